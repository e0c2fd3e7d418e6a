//! Search/filter input widget

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Single-line text input used as the filter box of a selector.
///
/// `cursor_pos` counts characters, not bytes, so Tibetan and Chinese input
/// edit correctly.
#[derive(Debug, Clone, Default)]
pub struct SearchBar {
    pub query: String,
    pub active: bool,
    pub cursor_pos: usize,
}

impl SearchBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.cursor_pos = self.char_len();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.cursor_pos = 0;
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.cursor_pos = self.char_len();
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_offset(self.cursor_pos);
        self.query.insert(at, c);
        self.cursor_pos += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let at = self.byte_offset(self.cursor_pos);
            self.query.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor_pos < self.char_len() {
            let at = self.byte_offset(self.cursor_pos);
            self.query.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_pos < self.char_len() {
            self.cursor_pos += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_pos = self.char_len();
    }

    fn char_len(&self) -> usize {
        self.query.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.query
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.query.len())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str, style: Style, focused_style: Style) {
        let border_style = if self.active { focused_style } else { style };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", title));

        let display_text = if self.query.is_empty() && !self.active {
            "Type to filter...".to_string()
        } else {
            self.query.clone()
        };

        let paragraph = Paragraph::new(display_text)
            .block(block)
            .style(style);

        frame.render_widget(paragraph, area);

        // Show cursor if active
        if self.active {
            frame.set_cursor_position((
                area.x + 1 + self.cursor_pos as u16,
                area.y + 1,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_multibyte_text() {
        let mut bar = SearchBar::new();
        for c in "བོད".chars() {
            bar.insert(c);
        }
        assert_eq!(bar.cursor_pos, 3);
        bar.move_left();
        bar.insert('x');
        assert_eq!(bar.query, "བོxད");
        bar.backspace();
        assert_eq!(bar.query, "བོད");
        bar.move_home();
        bar.delete();
        assert_eq!(bar.query, "ོད");
        bar.move_end();
        assert_eq!(bar.cursor_pos, 2);
    }

    #[test]
    fn test_set_query_and_clear() {
        let mut bar = SearchBar::new();
        bar.set_query("beta");
        assert_eq!(bar.cursor_pos, 4);
        bar.clear();
        assert!(bar.query.is_empty());
        assert_eq!(bar.cursor_pos, 0);
        bar.backspace();
        assert_eq!(bar.cursor_pos, 0);
    }
}
