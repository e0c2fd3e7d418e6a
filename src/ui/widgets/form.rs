//! Form input widgets

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Checkbox field
#[derive(Debug, Clone)]
pub struct Checkbox {
    pub label: String,
    pub checked: bool,
    pub focused: bool,
}

impl Checkbox {
    pub fn new(label: &str, checked: bool) -> Self {
        Self {
            label: label.to_string(),
            checked,
            focused: false,
        }
    }

    pub fn toggle(&mut self) {
        self.checked = !self.checked;
    }

    pub fn line(&self, style: Style, focused_style: Style) -> Line<'static> {
        let display_style = if self.focused { focused_style } else { style };
        let mark = if self.checked { "[x]" } else { "[ ]" };
        Line::from(vec![
            Span::styled(mark, display_style),
            Span::raw(" "),
            Span::styled(self.label.clone(), display_style),
        ])
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, style: Style, focused_style: Style) {
        frame.render_widget(Paragraph::new(self.line(style, focused_style)), area);
    }
}
