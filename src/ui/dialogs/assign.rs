//! Category assignment confirmation dialog

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::state::AppMessage;
use crate::ui::layout::DialogLayout;
use crate::ui::theme::Theme;
use crate::ui::widgets::form::Checkbox;

/// Asks before sending `PUT /metadata/{id}/category`
pub struct AssignDialog {
    pub pecha_id: String,
    pub pecha_label: String,
    pub category_id: String,
    pub category_label: String,
    pub relate: Checkbox,
    pub selected: bool, // true = confirm selected
    pub result: Option<bool>,
}

impl AssignDialog {
    pub fn new(pecha_id: &str, pecha_label: &str, category_id: &str, category_label: &str) -> Self {
        Self {
            pecha_id: pecha_id.to_string(),
            pecha_label: pecha_label.to_string(),
            category_id: category_id.to_string(),
            category_label: category_label.to_string(),
            relate: Checkbox::new("Also apply to related pechas", false),
            selected: false,
            result: None,
        }
    }

    /// Returns true once the dialog is finished
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.selected = !self.selected;
            }
            KeyCode::Char(' ') => self.relate.toggle(),
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.result = Some(true);
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.result = Some(false);
                return true;
            }
            KeyCode::Enter => {
                self.result = Some(self.selected);
                return true;
            }
            _ => {}
        }
        false
    }

    /// The message to send if the user confirmed
    pub fn message(&self) -> Option<AppMessage> {
        if self.result != Some(true) {
            return None;
        }
        Some(AppMessage::AssignCategory {
            pecha_id: self.pecha_id.clone(),
            category_id: self.category_id.clone(),
            relate_pecha: self.relate.checked,
        })
    }

    pub fn render(&self, frame: &mut Frame, theme: &Theme) {
        let area = frame.area();
        let dialog_area = DialogLayout::centered(area, 64, 12).dialog;

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(" Assign category ")
            .borders(Borders::ALL)
            .border_style(theme.border_focused());

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(3),    // Message
                Constraint::Length(1), // Checkbox
                Constraint::Length(1), // Buttons
            ])
            .split(inner);

        let message = vec![
            Line::from(vec![
                Span::styled("Pecha:    ", theme.dim()),
                Span::styled(self.pecha_label.as_str(), theme.normal()),
            ]),
            Line::from(vec![
                Span::styled("Category: ", theme.dim()),
                Span::styled(self.category_label.as_str(), theme.accent()),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(message).wrap(Wrap { trim: true }),
            chunks[0],
        );

        self.relate.render(frame, chunks[1], theme.normal(), theme.highlight());

        let yes_style = if self.selected {
            theme.accent().add_modifier(Modifier::BOLD)
        } else {
            theme.dim()
        };
        let no_style = if !self.selected {
            theme.accent().add_modifier(Modifier::BOLD)
        } else {
            theme.dim()
        };

        let buttons = Line::from(vec![
            Span::raw("  "),
            Span::styled("[ Assign ]", yes_style),
            Span::raw("    "),
            Span::styled("[ Cancel ]", no_style),
            Span::styled("   Space toggles", theme.dim()),
        ]);
        frame.render_widget(Paragraph::new(buttons), chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn dialog() -> AssignDialog {
        AssignDialog::new("P1", "P1 - Heart Sutra", "c2", "Child")
    }

    #[test]
    fn test_confirm_with_relate() {
        let mut d = dialog();
        assert!(!d.handle_key(key(KeyCode::Char(' '))));
        assert!(d.handle_key(key(KeyCode::Char('y'))));
        match d.message() {
            Some(AppMessage::AssignCategory {
                pecha_id,
                category_id,
                relate_pecha,
            }) => {
                assert_eq!(pecha_id, "P1");
                assert_eq!(category_id, "c2");
                assert!(relate_pecha);
            }
            other => panic!("unexpected message: {:?}", other.is_some()),
        }
    }

    #[test]
    fn test_enter_defaults_to_cancel() {
        let mut d = dialog();
        assert!(d.handle_key(key(KeyCode::Enter)));
        assert_eq!(d.result, Some(false));
        assert!(d.message().is_none());
    }

    #[test]
    fn test_escape_cancels() {
        let mut d = dialog();
        d.handle_key(key(KeyCode::Tab));
        assert!(d.handle_key(key(KeyCode::Esc)));
        assert!(d.message().is_none());
    }
}
