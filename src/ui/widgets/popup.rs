//! Popup/modal panel widget

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::models::CategoryNode;
use crate::ui::theme::Theme;

/// Popup panel drawn over whatever is below it
pub struct Popup<'a> {
    pub title: String,
    pub lines: Vec<Line<'a>>,
    pub style: Style,
    pub border_style: Style,
}

impl<'a> Popup<'a> {
    pub fn new(title: &str, lines: Vec<Line<'a>>) -> Self {
        Self {
            title: title.to_string(),
            lines,
            style: Style::default(),
            border_style: Style::default(),
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        // Clear background
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(self.border_style)
            .style(self.style);

        let paragraph = Paragraph::new(self.lines)
            .block(block)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);
    }
}

/// Human name for the language codes the catalog uses
pub fn language_name(lang: &str) -> &str {
    match lang {
        "bo" => "Tibetan",
        "en" => "English",
        "lzh" => "Literary Chinese",
        "zh" => "Chinese",
        "sa" => "Sanskrit",
        other => other,
    }
}

/// Full per-language description of a category, Tibetan first
pub fn category_details<'a>(node: &'a CategoryNode, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("ID: ", theme.dim()),
            Span::styled(node.id.as_str(), theme.accent()),
        ]),
        Line::from(vec![
            Span::styled("Subcategories: ", theme.dim()),
            Span::raw(node.children.len().to_string()),
        ]),
    ];

    let details = node.details();
    if details.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("No localized text", theme.dim())));
    }

    for d in details {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            language_name(d.lang),
            theme.accent().add_modifier(Modifier::BOLD),
        )));
        let fields = [
            ("Title", d.title),
            ("Description", d.description),
            ("Short description", d.short_description),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}: ", label), theme.dim()),
                    Span::styled(value, theme.normal()),
                ]));
            }
        }
    }

    lines
}
