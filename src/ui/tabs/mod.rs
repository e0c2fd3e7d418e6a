pub mod annotations;
pub mod categories;
pub mod pechas;

use ratatui::text::{Line, Span};

use crate::models::LocalizedText;
use crate::ui::theme::Theme;
use crate::ui::widgets::popup::language_name;

/// One `Label (Language): text` line per language, in display order
pub(crate) fn localized_lines<'a>(label: &str, text: &'a LocalizedText, theme: &Theme) -> Vec<Line<'a>> {
    text.ordered_languages()
        .into_iter()
        .filter_map(|lang| {
            let value = text.get(lang)?;
            Some(Line::from(vec![
                Span::styled(format!("{} ({}): ", label, language_name(lang)), theme.dim()),
                Span::styled(value, theme.normal()),
            ]))
        })
        .collect()
}
