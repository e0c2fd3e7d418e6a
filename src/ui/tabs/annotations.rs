//! Annotations tab: annotations of the target pecha

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tokio::sync::mpsc;

use crate::app::events::{apply_delta, navigation_delta};
use crate::app::requests::RequestKind;
use crate::app::state::{AppMessage, AppState};
use crate::config::KeyBindings;
use crate::models::AnnotationEntry;
use crate::ui::layout::{DialogLayout, SplitLayout};
use crate::ui::theme::Theme;
use crate::ui::widgets::{SearchableSelector, SelectorOutcome};
use crate::utils::truncate;

pub struct AnnotationsTab {
    selector: SearchableSelector,
    entries: Vec<AnnotationEntry>,
    pecha_id: Option<String>,
    version: u64,
    cursor: usize,
    loading: bool,
}

impl AnnotationsTab {
    pub fn new() -> Self {
        Self {
            selector: SearchableSelector::new("Annotations"),
            entries: Vec::new(),
            pecha_id: None,
            version: 0,
            cursor: 0,
            loading: false,
        }
    }

    pub fn capturing_input(&self) -> bool {
        self.selector.is_open()
    }

    pub async fn update_cache(&mut self, state: &Arc<AppState>) {
        {
            let annotations = state.annotations.read().await;
            if annotations.version != self.version {
                self.version = annotations.version;
                if annotations.data.pecha_id != self.pecha_id {
                    self.selector.clear_selection();
                    self.cursor = 0;
                }
                self.pecha_id = annotations.data.pecha_id.clone();
                self.entries = annotations.data.entries.clone();
                self.selector
                    .set_options(self.entries.iter().map(|a| a.to_option()).collect());
                self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
            }
        }
        self.loading = state.is_loading(RequestKind::Annotations).await;
    }

    fn current(&self) -> Option<&AnnotationEntry> {
        self.entries.get(self.cursor)
    }

    pub async fn handle_key(
        &mut self,
        key: KeyEvent,
        _state: &Arc<AppState>,
        state_tx: &mpsc::Sender<AppMessage>,
        keys: &KeyBindings,
    ) {
        if self.selector.is_open() {
            if let SelectorOutcome::Committed(option) = self.selector.handle_key(key) {
                if let Some(pos) = self.entries.iter().position(|a| a.id == option.id) {
                    self.cursor = pos;
                }
            }
            return;
        }

        if keys.search.matches_event(&key) || keys.select.matches_event(&key) {
            self.selector.open();
        } else if keys.refresh.matches_event(&key) {
            let _ = state_tx.send(AppMessage::RefreshAnnotations).await;
        } else if let Some(delta) = navigation_delta(&key) {
            self.cursor = apply_delta(self.cursor, delta, self.entries.len());
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(area);
        let split = SplitLayout::new(chunks[0], 50);

        let title = match &self.pecha_id {
            Some(id) => format!(" {} - {} annotations ", id, self.entries.len()),
            None => " No target pecha ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(theme.border())
            .title(Span::styled(title, theme.accent()));

        if self.entries.is_empty() {
            let text = if self.pecha_id.is_none() {
                "Choose a pecha on the Pechas tab"
            } else if self.loading {
                "Loading annotations..."
            } else {
                "This pecha has no annotations"
            };
            frame.render_widget(
                Paragraph::new(text).style(theme.dim()).block(block),
                split.left,
            );
        } else {
            let width = split.left.width.saturating_sub(4) as usize;
            let items: Vec<ListItem> = self
                .selector
                .options()
                .iter()
                .map(|o| ListItem::new(truncate(&o.label, width)))
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(theme.selected())
                .highlight_symbol("▶ ");
            let mut list_state = ListState::default();
            list_state.select(Some(self.cursor));
            frame.render_stateful_widget(list, split.left, &mut list_state);
        }

        self.render_details(frame, split.right, theme);

        let hint = Paragraph::new(" ↑↓ = navigate  Enter,/ = search  r = refresh")
            .style(theme.dim());
        frame.render_widget(hint, chunks[1]);

        if self.selector.is_open() {
            let popup = DialogLayout::new(area, 60, 70).dialog;
            self.selector.render(frame, popup, theme);
        }
    }

    fn render_details(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::NONE)
            .title(Span::styled(" Annotation ", theme.accent()));

        let lines = match self.current() {
            None => vec![Line::from(Span::styled("Nothing selected", theme.dim()))],
            Some(a) => {
                let mut lines = vec![
                    Line::from(vec![
                        Span::styled("ID: ", theme.dim()),
                        Span::styled(a.id.as_str(), theme.highlight()),
                    ]),
                    Line::from(vec![
                        Span::styled("Title: ", theme.dim()),
                        Span::raw(a.title.as_str()),
                    ]),
                    Line::from(vec![
                        Span::styled("Type: ", theme.dim()),
                        Span::raw(a.kind.as_str()),
                    ]),
                ];
                if let Some(aligned) = &a.aligned_to {
                    lines.push(Line::from(vec![
                        Span::styled("Aligned to: ", theme.dim()),
                        Span::raw(aligned.as_str()),
                    ]));
                }
                lines
            }
        };

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}

impl Default for AnnotationsTab {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::app::state::AnnotationSet;
    use crate::config::Settings;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::time::Duration;
    use tokio::sync::broadcast;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn entry(id: &str, title: &str, kind: &str) -> AnnotationEntry {
        AnnotationEntry {
            id: id.to_string(),
            title: title.to_string(),
            kind: kind.to_string(),
            aligned_to: None,
        }
    }

    #[tokio::test]
    async fn test_search_moves_cursor_to_committed_annotation() {
        let api = ApiClient::new("http://127.0.0.1:9/api", Duration::from_secs(1), None).unwrap();
        let (tx, _) = broadcast::channel(16);
        let state = Arc::new(AppState::new(Settings::default(), api, tx));
        let (state_tx, _state_rx) = mpsc::channel(16);

        state.annotations.write().await.replace(AnnotationSet {
            pecha_id: Some("P1".to_string()),
            entries: vec![
                entry("a1", "Segmentation", "segmentation"),
                entry("a2", "English alignment", "alignment"),
            ],
        });

        let mut tab = AnnotationsTab::new();
        tab.update_cache(&state).await;
        assert_eq!(tab.selector.options().len(), 2);

        let keys = KeyBindings::default();
        tab.handle_key(key(KeyCode::Char('/')), &state, &state_tx, &keys).await;
        assert!(tab.capturing_input());
        for c in "align".chars() {
            tab.handle_key(key(KeyCode::Char(c)), &state, &state_tx, &keys).await;
        }
        tab.handle_key(key(KeyCode::Enter), &state, &state_tx, &keys).await;

        assert!(!tab.capturing_input());
        assert_eq!(tab.current().map(|a| a.id.as_str()), Some("a2"));
    }
}
