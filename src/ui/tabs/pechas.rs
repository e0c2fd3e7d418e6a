//! Pechas tab: page through pecha metadata and pick the target pecha

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use tokio::sync::mpsc;

use crate::app::state::{AppMessage, AppState};
use crate::config::KeyBindings;
use crate::models::{LanguagePolicy, PechaMetadata, RelationFilter};
use crate::ui::layout::{DialogLayout, SplitLayout};
use crate::ui::tabs::localized_lines;
use crate::ui::theme::Theme;
use crate::ui::widgets::{SearchableSelector, SelectorOutcome};
use crate::utils::truncate;

pub struct PechasTab {
    selector: SearchableSelector,
    /// Records behind the selector options, shared with the selection observer
    records: Arc<Mutex<HashMap<String, PechaMetadata>>>,
    version: u64,
    page: u32,
    has_more: bool,
    target: Option<PechaMetadata>,
    policy: LanguagePolicy,
    filter: RelationFilter,
}

impl PechasTab {
    pub fn new(state: &Arc<AppState>, state_tx: &mpsc::Sender<AppMessage>) -> Self {
        let records: Arc<Mutex<HashMap<String, PechaMetadata>>> = Arc::default();
        let mut selector = SearchableSelector::new("Pechas");

        let tx = state_tx.clone();
        let lookup = Arc::clone(&records);
        selector.on_selection_changed(move |option| {
            let pecha = lookup
                .lock()
                .ok()
                .and_then(|records| records.get(&option.id).cloned());
            if let Some(pecha) = pecha {
                if let Err(e) = tx.try_send(AppMessage::SetTargetPecha { pecha }) {
                    tracing::warn!("Could not set target pecha {}: {}", option.id, e);
                }
            }
        });

        Self {
            selector,
            records,
            version: 0,
            page: 0,
            has_more: false,
            target: None,
            policy: state.settings.languages.clone(),
            filter: state.settings.relation_filter,
        }
    }

    /// True while the selector owns the keyboard
    pub fn capturing_input(&self) -> bool {
        self.selector.is_open()
    }

    pub async fn update_cache(&mut self, state: &Arc<AppState>) {
        {
            let pechas = state.pechas.read().await;
            if pechas.version != self.version {
                self.version = pechas.version;
                self.page = pechas.data.page;
                self.has_more = pechas.data.has_more;
                let options = pechas
                    .data
                    .items
                    .iter()
                    .map(|p| p.to_option(&self.policy))
                    .collect();
                if let Ok(mut records) = self.records.lock() {
                    *records = pechas
                        .data
                        .items
                        .iter()
                        .map(|p| (p.id.clone(), p.clone()))
                        .collect();
                }
                self.selector.set_options(options);
            }
        }
        self.target = state.target.read().await.clone();
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
                tracing::debug!("Pecha committed: {}", option.id);
            }
            return;
        }

        let page = if keys.search.matches_event(&key) || keys.select.matches_event(&key) {
            self.selector.open();
            None
        } else if keys.next_page.matches_event(&key) {
            self.has_more.then(|| self.page + 1)
        } else if keys.prev_page.matches_event(&key) {
            self.page.checked_sub(1)
        } else if keys.refresh.matches_event(&key) {
            Some(self.page)
        } else {
            None
        };

        if let Some(page) = page {
            let _ = state_tx.send(AppMessage::FetchPechas { page }).await;
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(area);
        let split = SplitLayout::new(chunks[0], 50);

        self.render_list(frame, split.left, theme);
        self.render_target(frame, split.right, theme);

        let hint = Paragraph::new(
            " Enter,/ = search  [ ] = page  r = refresh  ● = target pecha",
        )
        .style(theme.dim());
        frame.render_widget(hint, chunks[1]);

        if self.selector.is_open() {
            let popup = DialogLayout::new(area, 70, 80).dialog;
            self.selector.render(frame, popup, theme);
        }
    }

    fn render_list(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let title = format!(
            " Page {}{} - {} pechas ",
            self.page + 1,
            if self.has_more { "+" } else { "" },
            self.selector.options().len()
        );
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(theme.border())
            .title(Span::styled(title, theme.accent()));

        let target_id = self.target.as_ref().map(|p| p.id.as_str());
        let width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = if self.selector.options().is_empty() {
            vec![ListItem::new(Span::styled("No pechas loaded", theme.dim()))]
        } else {
            self.selector
                .options()
                .iter()
                .map(|o| {
                    let is_target = target_id == Some(o.id.as_str());
                    let marker = if is_target {
                        Span::styled("● ", theme.success())
                    } else {
                        Span::raw("  ")
                    };
                    let style = if is_target { theme.highlight() } else { theme.normal() };
                    ListItem::new(Line::from(vec![
                        marker,
                        Span::styled(truncate(&o.label, width), style),
                    ]))
                })
                .collect()
        };

        frame.render_widget(List::new(items).block(block), area);
    }

    fn render_target(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::NONE)
            .title(Span::styled(" Target pecha ", theme.accent()));

        let mut lines = match &self.target {
            None => vec![Line::from(Span::styled(
                "No target selected. Press Enter to search.",
                theme.dim(),
            ))],
            Some(p) => {
                let mut lines = vec![Line::from(vec![
                    Span::styled("ID: ", theme.dim()),
                    Span::styled(p.id.as_str(), theme.highlight()),
                ])];
                if let Some(lang) = &p.language {
                    lines.push(Line::from(vec![
                        Span::styled("Language: ", theme.dim()),
                        Span::raw(lang.as_str()),
                    ]));
                }
                if let Some((relation, other)) = p.relation() {
                    lines.push(Line::from(vec![
                        Span::styled(format!("{}: ", relation), theme.dim()),
                        Span::raw(other),
                    ]));
                }
                lines.push(Line::from(vec![
                    Span::styled("Category: ", theme.dim()),
                    match &p.category {
                        Some(c) => Span::styled(c.as_str(), theme.success()),
                        None => Span::styled("none", theme.warning()),
                    },
                ]));
                lines.extend(localized_lines("Title", &p.title, theme));
                lines.extend(localized_lines("Author", &p.author, theme));
                lines
            }
        };

        if self.filter != RelationFilter::All {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Relation filter: {}", self.filter),
                theme.dim(),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}
