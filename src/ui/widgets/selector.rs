//! Searchable single-select list
//!
//! [`SearchableSelector`] wraps a flat option set with a type-to-filter
//! input and keyboard navigation. It replaces scrolling through hundreds of
//! entries: the user types part of a label, moves through the matches with
//! the arrow keys and commits one with Enter.
//!
//! The committed option is reported to an optional observer registered with
//! [`SearchableSelector::on_selection_changed`] and is also returned from the
//! commit call, so callers can use whichever fits.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::SelectableOption;
use crate::ui::theme::Theme;
use crate::ui::widgets::searchbar::SearchBar;
use crate::utils::truncate;

/// Observer invoked with the committed option
pub type SelectionHandler = Box<dyn FnMut(&SelectableOption) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Next,
    Prev,
}

/// What a key press did to the selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorOutcome {
    /// Key consumed, selector still open
    Pending,
    /// An option was committed and the panel closed
    Committed(SelectableOption),
    /// The panel was closed without a change
    Closed,
    /// Key not handled (selector closed)
    Ignored,
}

pub struct SearchableSelector {
    title: String,
    options: Vec<SelectableOption>,
    input: SearchBar,
    /// Indices into `options` matching the filter
    visible: Vec<usize>,
    /// Index into `visible`
    highlighted: Option<usize>,
    selected_id: Option<String>,
    open: bool,
    on_change: Option<SelectionHandler>,
}

impl SearchableSelector {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            options: Vec::new(),
            input: SearchBar::new(),
            visible: Vec::new(),
            highlighted: None,
            selected_id: None,
            open: false,
            on_change: None,
        }
    }

    pub fn with_options(mut self, options: Vec<SelectableOption>) -> Self {
        self.set_options(options);
        self
    }

    /// Register the observer called after every successful commit
    pub fn on_selection_changed<F>(&mut self, handler: F)
    where
        F: FnMut(&SelectableOption) + Send + 'static,
    {
        self.on_change = Some(Box::new(handler));
    }

    /// Replace the whole option set, keeping the filter text. The committed
    /// id is kept even if the new set no longer contains it.
    pub fn set_options(&mut self, options: Vec<SelectableOption>) {
        let highlighted_id = self.highlighted_option().map(|o| o.id.clone());
        self.options = options;
        self.recompute();
        if let Some(id) = highlighted_id {
            if let Some(pos) = self.visible.iter().position(|&i| self.options[i].id == id) {
                self.highlighted = Some(pos);
            }
        }
    }

    pub fn options(&self) -> &[SelectableOption] {
        &self.options
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn filter_text(&self) -> &str {
        &self.input.query
    }

    pub fn visible_options(&self) -> impl Iterator<Item = &SelectableOption> {
        self.visible.iter().map(|&i| &self.options[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_option(&self) -> Option<&SelectableOption> {
        self.highlighted
            .and_then(|h| self.visible.get(h))
            .map(|&i| &self.options[i])
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// The committed option, if it is still part of the current set
    pub fn selected_option(&self) -> Option<&SelectableOption> {
        let id = self.selected_id.as_deref()?;
        self.options.iter().find(|o| o.id == id)
    }

    /// Show the panel with an empty filter, highlighting the committed
    /// option when there is one.
    pub fn open(&mut self) {
        self.open = true;
        self.input.clear();
        self.input.activate();
        self.recompute();
        if let Some(id) = self.selected_id.as_deref() {
            if let Some(pos) = self.visible.iter().position(|&i| self.options[i].id == id) {
                self.highlighted = Some(pos);
            }
        }
    }

    /// Hide the panel; the committed selection is untouched
    pub fn close(&mut self) {
        self.open = false;
        self.input.deactivate();
    }

    /// Set the filter text and recompute the visible options
    pub fn filter(&mut self, text: &str) {
        self.input.set_query(text);
        self.recompute();
    }

    pub fn navigate(&mut self, direction: NavDirection) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        self.highlighted = Some(match (self.highlighted, direction) {
            (None, NavDirection::Next) => 0,
            (None, NavDirection::Prev) => len - 1,
            (Some(h), NavDirection::Next) => (h + 1) % len,
            (Some(h), NavDirection::Prev) => (h + len - 1) % len,
        });
    }

    /// Commit the option at `index` of the visible list
    pub fn commit_index(&mut self, index: usize) -> Option<SelectableOption> {
        let option = self.options.get(*self.visible.get(index)?)?.clone();
        Some(self.commit(option))
    }

    /// Commit by id. Ids outside the current option set are rejected.
    pub fn commit_id(&mut self, id: &str) -> Option<SelectableOption> {
        let option = self.options.iter().find(|o| o.id == id)?.clone();
        Some(self.commit(option))
    }

    pub fn commit_highlighted(&mut self) -> Option<SelectableOption> {
        self.commit_index(self.highlighted?)
    }

    fn commit(&mut self, option: SelectableOption) -> SelectableOption {
        self.selected_id = Some(option.id.clone());
        self.close();
        if let Some(handler) = self.on_change.as_mut() {
            handler(&option);
        }
        option
    }

    /// Forget the committed selection without notifying the observer
    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    fn recompute(&mut self) {
        let needle = self.input.query.to_lowercase();
        self.visible = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.matches(&needle))
            .map(|(i, _)| i)
            .collect();
        self.highlighted = if self.visible.is_empty() { None } else { Some(0) };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SelectorOutcome {
        if !self.open {
            return SelectorOutcome::Ignored;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.close();
                return SelectorOutcome::Closed;
            }
            (KeyCode::Enter, _) => {
                return match self.commit_highlighted() {
                    Some(option) => SelectorOutcome::Committed(option),
                    None => SelectorOutcome::Pending,
                };
            }
            (KeyCode::Up, _) | (KeyCode::Char('p'), KeyModifiers::CONTROL) => {
                self.navigate(NavDirection::Prev)
            }
            (KeyCode::Down, _) | (KeyCode::Char('n'), KeyModifiers::CONTROL) => {
                self.navigate(NavDirection::Next)
            }
            (KeyCode::Left, _) => self.input.move_left(),
            (KeyCode::Right, _) => self.input.move_right(),
            (KeyCode::Home, _) => self.input.move_home(),
            (KeyCode::End, _) => self.input.move_end(),
            (KeyCode::Backspace, _) => {
                self.input.backspace();
                self.recompute();
            }
            (KeyCode::Delete, _) => {
                self.input.delete();
                self.recompute();
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.input.clear();
                self.recompute();
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.input.insert(c);
                self.recompute();
            }
            _ => {}
        }
        SelectorOutcome::Pending
    }

    /// Render the open panel as a popup over `area`
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(
                " {} ({}/{}) ",
                self.title,
                self.visible.len(),
                self.options.len()
            ))
            .borders(Borders::ALL)
            .border_style(theme.border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Filter
                Constraint::Min(1),    // Options
                Constraint::Length(1), // Hint
            ])
            .split(inner);

        self.input.render(
            frame,
            chunks[0],
            "Filter",
            theme.normal(),
            theme.border_focused(),
        );

        if self.visible.is_empty() {
            let text = if self.options.is_empty() {
                "Nothing loaded"
            } else {
                "No results"
            };
            frame.render_widget(Paragraph::new(text).style(theme.dim()), chunks[1]);
        } else {
            let width = chunks[1].width.saturating_sub(4) as usize;
            let items: Vec<ListItem> = self
                .visible_options()
                .map(|o| {
                    let marker = if self.selected_id.as_deref() == Some(o.id.as_str()) {
                        Span::styled("● ", theme.success())
                    } else {
                        Span::raw("  ")
                    };
                    ListItem::new(Line::from(vec![
                        marker,
                        Span::styled(truncate(&o.label, width), theme.normal()),
                    ]))
                })
                .collect();

            let list = List::new(items)
                .highlight_style(theme.selected())
                .highlight_symbol("▶ ");
            let mut list_state = ListState::default();
            list_state.select(self.highlighted);
            frame.render_stateful_widget(list, chunks[1], &mut list_state);
        }

        let hint = Paragraph::new(" ↑/↓ move  Enter select  Esc close").style(theme.dim());
        frame.render_widget(hint, chunks[2]);
    }
}
