//! Categories tab: choose a root category, browse its tree and assign a
//! category to the target pecha

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tokio::sync::mpsc;

use crate::app::events::navigation_delta;
use crate::app::notifications::Toast;
use crate::app::state::{AppMessage, AppState};
use crate::config::KeyBindings;
use crate::models::{CategoryCatalog, LanguagePolicy, PechaMetadata};
use crate::ui::dialogs::AssignDialog;
use crate::ui::layout::{DialogLayout, SplitLayout};
use crate::ui::theme::Theme;
use crate::ui::widgets::popup::{category_details, Popup};
use crate::ui::widgets::{SearchableSelector, SelectorOutcome, TreeView};

pub struct CategoriesTab {
    root_selector: SearchableSelector,
    catalog: Option<CategoryCatalog>,
    catalog_version: u64,
    root_id: Option<String>,
    tree: Option<TreeView>,
    target: Option<PechaMetadata>,
    show_details: bool,
    dialog: Option<AssignDialog>,
    policy: LanguagePolicy,
}

impl CategoriesTab {
    pub fn new(state: &Arc<AppState>) -> Self {
        Self {
            root_selector: SearchableSelector::new("Root category"),
            catalog: None,
            catalog_version: 0,
            root_id: None,
            tree: None,
            target: None,
            show_details: false,
            dialog: None,
            policy: state.settings.languages.clone(),
        }
    }

    /// True while a popup, dialog or the root selector owns the keyboard
    pub fn capturing_input(&self) -> bool {
        self.root_selector.is_open() || self.dialog.is_some() || self.show_details
    }

    pub async fn update_cache(&mut self, state: &Arc<AppState>) {
        let refreshed = {
            let catalog = state.catalog.read().await;
            if catalog.version != self.catalog_version {
                self.catalog_version = catalog.version;
                self.catalog = catalog.data.clone();
                true
            } else {
                false
            }
        };
        if refreshed {
            self.on_catalog_refreshed(state).await;
        }
        self.target = state.target.read().await.clone();
    }

    async fn on_catalog_refreshed(&mut self, state: &Arc<AppState>) {
        let Some(catalog) = &self.catalog else {
            return;
        };
        self.root_selector.set_options(catalog.to_options(&self.policy));

        let root = match self.root_id.clone() {
            Some(id) if catalog.get(&id).is_some() => Some(id),
            Some(id) => {
                tracing::info!("Root category {} no longer in catalog", id);
                self.root_selector.clear_selection();
                None
            }
            None => None,
        };
        let root = root.or_else(|| catalog.entries().first().map(|e| e.id.clone()));

        match root {
            Some(id) => {
                if let Err(message) = self.load_tree(&id) {
                    state.push_toast(Toast::error(message)).await;
                }
            }
            None => {
                self.root_id = None;
                self.tree = None;
            }
        }
    }

    /// Build the tree for `root_id`, keeping the current selection and cursor
    /// when the same root is rebuilt. On failure the old tree stays visible.
    fn load_tree(&mut self, root_id: &str) -> Result<(), String> {
        let Some(catalog) = &self.catalog else {
            return Err("Category catalog not loaded".to_string());
        };

        let mut tree = catalog.build_tree(root_id).map_err(|e| {
            tracing::warn!("Cannot build category tree {}: {}", root_id, e);
            format!("Invalid category tree {}: {}", root_id, e)
        })?;

        let same_root = self.root_id.as_deref() == Some(root_id);
        let (selected, cursor) = match (&self.tree, same_root) {
            (Some(old), true) => (
                old.selected().map(|n| n.id.clone()),
                old.cursor_node().map(|n| n.id.clone()),
            ),
            _ => (None, None),
        };
        if let Some(id) = &selected {
            tree.select_by_id(id);
        }

        let mut view = TreeView::new(tree);
        if let Some(node) = cursor.and_then(|id| view.tree().find(&id)) {
            view.reveal(node);
        }

        tracing::debug!("Category tree {} has {} nodes", root_id, view.tree().len());
        self.root_id = Some(root_id.to_string());
        self.root_selector.commit_id(root_id);
        self.tree = Some(view);
        Ok(())
    }

    fn open_assign_dialog(&mut self) -> Result<(), String> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| "Choose a target pecha on the Pechas tab first".to_string())?;
        let view = self
            .tree
            .as_mut()
            .ok_or_else(|| "No category tree loaded".to_string())?;
        let category_id = view
            .select_cursor()
            .ok_or_else(|| "No category under the cursor".to_string())?;
        let node = view
            .tree()
            .find(&category_id)
            .ok_or_else(|| "No category under the cursor".to_string())?;
        let label = view.tree().breadcrumb(node, &self.policy);

        let pecha_label = target.to_option(&self.policy).label;
        self.dialog = Some(AssignDialog::new(&target.id, &pecha_label, &category_id, &label));
        Ok(())
    }

    pub async fn handle_key(
        &mut self,
        key: KeyEvent,
        state: &Arc<AppState>,
        state_tx: &mpsc::Sender<AppMessage>,
        keys: &KeyBindings,
    ) {
        if let Some(dialog) = &mut self.dialog {
            if dialog.handle_key(key) {
                if let Some(msg) = dialog.message() {
                    let _ = state_tx.send(msg).await;
                }
                self.dialog = None;
            }
            return;
        }

        if self.show_details {
            self.show_details = false;
            return;
        }

        if self.root_selector.is_open() {
            if let SelectorOutcome::Committed(option) = self.root_selector.handle_key(key) {
                if let Err(message) = self.load_tree(&option.id) {
                    if let Some(previous) = self.root_id.clone() {
                        self.root_selector.commit_id(&previous);
                    }
                    state.push_toast(Toast::error(message)).await;
                }
            }
            return;
        }

        if keys.choose_root.matches_event(&key) || keys.search.matches_event(&key) {
            self.root_selector.open();
        } else if keys.refresh.matches_event(&key) {
            let _ = state_tx.send(AppMessage::RefreshCatalog).await;
        } else if keys.details.matches_event(&key) {
            self.show_details = self.tree.as_ref().and_then(|t| t.cursor_node()).is_some();
        } else if keys.select.matches_event(&key) || keys.assign.matches_event(&key) {
            if let Err(message) = self.open_assign_dialog() {
                state.push_toast(Toast::info(message)).await;
            }
        } else if let Some(view) = &mut self.tree {
            if keys.expand.matches_event(&key) {
                view.expand();
            } else if keys.collapse.matches_event(&key) {
                view.collapse();
            } else if keys.toggle.matches_event(&key) {
                view.toggle();
            } else if let Some(delta) = navigation_delta(&key) {
                view.move_cursor(delta);
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Root and target
                Constraint::Min(5),    // Tree + selection
                Constraint::Length(1), // Hints
            ])
            .split(area);

        let root_label = self
            .root_selector
            .selected_option()
            .map(|o| o.label.clone())
            .unwrap_or_else(|| "none".to_string());
        let target_label = self
            .target
            .as_ref()
            .map(|p| p.to_option(&self.policy).label)
            .unwrap_or_else(|| "none".to_string());
        let header = Line::from(vec![
            Span::styled(" Root: ", theme.dim()),
            Span::styled(root_label, theme.accent()),
            Span::styled("   Target: ", theme.dim()),
            Span::styled(target_label, theme.highlight()),
        ]);
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let split = SplitLayout::new(chunks[1], 60);
        let tree_block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(theme.border());
        let tree_area = tree_block.inner(split.left);
        frame.render_widget(tree_block, split.left);

        match &mut self.tree {
            Some(view) => view.render(frame, tree_area, theme),
            None => {
                let text = if self.catalog.is_none() {
                    "Loading categories..."
                } else {
                    "Press c to choose a root category"
                };
                frame.render_widget(Paragraph::new(text).style(theme.dim()), tree_area);
            }
        }

        self.render_selection(frame, split.right, theme);

        let hint = Paragraph::new(
            " ←→ = collapse/expand  Enter,a = assign  i = details  c = root  r = refresh",
        )
        .style(theme.dim());
        frame.render_widget(hint, chunks[2]);

        if self.show_details {
            if let Some(node) = self.tree.as_ref().and_then(|t| t.cursor_node()) {
                let popup_area = DialogLayout::new(area, 70, 70).dialog;
                Popup::new("Category details", category_details(node, theme))
                    .with_border_style(theme.border_focused())
                    .render(frame, popup_area);
            }
        }

        if self.root_selector.is_open() {
            let popup_area = DialogLayout::new(area, 60, 70).dialog;
            self.root_selector.render(frame, popup_area, theme);
        }

        if let Some(dialog) = &self.dialog {
            dialog.render(frame, theme);
        }
    }

    fn render_selection(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::NONE)
            .title(Span::styled(" Selected category ", theme.accent()));

        let mut lines = Vec::new();
        match self.tree.as_ref().and_then(|t| {
            let id = t.tree().selected_node_id()?;
            Some((t, id))
        }) {
            Some((view, id)) => {
                lines.push(Line::from(Span::styled(
                    view.tree().breadcrumb(id, &self.policy),
                    theme.highlight(),
                )));
                if let Some(node) = view.tree().node(id) {
                    lines.push(Line::from(vec![
                        Span::styled("ID: ", theme.dim()),
                        Span::raw(node.id.as_str()),
                    ]));
                }
            }
            None => lines.push(Line::from(Span::styled("Nothing selected", theme.dim()))),
        }

        if let Some(current) = self.target.as_ref().and_then(|p| p.category.as_deref()) {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Current category of target: ", theme.dim()),
                Span::styled(current, theme.success()),
            ]));
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}
