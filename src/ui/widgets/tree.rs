//! Tree view widget for a [`CategoryTree`]

use std::collections::HashSet;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
    Frame,
};

use crate::models::{CategoryNode, CategoryTree, NodeId};
use crate::ui::theme::Theme;

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub node: NodeId,
    pub depth: usize,
    pub expanded: bool,
    pub is_leaf: bool,
}

/// Expand/collapse state and cursor over a category tree.
///
/// The tree data is owned here but never changed apart from its selection
/// marker; expansion is view state.
pub struct TreeView {
    tree: CategoryTree,
    expanded: HashSet<NodeId>,
    cursor: usize,
    offset: usize,
}

impl TreeView {
    pub fn new(tree: CategoryTree) -> Self {
        let mut expanded = HashSet::new();
        expanded.insert(tree.root_id());
        Self {
            tree,
            expanded,
            cursor: 0,
            offset: 0,
        }
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    /// Rows currently visible, in pre-order
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.push_rows(self.tree.root_id(), &mut rows);
        rows
    }

    fn push_rows(&self, id: NodeId, rows: &mut Vec<TreeRow>) {
        let Some(node) = self.tree.node(id) else {
            return;
        };
        let expanded = self.expanded.contains(&id);
        rows.push(TreeRow {
            node: id,
            depth: node.depth,
            expanded,
            is_leaf: node.is_leaf(),
        });
        if expanded {
            for child in &node.children {
                self.push_rows(*child, rows);
            }
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_id(&self) -> Option<NodeId> {
        self.rows().get(self.cursor).map(|r| r.node)
    }

    pub fn cursor_node(&self) -> Option<&CategoryNode> {
        self.cursor_id().and_then(|id| self.tree.node(id))
    }

    pub fn set_cursor(&mut self, row: usize) {
        let len = self.rows().len();
        self.cursor = row.min(len.saturating_sub(1));
    }

    pub fn move_cursor(&mut self, delta: i32) {
        let len = self.rows().len();
        self.cursor = crate::app::events::apply_delta(self.cursor, delta, len);
    }

    pub fn expand(&mut self) {
        if let Some(id) = self.cursor_id() {
            if !self.tree.node(id).map(|n| n.is_leaf()).unwrap_or(true) {
                self.expanded.insert(id);
            }
        }
    }

    /// Collapse the node under the cursor, or jump to its parent when it is
    /// already collapsed or a leaf.
    pub fn collapse(&mut self) {
        let Some(id) = self.cursor_id() else {
            return;
        };
        if self.expanded.contains(&id) && id != self.tree.root_id() {
            self.expanded.remove(&id);
        } else if let Some(parent) = self.tree.node(id).and_then(|n| n.parent) {
            self.reveal(parent);
        }
    }

    pub fn toggle(&mut self) {
        let Some(id) = self.cursor_id() else {
            return;
        };
        if self.expanded.contains(&id) {
            if id != self.tree.root_id() {
                self.expanded.remove(&id);
            }
        } else {
            self.expand();
        }
    }

    /// Expand every ancestor of `id` and put the cursor on it
    pub fn reveal(&mut self, id: NodeId) {
        let path = self.tree.path_to(id);
        if path.is_empty() {
            return;
        }
        for ancestor in &path[..path.len() - 1] {
            self.expanded.insert(*ancestor);
        }
        if let Some(row) = self.rows().iter().position(|r| r.node == id) {
            self.cursor = row;
        }
    }

    /// Select the node under the cursor; returns its category id
    pub fn select_cursor(&mut self) -> Option<String> {
        let id = self.cursor_id()?;
        self.tree.select(id);
        self.tree.selected().map(|n| n.id.clone())
    }

    pub fn selected(&self) -> Option<&CategoryNode> {
        self.tree.selected()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let rows = self.rows();
        let height = area.height as usize;

        // Keep the cursor inside the window
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if height > 0 && self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }

        let items: Vec<ListItem> = rows
            .iter()
            .filter_map(|row| {
                let node = self.tree.node(row.node)?;
                let marker = if row.is_leaf {
                    "  • "
                } else if row.expanded {
                    "  ▾ "
                } else {
                    "  ▸ "
                };
                let indent = "  ".repeat(row.depth);
                let is_selected = self.tree.is_selected(row.node);
                let label_style = if is_selected {
                    theme.highlight()
                } else {
                    theme.normal()
                };

                let mut spans = vec![
                    Span::raw(indent),
                    Span::styled(marker, theme.accent()),
                    Span::styled(node.compact_label(), label_style),
                ];
                if is_selected {
                    spans.push(Span::styled("  ✓ selected", theme.success()));
                }
                Some(ListItem::new(Line::from(spans)))
            })
            .collect();

        let list = List::new(items).highlight_style(theme.selected());
        let mut state = ListState::default().with_offset(self.offset);
        state.select(Some(self.cursor));
        frame.render_stateful_widget(list, area, &mut state);
        self.offset = state.offset();
    }
}
