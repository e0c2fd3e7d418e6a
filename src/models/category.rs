//! Category catalog and category tree
//!
//! A [`CategoryTree`] is built from one entry of the backend category
//! catalog. Nodes live in an arena and refer to each other by [`NodeId`];
//! the parent link is a plain index used for navigation only.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use thiserror::Error;

use super::localized::{LanguagePolicy, LocalizedText};
use super::option::SelectableOption;

/// Index of a node inside its [`CategoryTree`]
pub type NodeId = usize;

/// Deepest nesting accepted from a payload
pub const MAX_DEPTH: usize = 64;

/// Structural problems that make a category payload unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("category at {path} is not an object")]
    NotAnObject { path: String },

    #[error("category at {path} has no id")]
    MissingId { path: String },

    #[error("duplicate category id '{id}'")]
    DuplicateId { id: String },

    #[error("category nesting at {path} exceeds {max} levels")]
    TooDeep { path: String, max: usize },

    #[error("catalog payload has no 'categories' array")]
    InvalidCatalog,

    #[error("unknown root category '{id}'")]
    UnknownRoot { id: String },
}

/// A single category in a tree
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNode {
    pub id: String,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub short_description: LocalizedText,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub depth: usize,
}

/// All localized fields of a node for one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDetails<'a> {
    pub lang: &'a str,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub short_description: Option<&'a str>,
}

impl CategoryNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Row label, `bo (en) (lzh)`, falling back to the id
    pub fn compact_label(&self) -> String {
        self.title
            .compact_label()
            .unwrap_or_else(|| self.id.clone())
    }

    /// Per-language details in display order (Tibetan, English, Literary
    /// Chinese, then the rest alphabetically).
    pub fn details(&self) -> Vec<LanguageDetails<'_>> {
        let langs = super::localized::display_order(
            self.title
                .languages()
                .chain(self.description.languages())
                .chain(self.short_description.languages()),
        );

        langs
            .into_iter()
            .map(|lang| LanguageDetails {
                lang,
                title: self.title.get(lang),
                description: self.description.get(lang),
                short_description: self.short_description.get(lang),
            })
            .collect()
    }
}

/// A rooted category tree with single selection
#[derive(Debug, Clone)]
pub struct CategoryTree {
    nodes: Vec<CategoryNode>,
    index: HashMap<String, NodeId>,
    selected: Option<NodeId>,
}

impl CategoryTree {
    /// Build a tree from one category payload.
    ///
    /// A `subcategories` value that is not an object is treated as "no
    /// children". Missing ids, duplicate ids and runaway nesting are errors.
    pub fn build(payload: &Value) -> Result<Self, ParseError> {
        let mut tree = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            selected: None,
        };
        tree.insert(payload, None, None, "$")?;
        tracing::debug!("Built category tree with {} nodes", tree.nodes.len());
        Ok(tree)
    }

    fn insert(
        &mut self,
        payload: &Value,
        parent: Option<NodeId>,
        key: Option<&str>,
        path: &str,
    ) -> Result<NodeId, ParseError> {
        let depth = parent.map(|p| self.nodes[p].depth + 1).unwrap_or(0);
        if depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                path: path.to_string(),
                max: MAX_DEPTH,
            });
        }

        let obj = payload.as_object().ok_or_else(|| ParseError::NotAnObject {
            path: path.to_string(),
        })?;

        let id = payload_id(obj)
            .or(key)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ParseError::MissingId {
                path: path.to_string(),
            })?
            .to_string();

        if self.index.contains_key(&id) {
            return Err(ParseError::DuplicateId { id });
        }

        let node_id = self.nodes.len();
        self.nodes.push(CategoryNode {
            id: id.clone(),
            title: localized_field(obj, &["name", "title"]),
            description: localized_field(obj, &["description"]),
            short_description: localized_field(obj, &["short_description", "shortDescription"]),
            children: Vec::new(),
            parent,
            depth,
        });
        self.index.insert(id, node_id);

        match obj.get("subcategories") {
            None | Some(Value::Null) => {}
            Some(Value::Object(children)) => {
                for (child_key, child) in children {
                    let child_path = format!("{}.subcategories.{}", path, child_key);
                    let child_id =
                        self.insert(child, Some(node_id), Some(child_key), &child_path)?;
                    self.nodes[node_id].children.push(child_id);
                }
            }
            Some(other) => {
                tracing::warn!(
                    "Ignoring malformed subcategories at {} (expected object, got {})",
                    path,
                    json_kind(other)
                );
            }
        }

        Ok(node_id)
    }

    pub fn root(&self) -> &CategoryNode {
        &self.nodes[0]
    }

    pub fn root_id(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&CategoryNode> {
        self.nodes.get(id)
    }

    pub fn find(&self, category_id: &str) -> Option<NodeId> {
        self.index.get(category_id).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<&CategoryNode> {
        self.node(id)?.parent.and_then(|p| self.node(p))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &CategoryNode> {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|c| self.node(*c))
    }

    /// Node ids from the root down to `id`, inclusive
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.node(id).map(|_| id);
        while let Some(n) = current {
            path.push(n);
            current = self.nodes[n].parent;
        }
        path.reverse();
        path
    }

    /// Depth-first, pre-order traversal in payload order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CategoryNode)> {
        let mut stack = vec![self.root_id()];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = &self.nodes[id];
            stack.extend(node.children.iter().rev());
            Some((id, node))
        })
    }

    /// Mark `id` as the single selected node. Unknown ids are ignored.
    pub fn select(&mut self, id: NodeId) -> bool {
        if id >= self.nodes.len() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn select_by_id(&mut self, category_id: &str) -> bool {
        match self.find(category_id) {
            Some(id) => self.select(id),
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&CategoryNode> {
        self.selected.and_then(|id| self.node(id))
    }

    pub fn selected_node_id(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected == Some(id)
    }

    /// Breadcrumb such as `Root / Child` resolved with `policy`
    pub fn breadcrumb(&self, id: NodeId, policy: &LanguagePolicy) -> String {
        self.path_to(id)
            .into_iter()
            .map(|n| {
                let node = &self.nodes[n];
                policy
                    .resolve(&node.title)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| node.id.clone())
            })
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// One root entry of the backend catalog
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: String,
    pub title: LocalizedText,
    payload: Value,
}

impl CatalogEntry {
    pub fn build_tree(&self) -> Result<CategoryTree, ParseError> {
        CategoryTree::build(&self.payload)
    }
}

/// The backend category catalog (`GET /categories`)
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    entries: Vec<CatalogEntry>,
}

impl CategoryCatalog {
    /// Parse `{ "categories": [ ... ] }`. Entries without a usable id are
    /// skipped, and so are later entries repeating an earlier id.
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        let Value::Object(mut obj) = value else {
            return Err(ParseError::InvalidCatalog);
        };
        let Some(Value::Array(items)) = obj.remove("categories") else {
            return Err(ParseError::InvalidCatalog);
        };

        let mut entries = Vec::with_capacity(items.len());
        let mut seen = HashSet::new();
        for (i, item) in items.into_iter().enumerate() {
            let Some(obj) = item.as_object() else {
                tracing::warn!("Skipping catalog entry {}: not an object", i);
                continue;
            };
            let Some(id) = payload_id(obj).filter(|id| !id.trim().is_empty()) else {
                tracing::warn!("Skipping catalog entry {}: missing id", i);
                continue;
            };
            if !seen.insert(id.to_string()) {
                tracing::warn!("Skipping catalog entry {}: duplicate id {}", i, id);
                continue;
            }
            entries.push(CatalogEntry {
                id: id.to_string(),
                title: localized_field(obj, &["name", "title"]),
                payload: item.clone(),
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn build_tree(&self, root_id: &str) -> Result<CategoryTree, ParseError> {
        self.get(root_id)
            .ok_or_else(|| ParseError::UnknownRoot {
                id: root_id.to_string(),
            })?
            .build_tree()
    }

    /// Root categories as selector options
    pub fn to_options(&self, policy: &LanguagePolicy) -> Vec<SelectableOption> {
        self.entries
            .iter()
            .map(|e| {
                let label = match policy.resolve(&e.title) {
                    Some(title) => title.to_string(),
                    None => e.id.clone(),
                };
                SelectableOption::new(&e.id, &label)
            })
            .collect()
    }
}

fn payload_id(obj: &Map<String, Value>) -> Option<&str> {
    obj.get("id").and_then(|v| v.as_str())
}

fn localized_field(obj: &Map<String, Value>, keys: &[&str]) -> LocalizedText {
    keys.iter()
        .find_map(|k| obj.get(*k))
        .map(LocalizedText::from_value)
        .unwrap_or_default()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_catalog() -> Value {
        json!({
            "categories": [{
                "id": "c1",
                "name": {"en": "Root", "bo": "རྩ་བ།"},
                "subcategories": {
                    "c2": {"id": "c2", "name": {"en": "Child", "bo": "བུ།"}}
                }
            }]
        })
    }

    fn deep_payload() -> Value {
        json!({
            "id": "root",
            "name": {"en": "Root"},
            "description": {"en": "The root", "bo": "རྩ།"},
            "short_description": {"lzh": "根"},
            "subcategories": {
                "z": {
                    "id": "z",
                    "name": {"en": "Zed"},
                    "subcategories": {
                        "z1": {"id": "z1", "name": {"en": "Zed one"}},
                        "z2": {"id": "z2", "name": {"en": "Zed two"}}
                    }
                },
                "a": {"id": "a", "name": {"en": "Ay"}},
                "m": {"id": "m", "name": {"en": "Em"}, "subcategories": []}
            }
        })
    }

    #[test]
    fn test_catalog_scenario_builds_two_nodes_and_selects_child() {
        let catalog = CategoryCatalog::from_value(sample_catalog()).unwrap();
        assert_eq!(catalog.len(), 1);

        let mut tree = catalog.build_tree("c1").unwrap();
        assert_eq!(tree.len(), 2);

        let child = tree.find("c2").unwrap();
        assert!(tree.select(child));
        assert_eq!(tree.selected().map(|n| n.id.as_str()), Some("c2"));
    }

    #[test]
    fn test_node_count_and_parent_links() {
        let tree = CategoryTree::build(&deep_payload()).unwrap();
        assert_eq!(tree.len(), 6);

        for (id, node) in tree.iter() {
            match node.parent {
                None => assert_eq!(id, tree.root_id()),
                Some(parent) => {
                    assert!(tree.node(parent).unwrap().children.contains(&id));
                }
            }
        }

        let z1 = tree.find("z1").unwrap();
        assert_eq!(tree.parent(z1).unwrap().id, "z");
        assert_eq!(tree.node(z1).unwrap().depth, 2);
    }

    #[test]
    fn test_children_keep_payload_key_order() {
        let tree = CategoryTree::build(&deep_payload()).unwrap();
        let ids: Vec<&str> = tree.children(tree.root_id()).map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);

        let preorder: Vec<&str> = tree.iter().map(|(_, n)| n.id.as_str()).collect();
        assert_eq!(preorder, vec!["root", "z", "z1", "z2", "a", "m"]);
    }

    #[test]
    fn test_leaf_without_subcategories() {
        let tree = CategoryTree::build(&json!({"id": "solo", "name": {"en": "Solo"}})).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.root().is_leaf());
    }

    #[test]
    fn test_malformed_subcategories_are_treated_as_leaf() {
        for bad in [json!([1, 2]), json!("nope"), json!(3), json!(null)] {
            let tree = CategoryTree::build(&json!({"id": "r", "subcategories": bad})).unwrap();
            assert_eq!(tree.len(), 1);
        }
    }

    #[test]
    fn test_localized_fields_are_preserved() {
        let tree = CategoryTree::build(&deep_payload()).unwrap();
        let root = tree.root();
        assert_eq!(root.title.get("en"), Some("Root"));
        assert_eq!(root.description.get("bo"), Some("རྩ།"));
        assert_eq!(root.short_description.get("lzh"), Some("根"));
        assert_eq!(tree.node(tree.find("a").unwrap()).unwrap().description.len(), 0);
    }

    #[test]
    fn test_child_id_falls_back_to_key() {
        let tree = CategoryTree::build(&json!({
            "id": "r",
            "subcategories": {"k1": {"name": {"en": "Keyed"}}}
        }))
        .unwrap();
        assert!(tree.find("k1").is_some());
    }

    #[test]
    fn test_missing_root_id_is_an_error() {
        let err = CategoryTree::build(&json!({"name": {"en": "x"}})).unwrap_err();
        assert_eq!(err, ParseError::MissingId { path: "$".into() });
        assert!(matches!(
            CategoryTree::build(&json!("str")),
            Err(ParseError::NotAnObject { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = CategoryTree::build(&json!({
            "id": "r",
            "subcategories": {
                "a": {"id": "dup"},
                "b": {"id": "dup"}
            }
        }))
        .unwrap_err();
        assert_eq!(err, ParseError::DuplicateId { id: "dup".into() });
    }

    #[test]
    fn test_excessive_nesting_is_rejected() {
        let mut payload = json!({"id": "leaf"});
        for i in 0..MAX_DEPTH + 1 {
            payload = json!({"id": format!("n{}", i), "subcategories": {"x": payload}});
        }
        assert!(matches!(
            CategoryTree::build(&payload),
            Err(ParseError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_single_selection_across_tree() {
        let mut tree = CategoryTree::build(&deep_payload()).unwrap();
        let z1 = tree.find("z1").unwrap();
        let a = tree.find("a").unwrap();

        assert!(tree.select(z1));
        assert!(tree.select(a));
        assert!(tree.is_selected(a));
        assert!(!tree.is_selected(z1));

        assert!(!tree.select(999));
        assert_eq!(tree.selected().unwrap().id, "a");

        assert!(!tree.select_by_id("missing"));
        assert!(tree.select_by_id("z2"));
        assert_eq!(tree.selected().unwrap().id, "z2");

        tree.clear_selection();
        assert!(tree.selected().is_none());
    }

    #[test]
    fn test_labels_and_details() {
        let tree = CategoryTree::build(&json!({
            "id": "r",
            "name": {"en": "Foo", "bo": "བོད།", "lzh": "佛", "de": "Fu"},
            "description": {"en": "desc"}
        }))
        .unwrap();
        let root = tree.root();
        let label = root.compact_label();
        assert!(label.contains("Foo"));
        assert!(label.contains("བོད།"));
        assert_eq!(label, "བོད། (Foo) (佛)");

        let langs: Vec<&str> = root.details().iter().map(|d| d.lang).collect();
        assert_eq!(langs, vec!["bo", "en", "lzh", "de"]);
        assert_eq!(root.details()[1].description, Some("desc"));

        let bare = CategoryTree::build(&json!({"id": "bare"})).unwrap();
        assert_eq!(bare.root().compact_label(), "bare");
        assert!(!bare.root().compact_label().contains("undefined"));
    }

    #[test]
    fn test_path_and_breadcrumb() {
        let tree = CategoryTree::build(&deep_payload()).unwrap();
        let z2 = tree.find("z2").unwrap();
        assert_eq!(tree.path_to(z2).len(), 3);
        let policy = LanguagePolicy::new(vec!["en".into()]);
        assert_eq!(tree.breadcrumb(z2, &policy), "Root / Zed / Zed two");
    }

    #[test]
    fn test_catalog_validation() {
        assert_eq!(
            CategoryCatalog::from_value(json!({"other": []})).unwrap_err(),
            ParseError::InvalidCatalog
        );
        assert_eq!(
            CategoryCatalog::from_value(json!([])).unwrap_err(),
            ParseError::InvalidCatalog
        );

        let catalog = CategoryCatalog::from_value(json!({
            "categories": [{"id": "a", "name": {"en": "A"}}, {"name": {"en": "no id"}}, 7]
        }))
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(matches!(
            catalog.build_tree("zzz"),
            Err(ParseError::UnknownRoot { .. })
        ));

        let options = catalog.to_options(&LanguagePolicy::default());
        assert_eq!(options, vec![SelectableOption::new("a", "A")]);
    }

    #[test]
    fn test_catalog_keeps_first_of_duplicate_root_ids() {
        let catalog = CategoryCatalog::from_value(json!({
            "categories": [
                {"id": "c1", "name": {"en": "First"}},
                {"id": "c1", "name": {"en": "Second"}},
                {"id": "c3", "name": {"en": "Third"}}
            ]
        }))
        .unwrap();
        assert_eq!(catalog.len(), 2);

        let options = catalog.to_options(&LanguagePolicy::new(vec!["en".into()]));
        assert_eq!(
            options,
            vec![
                SelectableOption::new("c1", "First"),
                SelectableOption::new("c3", "Third"),
            ]
        );
    }
}
