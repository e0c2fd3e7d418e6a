use serde::{Deserialize, Serialize};
use std::fmt;

use super::localized::{LanguagePolicy, LocalizedText};
use super::option::SelectableOption;

/// How a pecha relates to another pecha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    CommentaryOf,
    TranslationOf,
    VersionOf,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommentaryOf => write!(f, "commentary of"),
            Self::TranslationOf => write!(f, "translation of"),
            Self::VersionOf => write!(f, "version of"),
        }
    }
}

/// Which pechas are offered in the pecha list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationFilter {
    /// Everything the backend returns
    #[default]
    All,
    /// Only pechas that are not related to another pecha
    Root,
    /// Only pechas with the given relation
    Only(Relation),
}

impl RelationFilter {
    pub fn matches(&self, pecha: &PechaMetadata) -> bool {
        match self {
            Self::All => true,
            Self::Root => pecha.relation().is_none(),
            Self::Only(rel) => pecha.relation().map(|(r, _)| r) == Some(*rel),
        }
    }
}

impl fmt::Display for RelationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Root => write!(f, "root texts"),
            Self::Only(rel) => write!(f, "{}", rel),
        }
    }
}

/// A pecha record as returned by `POST /metadata/filter/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PechaMetadata {
    pub id: String,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub author: LocalizedText,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub commentary_of: Option<String>,
    #[serde(default)]
    pub translation_of: Option<String>,
    #[serde(default)]
    pub version_of: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl PechaMetadata {
    pub fn new(id: &str, title: LocalizedText) -> Self {
        Self {
            id: id.to_string(),
            title,
            author: LocalizedText::new(),
            language: None,
            commentary_of: None,
            translation_of: None,
            version_of: None,
            category: None,
        }
    }

    /// The first relationship field set, checked in the order commentary,
    /// translation, version.
    pub fn relation(&self) -> Option<(Relation, &str)> {
        [
            (Relation::CommentaryOf, &self.commentary_of),
            (Relation::TranslationOf, &self.translation_of),
            (Relation::VersionOf, &self.version_of),
        ]
        .into_iter()
        .find_map(|(rel, target)| {
            target
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(|t| (rel, t))
        })
    }

    /// Title in the pecha's own language, then by policy
    pub fn display_title(&self, policy: &LanguagePolicy) -> Option<&str> {
        policy.resolve_with_primary(&self.title, self.language.as_deref())
    }

    pub fn to_option(&self, policy: &LanguagePolicy) -> SelectableOption {
        let label = match self.display_title(policy) {
            Some(title) => format!("{} - {}", self.id, title),
            None => self.id.clone(),
        };
        SelectableOption::new(&self.id, &label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pecha(value: serde_json::Value) -> PechaMetadata {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let p = pecha(json!({"id": "I123"}));
        assert_eq!(p.id, "I123");
        assert!(p.title.is_empty());
        assert!(p.relation().is_none());
    }

    #[test]
    fn test_label_prefers_own_language() {
        let p = pecha(json!({
            "id": "P1",
            "language": "en",
            "title": {"bo": "ཀ", "en": "Alpha"}
        }));
        let policy = LanguagePolicy::default();
        assert_eq!(p.to_option(&policy), SelectableOption::new("P1", "P1 - Alpha"));

        let untitled = pecha(json!({"id": "P2"}));
        assert_eq!(untitled.to_option(&policy).label, "P2");
    }

    #[test]
    fn test_relation_and_filters() {
        let root = pecha(json!({"id": "a"}));
        let commentary = pecha(json!({"id": "b", "commentary_of": "a"}));
        let translation = pecha(json!({"id": "c", "translation_of": "a", "version_of": ""}));
        let empty_rel = pecha(json!({"id": "d", "version_of": ""}));

        assert_eq!(commentary.relation(), Some((Relation::CommentaryOf, "a")));
        assert_eq!(translation.relation(), Some((Relation::TranslationOf, "a")));
        assert!(empty_rel.relation().is_none());

        assert!(RelationFilter::All.matches(&commentary));
        assert!(RelationFilter::Root.matches(&root));
        assert!(RelationFilter::Root.matches(&empty_rel));
        assert!(!RelationFilter::Root.matches(&commentary));
        assert!(RelationFilter::Only(Relation::TranslationOf).matches(&translation));
        assert!(!RelationFilter::Only(Relation::VersionOf).matches(&translation));
    }

    #[test]
    fn test_relation_filter_serde() {
        let f: RelationFilter = serde_json::from_value(json!("root")).unwrap();
        assert_eq!(f, RelationFilter::Root);
        let f: RelationFilter = serde_json::from_value(json!({"only": "commentary_of"})).unwrap();
        assert_eq!(f, RelationFilter::Only(Relation::CommentaryOf));
    }
}
