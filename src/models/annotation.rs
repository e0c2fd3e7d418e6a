use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::option::SelectableOption;

/// An annotation layer attached to a pecha
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub aligned_to: Option<String>,
}

impl AnnotationEntry {
    pub fn to_option(&self) -> SelectableOption {
        let title = if self.title.is_empty() { &self.id } else { &self.title };
        let label = if self.kind.is_empty() {
            title.clone()
        } else {
            format!("{} ({})", title, self.kind)
        };
        SelectableOption::new(&self.id, &label)
    }
}

/// Reduce a `GET /annotation/{id}` payload to entries.
///
/// The backend answers with a map keyed by annotation id; an array of
/// entries is accepted too. Entries that fail to decode are skipped, as are
/// entries whose id was already seen.
pub fn annotations_from_value(value: Value) -> Vec<AnnotationEntry> {
    let items: Vec<(Option<String>, Value)> = match value {
        Value::Object(map) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        Value::Array(items) => items.into_iter().map(|v| (None, v)).collect(),
        other => {
            tracing::warn!("Unexpected annotation payload: {}", other);
            Vec::new()
        }
    };

    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(|(key, v)| {
            let mut entry = match serde_json::from_value::<AnnotationEntry>(v) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping annotation {:?}: {}", key, e);
                    return None;
                }
            };
            if entry.id.is_empty() {
                entry.id = key?;
            }
            if !seen.insert(entry.id.clone()) {
                tracing::warn!("Skipping annotation {}: duplicate id", entry.id);
                return None;
            }
            Some(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_payload_uses_keys_as_ids() {
        let entries = annotations_from_value(json!({
            "a1": {"title": "Segmentation", "type": "segmentation"},
            "a2": {"id": "explicit", "title": "Align", "type": "alignment", "aligned_to": "a1"},
            "bad": 5
        }));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "a1");
        assert_eq!(entries[1].id, "explicit");
        assert_eq!(entries[1].aligned_to.as_deref(), Some("a1"));
        assert_eq!(entries[0].to_option().label, "Segmentation (segmentation)");
    }

    #[test]
    fn test_array_payload_and_labels() {
        let entries = annotations_from_value(json!([
            {"id": "x"},
            {"title": "no id"}
        ]));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].to_option(), SelectableOption::new("x", "x"));
        assert!(annotations_from_value(json!("nope")).is_empty());
    }

    #[test]
    fn test_duplicate_annotation_ids_keep_the_first() {
        let entries = annotations_from_value(json!([
            {"id": "x", "title": "First"},
            {"id": "x", "title": "Second"},
            {"id": "y"}
        ]));
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert_eq!(entries[0].title, "First");

        // An explicit id can collide with another entry's key
        let entries = annotations_from_value(json!({
            "a1": {"title": "Keyed"},
            "a2": {"id": "a1", "title": "Explicit"}
        }));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Keyed");
    }
}
