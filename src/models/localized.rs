//! Multilingual text values and the language fallback policy

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Tibetan
pub const LANG_BO: &str = "bo";
/// English
pub const LANG_EN: &str = "en";
/// Literary Chinese
pub const LANG_LZH: &str = "lzh";

/// Fixed display order for detail views: Tibetan, English, Literary Chinese.
/// Any other language follows in alphabetical order.
pub const DISPLAY_ORDER: [&str; 3] = [LANG_BO, LANG_EN, LANG_LZH];

/// A mapping from language code to display string.
///
/// Empty strings are treated as absent, so a missing translation can never
/// leak into a label as an empty pair of parentheses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocalizedText {
    values: BTreeMap<String, String>,
}

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from a JSON value, keeping only non-empty string entries.
    /// Anything other than an object yields an empty text.
    pub fn from_value(value: &Value) -> Self {
        let mut text = Self::new();
        if let Some(map) = value.as_object() {
            for (lang, v) in map {
                if let Some(s) = v.as_str() {
                    text.insert(lang, s);
                }
            }
        }
        text
    }

    pub fn with(mut self, lang: &str, value: &str) -> Self {
        self.insert(lang, value);
        self
    }

    /// Blank values are dropped; anything else is stored as given.
    pub fn insert(&mut self, lang: &str, value: &str) {
        if value.trim().is_empty() {
            return;
        }
        self.values.insert(lang.to_string(), value.to_string());
    }

    pub fn get(&self, lang: &str) -> Option<&str> {
        self.values.get(lang).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    /// Languages present, in display order
    pub fn ordered_languages(&self) -> Vec<&str> {
        display_order(self.languages())
    }

    /// Compact row label: `bo (en) (lzh)`.
    ///
    /// The first present language of the display order becomes the head and
    /// the rest follow in parentheses. Returns `None` when nothing is present.
    pub fn compact_label(&self) -> Option<String> {
        let mut parts = DISPLAY_ORDER.iter().filter_map(|lang| self.get(lang));
        let head = parts.next()?;
        let mut label = head.to_string();
        for part in parts {
            label.push_str(" (");
            label.push_str(part);
            label.push(')');
        }
        Some(label)
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            // Some endpoints send a bare string instead of a map
            Value::String(s) => Self::new().with(LANG_EN, &s),
            other => Self::from_value(&other),
        })
    }
}

/// Sort language codes into display order
pub fn display_order<'a>(langs: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut langs: Vec<&str> = langs.collect();
    langs.sort_by_key(|lang| {
        let rank = DISPLAY_ORDER
            .iter()
            .position(|l| l == lang)
            .unwrap_or(DISPLAY_ORDER.len());
        (rank, *lang)
    });
    langs.dedup();
    langs
}

/// Ordered list of preferred languages used whenever a single display
/// string has to be chosen from a [`LocalizedText`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguagePolicy {
    preferred: Vec<String>,
}

impl Default for LanguagePolicy {
    fn default() -> Self {
        Self::new(DISPLAY_ORDER.iter().map(|s| s.to_string()).collect())
    }
}

impl LanguagePolicy {
    pub fn new(preferred: Vec<String>) -> Self {
        Self { preferred }
    }

    pub fn preferred(&self) -> &[String] {
        &self.preferred
    }

    /// Pick the first preferred language present, then any language at all.
    pub fn resolve<'a>(&self, text: &'a LocalizedText) -> Option<&'a str> {
        self.preferred
            .iter()
            .find_map(|lang| text.get(lang))
            .or_else(|| text.ordered_languages().first().and_then(|l| text.get(l)))
    }

    /// Like [`resolve`](Self::resolve) but tries `primary` first, e.g. a
    /// pecha's own language.
    pub fn resolve_with_primary<'a>(
        &self,
        text: &'a LocalizedText,
        primary: Option<&str>,
    ) -> Option<&'a str> {
        primary
            .and_then(|lang| text.get(lang))
            .or_else(|| self.resolve(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_skips_non_strings_and_empty() {
        let text = LocalizedText::from_value(&json!({
            "en": "Root",
            "bo": "",
            "lzh": 5,
            "fr": null
        }));
        assert_eq!(text.len(), 1);
        assert_eq!(text.get("en"), Some("Root"));
        assert_eq!(text.get("bo"), None);
    }

    #[test]
    fn test_from_value_non_object_is_empty() {
        assert!(LocalizedText::from_value(&json!("x")).is_empty());
        assert!(LocalizedText::from_value(&json!([1, 2])).is_empty());
        assert!(LocalizedText::from_value(&Value::Null).is_empty());
    }

    #[test]
    fn test_compact_label_orders_bo_en_lzh() {
        let text = LocalizedText::new()
            .with("en", "Foo")
            .with("lzh", "佛")
            .with("bo", "བོད།");
        assert_eq!(text.compact_label().as_deref(), Some("བོད། (Foo) (佛)"));
    }

    #[test]
    fn test_compact_label_without_bo_never_mentions_undefined() {
        let text = LocalizedText::new().with("en", "Foo");
        let label = text.compact_label().unwrap();
        assert_eq!(label, "Foo");
        assert!(!label.contains("undefined"));
        assert!(LocalizedText::new().compact_label().is_none());
    }

    #[test]
    fn test_display_order_puts_known_languages_first() {
        let text = LocalizedText::new()
            .with("zh", "a")
            .with("en", "b")
            .with("de", "c")
            .with("bo", "d");
        assert_eq!(text.ordered_languages(), vec!["bo", "en", "de", "zh"]);
    }

    #[test]
    fn test_policy_resolution() {
        let text = LocalizedText::new().with("en", "Alpha").with("bo", "ཀ");
        let policy = LanguagePolicy::new(vec!["en".into(), "bo".into()]);
        assert_eq!(policy.resolve(&text), Some("Alpha"));

        let tibetan_first = LanguagePolicy::default();
        assert_eq!(tibetan_first.resolve(&text), Some("ཀ"));
        assert_eq!(
            tibetan_first.resolve_with_primary(&text, Some("en")),
            Some("Alpha")
        );
        assert_eq!(
            tibetan_first.resolve_with_primary(&text, Some("sa")),
            Some("ཀ")
        );
    }

    #[test]
    fn test_policy_falls_back_to_any_language() {
        let text = LocalizedText::new().with("sa", "Sanskrit");
        let policy = LanguagePolicy::default();
        assert_eq!(policy.resolve(&text), Some("Sanskrit"));
        assert_eq!(policy.resolve(&LocalizedText::new()), None);
    }

    #[test]
    fn test_deserialize_accepts_bare_string() {
        let text: LocalizedText = serde_json::from_value(json!("Plain")).unwrap();
        assert_eq!(text.get("en"), Some("Plain"));
        let text: LocalizedText = serde_json::from_value(json!({"bo": "ཀ"})).unwrap();
        assert_eq!(text.get("bo"), Some("ཀ"));
    }

    #[test]
    fn test_insert_keeps_value_untrimmed_and_drops_blank() {
        let text = LocalizedText::new()
            .with("en", "  Foo  ")
            .with("bo", "   ")
            .with("lzh", "\t\n");
        assert_eq!(text.len(), 1);
        assert_eq!(text.get("en"), Some("  Foo  "));
        assert_eq!(text.get("bo"), None);

        let text = LocalizedText::from_value(&json!({"en": " Root ", "bo": " "}));
        assert_eq!(text.get("en"), Some(" Root "));
        assert_eq!(text.get("bo"), None);
    }
}
