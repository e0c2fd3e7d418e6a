use serde::{Deserialize, Serialize};

/// An entry of a selectable option set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectableOption {
    /// Key sent back to the backend
    pub id: String,
    /// Display string, already localized by the caller
    pub label: String,
}

impl SelectableOption {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    /// Case-insensitive substring match on the label.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty() || self.label.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_is_case_insensitive() {
        let opt = SelectableOption::new("p1", "Alpha Text");
        assert!(opt.matches("alpha"));
        assert!(opt.matches("a t"));
        assert!(opt.matches(""));
        assert!(!opt.matches("beta"));
    }
}
