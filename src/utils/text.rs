//! Text formatting utilities

use chrono::{DateTime, Local, Utc};

/// Truncate to at most `max` characters, appending an ellipsis when cut.
/// Works on character boundaries so Tibetan and Chinese text are safe.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}

/// Local wall-clock time for the status bar
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly", 7), "exactly");
        assert_eq!(truncate("truncated", 5), "trun…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_truncate_multibyte() {
        let tibetan = "བཀྲ་ཤིས་བདེ་ལེགས།";
        let cut = truncate(tibetan, 4);
        assert_eq!(cut.chars().count(), 4);
        assert!(cut.ends_with('…'));
    }
}
