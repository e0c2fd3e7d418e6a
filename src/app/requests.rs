//! Request tokens for "last request wins" handling of fetch results

use std::sync::atomic::{AtomicU64, Ordering};

/// Kinds of backend requests that are sequenced independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Catalog,
    Pechas,
    Annotations,
    Assign,
}

impl RequestKind {
    const ALL: [RequestKind; 4] = [Self::Catalog, Self::Pechas, Self::Annotations, Self::Assign];

    fn slot(self) -> usize {
        match self {
            Self::Catalog => 0,
            Self::Pechas => 1,
            Self::Annotations => 2,
            Self::Assign => 3,
        }
    }
}

/// Identifies one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    pub kind: RequestKind,
    pub seq: u64,
}

/// Hands out monotonically increasing tokens per request kind.
///
/// A response is only applied while its token is still the latest one issued
/// for its kind; anything older arrived too late and is dropped.
pub struct RequestSequencer {
    latest: [AtomicU64; RequestKind::ALL.len()],
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self {
            latest: Default::default(),
        }
    }

    pub fn issue(&self, kind: RequestKind) -> RequestToken {
        let seq = self.latest[kind.slot()].fetch_add(1, Ordering::SeqCst) + 1;
        RequestToken { kind, seq }
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.latest[token.kind.slot()].load(Ordering::SeqCst) == token.seq
    }
}

impl Default for RequestSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_token_wins() {
        let seq = RequestSequencer::new();
        let first = seq.issue(RequestKind::Pechas);
        let second = seq.issue(RequestKind::Pechas);
        assert!(second.seq > first.seq);
        assert!(!seq.is_current(&first));
        assert!(seq.is_current(&second));
    }

    #[test]
    fn test_kinds_are_independent() {
        let seq = RequestSequencer::new();
        let catalog = seq.issue(RequestKind::Catalog);
        let _annotations = seq.issue(RequestKind::Annotations);
        let _again = seq.issue(RequestKind::Annotations);
        assert!(seq.is_current(&catalog));
    }
}
