//! Normalized certification keys.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Aggregation identity of a certification name: lowercase, trimmed,
/// internal whitespace collapsed to single spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a name. Idempotent; empty input gives an empty key.
pub fn normalize(name: &str) -> NormalizedKey {
    let lowered = name.trim().to_lowercase();
    NormalizedKey(WHITESPACE.replace_all(&lowered, " ").into_owned())
}

/// Whether two names denote the same certification.
///
/// An empty name only matches another empty name.
pub fn matches(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
