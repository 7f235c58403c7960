use serde::{Deserialize, Serialize};
use std::fmt;

/// A single DNS rewrite: queries for `domain` are answered with `target`.
///
/// Equality is exact on both fields. Domains are not case-folded and
/// targets are not parsed, so `App.local` and `app.local` are distinct rules.
///
/// Serializes as `{"domain": ..., "answer": ...}`, the shape used both by the
/// authority's API and by the state file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewriteRule {
    /// Domain being rewritten
    pub domain: String,

    /// Answer returned for the domain (usually an IP address)
    #[serde(rename = "answer")]
    pub target: String,
}

impl RewriteRule {
    /// Create a rule from a domain and its answer
    #[must_use]
    pub fn new(domain: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.domain, self.target)
    }
}
