//! Safety blacklist
//!
//! Exact `(model, method)` pairs the dispatcher refuses to forward. The set is
//! built once and injected into the [`Dispatcher`](super::Dispatcher); there is
//! no mutation API.

use std::collections::HashSet;

/// Pairs blocked by default: user deletion, model and field definition
/// deletion, forced module uninstall.
pub const DEFAULT_BLOCKED: [(&str, &str); 4] = [
    ("res.users", "unlink"),
    ("ir.model", "unlink"),
    ("ir.model.fields", "unlink"),
    ("ir.module.module", "button_immediate_uninstall"),
];

/// Immutable set of forbidden operations
#[derive(Debug, Clone)]
pub struct Blacklist {
    blocked: HashSet<(String, String)>,
}

impl Blacklist {
    /// Build from an explicit list of pairs
    pub fn new<I, M, O>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (M, O)>,
        M: Into<String>,
        O: Into<String>,
    {
        Self {
            blocked: pairs
                .into_iter()
                .map(|(model, method)| (model.into(), method.into()))
                .collect(),
        }
    }

    /// Exact-match lookup; no wildcards, no prefix matching
    pub fn is_blocked(&self, model: &str, method: &str) -> bool {
        self.blocked
            .contains(&(model.to_string(), method.to_string()))
    }

    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    /// Blocked pairs in sorted order
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .blocked
            .iter()
            .map(|(m, o)| (m.as_str(), o.as_str()))
            .collect();
        entries.sort_unstable();
        entries
    }
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED)
    }
}
