//! Page parameters for bookmarkable page construction.
//!
//! [`PageParameters`] carries the construction parameters of a page: an
//! ordered list of named `key -> value` pairs plus positional (indexed)
//! segments. Both halves survive URL encoding and decoding unchanged, which
//! is what makes a page reachable by a stable URL.

use serde::{Deserialize, Serialize};

/// Ordered page construction parameters.
///
/// Named parameters keep insertion order and may repeat; indexed parameters
/// are positional values that ride as extra URL path segments.
///
/// # Example
///
/// ```rust,ignore
/// let mut params = PageParameters::new();
/// params.set("category", "books");
/// params.add("tag", "rust");
/// params.add("tag", "web");
/// params.set_indexed(0, "2024");
///
/// assert_eq!(params.get("category"), Some("books"));
/// assert_eq!(params.get_all("tag"), vec!["rust", "web"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParameters {
    /// Positional parameters, addressed by index.
    indexed: Vec<String>,
    /// Named parameters in insertion order. Keys may repeat.
    named: Vec<(String, String)>,
}

impl PageParameters {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.named
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all values for `key` in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.named
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Replaces all values for `key` with a single value.
    ///
    /// The new value takes the position of the first existing entry for the
    /// key; remaining duplicates are removed. A missing key appends.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();

        match self.named.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.named[first].1 = value;
                // Drop any later duplicates of the key.
                let mut seen = false;
                self.named.retain(|(k, _)| {
                    if *k == key {
                        let keep = !seen;
                        seen = true;
                        keep
                    } else {
                        true
                    }
                });
            }
            None => self.named.push((key, value)),
        }
        self
    }

    /// Appends a value for `key`, keeping existing entries.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.named.push((key.into(), value.into()));
        self
    }

    /// Removes all values for `key`, returning how many were removed.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.named.len();
        self.named.retain(|(k, _)| k != key);
        before - self.named.len()
    }

    /// Returns the indexed parameter at `index`, if present.
    pub fn get_indexed(&self, index: usize) -> Option<&str> {
        self.indexed.get(index).map(String::as_str)
    }

    /// Sets the indexed parameter at `index`, padding gaps with empty strings.
    pub fn set_indexed(&mut self, index: usize, value: impl Into<String>) -> &mut Self {
        if index >= self.indexed.len() {
            self.indexed.resize(index + 1, String::new());
        }
        self.indexed[index] = value.into();
        self
    }

    /// Number of indexed parameters.
    pub fn indexed_count(&self) -> usize {
        self.indexed.len()
    }

    /// Iterates indexed parameters in positional order.
    pub fn indexed(&self) -> impl Iterator<Item = &str> {
        self.indexed.iter().map(String::as_str)
    }

    /// Iterates named pairs in insertion order.
    pub fn named(&self) -> impl Iterator<Item = (&str, &str)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` when there are no parameters of either kind.
    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty() && self.named.is_empty()
    }
}
