//! `\cite{...}` scanning.
//!
//! Citation keys are accumulated across several documents into one
//! [`CitationOrder`], so the final order is: root document first, then each
//! included document in discovery order.

use indexmap::IndexSet;

use crate::scan::{braced_argument, ScanError};

const CITE_MARKER: &str = r"\cite{";

/// Unique citation keys in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationOrder {
    keys: IndexSet<String>,
}

impl CitationOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, key: &str) -> bool {
        if self.keys.contains(key) {
            return false;
        }
        self.keys.insert(key.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.keys.iter().cloned().collect()
    }
}

impl<'a> FromIterator<&'a str> for CitationOrder {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut order = CitationOrder::new();
        for key in iter {
            order.insert(key);
        }
        order
    }
}

/// Adds every citation key found in `text` to `order`.
///
/// A single directive may carry several comma-separated keys; each key is
/// trimmed. Empty keys (`\cite{}` or `\cite{a,}`) are recorded as `""`.
///
/// # Examples
///
/// ```
/// use bibitem_styler::{find_citation_keys, CitationOrder};
///
/// let mut order = CitationOrder::new();
/// find_citation_keys(r"see \cite{a, b,a} and \cite{c}", &mut order).unwrap();
/// assert_eq!(order.to_vec(), vec!["a", "b", "c"]);
/// ```
pub fn find_citation_keys(text: &str, order: &mut CitationOrder) -> Result<(), ScanError> {
    let mut cursor = 0;

    while let Some(pos) = text[cursor..].find(CITE_MARKER) {
        let start = cursor + pos;
        let (raw_keys, next) = braced_argument(text, start + CITE_MARKER.len(), CITE_MARKER, start)?;
        cursor = next;

        for key in raw_keys.split(',').map(str::trim) {
            order.insert(key);
        }
    }

    Ok(())
}
