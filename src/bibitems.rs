//! `\bibitem` extraction from a `thebibliography` document.

use indexmap::IndexMap;
use tracing::warn;

use crate::scan::ScanError;

const BIBITEM_MARKER: &str = r"\bibitem";
const END_MARKER: &str = r"\end{";

/// Bibliography entries keyed by citation key, in order of first definition.
///
/// Redefining a key replaces its body but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bibliography {
    entries: IndexMap<String, String>,
}

impl Bibliography {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `body` under `key`. Returns the replaced body, if any.
    pub fn insert(&mut self, key: impl Into<String>, body: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), body.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(key, body)` pairs in bibliography order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Bibliography {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bib = Bibliography::new();
        for (key, body) in iter {
            bib.insert(key, body);
        }
        bib
    }
}

/// Parses every `\bibitem{key} body` in `text`.
///
/// An entry runs from its marker to the next `\bibitem`; the last entry stops
/// at the first `\end{` (the closing `\end{thebibliography}`), or at the end
/// of the text when there is none. Every `{key}` occurrence is removed from
/// the entry and the remaining body is trimmed.
///
/// # Examples
///
/// ```
/// use bibitem_styler::extract_entries;
///
/// let text = "\\bibitem{a}First.\n\\bibitem{b}Second.\n\\end{thebibliography}";
/// let bib = extract_entries(text).unwrap();
/// let pairs: Vec<_> = bib.iter().collect();
/// assert_eq!(pairs, vec![("a", "First."), ("b", "Second.")]);
/// ```
pub fn extract_entries(text: &str) -> Result<Bibliography, ScanError> {
    let mut bib = Bibliography::new();
    let mut cursor = 0;

    while let Some(pos) = text[cursor..].find(BIBITEM_MARKER) {
        let marker = cursor + pos;
        let start = marker + BIBITEM_MARKER.len();
        let rest = &text[start..];
        let end = start
            + rest
                .find(BIBITEM_MARKER)
                .or_else(|| rest.find(END_MARKER))
                .unwrap_or(rest.len());

        let (key, body) = split_entry(&text[start..end], marker)?;
        if bib.insert(key, body).is_some() {
            warn!(key, "duplicate \\bibitem, keeping the later definition");
        }
        cursor = end;
    }

    Ok(bib)
}

/// Splits a raw entry span into its key and cleaned body.
fn split_entry(raw: &str, marker: usize) -> Result<(&str, String), ScanError> {
    let malformed = || ScanError::MalformedDirective {
        directive: BIBITEM_MARKER.to_string(),
        offset: marker,
    };

    let open = raw.find('{').ok_or_else(malformed)?;
    let close = raw[open + 1..].find('}').ok_or_else(malformed)?;
    let key = &raw[open + 1..open + 1 + close];

    let body = raw.replace(&format!("{{{key}}}"), "");
    let body = body.trim().trim_end_matches(['\n', '\t']).to_string();

    Ok((key, body))
}
