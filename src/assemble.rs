//! Ordering and rendering of the output bibliography.
//!
//! This module turns the extracted entries and the project's citation order
//! into the final `thebibliography` text.

use std::collections::HashSet;

use thiserror::Error;

use crate::bibitems::Bibliography;
use crate::cites::CitationOrder;
use crate::style::BibStyle;

/// Errors that can occur while assembling the bibliography.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("citation key '{0}' has no \\bibitem in the bibliography")]
    UnknownCitationKey(String),
}

/// A single entry ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub key: String,
    pub body: String,
}

impl RenderedEntry {
    fn new(key: &str, body: &str) -> Self {
        Self {
            key: key.to_string(),
            body: body.to_string(),
        }
    }

    /// Appends `\t\bibitem{key} body` followed by a blank line.
    fn render_into(&self, out: &mut String) {
        out.push_str("\t\\bibitem{");
        out.push_str(&self.key);
        out.push_str("} ");
        out.push_str(&self.body);
        out.push_str("\n\n");
    }
}

/// The ordered entries with their surrounding environment text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledBibliography {
    pub preamble: String,
    pub entries: Vec<RenderedEntry>,
    pub postamble: String,
}

impl AssembledBibliography {
    /// Renders the complete output text.
    ///
    /// The layout is the preamble, a blank line, one block per entry, a
    /// newline, then the postamble.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.preamble);
        out.push_str("\n\n");
        for entry in &self.entries {
            entry.render_into(&mut out);
        }
        out.push('\n');
        out.push_str(&self.postamble);
        out
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }
}

/// Orders the bibliography entries according to `style`.
///
/// # Arguments
///
/// * `entries` - Entries in bibliography order
/// * `citations` - Unique citation keys in project order (used by `Unsrt`)
/// * `style` - The ordering policy
/// * `preamble` / `postamble` - Text written around the entries
///
/// # Errors
///
/// With [`BibStyle::Unsrt`], returns [`AssembleError::UnknownCitationKey`] for
/// the first cited key that has no entry. Nothing is assembled in that case.
///
/// # Examples
///
/// ```
/// use bibitem_styler::{assemble, BibStyle, Bibliography, CitationOrder};
///
/// let entries: Bibliography = [("a", "Alpha."), ("b", "Beta.")].into_iter().collect();
/// let cited: CitationOrder = ["b"].into_iter().collect();
/// let bib = assemble(&entries, &cited, BibStyle::Unsrt, "PRE", "POST").unwrap();
/// assert_eq!(bib.keys().collect::<Vec<_>>(), vec!["b", "a"]);
/// ```
pub fn assemble(
    entries: &Bibliography,
    citations: &CitationOrder,
    style: BibStyle,
    preamble: &str,
    postamble: &str,
) -> Result<AssembledBibliography, AssembleError> {
    let ordered = match style {
        BibStyle::Plain => entries
            .iter()
            .map(|(key, body)| RenderedEntry::new(key, body))
            .collect(),
        BibStyle::Alpha => {
            let mut sorted: Vec<(&str, &str)> = entries.iter().collect();
            // Stable: identical bodies keep their bibliography order.
            sorted.sort_by(|a, b| a.1.cmp(b.1));
            sorted
                .into_iter()
                .map(|(key, body)| RenderedEntry::new(key, body))
                .collect()
        }
        BibStyle::Unsrt => citation_ordered(entries, citations)?,
    };

    Ok(AssembledBibliography {
        preamble: preamble.to_string(),
        entries: ordered,
        postamble: postamble.to_string(),
    })
}

/// Cited entries first, in citation order, then the uncited ones in
/// bibliography order.
fn citation_ordered(
    entries: &Bibliography,
    citations: &CitationOrder,
) -> Result<Vec<RenderedEntry>, AssembleError> {
    let mut ordered = Vec::with_capacity(entries.len());
    let mut consumed: HashSet<&str> = HashSet::with_capacity(citations.len());

    for key in citations.iter() {
        let body = entries
            .get(key)
            .ok_or_else(|| AssembleError::UnknownCitationKey(key.to_string()))?;
        ordered.push(RenderedEntry::new(key, body));
        consumed.insert(key);
    }

    ordered.extend(
        entries
            .iter()
            .filter(|(key, _)| !consumed.contains(key))
            .map(|(key, body)| RenderedEntry::new(key, body)),
    );

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bib(pairs: &[(&str, &str)]) -> Bibliography {
        pairs.iter().copied().collect()
    }

    fn order(keys: &[&str]) -> CitationOrder {
        keys.iter().copied().collect()
    }

    fn keys(assembled: &AssembledBibliography) -> Vec<&str> {
        assembled.keys().collect()
    }

    // ===========================================
    // Ordering
    // ===========================================

    #[test]
    fn test_plain_keeps_bibliography_order() {
        // Given: Entries and a citation order that differs from them
        let entries = bib(&[("c", "Gamma."), ("a", "Alpha."), ("b", "Beta.")]);
        let cited = order(&["b", "a"]);

        // When: We assemble in Plain style
        let result = assemble(&entries, &cited, BibStyle::Plain, "", "").unwrap();

        // Then: Bibliography order is kept, citations are ignored
        assert_eq!(keys(&result), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_alpha_sorts_by_body_not_key() {
        // Given: Keys in alphabetical order but bodies in reverse
        let entries = bib(&[("a", "Zeta."), ("b", "Mu."), ("c", "Alpha.")]);

        // When: We assemble in Alpha style
        let result = assemble(&entries, &CitationOrder::new(), BibStyle::Alpha, "", "").unwrap();

        // Then: Entries follow their body text
        assert_eq!(keys(&result), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_alpha_is_stable_for_equal_bodies() {
        let entries = bib(&[("x", "Same."), ("a", "Earlier."), ("y", "Same.")]);
        let result = assemble(&entries, &CitationOrder::new(), BibStyle::Alpha, "", "").unwrap();
        assert_eq!(keys(&result), vec!["a", "x", "y"]);
    }

    #[test]
    fn test_unsrt_cited_first_then_rest() {
        // Given: Entries a, b and citation order [b]
        let entries = bib(&[("a", "Alpha."), ("b", "Beta.")]);
        let cited = order(&["b"]);

        // When: We assemble in Unsrt style
        let result = assemble(&entries, &cited, BibStyle::Unsrt, "", "").unwrap();

        // Then: b comes first, a follows
        assert_eq!(keys(&result), vec!["b", "a"]);
    }

    #[test]
    fn test_unsrt_every_entry_exactly_once() {
        let entries = bib(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "5")]);
        let cited = order(&["d", "b", "e"]);

        let result = assemble(&entries, &cited, BibStyle::Unsrt, "", "").unwrap();

        assert_eq!(keys(&result), vec!["d", "b", "e", "a", "c"]);
        let unique: HashSet<&str> = result.keys().collect();
        assert_eq!(unique.len(), entries.len());
    }

    #[test]
    fn test_unsrt_unknown_key_fails() {
        // Given: A cited key with no entry
        let entries = bib(&[("a", "Alpha.")]);
        let cited = order(&["a", "c"]);

        // When: We assemble in Unsrt style
        let err = assemble(&entries, &cited, BibStyle::Unsrt, "", "").unwrap_err();

        // Then: It is a lookup failure naming the key
        assert_eq!(err, AssembleError::UnknownCitationKey("c".to_string()));
    }

    #[test]
    fn test_unknown_key_ignored_outside_unsrt() {
        let entries = bib(&[("a", "Alpha.")]);
        let cited = order(&["missing"]);
        assert!(assemble(&entries, &cited, BibStyle::Plain, "", "").is_ok());
        assert!(assemble(&entries, &cited, BibStyle::Alpha, "", "").is_ok());
    }

    // ===========================================
    // Rendering
    // ===========================================

    #[test]
    fn test_render_layout() {
        // Given: Two entries with custom wrapping
        let entries = bib(&[("a", "First."), ("b", "Second.")]);

        // When: We render in Plain style
        let text = assemble(&entries, &CitationOrder::new(), BibStyle::Plain, "PRE", "POST")
            .unwrap()
            .render();

        // Then: The exact template is used
        assert_eq!(
            text,
            "PRE\n\n\t\\bibitem{a} First.\n\n\t\\bibitem{b} Second.\n\n\nPOST"
        );
    }

    #[test]
    fn test_render_no_entries() {
        let text = assemble(&Bibliography::new(), &CitationOrder::new(), BibStyle::Plain, "PRE", "POST")
            .unwrap()
            .render();
        assert_eq!(text, "PRE\n\n\nPOST");
    }

    #[test]
    fn test_render_preserves_body_bytes() {
        let body = "G\u{f6}del, K. \\emph{\u{dc}ber formal} {unentscheidbare} S\u{e4}tze.";
        let entries = bib(&[("godel31", body)]);
        let text = assemble(&entries, &CitationOrder::new(), BibStyle::Plain, "", "")
            .unwrap()
            .render();
        assert!(text.contains(&format!("\\bibitem{{godel31}} {body}\n\n")));
    }
}
