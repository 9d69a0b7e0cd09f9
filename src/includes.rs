//! Discovery of `\input{...}` and `\include{...}` directives.
//!
//! Only the root document is scanned; included documents are not searched
//! for further includes.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::scan::{braced_argument, ScanError};

/// Marker after which included documents are collected.
pub const BODY_MARKER: &str = r"\begin{document}";

// Leftmost match of either form, so whichever directive comes first is
// consumed first.
static INCLUDE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\(?:input|include)\{").unwrap());

/// Finds the documents pulled in by the root document's body.
///
/// Scanning starts right after the first `\begin{document}`; text before it
/// (preamble, macro definitions) is ignored. When the marker is missing the
/// whole text is scanned.
///
/// # Arguments
///
/// * `root_text` - Content of the root `.tex` document
/// * `excluded_name` - Name to skip, normally the bibliography file
///
/// # Returns
///
/// Referenced names in order of appearance, duplicates kept.
///
/// # Examples
///
/// ```
/// use bibitem_styler::find_included_documents;
///
/// let root = r"\begin{document}\input{intro}\include{bib}\end{document}";
/// let docs = find_included_documents(root, "bib").unwrap();
/// assert_eq!(docs, vec!["intro".to_string()]);
/// ```
pub fn find_included_documents(
    root_text: &str,
    excluded_name: &str,
) -> Result<Vec<String>, ScanError> {
    let mut cursor = root_text
        .find(BODY_MARKER)
        .map_or(0, |pos| pos + BODY_MARKER.len());

    let mut documents = Vec::new();

    while let Some(m) = INCLUDE_RE.find_at(root_text, cursor) {
        let (name, next) = braced_argument(root_text, m.end(), m.as_str(), m.start())?;
        cursor = next;

        if name == excluded_name {
            debug!(name, "skipping bibliography include");
            continue;
        }
        debug!(name, "found included document");
        documents.push(name.to_string());
    }

    Ok(documents)
}
