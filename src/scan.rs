//! Delimiter scanning shared by the directive, citation and bibitem scanners.
//!
//! All scanners work by first-match search: find a marker, then take the text
//! up to the next closing brace. Nested braces, comments and escapes are not
//! understood, so `\cite{a{b}c}` yields the key list `a{b`.

use thiserror::Error;

/// Errors raised while scanning LaTeX source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("unterminated {directive} at byte {offset}: no closing '}}' found")]
    MalformedDirective {
        /// The marker that was left open (e.g. `\cite{`)
        directive: String,
        /// Byte offset of the marker in the scanned text
        offset: usize,
    },
}

/// Returns the braced argument that starts at `open`, plus the offset just
/// past its closing brace.
///
/// `open` must point at the first byte after the opening `{`. The argument
/// runs to the next `}` regardless of nesting.
pub(crate) fn braced_argument<'a>(
    text: &'a str,
    open: usize,
    directive: &str,
    marker_offset: usize,
) -> Result<(&'a str, usize), ScanError> {
    match text[open..].find('}') {
        Some(len) => Ok((&text[open..open + len], open + len + 1)),
        None => Err(ScanError::MalformedDirective {
            directive: directive.to_string(),
            offset: marker_offset,
        }),
    }
}
