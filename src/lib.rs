//! bibitem-styler: reorder the `\bibitem` entries of a LaTeX project.
//!
//! This library provides functionality to:
//! - Find the documents a root `.tex` file pulls in with `\input`/`\include`
//! - Collect `\cite` keys across the project in order of first appearance
//! - Extract `\bibitem` entries from a `thebibliography` document
//! - Rewrite the bibliography in plain, alpha or unsrt order

pub mod assemble;
pub mod bibitems;
pub mod cites;
pub mod includes;
pub mod project;
pub mod scan;
pub mod style;

pub use assemble::{assemble, AssembleError, AssembledBibliography, RenderedEntry};
pub use bibitems::{extract_entries, Bibliography};
pub use cites::{find_citation_keys, CitationOrder};
pub use includes::find_included_documents;
pub use project::{
    process_project, scan_project, DocumentStore, FsStore, MemoryStore, ProcessOutcome,
    ProjectConfig, ProjectError, ProjectReport, ProjectScan, TextEncoding,
};
pub use scan::ScanError;
pub use style::{BibStyle, DEFAULT_POSTAMBLE, DEFAULT_PREAMBLE};
