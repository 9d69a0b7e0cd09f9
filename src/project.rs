//! Project-level pipeline: read the documents, scan them, assemble and write.
//!
//! File access goes through the [`DocumentStore`] trait so the pipeline can
//! run against the filesystem ([`FsStore`]) or in memory ([`MemoryStore`]).

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::assemble::{assemble, AssembleError};
use crate::bibitems::{extract_entries, Bibliography};
use crate::cites::{find_citation_keys, CitationOrder};
use crate::includes::find_included_documents;
use crate::scan::ScanError;
use crate::style::{BibStyle, DEFAULT_POSTAMBLE, DEFAULT_PREAMBLE};

/// Errors that can occur while processing a project.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("cannot read '{}': {source}", path.display())]
    MissingFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed directive in '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ScanError,
    },

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How a document's bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, used for the root and included documents. Files that are not
    /// valid UTF-8 are read as Latin-1 instead.
    Utf8,
    /// ISO-8859-1, one byte per character, used for the bibliography.
    Latin1,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        if self == TextEncoding::Utf8 {
            if let Some(text) =
                encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
            {
                return text.into_owned();
            }
        }
        encoding_rs::mem::decode_latin1(bytes).into_owned()
    }
}

/// Read and write access to the project's documents.
pub trait DocumentStore {
    fn read_text(&self, path: &Path, encoding: TextEncoding) -> io::Result<String>;

    /// Writes `content` as UTF-8, replacing any existing file.
    fn write_text(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// Filesystem-backed store. Writes are atomic: the content goes to a
/// temporary file next to the target, which is then renamed over it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl DocumentStore for FsStore {
    fn read_text(&self, path: &Path, encoding: TextEncoding) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(encoding.decode(&bytes))
    }

    fn write_text(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// In-memory store holding raw bytes per path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.borrow_mut().insert(path.into(), bytes.into());
        self
    }

    /// Returns the stored bytes of `path` as UTF-8 text.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .borrow()
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl DocumentStore for MemoryStore {
    fn read_text(&self, path: &Path, encoding: TextEncoding) -> io::Result<String> {
        let files = self.files.borrow();
        let bytes = files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such document"))?;
        Ok(encoding.decode(bytes))
    }

    fn write_text(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), content.as_bytes().to_vec());
        Ok(())
    }
}

/// Everything needed to restyle one project's bibliography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Path to the root `.tex` document
    pub main_tex: PathBuf,
    /// Bibliography file name, relative to the root document's directory
    pub bib_file: String,
    /// Output file name, relative to the root document's directory.
    /// `None` means the caller handles the rendered text itself.
    pub output_file: Option<String>,
    pub style: BibStyle,
    pub preamble: String,
    pub postamble: String,
}

impl ProjectConfig {
    /// A config with the plain style and the default wrapping.
    pub fn new(main_tex: impl Into<PathBuf>, bib_file: impl Into<String>) -> Self {
        Self {
            main_tex: main_tex.into(),
            bib_file: bib_file.into(),
            output_file: None,
            style: BibStyle::default(),
            preamble: DEFAULT_PREAMBLE.to_string(),
            postamble: DEFAULT_POSTAMBLE.to_string(),
        }
    }

    /// Directory that relative document names are resolved against.
    pub fn root_dir(&self) -> &Path {
        self.main_tex.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn bib_path(&self) -> PathBuf {
        self.root_dir().join(&self.bib_file)
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_file.as_ref().map(|name| self.root_dir().join(name))
    }
}

/// Everything extracted from a project, before ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectScan {
    /// Included document names, as written in the root document
    pub included: Vec<String>,
    pub citations: CitationOrder,
    pub entries: Bibliography,
}

/// Serializable summary of a [`ProjectScan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReport {
    pub included: Vec<String>,
    pub citations: Vec<String>,
    pub entries: Vec<String>,
    /// Entries never cited in the project
    pub uncited: Vec<String>,
    /// Cited keys with no entry in the bibliography
    pub undefined: Vec<String>,
}

impl ProjectScan {
    pub fn report(&self) -> ProjectReport {
        ProjectReport {
            included: self.included.clone(),
            citations: self.citations.to_vec(),
            entries: self.entries.keys().map(str::to_string).collect(),
            uncited: self
                .entries
                .keys()
                .filter(|key| !self.citations.contains(key))
                .map(str::to_string)
                .collect(),
            undefined: self
                .citations
                .iter()
                .filter(|key| !self.entries.contains_key(key))
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Result of a successful [`process_project`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// The rendered bibliography
    pub text: String,
    /// Where it was written, if an output file was configured
    pub written: Option<PathBuf>,
    pub entry_count: usize,
    pub citation_count: usize,
}

fn read_document(
    store: &impl DocumentStore,
    path: &Path,
    encoding: TextEncoding,
) -> Result<String, ProjectError> {
    store
        .read_text(path, encoding)
        .map_err(|source| ProjectError::MissingFile {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_error(path: &Path) -> impl FnOnce(ScanError) -> ProjectError {
    let path = path.to_path_buf();
    move |source| ProjectError::Parse { path, source }
}

/// Whether an included path names the bibliography, either exactly or
/// through the implicit `.tex` extension.
fn is_bibliography(path: &Path, bib_path: &Path) -> bool {
    path == bib_path || (path.extension().is_none() && path.with_extension("tex") == bib_path)
}

/// Reads an included document, retrying as `name.tex` when the name has no
/// extension and is not found as given.
fn read_included(
    store: &impl DocumentStore,
    path: &Path,
) -> Result<(PathBuf, String), ProjectError> {
    let missing = |path: &Path, source: io::Error| ProjectError::MissingFile {
        path: path.to_path_buf(),
        source,
    };

    match store.read_text(path, TextEncoding::Utf8) {
        Ok(text) => Ok((path.to_path_buf(), text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound && path.extension().is_none() => {
            let with_tex = path.with_extension("tex");
            match store.read_text(&with_tex, TextEncoding::Utf8) {
                Ok(text) => Ok((with_tex, text)),
                Err(retry) if retry.kind() == io::ErrorKind::NotFound => Err(missing(path, e)),
                Err(retry) => Err(missing(&with_tex, retry)),
            }
        }
        Err(e) => Err(missing(path, e)),
    }
}

/// Reads and scans the root document, its includes and the bibliography.
///
/// Citations are collected from the whole root document first, then from
/// each included document in the order it was discovered.
pub fn scan_project(
    config: &ProjectConfig,
    store: &impl DocumentStore,
) -> Result<ProjectScan, ProjectError> {
    let root_dir = config.root_dir();
    let bib_path = config.bib_path();

    info!(path = %config.main_tex.display(), "getting included documents");
    let root_text = read_document(store, &config.main_tex, TextEncoding::Utf8)?;
    let included: Vec<String> = find_included_documents(&root_text, &config.bib_file)
        .map_err(parse_error(&config.main_tex))?
        .into_iter()
        .filter(|name| {
            let is_bib = is_bibliography(&root_dir.join(name), &bib_path);
            if is_bib {
                debug!(name = name.as_str(), "skipping bibliography include");
            }
            !is_bib
        })
        .collect();
    debug!(count = included.len(), "included documents found");

    info!("getting citations");
    let mut citations = CitationOrder::new();
    find_citation_keys(&root_text, &mut citations).map_err(parse_error(&config.main_tex))?;
    for name in &included {
        let (path, text) = read_included(store, &root_dir.join(name))?;
        debug!(path = %path.display(), "scanning included document");
        find_citation_keys(&text, &mut citations).map_err(parse_error(&path))?;
    }
    debug!(count = citations.len(), "citation keys found");

    info!("getting bibitems");
    let bib_text = read_document(store, &bib_path, TextEncoding::Latin1)?;
    let entries = extract_entries(&bib_text).map_err(parse_error(&bib_path))?;
    debug!(count = entries.len(), "bibitems found");

    Ok(ProjectScan {
        included,
        citations,
        entries,
    })
}

/// Runs the full pipeline and writes the result if an output file is set.
///
/// The output is rendered completely before anything is written, so a
/// failure never leaves a partial file behind.
pub fn process_project(
    config: &ProjectConfig,
    store: &impl DocumentStore,
) -> Result<ProcessOutcome, ProjectError> {
    let scan = scan_project(config, store)?;

    info!(style = %config.style, "assembling bibliography");
    let assembled = assemble(
        &scan.entries,
        &scan.citations,
        config.style,
        &config.preamble,
        &config.postamble,
    )?;
    let text = assembled.render();

    let written = match config.output_path() {
        Some(path) => {
            info!(path = %path.display(), "writing bibliography file");
            store
                .write_text(&path, &text)
                .map_err(|source| ProjectError::Write {
                    path: path.clone(),
                    source,
                })?;
            Some(path)
        }
        None => None,
    };

    Ok(ProcessOutcome {
        text,
        written,
        entry_count: assembled.entries.len(),
        citation_count: scan.citations.len(),
    })
}
