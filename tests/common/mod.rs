//! Shared test constants and helpers for integration tests.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Root document with one `\include`, one `\input` and the bibliography
/// pulled in with `\input{refs.tex}`.
pub const MAIN_TEX: &str = r"\documentclass{report}
\newcommand{\note}[1]{#1}
\begin{document}
Early work~\cite{turing36}.
\include{chapters/one}
\input{two.tex}
\input{refs.tex}
\end{document}
";

pub const CHAPTER_ONE: &str = r"As shown in \cite{knuth84, turing36} and \cite{hoare69}.";

pub const CHAPTER_TWO: &str = r"See also \cite{dijkstra68}.";

/// Bibliography in neither citation nor body order.
pub const REFS_TEX: &str = r"\begin{thebibliography}{9}

\bibitem{hoare69} C. A. R. Hoare. An axiomatic basis for computer programming.

\bibitem{knuth84} D. E. Knuth. The TeXbook.

\bibitem{wirth76} N. Wirth. Algorithms + Data Structures = Programs.

\bibitem{dijkstra68} E. W. Dijkstra. Go To Statement Considered Harmful.

\bibitem{turing36} A. M. Turing. On computable numbers.

\end{thebibliography}
";

/// A LaTeX project laid out in a temporary directory.
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// The standard five-entry project used by most tests.
    pub fn standard() -> Self {
        let project = Self::new();
        project
            .file("main.tex", MAIN_TEX)
            .file("chapters/one.tex", CHAPTER_ONE)
            .file("two.tex", CHAPTER_TWO)
            .file("refs.tex", REFS_TEX);
        project
    }

    /// Writes `content` to `name`, creating parent directories.
    pub fn file(&self, name: &str, content: impl AsRef<[u8]>) -> &Self {
        let path = self.path(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn main_tex(&self) -> String {
        self.path("main.tex").to_str().unwrap().to_string()
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }
}

/// Keys of the `\bibitem` lines in a rendered bibliography, in order.
pub fn bibitem_keys(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.trim_start().strip_prefix(r"\bibitem{"))
        .filter_map(|rest| rest.find('}').map(|end| rest[..end].to_string()))
        .collect()
}
