//! CLI for bibitem-styler - Reorder the bibliography of a LaTeX project.

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bibitem_styler::{
    process_project, scan_project, AssembleError, BibStyle, FsStore, ProjectConfig, ProjectError,
    DEFAULT_POSTAMBLE, DEFAULT_PREAMBLE,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Reorder the \bibitem entries of a LaTeX project
#[derive(Parser)]
#[command(name = "bibitem-styler")]
#[command(version)]
#[command(after_help = "\
Examples:
  bibitem-styler process thesis/main.tex --bib refs.tex --style unsrt -o sorted.tex
  bibitem-styler process main.tex --bib refs.tex --style alpha
  bibitem-styler scan main.tex --bib refs.tex
  bibitem-styler styles")]
struct Cli {
    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite the bibliography in the chosen order
    #[command(after_help = "\
Examples:
  bibitem-styler process main.tex --bib refs.tex --style unsrt -o sorted.tex
  bibitem-styler process main.tex -b refs.tex -s 1
  bibitem-styler process main.tex -b refs.tex --preamble '\\begin{thebibliography}{9}'

File names given to --bib and --output are relative to the main document's directory.")]
    Process {
        /// Main .tex document of the project
        main_tex: PathBuf,

        /// Bibliography file containing the \bibitem entries
        #[arg(short, long)]
        bib: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Ordering style: plain, alpha or unsrt (or 0, 1, 2)
        #[arg(short, long, default_value_t = BibStyle::Plain)]
        style: BibStyle,

        /// Text written before the entries
        #[arg(long, default_value = DEFAULT_PREAMBLE)]
        preamble: String,

        /// Text written after the entries
        #[arg(long, default_value = DEFAULT_POSTAMBLE)]
        postamble: String,
    },

    /// Print the included documents, citations and entries as JSON
    Scan {
        /// Main .tex document of the project
        main_tex: PathBuf,

        /// Bibliography file containing the \bibitem entries
        #[arg(short, long)]
        bib: String,
    },

    /// List available ordering styles
    Styles,
}

// ---------------------------------------------------------------------------
// AppError — semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10 — main or included document not found / unreadable
    InputFile(String),
    /// Exit 11 — bibliography file not found / unreadable
    BibFile(String),
    /// Exit 12 — directive without closing brace
    MalformedDirective(String),
    /// Exit 13 — cited key missing from the bibliography
    UnknownCitationKey(String),
    /// Exit 15 — cannot write output
    OutputFile(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputFile(_) => 10,
            AppError::BibFile(_) => 11,
            AppError::MalformedDirective(_) => 12,
            AppError::UnknownCitationKey(_) => 13,
            AppError::OutputFile(_) => 15,
        }
    }

    fn from_project(e: ProjectError, config: &ProjectConfig) -> Self {
        match e {
            ProjectError::MissingFile { ref path, .. } if *path == config.bib_path() => {
                AppError::BibFile(e.to_string())
            }
            ProjectError::MissingFile { .. } => AppError::InputFile(e.to_string()),
            ProjectError::Parse { .. } => AppError::MalformedDirective(e.to_string()),
            ProjectError::Assemble(AssembleError::UnknownCitationKey(_)) => {
                AppError::UnknownCitationKey(e.to_string())
            }
            ProjectError::Write { .. } => AppError::OutputFile(e.to_string()),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: included names are resolved relative to the main document's directory",
                    msg
                )
            }
            AppError::BibFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: --bib takes a file name relative to the main document's directory",
                    msg
                )
            }
            AppError::MalformedDirective(msg) => {
                write!(f, "{}\n  hint: every directive needs a closing '}}'", msg)
            }
            AppError::UnknownCitationKey(msg) => {
                write!(
                    f,
                    "{}\n  hint: run 'bibitem-styler scan' to list undefined keys, or use --style plain",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "bibitem_styler=debug"
    } else {
        "bibitem_styler=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Process {
            main_tex,
            bib,
            output,
            style,
            preamble,
            postamble,
        } => {
            let config = ProjectConfig {
                main_tex,
                bib_file: bib,
                output_file: output,
                style,
                preamble,
                postamble,
            };
            process_command(&config)?;
        }
        Commands::Scan { main_tex, bib } => {
            scan_command(&ProjectConfig::new(main_tex, bib))?;
        }
        Commands::Styles => {
            styles_command();
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Rewrite the bibliography, to a file or stdout.
fn process_command(config: &ProjectConfig) -> Result<(), AppError> {
    let outcome =
        process_project(config, &FsStore).map_err(|e| AppError::from_project(e, config))?;

    if let Some(path) = &outcome.written {
        eprintln!(
            "wrote {} \\bibitem(s) in {} order ({} cited key(s)) to {}",
            outcome.entry_count,
            config.style,
            outcome.citation_count,
            path.display()
        );
    } else {
        write_stdout(&outcome.text)?;
    }

    Ok(())
}

/// Print the project's scan report as JSON.
fn scan_command(config: &ProjectConfig) -> Result<(), AppError> {
    let scan = scan_project(config, &FsStore).map_err(|e| AppError::from_project(e, config))?;
    let json = serde_json::to_string_pretty(&scan.report())
        .map_err(|e| AppError::OutputFile(format!("cannot serialize report: {}", e)))?;
    write_stdout(&format!("{}\n", json))
}

fn write_stdout(text: &str) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write!(handle, "{}", text).map_err(|e| AppError::OutputFile(format!("stdout: {}", e)))
}

/// List available ordering styles.
fn styles_command() {
    for style in BibStyle::ALL {
        println!("{:<6} {}", style.name(), style.description());
    }
}
