//! Bibliography ordering styles and the default environment wrapping.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Default text written before the entries.
pub const DEFAULT_PREAMBLE: &str = r"\begin{thebibliography}{100}";

/// Default text written after the entries.
pub const DEFAULT_POSTAMBLE: &str = "\\end{thebibliography}\n\n%%%%% CLEAR DOUBLE PAGE!\n\\newpage{\\pagestyle{empty}\\cleardoublepage}";

/// Error for an unrecognized style name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown style '{0}' (expected plain, alpha or unsrt)")]
pub struct UnknownStyle(pub String);

/// How the bibliography entries are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BibStyle {
    /// Same order as the source bibliography
    #[default]
    Plain,
    /// Sorted by entry text
    Alpha,
    /// Order of first citation, uncited entries last
    Unsrt,
}

impl BibStyle {
    /// All styles, in menu order.
    pub const ALL: [BibStyle; 3] = [BibStyle::Plain, BibStyle::Alpha, BibStyle::Unsrt];

    pub fn name(self) -> &'static str {
        match self {
            BibStyle::Plain => "plain",
            BibStyle::Alpha => "alpha",
            BibStyle::Unsrt => "unsrt",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BibStyle::Plain => "same order as the bibliography file",
            BibStyle::Alpha => "alphanumerical order of the entry text",
            BibStyle::Unsrt => "order of first citation in the project, uncited entries last",
        }
    }
}

impl fmt::Display for BibStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BibStyle {
    type Err = UnknownStyle;

    /// Accepts the style names (any case) or the menu codes `0`, `1`, `2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "0" => Ok(BibStyle::Plain),
            "alpha" | "1" => Ok(BibStyle::Alpha),
            "unsrt" | "2" => Ok(BibStyle::Unsrt),
            _ => Err(UnknownStyle(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("plain".parse::<BibStyle>().unwrap(), BibStyle::Plain);
        assert_eq!("ALPHA".parse::<BibStyle>().unwrap(), BibStyle::Alpha);
        assert_eq!(" Unsrt ".parse::<BibStyle>().unwrap(), BibStyle::Unsrt);
    }

    #[test]
    fn test_parse_menu_codes() {
        assert_eq!("0".parse::<BibStyle>().unwrap(), BibStyle::Plain);
        assert_eq!("1".parse::<BibStyle>().unwrap(), BibStyle::Alpha);
        assert_eq!("2".parse::<BibStyle>().unwrap(), BibStyle::Unsrt);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "abbrv".parse::<BibStyle>().unwrap_err();
        assert_eq!(err, UnknownStyle("abbrv".to_string()));
        assert!(err.to_string().contains("abbrv"));
    }

    #[test]
    fn test_names_round_trip() {
        for style in BibStyle::ALL {
            assert_eq!(style.name().parse::<BibStyle>().unwrap(), style);
            assert!(!style.description().is_empty());
        }
    }

    #[test]
    fn test_default_wrapping() {
        assert!(DEFAULT_PREAMBLE.starts_with(r"\begin{thebibliography}"));
        assert!(DEFAULT_POSTAMBLE.starts_with(r"\end{thebibliography}"));
    }
}
