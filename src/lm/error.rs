//! Error types for LM parsing

use std::path::PathBuf;
use thiserror::Error;

/// Position in LM source text (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that can occur while parsing LM source
#[derive(Error, Debug)]
pub enum ParseError {
    /// Malformed source text
    #[error("{source_name}:{location}: {reason}{}", format_expected(.expected))]
    Syntax {
        source_name: String,
        location: Location,
        reason: String,
        expected: Vec<String>,
    },

    /// Failed to read LM file
    #[error("Failed to read LM file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_expected(expected: &[String]) -> String {
    if expected.is_empty() {
        String::new()
    } else {
        format!(" (expected one of: {})", expected.join(", "))
    }
}

impl ParseError {
    pub fn syntax(
        source_name: impl Into<String>,
        location: Location,
        reason: impl Into<String>,
        expected: Vec<String>,
    ) -> Self {
        Self::Syntax {
            source_name: source_name.into(),
            location,
            reason: reason.into(),
            expected,
        }
    }

    /// Location of a syntax error
    pub fn location(&self) -> Option<Location> {
        match self {
            ParseError::Syntax { location, .. } => Some(*location),
            ParseError::ReadError { .. } => None,
        }
    }

    /// Tokens the parser would have accepted at the error position
    pub fn expected(&self) -> &[String] {
        match self {
            ParseError::Syntax { expected, .. } => expected,
            ParseError::ReadError { .. } => &[],
        }
    }
}

/// Result type for LM parsing
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::syntax(
            "source.lm",
            Location { line: 3, column: 7 },
            "unexpected token '}'",
            vec!["';'".to_string(), "','".to_string()],
        );
        let display = err.to_string();
        assert!(display.starts_with("source.lm:3:7: unexpected token '}'"));
        assert!(display.contains("expected one of: ';', ','"));
        assert_eq!(err.location(), Some(Location { line: 3, column: 7 }));
    }

    #[test]
    fn test_error_display_without_expected() {
        let err = ParseError::syntax("x.lm", Location { line: 1, column: 1 }, "bad", vec![]);
        assert_eq!(err.to_string(), "x.lm:1:1: bad");
    }
}
