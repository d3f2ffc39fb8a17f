//! Error types.

use std::fmt;
use thiserror::Error;

/// A pattern that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at position {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset into the pattern.
    pub position: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: usize) -> Self {
        ParseError { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedEnd,
    UnexpectedChar(char),
    UnbalancedParen,
    UnterminatedClass,
    InvalidGroup,
    NothingToRepeat,
    InvalidEscape(char),
    UnknownFlag(char),
    UnknownGroupName(String),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnexpectedEnd => write!(f, "Unexpected end of pattern"),
            ParseErrorKind::UnexpectedChar(ch) => write!(f, "Unexpected character '{}'", ch),
            ParseErrorKind::UnbalancedParen => write!(f, "Unbalanced parenthesis"),
            ParseErrorKind::UnterminatedClass => write!(f, "Unterminated character class"),
            ParseErrorKind::InvalidGroup => write!(f, "Invalid group syntax after '(?'"),
            ParseErrorKind::NothingToRepeat => write!(f, "Dangling quantifier"),
            ParseErrorKind::InvalidEscape(ch) => write!(f, "Invalid escape '\\{}'", ch),
            ParseErrorKind::UnknownFlag(ch) => write!(f, "Unknown flag '{}'", ch),
            ParseErrorKind::UnknownGroupName(name) => write!(f, "Unknown group name '{}'", name),
        }
    }
}

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
