//! Parse-level errors

use thiserror::Error;

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Malformed JSON. Every variant carries the byte offset where it was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        found: &'static str,
        expected: &'static str,
        offset: usize,
    },

    #[error("unterminated string")]
    UnterminatedString { offset: usize },

    #[error("invalid escape sequence")]
    InvalidEscape { offset: usize },

    #[error("unpaired UTF-16 surrogate in \\u escape")]
    UnpairedSurrogate { offset: usize },

    #[error("invalid number")]
    InvalidNumber { offset: usize },

    #[error("invalid literal")]
    InvalidLiteral { offset: usize },

    #[error("duplicate object key \"{key}\"")]
    DuplicateKey { key: String, offset: usize },

    #[error("nesting deeper than {limit} levels")]
    TooDeep { limit: usize, offset: usize },

    #[error("trailing content after the document")]
    TrailingContent { offset: usize },
}

impl ParseError {
    /// Byte offset into the source where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnexpectedChar { offset, .. }
            | ParseError::UnexpectedToken { offset, .. }
            | ParseError::UnterminatedString { offset }
            | ParseError::InvalidEscape { offset }
            | ParseError::UnpairedSurrogate { offset }
            | ParseError::InvalidNumber { offset }
            | ParseError::InvalidLiteral { offset }
            | ParseError::DuplicateKey { offset, .. }
            | ParseError::TooDeep { offset, .. }
            | ParseError::TrailingContent { offset } => *offset,
        }
    }
}
