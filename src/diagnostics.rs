//! Diagnostics
//!
//! Collects the errors found while compiling a schema document. An
//! [`ErrorState`] is owned by the caller and passed to each compile call, so
//! concurrent or repeated compilations never share a queue.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};

// =============================================================================
// Error Kinds
// =============================================================================

/// Category of a compilation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input is not well-formed JSON
    MalformedJson,
    /// Reference to a name that was never declared
    UndefinedName,
    /// Two named types share a fully-qualified name
    DuplicateName,
    /// Two union branches have the same compatibility key
    DuplicateUnionMember,
    /// A union branch is itself a union
    NestedUnion,
    /// An enum lists the same symbol twice
    DuplicateEnumSymbol,
    /// A record declares the same field name twice
    DuplicateFieldName,
    /// A required attribute (name, size, fields, ...) is absent
    MissingAttribute,
    /// An attribute has the wrong JSON shape
    WrongAttributeShape,
    /// `type` names nothing known
    UnknownType,
    /// A name, namespace or symbol violates the name grammar
    InvalidName,
    /// A default literal does not fit its declared type
    DefaultMismatch,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedJson => "E000",
            Self::UndefinedName => "E001",
            Self::DuplicateName => "E002",
            Self::DuplicateUnionMember => "E003",
            Self::NestedUnion => "E004",
            Self::DuplicateEnumSymbol => "E005",
            Self::DuplicateFieldName => "E006",
            Self::MissingAttribute => "E007",
            Self::WrongAttributeShape => "E008",
            Self::UnknownType => "E009",
            Self::InvalidName => "E010",
            Self::DefaultMismatch => "E011",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// =============================================================================
// Error Mode
// =============================================================================

/// How a compile call reacts to the first error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Stop at the first error and report it alone
    #[default]
    FailFast,
    /// Record every independent error in one pass
    AccumulateAll,
}

// =============================================================================
// Diagnostic
// =============================================================================

/// 1-based line and column in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Resolve a byte offset against the source text. Columns count chars.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A single compilation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.kind, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({})", location)?;
        }
        Ok(())
    }
}

// =============================================================================
// Error State
// =============================================================================

/// Ordered queue of diagnostics plus a "has errored" flag.
#[derive(Debug, Clone, Default)]
pub struct ErrorState {
    queue: VecDeque<Diagnostic>,
    has_errored: bool,
}

impl ErrorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic and raise the flag.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.has_errored = true;
        self.queue.push_back(diagnostic);
    }

    /// Append a message of the given kind without a location.
    pub fn record_error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.record(Diagnostic::new(kind, message));
    }

    pub fn has_errored(&self) -> bool {
        self.has_errored
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.queue.iter()
    }

    /// Messages in the order they were recorded.
    pub fn messages(&self) -> Vec<String> {
        self.queue.iter().map(|d| d.to_string()).collect()
    }

    /// Write every queued message, one per line, then clear the queue and flag.
    ///
    /// The queue is cleared even when the writer fails part way.
    pub fn drain<W: Write>(&mut self, mut out: W) -> io::Result<()> {
        let mut result = Ok(());
        while let Some(diagnostic) = self.queue.pop_front() {
            if result.is_ok() {
                result = writeln!(out, "{}", diagnostic);
            }
        }
        self.has_errored = false;
        result.and_then(|_| out.flush())
    }

    /// Drop every queued message and reset the flag.
    pub fn discard(&mut self) {
        // io::sink never fails
        let _ = self.drain(io::sink());
    }

    /// Take the queued diagnostics, leaving the state empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.has_errored = false;
        self.queue.drain(..).collect()
    }
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.queue {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ErrorState {
    type Item = &'a Diagnostic;
    type IntoIter = std::collections::vec_deque::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.queue.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sets_flag() {
        let mut state = ErrorState::new();
        assert!(!state.has_errored());
        state.record_error(ErrorKind::UndefinedName, "undefined name 'X'");
        state.record_error(ErrorKind::DuplicateEnumSymbol, "duplicate symbol 'A'");
        assert!(state.has_errored());
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_drain_writes_lines_and_resets() {
        let mut state = ErrorState::new();
        state.record_error(ErrorKind::MissingAttribute, "missing size");
        state.record(
            Diagnostic::new(ErrorKind::MissingAttribute, "missing name")
                .at(Location { line: 2, column: 5 }),
        );

        let mut out = Vec::new();
        state.drain(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "error[E007]: missing size\nerror[E007]: missing name (line 2, column 5)\n"
        );
        assert!(!state.has_errored());
        assert!(state.is_empty());
    }

    #[test]
    fn test_take_returns_in_order() {
        let mut state = ErrorState::new();
        state.record_error(ErrorKind::UndefinedName, "undefined name 'X'");
        state.record_error(ErrorKind::MissingAttribute, "missing size");

        let taken = state.take();
        let kinds: Vec<_> = taken.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, [ErrorKind::UndefinedName, ErrorKind::MissingAttribute]);
        assert!(!state.has_errored());
        assert!(state.is_empty());
        assert!(state.take().is_empty());
    }

    #[test]
    fn test_discard() {
        let mut state = ErrorState::new();
        state.record_error(ErrorKind::UnknownType, "unknown type 'foo'");
        state.discard();
        assert!(!state.has_errored());
        assert!(state.is_empty());
    }

    #[test]
    fn test_location_from_offset() {
        let source = "{\n  \"type\": 1\n}";
        assert_eq!(Location::from_offset(source, 0), Location { line: 1, column: 1 });
        assert_eq!(Location::from_offset(source, 4), Location { line: 2, column: 3 });
        assert_eq!(Location::from_offset(source, 999), Location { line: 3, column: 2 });
    }

    #[test]
    fn test_kind_codes_are_unique() {
        let kinds = [
            ErrorKind::MalformedJson,
            ErrorKind::UndefinedName,
            ErrorKind::DuplicateName,
            ErrorKind::DuplicateUnionMember,
            ErrorKind::NestedUnion,
            ErrorKind::DuplicateEnumSymbol,
            ErrorKind::DuplicateFieldName,
            ErrorKind::MissingAttribute,
            ErrorKind::WrongAttributeShape,
            ErrorKind::UnknownType,
            ErrorKind::InvalidName,
            ErrorKind::DefaultMismatch,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }
}
