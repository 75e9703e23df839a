//! Error types for the schema compiler

use thiserror::Error;

use crate::diagnostics::{Diagnostic, ErrorKind};

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Why a compile call produced no schema
#[derive(Error, Debug)]
pub enum CompileError {
    /// The document is not well-formed JSON. Always aborts immediately.
    #[error("{0}")]
    Malformed(Diagnostic),

    /// First semantic error, in fail-fast mode
    #[error("{0}")]
    Schema(Diagnostic),

    /// Every semantic error, in accumulate-all mode
    #[error("schema compilation failed with {} error(s)", .0.len())]
    Invalid(Vec<Diagnostic>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Diagnostics carried by this error, in the order they were found.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::Malformed(d) | CompileError::Schema(d) => std::slice::from_ref(d),
            CompileError::Invalid(all) => all,
            CompileError::Io(_) => &[],
        }
    }

    /// Kind of the first diagnostic.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.diagnostics().first().map(|d| d.kind)
    }

    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.diagnostics().iter().any(|d| d.kind == kind)
    }
}
