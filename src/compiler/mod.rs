//! Schema compilation pipeline
//!
//! ```text
//! JSON text → parse → build (symbol table) → validate → freeze → ValidSchema
//! ```
//!
//! Every error is recorded into the caller's [`ErrorState`]. In
//! [`ErrorMode::FailFast`] the first one stops the pipeline; in
//! [`ErrorMode::AccumulateAll`] building and validation keep going so one
//! call reports every independent problem. Either way a call that recorded
//! an error returns no schema.

mod builder;
mod validate;

use std::path::Path;

use tracing::debug;

use crate::config::CompilerConfig;
use crate::diagnostics::{Diagnostic, ErrorKind, ErrorMode, ErrorState, Location};
use crate::error::{CompileError, Result};
use crate::json::{self, Span, DEFAULT_MAX_DEPTH};
use crate::symbols::SymbolTable;
use crate::valid_schema::ValidSchema;

use builder::Builder;

/// Marker returned when fail-fast mode stops the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Halt;

/// Routes diagnostics into the caller's error state and decides whether to halt.
pub(crate) struct Reporter<'a> {
    source: &'a str,
    mode: ErrorMode,
    state: &'a mut ErrorState,
    found: Vec<Diagnostic>,
}

impl<'a> Reporter<'a> {
    fn new(source: &'a str, mode: ErrorMode, state: &'a mut ErrorState) -> Self {
        Self {
            source,
            mode,
            state,
            found: Vec::new(),
        }
    }

    pub(crate) fn report(
        &mut self,
        kind: ErrorKind,
        span: Span,
        message: impl Into<String>,
    ) -> std::result::Result<(), Halt> {
        let diagnostic =
            Diagnostic::new(kind, message).at(Location::from_offset(self.source, span.start));
        debug!(code = kind.code(), message = %diagnostic.message, "schema error");
        self.state.record(diagnostic.clone());
        self.found.push(diagnostic);
        match self.mode {
            ErrorMode::FailFast => Err(Halt),
            ErrorMode::AccumulateAll => Ok(()),
        }
    }

    fn failed(&self) -> bool {
        !self.found.is_empty()
    }

    fn into_error(mut self) -> CompileError {
        match self.mode {
            ErrorMode::FailFast if !self.found.is_empty() => {
                CompileError::Schema(self.found.swap_remove(0))
            }
            _ => CompileError::Invalid(self.found),
        }
    }
}

/// Compiles schema documents with a fixed error mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compiler {
    mode: ErrorMode,
    max_depth: usize,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(ErrorMode::default())
    }
}

impl Compiler {
    pub fn new(mode: ErrorMode) -> Self {
        Self {
            mode,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deeply arrays and objects may nest in the input.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn from_config(config: &CompilerConfig) -> Self {
        Self::new(config.compiler.mode).with_max_depth(config.compiler.max_depth)
    }

    pub fn mode(&self) -> ErrorMode {
        self.mode
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Compile one schema document.
    ///
    /// Diagnostics are appended to `errors`; anything it already held is left
    /// alone and does not affect the outcome of this call.
    pub fn compile(&self, source: &str, errors: &mut ErrorState) -> Result<ValidSchema> {
        debug!(mode = ?self.mode, bytes = source.len(), "compiling schema");

        let document = match json::parse_with_depth(source, self.max_depth) {
            Ok(document) => document,
            Err(e) => {
                let diagnostic =
                    Diagnostic::new(ErrorKind::MalformedJson, format!("malformed JSON: {}", e))
                        .at(Location::from_offset(source, e.offset()));
                debug!(error = %diagnostic, "parse failed");
                errors.record(diagnostic.clone());
                return Err(CompileError::Malformed(diagnostic));
            }
        };

        let mut reporter = Reporter::new(source, self.mode, errors);
        let mut symbols = SymbolTable::new();

        let built = {
            let mut builder = Builder::new(&mut symbols, &mut reporter);
            builder.build(&document, None)
        };
        let root = match built {
            Ok(root) => root,
            Err(Halt) => return Err(reporter.into_error()),
        };

        if validate::validate(&symbols, &mut reporter).is_err() || reporter.failed() {
            debug!(errors = reporter.found.len(), "compilation failed");
            return Err(reporter.into_error());
        }

        match (root, symbols.freeze()) {
            (Some(root), Some(types)) => {
                debug!(named_types = types.len(), "compilation succeeded");
                Ok(ValidSchema::new(root, types))
            }
            // The builder only yields an incomplete graph after reporting an error.
            _ => Err(reporter.into_error()),
        }
    }

    /// Read and compile a schema file.
    pub fn compile_file(
        &self,
        path: impl AsRef<Path>,
        errors: &mut ErrorState,
    ) -> Result<ValidSchema> {
        let source = std::fs::read_to_string(path.as_ref())?;
        self.compile(&source, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_fast_stops_at_first_error() {
        let mut errors = ErrorState::new();
        let result = Compiler::new(ErrorMode::FailFast)
            .compile(r#"["Nope", {"type": "fixed", "size": 4}]"#, &mut errors);
        let err = result.unwrap_err();
        assert!(matches!(err, CompileError::Schema(_)));
        assert_eq!(err.kind(), Some(ErrorKind::UndefinedName));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_accumulate_collects_everything() {
        let mut errors = ErrorState::new();
        let result = Compiler::new(ErrorMode::AccumulateAll)
            .compile(r#"["Nope", {"type": "fixed", "size": 4}]"#, &mut errors);
        let err = result.unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert!(err.has_kind(ErrorKind::UndefinedName));
        assert!(err.has_kind(ErrorKind::MissingAttribute));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_stale_errors_do_not_fail_a_good_schema() {
        let mut errors = ErrorState::new();
        errors.record_error(ErrorKind::UnknownType, "left over from an earlier call");
        let schema = Compiler::default().compile(r#""int""#, &mut errors);
        assert!(schema.is_ok());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_parse_error_is_recorded() {
        let mut errors = ErrorState::new();
        let err = Compiler::new(ErrorMode::AccumulateAll)
            .compile("{\"type\": ", &mut errors)
            .unwrap_err();
        assert!(matches!(err, CompileError::Malformed(_)));
        assert_eq!(err.kind(), Some(ErrorKind::MalformedJson));
        assert!(errors.has_errored());
    }

    #[test]
    fn test_depth_limit_is_a_parse_error() {
        let deep = format!("{}\"int\"{}", "[".repeat(8), "]".repeat(8));
        let mut errors = ErrorState::new();
        let err = Compiler::default()
            .with_max_depth(4)
            .compile(&deep, &mut errors)
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MalformedJson));
    }

    #[test]
    fn test_compile_file_missing() {
        let mut errors = ErrorState::new();
        let err = Compiler::default()
            .compile_file("/nonexistent/schema.avsc", &mut errors)
            .unwrap_err();
        assert!(matches!(err, CompileError::Io(_)));
        assert!(err.diagnostics().is_empty());
    }
}
