//! Avro Schema Compiler
//!
//! Compiles Avro schema documents written in JSON into an immutable, fully
//! resolved type graph and writes that graph back as canonical JSON.
//!
//! ## Features
//!
//! - **Strict Resolution**: Every named reference must point at a declared type
//! - **Recursive Types**: A record may refer to itself inside its own body
//! - **Error Modes**: Stop at the first error or collect all of them in one pass
//! - **Canonical Output**: Deterministic pretty or compact JSON with stable escaping
//! - **Fingerprints**: SHA256 over the compact canonical form
//!
//! ## Pipeline
//!
//! ```text
//! JSON text
//!   └─ json::parse        spanned value tree
//!      └─ Builder         type graph + symbol table
//!         └─ validate     names, uniqueness, defaults
//!            └─ ValidSchema
//!               ├─ to_json(pretty)
//!               └─ fingerprint()
//! ```
//!
//! ## Example
//!
//! ```
//! let schema = avsc_compiler::compile(r#"{"type": "array", "items": "long"}"#).unwrap();
//! assert_eq!(schema.to_json(false), r#"{"type":"array","items":"long"}"#);
//! ```

pub mod canonical;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fingerprint;
pub mod json;
pub mod schema;
pub mod symbols;
pub mod valid_schema;

pub use compiler::Compiler;
pub use config::{CompilerConfig, OutputFormat};
pub use diagnostics::{Diagnostic, ErrorKind, ErrorMode, ErrorState, Location};
pub use error::{CompileError, Result};
pub use fingerprint::Fingerprint;
pub use schema::{Name, NamedId, PrimitiveKind, SchemaNode, TypeRef};
pub use symbols::NamedTypes;
pub use valid_schema::ValidSchema;

/// Compile `source`, stopping at the first error.
pub fn compile(source: &str) -> Result<ValidSchema> {
    Compiler::new(ErrorMode::FailFast).compile(source, &mut ErrorState::new())
}

/// Compile `source`, reporting every independent error.
pub fn compile_all(source: &str) -> Result<ValidSchema> {
    Compiler::new(ErrorMode::AccumulateAll).compile(source, &mut ErrorState::new())
}
