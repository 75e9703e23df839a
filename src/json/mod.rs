//! JSON parsing for schema documents.
//!
//! The schema compiler needs more than a generic JSON reader gives it:
//! member order is kept for canonical output, every node records its source
//! span for diagnostics, and number lexemes survive untouched so default
//! values are written back exactly.
//!
//! - [`lexer`] - tokenizer with escape handling
//! - [`parser`] - recursive descent parser with a nesting limit
//! - [`value`] - spanned value tree

pub mod error;
pub mod lexer;
pub mod parser;
pub mod value;

pub use error::{ParseError, ParseResult};
pub use parser::{parse, parse_with_depth, DEFAULT_MAX_DEPTH};
pub use value::{JsonNode, JsonObject, JsonValue, Number, Span};
