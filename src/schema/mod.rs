//! Schema type graph
//!
//! Named types (records, enums, fixed) live in the symbol-table arena and are
//! referenced by [`NamedId`]; everything else is owned inline by its
//! container. A record that contains itself is therefore just an index, and
//! the graph can be cyclic without the data structure being infinite.

pub mod name;

pub use name::Name;

use crate::json::{JsonNode, Span};
use std::fmt;

/// Index of a named type in the symbol-table arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamedId(pub(crate) usize);

impl NamedId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Primitive type kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Null,
        PrimitiveKind::Boolean,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Bytes,
        PrimitiveKind::String,
    ];

    pub fn parse(s: &str) -> Option<PrimitiveKind> {
        match s {
            "null" => Some(PrimitiveKind::Null),
            "boolean" => Some(PrimitiveKind::Boolean),
            "int" => Some(PrimitiveKind::Int),
            "long" => Some(PrimitiveKind::Long),
            "float" => Some(PrimitiveKind::Float),
            "double" => Some(PrimitiveKind::Double),
            "bytes" => Some(PrimitiveKind::Bytes),
            "string" => Some(PrimitiveKind::String),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Null => "null",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Bytes => "bytes",
            PrimitiveKind::String => "string",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::Int | PrimitiveKind::Long | PrimitiveKind::Float | PrimitiveKind::Double
        )
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference from a container to a child type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// Unnamed type owned by the container
    Inline(Box<SchemaNode>),
    /// Named type shared through the arena
    Named(NamedId),
}

impl TypeRef {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeRef::Inline(Box::new(SchemaNode::Primitive(kind)))
    }

    pub fn named_id(&self) -> Option<NamedId> {
        match self {
            TypeRef::Named(id) => Some(*id),
            TypeRef::Inline(_) => None,
        }
    }
}

/// A node of the type graph.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Primitive(PrimitiveKind),
    Record(RecordSchema),
    Enum(EnumSchema),
    Array(ArraySchema),
    Map(MapSchema),
    Union(UnionSchema),
    Fixed(FixedSchema),
}

impl SchemaNode {
    /// The `type` keyword this node serializes under.
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaNode::Primitive(kind) => kind.as_str(),
            SchemaNode::Record(r) if r.is_error => "error",
            SchemaNode::Record(_) => "record",
            SchemaNode::Enum(_) => "enum",
            SchemaNode::Array(_) => "array",
            SchemaNode::Map(_) => "map",
            SchemaNode::Union(_) => "union",
            SchemaNode::Fixed(_) => "fixed",
        }
    }

    /// Name of a record, enum or fixed node.
    pub fn name(&self) -> Option<&Name> {
        match self {
            SchemaNode::Record(r) => Some(&r.name),
            SchemaNode::Enum(e) => Some(&e.name),
            SchemaNode::Fixed(f) => Some(&f.name),
            _ => None,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            SchemaNode::Record(r) => r.doc.as_deref(),
            SchemaNode::Enum(e) => e.doc.as_deref(),
            SchemaNode::Fixed(f) => f.doc.as_deref(),
            SchemaNode::Array(a) => a.doc.as_deref(),
            SchemaNode::Map(m) => m.doc.as_deref(),
            SchemaNode::Primitive(_) | SchemaNode::Union(_) => None,
        }
    }

    /// Source span of a named declaration.
    pub fn span(&self) -> Option<Span> {
        match self {
            SchemaNode::Record(r) => Some(r.span),
            SchemaNode::Enum(e) => Some(e.span),
            SchemaNode::Fixed(f) => Some(f.span),
            _ => None,
        }
    }
}

/// A record (or error) declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: Name,
    pub doc: Option<String>,
    pub fields: Vec<Field>,
    pub aliases: Vec<String>,
    /// Declared with `"type": "error"`
    pub is_error: bool,
    pub span: Span,
}

impl RecordSchema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A record field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub doc: Option<String>,
    pub type_ref: TypeRef,
    /// Default literal, exactly as parsed
    pub default: Option<JsonNode>,
    pub aliases: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub name: Name,
    pub doc: Option<String>,
    pub symbols: Vec<String>,
    pub default: Option<String>,
    pub aliases: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    pub name: Name,
    pub doc: Option<String>,
    pub size: usize,
    pub aliases: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: TypeRef,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapSchema {
    pub values: TypeRef,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    pub branches: Vec<TypeRef>,
}

/// Equivalence class used to reject ambiguous union branches.
///
/// Two branches with the same key cannot be told apart by a decoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnionKey {
    Primitive(PrimitiveKind),
    Named(String),
    Array,
    Map,
    Union,
}

impl fmt::Display for UnionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnionKey::Primitive(kind) => write!(f, "{}", kind),
            UnionKey::Named(name) => f.write_str(name),
            UnionKey::Array => f.write_str("array"),
            UnionKey::Map => f.write_str("map"),
            UnionKey::Union => f.write_str("union"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(PrimitiveKind::parse("record"), None);
    }

    #[test]
    fn test_numeric_kinds() {
        assert!(PrimitiveKind::Int.is_numeric());
        assert!(PrimitiveKind::Double.is_numeric());
        assert!(!PrimitiveKind::String.is_numeric());
        assert!(!PrimitiveKind::Null.is_numeric());
    }

    #[test]
    fn test_error_record_type_name() {
        let record = RecordSchema {
            name: Name::new("Oops"),
            doc: None,
            fields: Vec::new(),
            aliases: Vec::new(),
            is_error: true,
            span: Span::default(),
        };
        assert_eq!(SchemaNode::Record(record).type_name(), "error");
    }

    #[test]
    fn test_doc_and_span_accessors() {
        let e = SchemaNode::Enum(EnumSchema {
            name: Name::new("Suit"),
            doc: Some("card suits".to_string()),
            symbols: vec!["HEARTS".to_string()],
            default: None,
            aliases: Vec::new(),
            span: Span::new(3, 40),
        });
        assert_eq!(e.doc(), Some("card suits"));
        assert_eq!(e.span(), Some(Span::new(3, 40)));

        let int = SchemaNode::Primitive(PrimitiveKind::Int);
        assert_eq!(int.doc(), None);
        assert_eq!(int.span(), None);
    }
}
