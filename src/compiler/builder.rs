//! Type graph builder
//!
//! Walks the JSON tree and produces [`TypeRef`]s. A subtree that could not
//! be built comes back as `Ok(None)` after its error was reported, and the
//! caller carries on with its siblings.

use std::collections::HashSet;

use tracing::trace;

use super::{Halt, Reporter};
use crate::diagnostics::ErrorKind;
use crate::json::{JsonNode, JsonObject, JsonValue, Span};
use crate::schema::{
    ArraySchema, EnumSchema, Field, FixedSchema, MapSchema, Name, NamedId, PrimitiveKind,
    RecordSchema, SchemaNode, TypeRef, UnionKey, UnionSchema,
};
use crate::symbols::SymbolTable;

/// `Ok(None)` marks a subtree that failed after reporting.
pub(crate) type Build<T> = Result<Option<T>, Halt>;

/// Common attributes of record, enum and fixed declarations.
struct Header {
    name: Name,
    doc: Option<String>,
    aliases: Vec<String>,
}

pub(crate) struct Builder<'r, 's> {
    symbols: &'r mut SymbolTable,
    reporter: &'r mut Reporter<'s>,
}

impl<'r, 's> Builder<'r, 's> {
    pub(crate) fn new(symbols: &'r mut SymbolTable, reporter: &'r mut Reporter<'s>) -> Self {
        Self { symbols, reporter }
    }

    fn report(
        &mut self,
        kind: ErrorKind,
        span: Span,
        message: impl Into<String>,
    ) -> Result<(), Halt> {
        self.reporter.report(kind, span, message)
    }

    /// Build the type described by `json` inside `namespace`.
    pub(crate) fn build(&mut self, json: &JsonNode, namespace: Option<&str>) -> Build<TypeRef> {
        match &json.value {
            JsonValue::String(name) => self.build_reference(name, json.span, namespace),
            JsonValue::Array(branches) => self.build_union(branches, namespace),
            JsonValue::Object(obj) => self.build_object(obj, json.span, namespace),
            other => {
                self.report(
                    ErrorKind::WrongAttributeShape,
                    json.span,
                    format!("expected a type name, object or union, found {}", other.kind_name()),
                )?;
                Ok(None)
            }
        }
    }

    fn build_reference(
        &mut self,
        name: &str,
        span: Span,
        namespace: Option<&str>,
    ) -> Build<TypeRef> {
        if let Some(kind) = PrimitiveKind::parse(name) {
            return Ok(Some(TypeRef::primitive(kind)));
        }
        match self.symbols.resolve(name, namespace) {
            Some(id) => Ok(Some(TypeRef::Named(id))),
            None => {
                self.report(
                    ErrorKind::UndefinedName,
                    span,
                    format!("undefined name \"{}\"", name),
                )?;
                Ok(None)
            }
        }
    }

    fn build_union(&mut self, items: &[JsonNode], namespace: Option<&str>) -> Build<TypeRef> {
        let mut branches = Vec::with_capacity(items.len());
        let mut seen = HashSet::new();
        let mut complete = true;

        for item in items {
            let Some(branch) = self.build(item, namespace)? else {
                complete = false;
                continue;
            };
            match self.union_key(&branch) {
                UnionKey::Union => {
                    self.report(
                        ErrorKind::NestedUnion,
                        item.span,
                        "union may not directly contain another union",
                    )?;
                }
                key => {
                    if !seen.insert(key.clone()) {
                        self.report(
                            ErrorKind::DuplicateUnionMember,
                            item.span,
                            format!("union contains duplicate type {}", key),
                        )?;
                    }
                }
            }
            branches.push(branch);
        }

        // A partial union would let defaults be checked against the wrong branches.
        if !complete {
            return Ok(None);
        }
        Ok(Some(TypeRef::Inline(Box::new(SchemaNode::Union(UnionSchema { branches })))))
    }

    fn union_key(&self, branch: &TypeRef) -> UnionKey {
        match branch {
            TypeRef::Named(id) => UnionKey::Named(
                self.symbols
                    .name_of(*id)
                    .map(Name::fullname)
                    .unwrap_or_default(),
            ),
            TypeRef::Inline(node) => match node.as_ref() {
                SchemaNode::Primitive(kind) => UnionKey::Primitive(*kind),
                SchemaNode::Array(_) => UnionKey::Array,
                SchemaNode::Map(_) => UnionKey::Map,
                SchemaNode::Union(_) => UnionKey::Union,
                other => UnionKey::Named(other.name().map(Name::fullname).unwrap_or_default()),
            },
        }
    }

    fn build_object(
        &mut self,
        obj: &JsonObject,
        span: Span,
        namespace: Option<&str>,
    ) -> Build<TypeRef> {
        let Some(type_node) = obj.get("type") else {
            self.report(ErrorKind::MissingAttribute, span, "missing \"type\" attribute")?;
            return Ok(None);
        };

        let type_name = match &type_node.value {
            JsonValue::String(s) => s.as_str(),
            // {"type": {...}} and {"type": [...]} wrap a nested schema
            JsonValue::Object(_) | JsonValue::Array(_) => return self.build(type_node, namespace),
            other => {
                self.report(
                    ErrorKind::WrongAttributeShape,
                    type_node.span,
                    format!(
                        "\"type\" must be a string, object or array, found {}",
                        other.kind_name()
                    ),
                )?;
                return Ok(None);
            }
        };

        if let Some(kind) = PrimitiveKind::parse(type_name) {
            return Ok(Some(TypeRef::primitive(kind)));
        }

        match type_name {
            "record" => self.build_record(obj, span, namespace, false),
            "error" => self.build_record(obj, span, namespace, true),
            "enum" => self.build_enum(obj, span, namespace),
            "fixed" => self.build_fixed(obj, span, namespace),
            "array" => self.build_array(obj, span, namespace),
            "map" => self.build_map(obj, span, namespace),
            other => match self.symbols.resolve(other, namespace) {
                Some(id) => Ok(Some(TypeRef::Named(id))),
                None => {
                    self.report(
                        ErrorKind::UnknownType,
                        type_node.span,
                        format!("unknown type \"{}\"", other),
                    )?;
                    Ok(None)
                }
            },
        }
    }

    // -------------------------------------------------------------------------
    // Named types
    // -------------------------------------------------------------------------

    fn header(
        &mut self,
        kind: &str,
        obj: &JsonObject,
        span: Span,
        namespace: Option<&str>,
    ) -> Build<Header> {
        let name = match obj.get("name") {
            None => {
                self.report(
                    ErrorKind::MissingAttribute,
                    span,
                    format!("missing name in {} declaration", kind),
                )?;
                None
            }
            Some(node) => match node.as_str() {
                Some("") => {
                    self.report(
                        ErrorKind::MissingAttribute,
                        node.span,
                        format!("empty name in {} declaration", kind),
                    )?;
                    None
                }
                Some(s) => Some(s),
                None => {
                    self.report(
                        ErrorKind::WrongAttributeShape,
                        node.span,
                        format!("{} name must be a string, found {}", kind, node.kind_name()),
                    )?;
                    None
                }
            },
        };

        let explicit_namespace = match obj.get("namespace") {
            None => None,
            Some(node) => match node.as_str() {
                Some(ns) => Some(ns),
                None => {
                    self.report(
                        ErrorKind::WrongAttributeShape,
                        node.span,
                        format!("namespace must be a string, found {}", node.kind_name()),
                    )?;
                    None
                }
            },
        };

        let doc = self.doc(obj)?;
        let aliases = self.aliases(obj)?;

        Ok(name.map(|name| Header {
            name: Name::qualify(name, explicit_namespace, namespace),
            doc,
            aliases,
        }))
    }

    /// Register the name before the body is built so the body may refer to it.
    fn declare(&mut self, name: &Name, span: Span) -> Result<NamedId, Halt> {
        match self.symbols.declare(name.clone()) {
            Ok(id) => {
                trace!(name = %name, "declared named type");
                Ok(id)
            }
            Err(_) => {
                self.report(
                    ErrorKind::DuplicateName,
                    span,
                    format!("duplicate name \"{}\"", name),
                )?;
                Ok(self.symbols.detached(name.clone()))
            }
        }
    }

    fn build_record(
        &mut self,
        obj: &JsonObject,
        span: Span,
        namespace: Option<&str>,
        is_error: bool,
    ) -> Build<TypeRef> {
        let kind = if is_error { "error" } else { "record" };
        let header = self.header(kind, obj, span, namespace)?;
        let id = match &header {
            Some(h) => Some(self.declare(&h.name, span)?),
            None => None,
        };

        // Field types resolve relative to the record's own namespace.
        let body_namespace: Option<String> = match &header {
            Some(h) => h.name.namespace().map(str::to_string),
            None => namespace.map(str::to_string),
        };

        let fields = match obj.get("fields") {
            None => {
                self.report(
                    ErrorKind::MissingAttribute,
                    span,
                    format!("missing fields in {} declaration", kind),
                )?;
                None
            }
            Some(node) => match node.as_array() {
                Some(items) => Some(self.build_fields(items, body_namespace.as_deref())?),
                None => {
                    self.report(
                        ErrorKind::WrongAttributeShape,
                        node.span,
                        "fields must be an array",
                    )?;
                    None
                }
            },
        };

        let (Some(header), Some(id), Some(fields)) = (header, id, fields) else {
            return Ok(None);
        };

        self.symbols.define(
            id,
            SchemaNode::Record(RecordSchema {
                name: header.name,
                doc: header.doc,
                fields,
                aliases: header.aliases,
                is_error,
                span,
            }),
        );
        Ok(Some(TypeRef::Named(id)))
    }

    fn build_fields(
        &mut self,
        items: &[JsonNode],
        namespace: Option<&str>,
    ) -> Result<Vec<Field>, Halt> {
        let mut fields = Vec::with_capacity(items.len());

        for item in items {
            let Some(obj) = item.as_object() else {
                self.report(
                    ErrorKind::WrongAttributeShape,
                    item.span,
                    format!("field must be an object, found {}", item.kind_name()),
                )?;
                continue;
            };

            let name = match obj.get("name") {
                None => {
                    self.report(
                        ErrorKind::MissingAttribute,
                        item.span,
                        "missing name in field declaration",
                    )?;
                    None
                }
                Some(node) => match node.as_str() {
                    Some(s) => Some(s.to_string()),
                    None => {
                        self.report(
                            ErrorKind::WrongAttributeShape,
                            node.span,
                            format!("field name must be a string, found {}", node.kind_name()),
                        )?;
                        None
                    }
                },
            };

            let type_ref = match obj.get("type") {
                None => {
                    self.report(
                        ErrorKind::MissingAttribute,
                        item.span,
                        format!("missing type for field \"{}\"", name.as_deref().unwrap_or("?")),
                    )?;
                    None
                }
                Some(node) => self.build(node, namespace)?,
            };

            let doc = self.doc(obj)?;
            let aliases = self.aliases(obj)?;

            if let (Some(name), Some(type_ref)) = (name, type_ref) {
                fields.push(Field {
                    name,
                    doc,
                    type_ref,
                    default: obj.get("default").cloned(),
                    aliases,
                    span: item.span,
                });
            }
        }

        Ok(fields)
    }

    fn build_enum(
        &mut self,
        obj: &JsonObject,
        span: Span,
        namespace: Option<&str>,
    ) -> Build<TypeRef> {
        let header = self.header("enum", obj, span, namespace)?;
        let id = match &header {
            Some(h) => Some(self.declare(&h.name, span)?),
            None => None,
        };

        let symbols = match obj.get("symbols") {
            None => {
                self.report(
                    ErrorKind::MissingAttribute,
                    span,
                    "missing symbols in enum declaration",
                )?;
                None
            }
            Some(node) => match node.as_array() {
                Some(items) => self.enum_symbols(items)?,
                None => {
                    self.report(
                        ErrorKind::WrongAttributeShape,
                        node.span,
                        "symbols must be an array of strings",
                    )?;
                    None
                }
            },
        };

        let default = match obj.get("default") {
            None => None,
            Some(node) => match node.as_str() {
                Some(s) => Some(s.to_string()),
                None => {
                    self.report(
                        ErrorKind::DefaultMismatch,
                        node.span,
                        format!("enum default must be a string, found {}", node.kind_name()),
                    )?;
                    None
                }
            },
        };

        let (Some(header), Some(id), Some(symbols)) = (header, id, symbols) else {
            return Ok(None);
        };

        self.symbols.define(
            id,
            SchemaNode::Enum(EnumSchema {
                name: header.name,
                doc: header.doc,
                symbols,
                default,
                aliases: header.aliases,
                span,
            }),
        );
        Ok(Some(TypeRef::Named(id)))
    }

    fn enum_symbols(&mut self, items: &[JsonNode]) -> Build<Vec<String>> {
        let mut symbols = Vec::with_capacity(items.len());
        let mut complete = true;
        for item in items {
            match item.as_str() {
                Some(s) => symbols.push(s.to_string()),
                None => {
                    self.report(
                        ErrorKind::WrongAttributeShape,
                        item.span,
                        format!("enum symbol must be a string, found {}", item.kind_name()),
                    )?;
                    complete = false;
                }
            }
        }
        Ok(complete.then_some(symbols))
    }

    fn build_fixed(
        &mut self,
        obj: &JsonObject,
        span: Span,
        namespace: Option<&str>,
    ) -> Build<TypeRef> {
        let header = self.header("fixed", obj, span, namespace)?;
        let id = match &header {
            Some(h) => Some(self.declare(&h.name, span)?),
            None => None,
        };

        let size = match obj.get("size") {
            None => {
                self.report(
                    ErrorKind::MissingAttribute,
                    span,
                    "missing size in fixed declaration",
                )?;
                None
            }
            Some(node) => {
                let size = match &node.value {
                    JsonValue::Number(n) => n
                        .as_i64()
                        .filter(|v| *v > 0)
                        .and_then(|v| usize::try_from(v).ok()),
                    _ => None,
                };
                if size.is_none() {
                    self.report(
                        ErrorKind::WrongAttributeShape,
                        node.span,
                        "fixed size must be a positive integer",
                    )?;
                }
                size
            }
        };

        let (Some(header), Some(id), Some(size)) = (header, id, size) else {
            return Ok(None);
        };

        self.symbols.define(
            id,
            SchemaNode::Fixed(FixedSchema {
                name: header.name,
                doc: header.doc,
                size,
                aliases: header.aliases,
                span,
            }),
        );
        Ok(Some(TypeRef::Named(id)))
    }

    // -------------------------------------------------------------------------
    // Containers
    // -------------------------------------------------------------------------

    fn build_array(
        &mut self,
        obj: &JsonObject,
        span: Span,
        namespace: Option<&str>,
    ) -> Build<TypeRef> {
        let doc = self.doc(obj)?;
        let items = match obj.get("items") {
            None => {
                self.report(
                    ErrorKind::MissingAttribute,
                    span,
                    "missing items in array declaration",
                )?;
                None
            }
            Some(node) => self.build(node, namespace)?,
        };
        Ok(items.map(|items| {
            TypeRef::Inline(Box::new(SchemaNode::Array(ArraySchema { items, doc })))
        }))
    }

    fn build_map(
        &mut self,
        obj: &JsonObject,
        span: Span,
        namespace: Option<&str>,
    ) -> Build<TypeRef> {
        let doc = self.doc(obj)?;
        let values = match obj.get("values") {
            None => {
                self.report(
                    ErrorKind::MissingAttribute,
                    span,
                    "missing values in map declaration",
                )?;
                None
            }
            Some(node) => self.build(node, namespace)?,
        };
        Ok(values.map(|values| {
            TypeRef::Inline(Box::new(SchemaNode::Map(MapSchema { values, doc })))
        }))
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    fn doc(&mut self, obj: &JsonObject) -> Result<Option<String>, Halt> {
        match obj.get("doc") {
            None => Ok(None),
            Some(node) => match node.as_str() {
                Some(doc) => Ok(Some(doc.to_string())),
                None => {
                    self.report(
                        ErrorKind::WrongAttributeShape,
                        node.span,
                        format!("doc must be a string, found {}", node.kind_name()),
                    )?;
                    Ok(None)
                }
            },
        }
    }

    fn aliases(&mut self, obj: &JsonObject) -> Result<Vec<String>, Halt> {
        let Some(node) = obj.get("aliases") else {
            return Ok(Vec::new());
        };
        let Some(items) = node.as_array() else {
            self.report(
                ErrorKind::WrongAttributeShape,
                node.span,
                "aliases must be an array of strings",
            )?;
            return Ok(Vec::new());
        };

        let mut aliases = Vec::with_capacity(items.len());
        for item in items {
            match item.as_str() {
                Some(alias) => aliases.push(alias.to_string()),
                None => {
                    self.report(
                        ErrorKind::WrongAttributeShape,
                        item.span,
                        format!("alias must be a string, found {}", item.kind_name()),
                    )?;
                }
            }
        }
        Ok(aliases)
    }
}
