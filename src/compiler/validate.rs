//! Post-build checks over the named types.
//!
//! Runs once every body is defined, so a default on a self-referential
//! record can be checked against the record itself.

use std::collections::HashSet;

use tracing::debug;

use super::{Halt, Reporter};
use crate::diagnostics::ErrorKind;
use crate::json::{JsonNode, JsonValue, Span};
use crate::schema::name::{is_valid_identifier, is_valid_namespace};
use crate::schema::{EnumSchema, Name, PrimitiveKind, RecordSchema, SchemaNode, TypeRef};
use crate::symbols::SymbolTable;

pub(crate) fn validate(symbols: &SymbolTable, reporter: &mut Reporter<'_>) -> Result<(), Halt> {
    let mut checked = 0usize;
    for (_, node) in symbols.defined() {
        match node {
            SchemaNode::Record(record) => check_record(symbols, record, reporter)?,
            SchemaNode::Enum(e) => check_enum(e, reporter)?,
            SchemaNode::Fixed(f) => {
                check_name(&f.name, f.span, reporter)?;
                check_aliases(&f.aliases, f.span, reporter)?;
            }
            _ => {}
        }
        checked += 1;
    }
    debug!(named_types = checked, "validation pass finished");
    Ok(())
}

fn check_name(name: &Name, span: Span, reporter: &mut Reporter<'_>) -> Result<(), Halt> {
    if !is_valid_identifier(name.name()) {
        reporter.report(
            ErrorKind::InvalidName,
            span,
            format!("invalid name \"{}\"", name.name()),
        )?;
    }
    if let Some(ns) = name.namespace() {
        if !is_valid_namespace(ns) {
            reporter.report(
                ErrorKind::InvalidName,
                span,
                format!("invalid namespace \"{}\"", ns),
            )?;
        }
    }
    Ok(())
}

fn check_aliases(aliases: &[String], span: Span, reporter: &mut Reporter<'_>) -> Result<(), Halt> {
    for alias in aliases {
        if alias.is_empty() || !is_valid_namespace(alias) {
            reporter.report(
                ErrorKind::InvalidName,
                span,
                format!("invalid alias \"{}\"", alias),
            )?;
        }
    }
    Ok(())
}

fn check_record(
    symbols: &SymbolTable,
    record: &RecordSchema,
    reporter: &mut Reporter<'_>,
) -> Result<(), Halt> {
    check_name(&record.name, record.span, reporter)?;
    check_aliases(&record.aliases, record.span, reporter)?;

    let mut seen = HashSet::new();
    for field in &record.fields {
        if !is_valid_identifier(&field.name) {
            reporter.report(
                ErrorKind::InvalidName,
                field.span,
                format!("invalid field name \"{}\"", field.name),
            )?;
        }
        if !seen.insert(field.name.as_str()) {
            reporter.report(
                ErrorKind::DuplicateFieldName,
                field.span,
                format!("duplicate field name \"{}\" in record {}", field.name, record.name),
            )?;
        }
        check_aliases(&field.aliases, field.span, reporter)?;

        if let Some(default) = &field.default {
            if !default_fits(symbols, &field.type_ref, default) {
                reporter.report(
                    ErrorKind::DefaultMismatch,
                    default.span,
                    format!(
                        "default value type mismatch: field \"{}\" of record {} cannot hold {}",
                        field.name,
                        record.name,
                        default.kind_name()
                    ),
                )?;
            }
        }
    }
    Ok(())
}

fn check_enum(e: &EnumSchema, reporter: &mut Reporter<'_>) -> Result<(), Halt> {
    check_name(&e.name, e.span, reporter)?;
    check_aliases(&e.aliases, e.span, reporter)?;

    let mut seen = HashSet::new();
    for symbol in &e.symbols {
        if !is_valid_identifier(symbol) {
            reporter.report(
                ErrorKind::InvalidName,
                e.span,
                format!("invalid symbol \"{}\" in enum {}", symbol, e.name),
            )?;
        }
        if !seen.insert(symbol.as_str()) {
            reporter.report(
                ErrorKind::DuplicateEnumSymbol,
                e.span,
                format!("duplicate enum symbol \"{}\" in enum {}", symbol, e.name),
            )?;
        }
    }

    if let Some(default) = &e.default {
        if !e.symbols.contains(default) {
            reporter.report(
                ErrorKind::DefaultMismatch,
                e.span,
                format!("enum default \"{}\" is not a symbol of {}", default, e.name),
            )?;
        }
    }
    Ok(())
}

/// Whether `value` is a representable default for `type_ref`.
///
/// A named type whose body is missing was already reported by the builder
/// and is treated as accepting anything.
pub(crate) fn default_fits(symbols: &SymbolTable, type_ref: &TypeRef, value: &JsonNode) -> bool {
    let node = match type_ref {
        TypeRef::Inline(node) => node.as_ref(),
        TypeRef::Named(id) => match symbols.get(*id) {
            Some(node) => node,
            None => return true,
        },
    };

    match (node, &value.value) {
        (SchemaNode::Primitive(kind), v) => primitive_fits(*kind, v),
        (SchemaNode::Enum(e), JsonValue::String(s)) => e.symbols.iter().any(|sym| sym == s),
        (SchemaNode::Fixed(_), JsonValue::String(_)) => true,
        (SchemaNode::Array(array), JsonValue::Array(items)) => {
            items.iter().all(|item| default_fits(symbols, &array.items, item))
        }
        (SchemaNode::Map(map), JsonValue::Object(obj)) => {
            obj.iter().all(|(_, v)| default_fits(symbols, &map.values, v))
        }
        (SchemaNode::Record(record), JsonValue::Object(obj)) => record.fields.iter().all(|field| {
            match obj.get(&field.name) {
                Some(v) => default_fits(symbols, &field.type_ref, v),
                None => field.default.is_some(),
            }
        }),
        (SchemaNode::Union(union), _) => union
            .branches
            .iter()
            .any(|branch| default_fits(symbols, branch, value)),
        _ => false,
    }
}

fn primitive_fits(kind: PrimitiveKind, value: &JsonValue) -> bool {
    match (kind, value) {
        (PrimitiveKind::Null, JsonValue::Null) => true,
        (PrimitiveKind::Boolean, JsonValue::Bool(_)) => true,
        (k, JsonValue::Number(_)) => k.is_numeric(),
        (PrimitiveKind::String | PrimitiveKind::Bytes, JsonValue::String(_)) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json;
    use crate::schema::{ArraySchema, Field, UnionSchema};

    fn lit(text: &str) -> JsonNode {
        json::parse(text).unwrap()
    }

    fn prim(kind: PrimitiveKind) -> TypeRef {
        TypeRef::primitive(kind)
    }

    #[test]
    fn test_primitive_defaults() {
        let table = SymbolTable::new();
        assert!(default_fits(&table, &prim(PrimitiveKind::Double), &lit("2")));
        assert!(default_fits(&table, &prim(PrimitiveKind::Double), &lit("1.2")));
        assert!(default_fits(&table, &prim(PrimitiveKind::Int), &lit("1.5")));
        assert!(!default_fits(&table, &prim(PrimitiveKind::Double), &lit("null")));
        assert!(!default_fits(&table, &prim(PrimitiveKind::Double), &lit(r#""string""#)));
        assert!(default_fits(&table, &prim(PrimitiveKind::Bytes), &lit(r#""ÿ""#)));
        assert!(!default_fits(&table, &prim(PrimitiveKind::Boolean), &lit("0")));
    }

    #[test]
    fn test_union_default_fits_any_branch() {
        let table = SymbolTable::new();
        let union = TypeRef::Inline(Box::new(SchemaNode::Union(UnionSchema {
            branches: vec![prim(PrimitiveKind::String), prim(PrimitiveKind::Null)],
        })));
        assert!(default_fits(&table, &union, &lit("null")));
        assert!(default_fits(&table, &union, &lit(r#""x""#)));
        assert!(!default_fits(&table, &union, &lit("3")));
    }

    #[test]
    fn test_array_default_checks_elements() {
        let table = SymbolTable::new();
        let array = TypeRef::Inline(Box::new(SchemaNode::Array(ArraySchema {
            items: prim(PrimitiveKind::Long),
            doc: None,
        })));
        assert!(default_fits(&table, &array, &lit("[1, 2, 3]")));
        assert!(default_fits(&table, &array, &lit("[]")));
        assert!(!default_fits(&table, &array, &lit(r#"[1, "two"]"#)));
    }

    #[test]
    fn test_self_referential_record_default() {
        let mut table = SymbolTable::new();
        let id = table.declare(Name::new("LongList")).unwrap();
        let next = TypeRef::Inline(Box::new(SchemaNode::Union(UnionSchema {
            branches: vec![TypeRef::Named(id), prim(PrimitiveKind::Null)],
        })));
        table.define(
            id,
            SchemaNode::Record(RecordSchema {
                name: Name::new("LongList"),
                doc: None,
                fields: vec![
                    Field {
                        name: "value".to_string(),
                        doc: None,
                        type_ref: prim(PrimitiveKind::Long),
                        default: None,
                        aliases: Vec::new(),
                        span: Span::default(),
                    },
                    Field {
                        name: "next".to_string(),
                        doc: None,
                        type_ref: next.clone(),
                        default: None,
                        aliases: Vec::new(),
                        span: Span::default(),
                    },
                ],
                aliases: Vec::new(),
                is_error: false,
                span: Span::default(),
            }),
        );

        let list = lit(r#"{"value": 1, "next": {"value": 2, "next": null}}"#);
        assert!(default_fits(&table, &next, &list));
        let broken = lit(r#"{"value": 1, "next": {"next": null}}"#);
        assert!(!default_fits(&table, &next, &broken));
    }

    #[test]
    fn test_undefined_named_type_accepts_anything() {
        let mut table = SymbolTable::new();
        let id = table.declare(Name::new("Pending")).unwrap();
        assert!(default_fits(&table, &TypeRef::Named(id), &lit("42")));
    }
}
