//! Canonical JSON writer for compiled schemas.
//!
//! Output is deterministic: attributes appear in a fixed order, each named
//! type is written in full once and by fullname afterwards, and strings are
//! escaped the same way whether the input used a raw character or a `\u`
//! escape. Compact output has no insignificant whitespace; pretty output
//! indents by two spaces with one key per line.

use crate::json::{JsonNode, JsonValue};
use crate::schema::{EnumSchema, FixedSchema, Name, RecordSchema, SchemaNode, TypeRef};
use crate::symbols::NamedTypes;

const INDENT: &str = "  ";

/// Serialize a schema rooted at `root`.
pub(crate) fn write_schema(root: &TypeRef, types: &NamedTypes, pretty: bool) -> String {
    let mut writer = Writer::new(types, pretty);
    writer.type_ref(root, None);
    writer.out
}

/// Serialize a JSON literal in canonical form.
pub fn write_literal(value: &JsonNode, pretty: bool) -> String {
    let types = NamedTypes::default();
    let mut writer = Writer::new(&types, pretty);
    writer.literal(value);
    writer.out
}

/// Quote and escape `s` as a JSON string.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    escape_into(s, &mut out);
    out
}

/// Append `s` to `out` as a quoted JSON string.
///
/// Short escapes for `\b \f \n \r \t`, `\u00xx` with lowercase hex for other
/// control characters, everything else literal.
pub fn escape_into(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\x20' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

struct Writer<'a> {
    types: &'a NamedTypes,
    pretty: bool,
    out: String,
    // One entry per open container: whether it already has a member.
    open: Vec<bool>,
    emitted: Vec<bool>,
}

impl<'a> Writer<'a> {
    fn new(types: &'a NamedTypes, pretty: bool) -> Self {
        Self {
            types,
            pretty,
            out: String::new(),
            open: Vec::new(),
            emitted: vec![false; types.len()],
        }
    }

    // ---------------------------------------------------------------------
    // Layout
    // ---------------------------------------------------------------------

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.open.len() {
            self.out.push_str(INDENT);
        }
    }

    /// Start the next member of the innermost container.
    fn member(&mut self) {
        if let Some(has_member) = self.open.last_mut() {
            if *has_member {
                self.out.push(',');
            }
            *has_member = true;
        }
        if self.pretty && !self.open.is_empty() {
            self.newline();
        }
    }

    fn begin(&mut self, bracket: char) {
        self.out.push(bracket);
        self.open.push(false);
    }

    fn end(&mut self, bracket: char) {
        let had_members = self.open.pop().unwrap_or(false);
        if self.pretty && had_members {
            self.newline();
        }
        self.out.push(bracket);
    }

    fn key(&mut self, key: &str) {
        self.member();
        escape_into(key, &mut self.out);
        self.out.push(':');
        if self.pretty {
            self.out.push(' ');
        }
    }

    fn string(&mut self, s: &str) {
        escape_into(s, &mut self.out);
    }

    fn string_attr(&mut self, key: &str, value: &str) {
        self.key(key);
        self.string(value);
    }

    fn string_list(&mut self, key: &str, items: &[String]) {
        self.key(key);
        self.begin('[');
        for item in items {
            self.member();
            self.string(item);
        }
        self.end(']');
    }

    fn optional_doc(&mut self, doc: Option<&str>) {
        if let Some(doc) = doc {
            self.string_attr("doc", doc);
        }
    }

    fn aliases(&mut self, aliases: &[String]) {
        if !aliases.is_empty() {
            self.string_list("aliases", aliases);
        }
    }

    // ---------------------------------------------------------------------
    // Schema nodes
    // ---------------------------------------------------------------------

    fn type_ref(&mut self, type_ref: &TypeRef, namespace: Option<&str>) {
        match type_ref {
            TypeRef::Inline(node) => self.node(node, namespace),
            TypeRef::Named(id) => {
                let types = self.types;
                let node = types.get(*id);
                match self.emitted.get_mut(id.index()) {
                    Some(done) if !*done => {
                        *done = true;
                        self.node(node, namespace);
                    }
                    _ => match node.name() {
                        Some(name) => self.string(&name.fullname()),
                        None => self.node(node, namespace),
                    },
                }
            }
        }
    }

    fn node(&mut self, node: &SchemaNode, namespace: Option<&str>) {
        match node {
            SchemaNode::Primitive(kind) => self.string(kind.as_str()),
            SchemaNode::Record(record) => self.record(record, namespace),
            SchemaNode::Enum(e) => self.enumeration(e, namespace),
            SchemaNode::Fixed(fixed) => self.fixed(fixed, namespace),
            SchemaNode::Array(array) => {
                self.begin('{');
                self.string_attr("type", "array");
                self.optional_doc(array.doc.as_deref());
                self.key("items");
                self.type_ref(&array.items, namespace);
                self.end('}');
            }
            SchemaNode::Map(map) => {
                self.begin('{');
                self.string_attr("type", "map");
                self.optional_doc(map.doc.as_deref());
                self.key("values");
                self.type_ref(&map.values, namespace);
                self.end('}');
            }
            SchemaNode::Union(union) => {
                self.begin('[');
                for branch in &union.branches {
                    self.member();
                    self.type_ref(branch, namespace);
                }
                self.end(']');
            }
        }
    }

    /// Opens a named declaration: `type`, `namespace` if it changes, `name`, `doc`.
    fn header(&mut self, type_name: &str, name: &Name, doc: Option<&str>, enclosing: Option<&str>) {
        self.begin('{');
        self.string_attr("type", type_name);
        if name.namespace() != enclosing {
            self.string_attr("namespace", name.namespace().unwrap_or(""));
        }
        self.string_attr("name", name.name());
        self.optional_doc(doc);
    }

    fn record(&mut self, record: &RecordSchema, enclosing: Option<&str>) {
        let type_name = if record.is_error { "error" } else { "record" };
        self.header(type_name, &record.name, record.doc.as_deref(), enclosing);

        let namespace = record.name.namespace();
        self.key("fields");
        self.begin('[');
        for field in &record.fields {
            self.member();
            self.begin('{');
            self.string_attr("name", &field.name);
            self.key("type");
            self.type_ref(&field.type_ref, namespace);
            self.optional_doc(field.doc.as_deref());
            if let Some(default) = &field.default {
                self.key("default");
                self.literal(default);
            }
            self.aliases(&field.aliases);
            self.end('}');
        }
        self.end(']');

        self.aliases(&record.aliases);
        self.end('}');
    }

    fn enumeration(&mut self, e: &EnumSchema, enclosing: Option<&str>) {
        self.header("enum", &e.name, e.doc.as_deref(), enclosing);
        self.string_list("symbols", &e.symbols);
        if let Some(default) = &e.default {
            self.string_attr("default", default);
        }
        self.aliases(&e.aliases);
        self.end('}');
    }

    fn fixed(&mut self, fixed: &FixedSchema, enclosing: Option<&str>) {
        self.header("fixed", &fixed.name, fixed.doc.as_deref(), enclosing);
        self.key("size");
        self.out.push_str(&fixed.size.to_string());
        self.aliases(&fixed.aliases);
        self.end('}');
    }

    // ---------------------------------------------------------------------
    // Default literals
    // ---------------------------------------------------------------------

    fn literal(&mut self, value: &JsonNode) {
        match &value.value {
            JsonValue::Null => self.out.push_str("null"),
            JsonValue::Bool(true) => self.out.push_str("true"),
            JsonValue::Bool(false) => self.out.push_str("false"),
            JsonValue::Number(n) => self.out.push_str(n.as_str()),
            JsonValue::String(s) => self.string(s),
            JsonValue::Array(items) => {
                self.begin('[');
                for item in items {
                    self.member();
                    self.literal(item);
                }
                self.end(']');
            }
            JsonValue::Object(obj) => {
                self.begin('{');
                for (key, item) in obj.iter() {
                    self.key(key);
                    self.literal(item);
                }
                self.end('}');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json;

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(quote("a\nb"), r#""a\nb""#);
        assert_eq!(quote("tab\there"), r#""tab\there""#);
        assert_eq!(quote("\u{1f}"), r#""\u001f""#);
        assert_eq!(quote("\u{0b}"), r#""\u000b""#);
        assert_eq!(quote("say \"hi\""), r#""say \"hi\"""#);
        assert_eq!(quote("back\\slash"), r#""back\\slash""#);
    }

    #[test]
    fn test_non_ascii_is_literal() {
        assert_eq!(quote("°C ø"), "\"°C ø\"");
        assert_eq!(quote("\u{1F600}"), "\"\u{1F600}\"");
    }

    #[test]
    fn test_literal_keeps_order_and_number_text() {
        let value = json::parse(r#"{ "z": 1.50, "a": [true, null, "x"] }"#).unwrap();
        assert_eq!(write_literal(&value, false), r#"{"z":1.50,"a":[true,null,"x"]}"#);
    }

    #[test]
    fn test_pretty_literal() {
        let value = json::parse(r#"{"a": [1, 2], "b": {}, "c": []}"#).unwrap();
        let expected = "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": {},\n  \"c\": []\n}";
        assert_eq!(write_literal(&value, true), expected);
    }
}
