//! JSON value tree produced by the parser.
//!
//! Every node carries the byte span it was parsed from so later passes can
//! point diagnostics at the offending text. Object members keep their
//! document order.

use std::fmt;

/// Byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A JSON number, kept as its source text.
///
/// Keeping the lexeme means a default of `2` is written back as `2` and
/// `1.20` as `1.20`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number(String);

impl Number {
    pub(crate) fn from_lexeme(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The number exactly as written in the document.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the lexeme has no fraction or exponent.
    pub fn is_integer(&self) -> bool {
        !self.0.contains(['.', 'e', 'E'])
    }

    pub fn as_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.0.parse().ok()
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed JSON value with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonNode {
    pub value: JsonValue,
    pub span: Span,
}

impl JsonNode {
    pub fn new(value: JsonValue, span: Span) -> Self {
        Self { value, span }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonNode]> {
        match &self.value {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match &self.value {
            JsonValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.value.kind_name()
    }

    /// Convert to a `serde_json::Value`, dropping spans.
    pub fn to_serde(&self) -> serde_json::Value {
        self.value.to_serde()
    }
}

/// JSON value variants.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<JsonNode>),
    Object(JsonObject),
}

impl JsonValue {
    /// Returns the kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "boolean",
            JsonValue::Number(_) => "number",
            JsonValue::String(_) => "string",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }

    pub fn to_serde(&self) -> serde_json::Value {
        match self {
            JsonValue::Null => serde_json::Value::Null,
            JsonValue::Bool(b) => serde_json::Value::Bool(*b),
            // Lexemes were validated by the lexer; overflowing exponents fall back to null.
            JsonValue::Number(n) => {
                serde_json::from_str(n.as_str()).unwrap_or(serde_json::Value::Null)
            }
            JsonValue::String(s) => serde_json::Value::String(s.clone()),
            JsonValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(JsonNode::to_serde).collect())
            }
            JsonValue::Object(obj) => serde_json::Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.to_string(), v.to_serde()))
                    .collect(),
            ),
        }
    }
}

/// JSON object with members in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonObject {
    members: Vec<(String, JsonNode)>,
}

impl JsonObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: String, value: JsonNode) {
        self.members.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&JsonNode> {
        self.members.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonNode)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(value: JsonValue) -> JsonNode {
        JsonNode::new(value, Span::default())
    }

    #[test]
    fn test_number_classification() {
        assert!(Number::from_lexeme("42").is_integer());
        assert!(!Number::from_lexeme("1.2").is_integer());
        assert!(!Number::from_lexeme("1e3").is_integer());
        assert_eq!(Number::from_lexeme("-7").as_i64(), Some(-7));
        assert_eq!(Number::from_lexeme("1.5").as_i64(), None);
        assert_eq!(Number::from_lexeme("1.5").as_f64(), Some(1.5));
    }

    #[test]
    fn test_object_keeps_order() {
        let mut obj = JsonObject::new();
        obj.insert("z".to_string(), node(JsonValue::Null));
        obj.insert("a".to_string(), node(JsonValue::Bool(true)));
        let keys: Vec<&str> = obj.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert!(obj.contains_key("a"));
        assert!(!obj.contains_key("b"));
    }

    #[test]
    fn test_to_serde() {
        let mut obj = JsonObject::new();
        obj.insert(
            "n".to_string(),
            node(JsonValue::Number(Number::from_lexeme("1.25"))),
        );
        let value = node(JsonValue::Object(obj)).to_serde();
        assert_eq!(value, serde_json::json!({"n": 1.25}));
    }
}
