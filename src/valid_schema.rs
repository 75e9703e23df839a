//! The compiled, immutable schema handle.

use std::fmt;
use std::str::FromStr;

use crate::canonical;
use crate::error::CompileError;
use crate::fingerprint::Fingerprint;
use crate::schema::{Name, NamedId, SchemaNode, TypeRef};
use crate::symbols::NamedTypes;

/// A schema that passed every check.
///
/// Only the compiler constructs one. It owns its named-type arena, never
/// changes after construction and can be shared freely between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSchema {
    root: TypeRef,
    types: NamedTypes,
}

impl ValidSchema {
    pub(crate) fn new(root: TypeRef, types: NamedTypes) -> Self {
        Self { root, types }
    }

    pub fn root(&self) -> &TypeRef {
        &self.root
    }

    /// The node at the root of the type graph.
    pub fn root_node(&self) -> &SchemaNode {
        self.node(&self.root)
    }

    /// Follow a reference to the node it names.
    pub fn node<'a>(&'a self, type_ref: &'a TypeRef) -> &'a SchemaNode {
        match type_ref {
            TypeRef::Inline(node) => node,
            TypeRef::Named(id) => self.types.get(*id),
        }
    }

    /// Find a named type by its fullname.
    pub fn lookup(&self, fullname: &str) -> Option<&SchemaNode> {
        self.types.lookup(fullname).map(|id| self.types.get(id))
    }

    pub fn named_types(&self) -> &NamedTypes {
        &self.types
    }

    pub fn name_of(&self, id: NamedId) -> Option<&Name> {
        self.types.get(id).name()
    }

    /// Canonical JSON, pretty-printed or compact.
    pub fn to_json(&self, pretty: bool) -> String {
        canonical::write_schema(&self.root, &self.types, pretty)
    }

    /// SHA-256 of the compact canonical form.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_canonical(&self.to_json(false))
    }
}

impl fmt::Display for ValidSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json(false))
    }
}

impl FromStr for ValidSchema {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::compile(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_valid_schema_is_send_sync() {
        assert_send_sync::<ValidSchema>();
    }

    #[test]
    fn test_from_str_and_display() {
        let schema: ValidSchema = r#"{ "type" : "long" }"#.parse().unwrap();
        assert_eq!(schema.to_string(), "\"long\"");
        assert_eq!(schema.root_node().type_name(), "long");
    }

    #[test]
    fn test_lookup_named_type() {
        let schema: ValidSchema =
            r#"{"type":"fixed","name":"MyFixed","namespace":"org.apache.hadoop.avro","size":1}"#
                .parse()
                .unwrap();
        let node = schema.lookup("org.apache.hadoop.avro.MyFixed").unwrap();
        assert_eq!(node.type_name(), "fixed");
        assert!(schema.lookup("MyFixed").is_none());
        let id = schema.root().named_id().unwrap();
        assert_eq!(schema.name_of(id).map(Name::name), Some("MyFixed"));
    }
}
