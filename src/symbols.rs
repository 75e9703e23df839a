//! Symbol table for named types
//!
//! A per-compilation arena of records, enums and fixed types keyed by
//! fully-qualified name. A name is declared when its header is read and
//! defined once its body is built, so the body can refer to itself.

use std::collections::HashMap;

use crate::schema::{NamedId, Name, SchemaNode};

#[derive(Debug)]
struct Slot {
    name: Name,
    node: Option<SchemaNode>,
}

/// Mutable symbol table used while building.
#[derive(Debug, Default)]
pub struct SymbolTable {
    slots: Vec<Slot>,
    index: HashMap<String, NamedId>,
    detached: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`. Returns the existing id if it is already taken.
    pub fn declare(&mut self, name: Name) -> Result<NamedId, NamedId> {
        let fullname = name.fullname();
        if let Some(existing) = self.index.get(&fullname) {
            return Err(*existing);
        }
        let id = self.push(name);
        self.index.insert(fullname, id);
        Ok(id)
    }

    /// Allocate a slot that no name resolves to.
    ///
    /// Used for the body of a duplicate declaration so its own errors are
    /// still found. A table with detached slots never freezes.
    pub fn detached(&mut self, name: Name) -> NamedId {
        self.detached += 1;
        self.push(name)
    }

    fn push(&mut self, name: Name) -> NamedId {
        let id = NamedId(self.slots.len());
        self.slots.push(Slot { name, node: None });
        id
    }

    /// Attach the finished body to a declared slot.
    pub fn define(&mut self, id: NamedId, node: SchemaNode) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.node = Some(node);
        }
    }

    /// Look `name` up as a fullname first, then relative to `namespace`.
    pub fn resolve(&self, name: &str, namespace: Option<&str>) -> Option<NamedId> {
        if let Some(id) = self.index.get(name) {
            return Some(*id);
        }
        match namespace {
            Some(ns) if !ns.is_empty() && !name.contains('.') => {
                self.index.get(&format!("{}.{}", ns, name)).copied()
            }
            _ => None,
        }
    }

    pub fn name_of(&self, id: NamedId) -> Option<&Name> {
        self.slots.get(id.0).map(|s| &s.name)
    }

    /// The body of `id`, or `None` while it is still being built.
    pub fn get(&self, id: NamedId) -> Option<&SchemaNode> {
        self.slots.get(id.0).and_then(|s| s.node.as_ref())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Defined named types in declaration order.
    pub fn defined(&self) -> impl Iterator<Item = (NamedId, &SchemaNode)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.node.as_ref().map(|n| (NamedId(i), n)))
    }

    /// Turn a complete table into the immutable arena.
    ///
    /// Returns `None` if any slot is detached or was never defined.
    pub fn freeze(self) -> Option<NamedTypes> {
        if self.detached > 0 {
            return None;
        }
        let nodes = self
            .slots
            .into_iter()
            .map(|s| s.node)
            .collect::<Option<Vec<_>>>()?;
        Some(NamedTypes {
            nodes,
            index: self.index,
        })
    }
}

/// Immutable arena of named types owned by a compiled schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedTypes {
    nodes: Vec<SchemaNode>,
    index: HashMap<String, NamedId>,
}

impl NamedTypes {
    /// # Panics
    ///
    /// Panics if `id` was issued by a different compilation.
    pub fn get(&self, id: NamedId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn lookup(&self, fullname: &str) -> Option<NamedId> {
        self.index.get(fullname).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NamedId, &SchemaNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NamedId(i), n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::Span;
    use crate::schema::FixedSchema;

    fn fixed(name: Name) -> SchemaNode {
        SchemaNode::Fixed(FixedSchema {
            name,
            doc: None,
            size: 4,
            aliases: Vec::new(),
            span: Span::default(),
        })
    }

    #[test]
    fn test_declare_rejects_duplicates() {
        let mut table = SymbolTable::new();
        let first = table.declare(Name::with_namespace("Id", Some("com.x"))).unwrap();
        let again = table.declare(Name::qualify("com.x.Id", None, None));
        assert_eq!(again, Err(first));
    }

    #[test]
    fn test_declared_but_undefined_resolves() {
        let mut table = SymbolTable::new();
        let id = table.declare(Name::new("LongList")).unwrap();
        assert_eq!(table.resolve("LongList", None), Some(id));
        assert!(table.get(id).is_none());
    }

    #[test]
    fn test_resolve_relative_to_namespace() {
        let mut table = SymbolTable::new();
        let id = table.declare(Name::with_namespace("Inner", Some("a.b"))).unwrap();
        assert_eq!(table.resolve("a.b.Inner", None), Some(id));
        assert_eq!(table.resolve("Inner", Some("a.b")), Some(id));
        assert_eq!(table.resolve("Inner", Some("a")), None);
        assert_eq!(table.resolve("Inner", None), None);
    }

    #[test]
    fn test_fullname_lookup_takes_precedence() {
        let mut table = SymbolTable::new();
        let top = table.declare(Name::new("Item")).unwrap();
        let nested = table.declare(Name::with_namespace("Item", Some("ns"))).unwrap();
        assert_eq!(table.resolve("Item", Some("ns")), Some(top));
        assert_eq!(table.resolve("ns.Item", Some("ns")), Some(nested));
    }

    #[test]
    fn test_freeze_requires_all_defined() {
        let mut table = SymbolTable::new();
        let id = table.declare(Name::new("A")).unwrap();
        table.declare(Name::new("B")).unwrap();
        table.define(id, fixed(Name::new("A")));
        assert!(table.freeze().is_none());
    }

    #[test]
    fn test_freeze_rejects_detached() {
        let mut table = SymbolTable::new();
        let id = table.detached(Name::new("A"));
        table.define(id, fixed(Name::new("A")));
        assert!(table.freeze().is_none());
    }

    #[test]
    fn test_freeze() {
        let mut table = SymbolTable::new();
        let id = table.declare(Name::new("A")).unwrap();
        table.define(id, fixed(Name::new("A")));
        let named = table.freeze().unwrap();
        assert_eq!(named.len(), 1);
        assert_eq!(named.lookup("A"), Some(id));
        assert_eq!(named.get(id).type_name(), "fixed");
    }
}
