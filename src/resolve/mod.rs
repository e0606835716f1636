//! Reference resolver
//!
//! Holds the results of name resolution, which runs before this middle-end:
//! which declaration each identifier or type path refers to, and which node
//! each declaration belongs to. The tables are filled by the resolution pass
//! (or by a deserialized compilation unit) and read by the type checker and
//! the lowering pass.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::hir::{Mappings, NodeId};

/// Primitive type names the resolver pre-declares
pub const BUILTIN_TYPE_NAMES: [&str; 13] = [
    "u8", "u16", "u32", "u64", "u128",
    "i8", "i16", "i32", "i64", "i128",
    "f32", "f64",
    "bool",
];

/// Links a declaration site (a pattern, a parameter, an item) to the node that
/// owns its type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub node: NodeId,
    pub parent: NodeId,
}

/// A pre-declared primitive type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinType {
    pub name: &'static str,
    pub node_id: NodeId,
}

#[derive(Debug, Default)]
pub struct Resolver {
    /// use-site -> declaration site, for values
    resolved_names: HashMap<NodeId, NodeId>,
    /// use-site -> declaration site, for types
    resolved_types: HashMap<NodeId, NodeId>,
    definitions: HashMap<NodeId, Definition>,
    builtins: Vec<BuiltinType>,
}

impl Resolver {
    pub fn new(mappings: &mut Mappings) -> Self {
        let mut resolver = Self::default();
        resolver.generate_builtins(mappings);
        resolver
    }

    fn generate_builtins(&mut self, mappings: &mut Mappings) {
        for name in BUILTIN_TYPE_NAMES {
            let node_id = mappings.next_node_id();
            log::trace!("builtin type {} declared as {}", name, node_id);
            self.builtins.push(BuiltinType { name, node_id });
        }
    }

    pub fn builtin_types(&self) -> &[BuiltinType] {
        &self.builtins
    }

    pub fn lookup_builtin_type(&self, name: &str) -> Option<NodeId> {
        self.builtins.iter().find(|b| b.name == name).map(|b| b.node_id)
    }

    pub fn insert_resolved_name(&mut self, use_site: NodeId, decl: NodeId) {
        self.resolved_names.insert(use_site, decl);
    }

    pub fn lookup_resolved_name(&self, use_site: NodeId) -> Option<NodeId> {
        self.resolved_names.get(&use_site).copied()
    }

    pub fn insert_resolved_type(&mut self, use_site: NodeId, decl: NodeId) {
        self.resolved_types.insert(use_site, decl);
    }

    pub fn lookup_resolved_type(&self, use_site: NodeId) -> Option<NodeId> {
        self.resolved_types.get(&use_site).copied()
    }

    pub fn insert_definition(&mut self, def: Definition) {
        self.definitions.insert(def.node, def);
    }

    pub fn lookup_definition(&self, node: NodeId) -> Option<Definition> {
        self.definitions.get(&node).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtins_have_distinct_nodes() {
        let mut mappings = Mappings::new();
        let resolver = Resolver::new(&mut mappings);

        assert_eq!(resolver.builtin_types().len(), BUILTIN_TYPE_NAMES.len());
        let i32_node = resolver.lookup_builtin_type("i32");
        let u32_node = resolver.lookup_builtin_type("u32");
        assert!(i32_node.is_some());
        assert!(i32_node != u32_node);
        assert_eq!(resolver.lookup_builtin_type("str"), None);
    }

    #[test]
    fn test_definitions_keyed_by_declaration() {
        let mut resolver = Resolver::default();
        resolver.insert_resolved_name(NodeId(10), NodeId(3));
        resolver.insert_definition(Definition { node: NodeId(3), parent: NodeId(2) });

        let decl = resolver.lookup_resolved_name(NodeId(10));
        assert_eq!(decl, Some(NodeId(3)));
        assert_eq!(resolver.lookup_definition(NodeId(3)).map(|d| d.parent), Some(NodeId(2)));
        assert_eq!(resolver.lookup_definition(NodeId(2)), None);
    }
}
