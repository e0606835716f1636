//! Definition/type registry for one compilation unit

use std::collections::HashMap;

use crate::hir::{HirId, Mappings, NodeId};
use crate::resolve::Resolver;
use crate::types::{Ty, TyKind};

/// Name the unit type is registered under
pub const UNIT_TYPE_NAME: &str = "()";

/// Every type recorded during checking, plus the pre-registered builtins
#[derive(Debug, Default)]
pub struct TypeCheckContext {
    builtins: HashMap<String, Ty>,
    node_id_refs: HashMap<NodeId, HirId>,
    resolved: HashMap<HirId, Ty>,
    return_type_stack: Vec<Ty>,
}

impl TypeCheckContext {
    /// Create a context with a type registered for every builtin the
    /// resolver declared, and for unit.
    pub fn new(resolver: &Resolver, mappings: &mut Mappings) -> Self {
        let mut ctx = Self::default();

        for builtin in resolver.builtin_types() {
            let Some(kind) = TyKind::from_builtin_name(builtin.name) else {
                continue;
            };
            let id = mappings.next_hir_id();
            ctx.insert_builtin(id, builtin.node_id, builtin.name, Ty::new(id, kind));
        }

        let unit_node = mappings.next_node_id();
        let unit_id = mappings.next_hir_id();
        ctx.insert_builtin(unit_id, unit_node, UNIT_TYPE_NAME, Ty::unit(unit_id));

        ctx
    }

    fn insert_builtin(&mut self, id: HirId, node: NodeId, name: &str, ty: Ty) {
        log::trace!("builtin {} registered as {}", name, id);
        self.node_id_refs.insert(node, id);
        self.resolved.insert(id, ty.clone());
        self.builtins.insert(name.to_string(), ty);
    }

    pub fn lookup_builtin(&self, name: &str) -> Option<Ty> {
        self.builtins.get(name).cloned()
    }

    /// Record (or overwrite) the type of a node
    pub fn insert_type(&mut self, id: HirId, ty: Ty) {
        log::debug!("{} : {}", id, ty);
        self.resolved.insert(id, ty);
    }

    pub fn lookup_type(&self, id: HirId) -> Option<Ty> {
        self.resolved.get(&id).cloned()
    }

    pub fn lookup_type_by_node_id(&self, node: NodeId) -> Option<HirId> {
        self.node_id_refs.get(&node).copied()
    }

    pub fn push_return_type(&mut self, ty: Ty) {
        self.return_type_stack.push(ty);
    }

    pub fn pop_return_type(&mut self) -> Option<Ty> {
        self.return_type_stack.pop()
    }

    /// Return type of the innermost function being checked
    pub fn peek_return_type(&self) -> Option<&Ty> {
        self.return_type_stack.last()
    }

    /// Number of recorded types, builtins included
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}
