//! Node identity mappings and the location service

use std::collections::HashMap;

use super::{CrateNum, HirId, NodeId, NodeMapping};
use crate::utils::Location;

/// Bridges surface-syntax identities to IR identities and IR identities to
/// source locations. Also hands out fresh identities.
#[derive(Debug, Default)]
pub struct Mappings {
    next_node_id: u32,
    next_hir_id: u32,
    node_to_hir: HashMap<CrateNum, HashMap<NodeId, HirId>>,
    locations: HashMap<HirId, Location>,
}

impl Mappings {
    pub fn new() -> Self {
        Self {
            // 0 is never handed out
            next_node_id: 1,
            next_hir_id: 1,
            ..Self::default()
        }
    }

    pub fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    pub fn next_hir_id(&mut self) -> HirId {
        let id = HirId(self.next_hir_id);
        self.next_hir_id += 1;
        id
    }

    /// Allocate and register the identities for a fresh node
    pub fn new_mapping(&mut self, crate_num: CrateNum, locus: Location) -> NodeMapping {
        let mapping = NodeMapping {
            crate_num,
            node_id: self.next_node_id(),
            hir_id: self.next_hir_id(),
        };
        self.insert_mapping(&mapping, locus);
        mapping
    }

    /// Register identities that were assigned elsewhere
    pub fn insert_mapping(&mut self, mapping: &NodeMapping, locus: Location) {
        self.insert_node_to_hir(mapping.crate_num, mapping.node_id, mapping.hir_id);
        self.insert_location(mapping.hir_id, locus);
        // keep fresh ids clear of externally assigned ones
        self.next_node_id = self.next_node_id.max(mapping.node_id.0 + 1);
        self.next_hir_id = self.next_hir_id.max(mapping.hir_id.0 + 1);
    }

    pub fn insert_node_to_hir(&mut self, crate_num: CrateNum, node: NodeId, hir: HirId) {
        self.node_to_hir.entry(crate_num).or_default().insert(node, hir);
    }

    pub fn lookup_node_to_hir(&self, crate_num: CrateNum, node: NodeId) -> Option<HirId> {
        self.node_to_hir.get(&crate_num)?.get(&node).copied()
    }

    pub fn insert_location(&mut self, hir: HirId, locus: Location) {
        self.locations.insert(hir, locus);
    }

    /// Unknown identities map to [`Location::unknown`]
    pub fn lookup_location(&self, hir: HirId) -> Location {
        self.locations.get(&hir).copied().unwrap_or_default()
    }
}
