//! Compilation session
//!
//! A session owns every table of one compilation: identity mappings, the
//! resolver, the type registry and the diagnostics. It is built from a
//! serialized [`CompilationUnit`], which is what name resolution hands over.

use std::collections::HashMap;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::backend::CBackend;
use crate::compile::Context;
use crate::hir::walk::{walk_crate, Visitor};
use crate::hir::{Crate, ItemKind, Mappings, NodeId, NodeMapping, Type};
use crate::resolve::{Definition, Resolver};
use crate::typeck::{type_check_crate, TypeCheckContext};
use crate::utils::{Diagnostics, Location, Result};

/// One resolved reference: `use_site` refers to `decl`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Binding {
    pub use_site: NodeId,
    pub decl: NodeId,
}

/// A desugared crate with the output of name resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(rename = "crate")]
    pub krate: Crate,
    /// Value references (identifiers, callees)
    #[serde(default)]
    pub names: Vec<Binding>,
    /// Type references (annotations, struct literal paths)
    #[serde(default)]
    pub types: Vec<Binding>,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

/// Registers every node identity and collects named type annotations
struct Registrar<'m> {
    mappings: &'m mut Mappings,
    type_paths: Vec<(NodeId, String)>,
}

impl Visitor for Registrar<'_> {
    fn visit_mapping(&mut self, mapping: &NodeMapping, locus: Location) {
        self.mappings.insert_mapping(mapping, locus);
    }

    fn visit_type_path(&mut self, ty: &Type, name: &str) {
        self.type_paths.push((ty.mappings.node_id, name.to_string()));
    }
}

pub struct Session {
    pub mappings: Mappings,
    pub resolver: Resolver,
    pub tyctx: TypeCheckContext,
    pub diagnostics: Diagnostics,
    krate: Crate,
}

impl Session {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let unit: CompilationUnit =
            serde_json::from_str(text).context("malformed compilation unit")?;
        Ok(Self::new(unit))
    }

    pub fn new(unit: CompilationUnit) -> Self {
        let mut mappings = Mappings::new();
        let mut registrar = Registrar {
            mappings: &mut mappings,
            type_paths: Vec::new(),
        };
        walk_crate(&mut registrar, &unit.krate);
        let type_paths = registrar.type_paths;

        // builtins get identities past every node of the crate
        let mut resolver = Resolver::new(&mut mappings);
        for b in &unit.names {
            resolver.insert_resolved_name(b.use_site, b.decl);
        }
        for b in &unit.types {
            resolver.insert_resolved_type(b.use_site, b.decl);
        }
        for def in &unit.definitions {
            resolver.insert_definition(*def);
        }

        // items are their own definitions
        let mut structs = HashMap::new();
        for item in &unit.krate.items {
            let node = item.mappings.node_id;
            if resolver.lookup_definition(node).is_none() {
                resolver.insert_definition(Definition { node, parent: node });
            }
            if let ItemKind::Struct(s) = &item.kind {
                structs.insert(s.name.clone(), node);
            }
        }

        // type paths left unbound name a builtin or a struct of the crate
        for (node, name) in type_paths {
            if resolver.lookup_resolved_type(node).is_some() {
                continue;
            }
            let decl = resolver
                .lookup_builtin_type(&name)
                .or_else(|| structs.get(&name).copied());
            if let Some(decl) = decl {
                resolver.insert_resolved_type(node, decl);
            }
        }

        let tyctx = TypeCheckContext::new(&resolver, &mut mappings);
        log::info!(
            "session loaded: {} items, {} name bindings",
            unit.krate.items.len(),
            unit.names.len()
        );

        Self {
            mappings,
            resolver,
            tyctx,
            diagnostics: Diagnostics::new(),
            krate: unit.krate,
        }
    }

    /// Type check the crate. Recoverable errors end up in `diagnostics`.
    pub fn check(&mut self) -> Result<()> {
        type_check_crate(
            &self.krate,
            &mut self.tyctx,
            &self.resolver,
            &self.mappings,
            &mut self.diagnostics,
        )
    }

    /// Lower the checked crate to C
    pub fn lower_to_c(&self, target: &str) -> Result<CBackend> {
        let mut backend = CBackend::new(target);
        let mut ctx = Context::new(&mut backend, &self.resolver, &self.tyctx, &self.mappings)?;
        ctx.compile_crate(&self.krate)?;
        Ok(backend)
    }
}
