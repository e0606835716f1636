//! Type inference and checking
//!
//! Walks the IR bottom-up and records a type against the identity of every
//! expression that checks successfully:
//! - builtin and declared types come from the [`TypeCheckContext`]
//! - identifiers are bound to declarations through the [`Resolver`]
//! - sub-expression types are reconciled with [`Ty::combine`]
//!
//! Recoverable problems are reported to [`Diagnostics`] and leave the node
//! without a type; checking then continues with the sibling nodes. Broken
//! invariants abort with an [`Error`].

pub mod context;
mod expr;
mod item;
mod stmt;
mod struct_expr;

use crate::hir::{Crate, Expr, HirId, Mappings};
use crate::resolve::Resolver;
use crate::types::Ty;
use crate::utils::{Diagnostics, Location, Result};

pub use context::TypeCheckContext;

/// Type check a whole compilation unit
pub fn type_check_crate(
    krate: &Crate,
    context: &mut TypeCheckContext,
    resolver: &Resolver,
    mappings: &Mappings,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    TypeChecker::new(context, resolver, mappings, diagnostics).check_crate(krate)
}

pub struct TypeChecker<'a> {
    context: &'a mut TypeCheckContext,
    resolver: &'a Resolver,
    mappings: &'a Mappings,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        context: &'a mut TypeCheckContext,
        resolver: &'a Resolver,
        mappings: &'a Mappings,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            context,
            resolver,
            mappings,
            diagnostics,
        }
    }

    /// Combine two types, reporting a mismatch at `locus`
    fn combine_or_report(&mut self, expected: &Ty, got: &Ty, locus: Location) -> Option<Ty> {
        match expected.combine(got) {
            Ok(ty) => Some(ty),
            Err(err) => {
                self.diagnostics.report_error(locus, err.to_string());
                None
            }
        }
    }

    /// Follow an identifier to the node that owns its declared type:
    /// use-site -> declaration -> definition parent -> IR identity.
    fn lookup_declaration(&self, expr: &Expr) -> std::result::Result<HirId, String> {
        let ref_node = self
            .resolver
            .lookup_resolved_name(expr.mappings.node_id)
            .ok_or_else(|| format!("failed to lookup reference for node: {}", expr))?;

        // the reference points at a pattern, the type lives on its parent
        let def = self
            .resolver
            .lookup_definition(ref_node)
            .ok_or_else(|| "unknown reference".to_string())?;

        self.mappings
            .lookup_node_to_hir(expr.mappings.crate_num, def.parent)
            .ok_or_else(|| "reverse lookup failure".to_string())
    }
}
