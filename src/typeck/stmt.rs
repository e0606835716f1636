//! Statements and type annotations

use crate::hir::{LetStmt, Stmt, Type, TypeKind};
use crate::types::Ty;
use crate::utils::Result;

use super::TypeChecker;

impl TypeChecker<'_> {
    pub fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expr(expr) => {
                self.resolve_expr(expr, false)?;
            }
            Stmt::Let(let_stmt) => self.resolve_let(let_stmt)?,
        }
        Ok(())
    }

    fn resolve_let(&mut self, stmt: &LetStmt) -> Result<()> {
        let specified = stmt.ty.as_ref().map(|ty| self.resolve_type(ty));
        let init_ty = match &stmt.init {
            Some(init) => self.resolve_expr(init, false)?,
            None => None,
        };

        let ty = match (specified, init_ty, &stmt.init) {
            // a mismatch keeps the annotation so later uses check against it
            (Some(specified), Some(init_ty), Some(init)) => self
                .combine_or_report(&specified, &init_ty, init.locus)
                .unwrap_or(specified),
            (Some(specified), _, _) => specified,
            (None, Some(init_ty), _) => init_ty,
            // the initializer already reported why it has no type
            (None, None, Some(_)) => Ty::error(stmt.mappings.hir_id),
            // settled by a later assignment
            (None, None, None) => Ty::infer(stmt.mappings.hir_id),
        };

        self.context.insert_type(stmt.pattern.mappings.hir_id, ty.clone());
        self.context.insert_type(stmt.mappings.hir_id, ty);
        Ok(())
    }

    /// Resolve a type annotation. An unresolvable path is reported once and
    /// becomes the error type.
    pub fn resolve_type(&mut self, ty: &Type) -> Ty {
        let resolved = match &ty.kind {
            TypeKind::Unit => Ty::unit(ty.mappings.hir_id),
            TypeKind::Array { element, capacity } => {
                let element = self.resolve_type(element);
                Ty::array(ty.mappings.hir_id, element, *capacity)
            }
            TypeKind::Path(name) => match self.lookup_type_path(ty) {
                Some(resolved) => resolved,
                None => {
                    self.diagnostics
                        .report_error(ty.locus, format!("failed to resolve type: {}", name));
                    Ty::error(ty.mappings.hir_id)
                }
            },
        };

        self.context.insert_type(ty.mappings.hir_id, resolved.clone());
        resolved
    }

    fn lookup_type_path(&self, ty: &Type) -> Option<Ty> {
        let ref_node = self.resolver.lookup_resolved_type(ty.mappings.node_id)?;

        // builtins have no node in the crate
        let ref_id = self
            .context
            .lookup_type_by_node_id(ref_node)
            .or_else(|| self.mappings.lookup_node_to_hir(ty.mappings.crate_num, ref_node))?;
        self.context.lookup_type(ref_id)
    }
}
