//! Struct literal checking

use crate::hir::{Expr, StructExpr};
use crate::types::Ty;
use crate::utils::Result;

use super::TypeChecker;

impl TypeChecker<'_> {
    /// Check `Name { field: value, .. }` against the struct's declaration.
    /// Every field is checked so all mismatches get reported.
    pub fn resolve_struct_expr(&mut self, expr: &Expr, s: &StructExpr) -> Result<Option<Ty>> {
        let Some(ref_node) = self.resolver.lookup_resolved_type(s.path.mappings.node_id) else {
            self.diagnostics
                .report_error(expr.locus, format!("failed to resolve struct path: {}", s.path.name));
            return Ok(None);
        };
        let Some(ref_id) = self.mappings.lookup_node_to_hir(s.path.mappings.crate_num, ref_node) else {
            self.diagnostics.report_error(expr.locus, "reverse lookup failure");
            return Ok(None);
        };
        let Some(struct_ty) = self.context.lookup_type(ref_id) else {
            self.diagnostics
                .report_error(expr.locus, format!("consider giving this a type: {}", expr));
            return Ok(None);
        };
        let Some(adt) = struct_ty.as_adt() else {
            self.diagnostics
                .report_error(expr.locus, format!("expected a struct type, found [{}]", struct_ty));
            return Ok(None);
        };

        let mut all_ok = true;
        for field in &s.fields {
            let value_ty = self.resolve_expr(&field.value, false)?;
            let Some(decl) = adt.field(&field.name) else {
                self.diagnostics.report_error(
                    field.locus,
                    format!("struct {} has no field named {}", adt.identifier, field.name),
                );
                all_ok = false;
                continue;
            };
            let Some(value_ty) = value_ty else {
                all_ok = false;
                continue;
            };

            match self.combine_or_report(&decl.ty, &value_ty, field.locus) {
                Some(ty) => self.context.insert_type(field.mappings.hir_id, ty),
                None => all_ok = false,
            }
        }

        for decl in &adt.fields {
            if !s.fields.iter().any(|f| f.name == decl.name) {
                self.diagnostics.report_error(
                    expr.locus,
                    format!("missing field {} in initializer of {}", decl.name, adt.identifier),
                );
                all_ok = false;
            }
        }

        Ok(all_ok.then(|| struct_ty.clone()))
    }
}
