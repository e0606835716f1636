//! Expression type checking

use crate::hir::{
    ArrayElems, BlockExpr, CoreType, Expr, ExprKind, LitKind, Literal,
};
use crate::types::{IntKind, Ty};
use crate::utils::{Error, Result};

use super::TypeChecker;

impl TypeChecker<'_> {
    /// Infer the type of `expr` and record it against the expression.
    ///
    /// `is_final_expr` marks tail position, where the value of the expression
    /// becomes the value of the enclosing function. `Ok(None)` means the type
    /// could not be determined and an error has been reported.
    pub fn resolve_expr(&mut self, expr: &Expr, is_final_expr: bool) -> Result<Option<Ty>> {
        let infered = match &expr.kind {
            ExprKind::Literal(lit) => self.resolve_literal(lit).map(Some)?,
            ExprKind::Identifier(_) => self.resolve_identifier(expr, false),
            ExprKind::Return(value) => self.resolve_return(expr, value.as_deref())?,
            ExprKind::Call { callee, args } => self.resolve_call(expr, callee, args)?,
            ExprKind::Assignment { lhs, rhs } => self.resolve_assignment(expr, lhs, rhs)?,
            ExprKind::ArithmeticOrLogical { lhs, rhs, .. }
            | ExprKind::Comparison { lhs, rhs, .. }
            | ExprKind::LazyBoolean { lhs, rhs, .. } => {
                // comparisons and lazy booleans keep the combined operand type
                self.resolve_binary(expr, lhs, rhs)?
            }
            ExprKind::If { condition, block } => {
                self.resolve_expr(condition, false)?;
                self.resolve_expr(block, false)?;

                // if without else always resolves to unit
                Some(Ty::unit(expr.hir_id()))
            }
            ExprKind::IfElse { condition, if_block, else_block } => {
                self.resolve_if_else(expr, condition, if_block, else_block, is_final_expr)?
            }
            ExprKind::IfElseIf { condition, if_block, else_if } => {
                self.resolve_expr(condition, false)?;
                self.resolve_expr(if_block, false)?;
                self.resolve_expr(else_if, false)?;
                Some(Ty::unit(expr.hir_id()))
            }
            ExprKind::Block(block) => self.resolve_block(expr, block, is_final_expr)?,
            ExprKind::ArrayIndex { array, index } => self.resolve_array_index(array, index)?,
            ExprKind::Array(elems) => self.resolve_array(expr, elems)?,
            ExprKind::StructStruct(s) => self.resolve_struct_expr(expr, s)?,
        };

        if let Some(ty) = &infered {
            self.context.insert_type(expr.hir_id(), ty.clone());
        }
        Ok(infered)
    }

    fn resolve_literal(&mut self, lit: &Literal) -> Result<Ty> {
        let name = match lit.kind {
            LitKind::Int => match lit.type_hint {
                CoreType::I8 => "i8",
                CoreType::I16 => "i16",
                CoreType::I64 => "i64",
                CoreType::I128 => "i128",
                CoreType::U8 => "u8",
                CoreType::U16 => "u16",
                CoreType::U32 => "u32",
                CoreType::U64 => "u64",
                CoreType::U128 => "u128",
                // an integer literal with a float suffix is a float
                CoreType::F32 => "f32",
                CoreType::F64 => "f64",
                CoreType::I32 | CoreType::Bool | CoreType::Unknown => "i32",
            },
            LitKind::Float => match lit.type_hint {
                CoreType::F64 => "f64",
                _ => "f32",
            },
            LitKind::Bool => "bool",
        };

        self.context
            .lookup_builtin(name)
            .ok_or_else(|| Error::internal(format!("builtin type {} is not registered", name)))
    }

    /// Type of the binding `expr` refers to. Only the target of an
    /// assignment may still be unsettled.
    fn resolve_identifier(&mut self, expr: &Expr, is_assignee: bool) -> Option<Ty> {
        let ref_id = match self.lookup_declaration(expr) {
            Ok(id) => id,
            Err(message) => {
                self.diagnostics.report_error(expr.locus, message);
                return None;
            }
        };

        // the declaration must already carry a type
        match self.context.lookup_type(ref_id) {
            Some(ty) if ty.is_infer() && !is_assignee => {
                self.diagnostics
                    .report_error(expr.locus, format!("type annotations needed for {}", expr));
                None
            }
            Some(ty) => Some(ty),
            None => {
                let locus = self.mappings.lookup_location(ref_id);
                self.diagnostics
                    .report_error(locus, format!("consider giving this a type: {}", expr));
                None
            }
        }
    }

    fn resolve_return(&mut self, expr: &Expr, value: Option<&Expr>) -> Result<Option<Ty>> {
        let ret = self
            .context
            .peek_return_type()
            .cloned()
            .ok_or_else(|| Error::internal("return expression outside of a function"))?;

        let expr_ty = match value {
            Some(value) => match self.resolve_expr(value, false)? {
                Some(ty) => ty,
                None => return Ok(None),
            },
            None => Ty::unit(expr.hir_id()),
        };

        Ok(self.combine_or_report(&ret, &expr_ty, expr.locus))
    }

    fn resolve_call(&mut self, expr: &Expr, callee: &Expr, args: &[Expr]) -> Result<Option<Ty>> {
        let Some(ref_node) = self.resolver.lookup_resolved_name(callee.mappings.node_id) else {
            self.diagnostics.report_error(
                expr.locus,
                format!("failed to lookup reference for node: {}", expr),
            );
            return Ok(None);
        };

        let Some(ref_id) = self.mappings.lookup_node_to_hir(expr.mappings.crate_num, ref_node) else {
            self.diagnostics.report_error(expr.locus, "reverse lookup failure");
            return Ok(None);
        };

        let Some(lookup) = self.context.lookup_type(ref_id) else {
            self.diagnostics
                .report_error(expr.locus, format!("consider giving this a type: {}", expr));
            return Ok(None);
        };

        self.check_call_arguments(expr, &lookup, args)
    }

    fn check_call_arguments(&mut self, expr: &Expr, callee_ty: &Ty, args: &[Expr]) -> Result<Option<Ty>> {
        if callee_ty.is_error() {
            for arg in args {
                self.resolve_expr(arg, false)?;
            }
            return Ok(Some(callee_ty.clone()));
        }

        let Some(fn_ty) = callee_ty.as_fn() else {
            self.diagnostics.report_error(
                expr.locus,
                format!("expected a function type, found [{}]", callee_ty),
            );
            return Ok(None);
        };

        if fn_ty.params.len() != args.len() {
            self.diagnostics.report_error(
                expr.locus,
                format!(
                    "differing number of arguments: expected {}, got {}",
                    fn_ty.params.len(),
                    args.len()
                ),
            );
            return Ok(None);
        }

        let mut all_ok = true;
        for ((_, param_ty), arg) in fn_ty.params.iter().zip(args) {
            let Some(arg_ty) = self.resolve_expr(arg, false)? else {
                all_ok = false;
                continue;
            };
            if self.combine_or_report(param_ty, &arg_ty, arg.locus).is_none() {
                all_ok = false;
            }
        }

        Ok(all_ok.then(|| (*fn_ty.ret).clone()))
    }

    fn resolve_assignment(&mut self, expr: &Expr, lhs: &Expr, rhs: &Expr) -> Result<Option<Ty>> {
        let lhs_ty = match &lhs.kind {
            ExprKind::Identifier(_) => {
                let ty = self.resolve_identifier(lhs, true);
                if let Some(ty) = &ty {
                    self.context.insert_type(lhs.hir_id(), ty.clone());
                }
                ty
            }
            _ => self.resolve_expr(lhs, false)?,
        };
        let rhs_ty = self.resolve_expr(rhs, false)?;
        let (Some(lhs_ty), Some(rhs_ty)) = (lhs_ty, rhs_ty) else {
            return Ok(None);
        };

        let Some(infered) = self.combine_or_report(&lhs_ty, &rhs_ty, expr.locus) else {
            return Ok(None);
        };

        // the assigned value settles the type of the left-hand side
        self.context.insert_type(lhs.hir_id(), infered.clone());
        if lhs_ty.is_infer() {
            if let Ok(decl) = self.lookup_declaration(lhs) {
                self.context.insert_type(decl, infered.clone());
            }
        }

        Ok(Some(infered))
    }

    fn resolve_binary(&mut self, expr: &Expr, lhs: &Expr, rhs: &Expr) -> Result<Option<Ty>> {
        let lhs_ty = self.resolve_expr(lhs, false)?;
        let rhs_ty = self.resolve_expr(rhs, false)?;
        match (lhs_ty, rhs_ty) {
            (Some(l), Some(r)) => Ok(self.combine_or_report(&l, &r, expr.locus)),
            _ => Ok(None),
        }
    }

    fn resolve_if_else(
        &mut self,
        expr: &Expr,
        condition: &Expr,
        if_block: &Expr,
        else_block: &Expr,
        is_final_expr: bool,
    ) -> Result<Option<Ty>> {
        // in tail position the value must match the function's return type,
        // anywhere else the expression is unit
        let expected = if is_final_expr {
            self.context
                .peek_return_type()
                .cloned()
                .ok_or_else(|| Error::internal("if/else in tail position outside of a function"))?
        } else {
            Ty::unit(expr.hir_id())
        };

        self.resolve_expr(condition, false)?;
        let if_ty = self.resolve_expr(if_block, is_final_expr)?;
        let else_ty = self.resolve_expr(else_block, is_final_expr)?;

        if !is_final_expr {
            return Ok(Some(expected));
        }

        let (Some(if_ty), Some(else_ty)) = (if_ty, else_ty) else {
            return Ok(None);
        };
        let Some(infered) = self.combine_or_report(&expected, &if_ty, if_block.locus) else {
            return Ok(None);
        };
        Ok(self.combine_or_report(&infered, &else_ty, else_block.locus))
    }

    fn resolve_block(&mut self, expr: &Expr, block: &BlockExpr, is_final_expr: bool) -> Result<Option<Ty>> {
        for stmt in &block.stmts {
            self.resolve_stmt(stmt)?;
        }

        match &block.tail {
            Some(tail) => self.resolve_expr(tail, is_final_expr),
            None => Ok(Some(Ty::unit(expr.hir_id()))),
        }
    }

    fn resolve_array_index(&mut self, array: &Expr, index: &Expr) -> Result<Option<Ty>> {
        // TODO: index with usize once it is a builtin
        let size_ty = Ty::int(index.hir_id(), IntKind::I32);
        let index_ty = self.resolve_expr(index, false)?;
        if let Some(index_ty) = &index_ty {
            size_ty
                .combine(index_ty)
                .map_err(|err| Error::internal(format!("array index is not an i32: {}", err)))?;
        }

        // both operands are checked before giving up on either
        let array_ty = self.resolve_expr(array, false)?;
        let (Some(_), Some(array_ty)) = (index_ty, array_ty) else {
            return Ok(None);
        };
        if array_ty.is_error() {
            return Ok(Some(array_ty));
        }

        match array_ty.as_array() {
            Some(a) => Ok(Some((*a.element).clone())),
            None => Err(self
                .diagnostics
                .report_fatal(array.locus, "expected an ArrayType for index expression")),
        }
    }

    fn resolve_array(&mut self, expr: &Expr, elems: &ArrayElems) -> Result<Option<Ty>> {
        match elems {
            ArrayElems::Values(values) => {
                if values.is_empty() {
                    self.diagnostics.report_error(
                        expr.locus,
                        "cannot infer the element type of an empty array",
                    );
                    return Ok(None);
                }

                let mut types = Vec::with_capacity(values.len());
                for value in values {
                    types.push(self.resolve_expr(value, false)?);
                }
                let Some(types) = types.into_iter().collect::<Option<Vec<_>>>() else {
                    return Ok(None);
                };

                let mut element = types[0].clone();
                for (ty, value) in types.iter().zip(values).skip(1) {
                    element = match self.combine_or_report(&element, ty, value.locus) {
                        Some(ty) => ty,
                        None => return Ok(None),
                    };
                }
                Ok(Some(Ty::array(expr.hir_id(), element, values.len())))
            }
            ArrayElems::Copied { elem, count } => {
                let element = self.resolve_expr(elem, false)?;
                Ok(element.map(|element| Ty::array(expr.hir_id(), element, *count)))
            }
        }
    }
}
