//! Lowering of expressions and statements
//!
//! Expressions become backend expressions. Anything with control flow or a
//! side effect on a variable is emitted as statements into the innermost
//! open block; value-producing conditionals and blocks leave their value in a
//! temporary.

use std::collections::HashMap;

use crate::backend::Backend;
use crate::hir::{ArrayElems, BlockExpr, Expr, ExprKind, HirId, LetStmt, LitKind, Literal, Stmt, StructExpr};
use crate::types::{Ty, TyKind};
use crate::utils::{Error, Result};

use super::{tyty, Context};

impl<B: Backend> Context<'_, B> {
    fn type_of(&self, id: HirId) -> Result<Ty> {
        self.tyctx()
            .lookup_type(id)
            .ok_or_else(|| Error::internal(format!("no type recorded for {}", id)))
    }

    /// Whether lowering `expr` yields a value worth keeping
    fn produces_value(&self, expr: &Expr) -> Result<bool> {
        if matches!(expr.kind, ExprKind::Return(_)) {
            return Ok(false);
        }
        Ok(!self.type_of(expr.hir_id())?.is_unit())
    }

    /// Lower the statements of `block` into the current block. The tail's
    /// value is returned when it has one.
    pub fn compile_block_contents(&mut self, block: &BlockExpr) -> Result<Option<B::Expression>> {
        for stmt in &block.stmts {
            self.compile_stmt(stmt)?;
        }

        let Some(tail) = &block.tail else {
            return Ok(None);
        };
        if self.produces_value(tail)? {
            Ok(Some(self.compile_expr(tail)?))
        } else {
            self.compile_expr_stmt(tail)?;
            Ok(None)
        }
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Let(let_stmt) => self.compile_let(let_stmt),
            Stmt::Expr(expr) => self.compile_expr_stmt(expr),
        }
    }

    fn compile_let(&mut self, stmt: &LetStmt) -> Result<()> {
        let ty = self.type_of(stmt.mappings.hir_id)?;
        // unit and never-assigned bindings need no storage
        if ty.is_unit() || ty.is_infer() {
            if let Some(init) = &stmt.init {
                self.compile_expr_stmt(init)?;
            }
            return Ok(());
        }

        let compiled = tyty::compile(self, &ty)?;
        // the initializer still sees any shadowed binding
        let init = match &stmt.init {
            Some(init) => Some(self.compile_expr(init)?),
            None => None,
        };

        let func = self.peek_fn()?.func.clone();
        let backend = self.backend();
        let var = backend.local_variable(&func, &stmt.pattern.name, &compiled);
        let decl = backend.init_statement(&var, init);
        self.insert_var_decl(stmt.mappings.hir_id, var);
        self.add_statement(decl)
    }

    /// Lower an expression evaluated only for its effects
    fn compile_expr_stmt(&mut self, expr: &Expr) -> Result<()> {
        let value = self.compile_expr(expr)?;
        match expr.kind {
            // these emit their own statements
            ExprKind::Return(_)
            | ExprKind::Assignment { .. }
            | ExprKind::If { .. }
            | ExprKind::IfElse { .. }
            | ExprKind::IfElseIf { .. }
            | ExprKind::Block(_) => Ok(()),
            _ => {
                let stmt = self.backend().expression_statement(value);
                self.add_statement(stmt)
            }
        }
    }

    pub fn compile_expr(&mut self, expr: &Expr) -> Result<B::Expression> {
        match &expr.kind {
            ExprKind::Literal(lit) => self.compile_literal(expr, lit),
            ExprKind::Identifier(name) => self.compile_identifier(expr, name),
            ExprKind::Return(value) => {
                let value = match value {
                    Some(value) => Some(self.compile_expr(value)?),
                    None => None,
                };
                let func = self.peek_fn()?.func.clone();
                let stmt = self.backend().return_statement(&func, value);
                self.add_statement(stmt)?;
                Ok(self.backend().unit_expression())
            }
            ExprKind::Call { callee, args } => {
                let decl = self.lookup_callee(callee)?;
                let mut compiled = Vec::with_capacity(args.len());
                for arg in args {
                    compiled.push(self.compile_expr(arg)?);
                }
                Ok(self.backend().call_expression(&decl, compiled))
            }
            ExprKind::Assignment { lhs, rhs } => {
                let target = self.compile_expr(lhs)?;
                let value = self.compile_expr(rhs)?;
                let stmt = self.backend().assignment_statement(target.clone(), value);
                self.add_statement(stmt)?;
                Ok(target)
            }
            ExprKind::ArithmeticOrLogical { op, lhs, rhs } => {
                let lhs = self.compile_expr(lhs)?;
                let rhs = self.compile_expr(rhs)?;
                Ok(self.backend().arithmetic_or_logical_expression(*op, lhs, rhs))
            }
            ExprKind::Comparison { op, lhs, rhs } => {
                let lhs = self.compile_expr(lhs)?;
                let rhs = self.compile_expr(rhs)?;
                Ok(self.backend().comparison_expression(*op, lhs, rhs))
            }
            ExprKind::LazyBoolean { op, lhs, rhs } => {
                let lhs = self.compile_expr(lhs)?;
                let rhs = self.compile_expr(rhs)?;
                Ok(self.backend().lazy_boolean_expression(*op, lhs, rhs))
            }
            ExprKind::If { condition, block } => {
                let condition = self.compile_expr(condition)?;
                let then_block = self.compile_branch(block, None)?;
                let stmt = self.backend().if_statement(condition, &then_block, None);
                self.add_statement(stmt)?;
                Ok(self.backend().unit_expression())
            }
            ExprKind::IfElse {
                condition,
                if_block,
                else_block,
            } => self.compile_if_else(expr, condition, if_block, else_block),
            ExprKind::IfElseIf {
                condition,
                if_block,
                else_if,
            } => {
                let condition = self.compile_expr(condition)?;
                let then_block = self.compile_branch(if_block, None)?;
                let else_block = self.compile_branch(else_if, None)?;
                let stmt = self.backend().if_statement(condition, &then_block, Some(&else_block));
                self.add_statement(stmt)?;
                Ok(self.backend().unit_expression())
            }
            ExprKind::Block(_) => self.compile_block_expr(expr),
            ExprKind::ArrayIndex { array, index } => {
                let array = self.compile_expr(array)?;
                let index = self.compile_expr(index)?;
                Ok(self.backend().array_index_expression(array, index))
            }
            ExprKind::Array(elems) => self.compile_array(expr, elems),
            ExprKind::StructStruct(s) => self.compile_struct_expr(expr, s),
        }
    }

    fn compile_literal(&mut self, expr: &Expr, lit: &Literal) -> Result<B::Expression> {
        let ty = self.type_of(expr.hir_id())?;
        let malformed = || Error::internal(format!("malformed literal {}", lit.value));
        let text = lit.value.replace('_', "");

        match (lit.kind, ty.kind()) {
            (LitKind::Bool, _) => {
                let value = text.parse::<bool>().map_err(|_| malformed())?;
                Ok(self.backend().boolean_constant_expression(value))
            }
            (LitKind::Float, _) | (LitKind::Int, TyKind::Float(_)) => {
                let value = text.parse::<f64>().map_err(|_| malformed())?;
                let compiled = tyty::compile(self, &ty)?;
                Ok(self.backend().float_constant_expression(&compiled, value))
            }
            (LitKind::Int, _) => {
                let value = text.parse::<i128>().map_err(|_| malformed())?;
                let compiled = tyty::compile(self, &ty)?;
                Ok(self.backend().integer_constant_expression(&compiled, value))
            }
        }
    }

    /// Identity of the node that declared the binding `expr` refers to
    fn lookup_declaration(&self, expr: &Expr) -> Result<HirId> {
        let resolver = self.resolver();
        let ref_node = resolver
            .lookup_resolved_name(expr.mappings.node_id)
            .ok_or_else(|| Error::internal(format!("unresolved name {}", expr)))?;
        let def = resolver
            .lookup_definition(ref_node)
            .ok_or_else(|| Error::internal(format!("no definition for {}", expr)))?;
        self.mappings()
            .lookup_node_to_hir(expr.mappings.crate_num, def.parent)
            .ok_or_else(|| Error::internal(format!("reverse lookup failure for {}", expr)))
    }

    fn compile_identifier(&mut self, expr: &Expr, name: &str) -> Result<B::Expression> {
        let decl = self.lookup_declaration(expr)?;
        if let Some(var) = self.lookup_var_decl(decl).cloned() {
            return Ok(self.backend().var_expression(&var));
        }
        if let Some(value) = self.lookup_const_decl(decl) {
            return Ok(value.clone());
        }
        Err(Error::internal(format!("{} does not name a variable or constant", name)))
    }

    fn lookup_callee(&self, callee: &Expr) -> Result<B::Function> {
        let ref_node = self
            .resolver()
            .lookup_resolved_name(callee.mappings.node_id)
            .ok_or_else(|| Error::internal(format!("unresolved callee {}", callee)))?;
        let id = self
            .mappings()
            .lookup_node_to_hir(callee.mappings.crate_num, ref_node)
            .ok_or_else(|| Error::internal(format!("reverse lookup failure for {}", callee)))?;
        self.lookup_function_decl(id)
            .cloned()
            .ok_or_else(|| Error::internal(format!("{} is not a declared function", callee)))
    }

    /// Lower a branch body into its own block. With a `target`, the branch's
    /// value is stored there.
    fn compile_branch(&mut self, body: &Expr, target: Option<&B::Variable>) -> Result<B::Block> {
        let func = self.peek_fn()?.func.clone();
        let enclosing = self.peek_enclosing_scope().cloned();
        let block = self.backend().block(&func, enclosing.as_ref());
        self.push_block(block);

        let value = match &body.kind {
            ExprKind::Block(inner) => self.compile_block_contents(inner)?,
            // `else if` chains nest without a block of their own
            _ => {
                self.compile_expr_stmt(body)?;
                None
            }
        };
        if let (Some(value), Some(target)) = (value, target) {
            let backend = self.backend();
            let lhs = backend.var_expression(target);
            let stmt = backend.assignment_statement(lhs, value);
            self.add_statement(stmt)?;
        }

        self.pop_block()
    }

    /// Declare a temporary in the current block for a value of type `ty`
    fn temporary(&mut self, ty: &Ty) -> Result<B::Variable> {
        let compiled = tyty::compile(self, ty)?;
        let func = self.peek_fn()?.func.clone();
        let backend = self.backend();
        let var = backend.local_variable(&func, "__tmp", &compiled);
        let decl = backend.init_statement(&var, None);
        self.add_statement(decl)?;
        Ok(var)
    }

    fn compile_if_else(
        &mut self,
        expr: &Expr,
        condition: &Expr,
        if_block: &Expr,
        else_block: &Expr,
    ) -> Result<B::Expression> {
        let ty = self.type_of(expr.hir_id())?;
        let condition = self.compile_expr(condition)?;

        let target = if ty.is_unit() { None } else { Some(self.temporary(&ty)?) };
        let then_block = self.compile_branch(if_block, target.as_ref())?;
        let else_block = self.compile_branch(else_block, target.as_ref())?;
        let stmt = self.backend().if_statement(condition, &then_block, Some(&else_block));
        self.add_statement(stmt)?;

        Ok(match target {
            Some(var) => self.backend().var_expression(&var),
            None => self.backend().unit_expression(),
        })
    }

    fn compile_block_expr(&mut self, expr: &Expr) -> Result<B::Expression> {
        let ty = self.type_of(expr.hir_id())?;
        let target = if ty.is_unit() { None } else { Some(self.temporary(&ty)?) };

        let inner = self.compile_branch(expr, target.as_ref())?;
        let stmt = self.backend().block_statement(&inner);
        self.add_statement(stmt)?;

        Ok(match target {
            Some(var) => self.backend().var_expression(&var),
            None => self.backend().unit_expression(),
        })
    }

    fn compile_array(&mut self, expr: &Expr, elems: &ArrayElems) -> Result<B::Expression> {
        let ty = self.type_of(expr.hir_id())?;
        let compiled = tyty::compile(self, &ty)?;

        let values = match elems {
            ArrayElems::Values(values) => {
                let mut compiled = Vec::with_capacity(values.len());
                for value in values {
                    compiled.push(self.compile_expr(value)?);
                }
                compiled
            }
            ArrayElems::Copied { elem, count } => {
                let value = self.compile_expr(elem)?;
                vec![value; *count]
            }
        };
        Ok(self.backend().array_constructor_expression(&compiled, values))
    }

    fn compile_struct_expr(&mut self, expr: &Expr, s: &StructExpr) -> Result<B::Expression> {
        let ty = self.type_of(expr.hir_id())?;
        let adt = ty
            .as_adt()
            .ok_or_else(|| Error::internal(format!("struct literal {} has type {}", s.path.name, ty)))?;
        let compiled = tyty::compile(self, &ty)?;

        // values run in source order, the constructor lists them in
        // declaration order
        let in_order = s
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .eq(adt.fields.iter().map(|d| d.name.as_str()));

        let mut values = HashMap::with_capacity(s.fields.len());
        for field in &s.fields {
            let mut value = self.compile_expr(&field.value)?;
            if !in_order && !is_side_effect_free(&field.value) {
                let ty = self.type_of(field.value.hir_id())?;
                if !ty.is_unit() {
                    let var = self.temporary(&ty)?;
                    let backend = self.backend();
                    let lhs = backend.var_expression(&var);
                    let stmt = backend.assignment_statement(lhs, value);
                    self.add_statement(stmt)?;
                    value = self.backend().var_expression(&var);
                }
            }
            values.insert(field.name.as_str(), value);
        }

        let mut fields = Vec::with_capacity(adt.fields.len());
        for decl in &adt.fields {
            let value = values
                .remove(decl.name.as_str())
                .ok_or_else(|| Error::internal(format!("missing field {} in {}", decl.name, s.path.name)))?;
            fields.push(value);
        }
        Ok(self.backend().constructor_expression(&compiled, fields))
    }
}

/// Whether the lowered form of `expr` can be evaluated in any order
fn is_side_effect_free(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Literal(_) | ExprKind::Identifier(_))
}
