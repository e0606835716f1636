//! Depth-first traversal over every IR node that carries an identity

use super::*;
use crate::utils::Location;

pub trait Visitor {
    /// Called once per node identity. Nodes without their own locus report
    /// the locus of the enclosing node.
    fn visit_mapping(&mut self, _mapping: &NodeMapping, _locus: Location) {}

    /// Called for every named type annotation
    fn visit_type_path(&mut self, _ty: &Type, _name: &str) {}
}

pub fn walk_crate<V: Visitor>(v: &mut V, krate: &Crate) {
    for item in &krate.items {
        walk_item(v, item);
    }
}

pub fn walk_item<V: Visitor>(v: &mut V, item: &Item) {
    v.visit_mapping(&item.mappings, item.locus);
    match &item.kind {
        ItemKind::Function(func) => {
            for param in &func.params {
                v.visit_mapping(&param.mappings, param.locus);
                v.visit_mapping(&param.pattern.mappings, param.locus);
                walk_type(v, &param.ty);
            }
            if let Some(ty) = &func.return_type {
                walk_type(v, ty);
            }
            walk_expr(v, &func.body);
        }
        ItemKind::Struct(s) => {
            for field in &s.fields {
                v.visit_mapping(&field.mappings, field.locus);
                walk_type(v, &field.ty);
            }
        }
        ItemKind::Constant(c) => {
            walk_type(v, &c.ty);
            walk_expr(v, &c.expr);
        }
        ItemKind::Static(s) => {
            walk_type(v, &s.ty);
            walk_expr(v, &s.expr);
        }
    }
}

pub fn walk_type<V: Visitor>(v: &mut V, ty: &Type) {
    v.visit_mapping(&ty.mappings, ty.locus);
    match &ty.kind {
        TypeKind::Path(name) => v.visit_type_path(ty, name),
        TypeKind::Array { element, .. } => walk_type(v, element),
        TypeKind::Unit => {}
    }
}

pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Let(l) => {
            v.visit_mapping(&l.mappings, l.locus);
            v.visit_mapping(&l.pattern.mappings, l.locus);
            if let Some(ty) = &l.ty {
                walk_type(v, ty);
            }
            if let Some(init) = &l.init {
                walk_expr(v, init);
            }
        }
        Stmt::Expr(e) => walk_expr(v, e),
    }
}

pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Expr) {
    v.visit_mapping(&expr.mappings, expr.locus);
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Identifier(_) => {}
        ExprKind::Return(value) => {
            if let Some(value) = value {
                walk_expr(v, value);
            }
        }
        ExprKind::Call { callee, args } => {
            walk_expr(v, callee);
            for arg in args {
                walk_expr(v, arg);
            }
        }
        ExprKind::Assignment { lhs, rhs }
        | ExprKind::ArithmeticOrLogical { lhs, rhs, .. }
        | ExprKind::Comparison { lhs, rhs, .. }
        | ExprKind::LazyBoolean { lhs, rhs, .. } => {
            walk_expr(v, lhs);
            walk_expr(v, rhs);
        }
        ExprKind::If { condition, block } => {
            walk_expr(v, condition);
            walk_expr(v, block);
        }
        ExprKind::IfElse { condition, if_block, else_block } => {
            walk_expr(v, condition);
            walk_expr(v, if_block);
            walk_expr(v, else_block);
        }
        ExprKind::IfElseIf { condition, if_block, else_if } => {
            walk_expr(v, condition);
            walk_expr(v, if_block);
            walk_expr(v, else_if);
        }
        ExprKind::Block(block) => {
            for stmt in &block.stmts {
                walk_stmt(v, stmt);
            }
            if let Some(tail) = &block.tail {
                walk_expr(v, tail);
            }
        }
        ExprKind::ArrayIndex { array, index } => {
            walk_expr(v, array);
            walk_expr(v, index);
        }
        ExprKind::Array(ArrayElems::Values(values)) => {
            for value in values {
                walk_expr(v, value);
            }
        }
        ExprKind::Array(ArrayElems::Copied { elem, .. }) => walk_expr(v, elem),
        ExprKind::StructStruct(s) => {
            v.visit_mapping(&s.path.mappings, expr.locus);
            for field in &s.fields {
                v.visit_mapping(&field.mappings, field.locus);
                walk_expr(v, &field.value);
            }
        }
    }
}
