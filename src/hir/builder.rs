//! Test helper for assembling resolved IR by hand
//!
//! Every node gets fresh identities and a distinct line number. Identifiers,
//! calls and type paths are bound in the resolver the way name resolution
//! would bind them.

use super::*;
use crate::resolve::{Definition, Resolver};

/// A declared variable or parameter that identifiers can refer to
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub decl: NodeId,
}

pub struct HirBuilder<'a> {
    pub mappings: &'a mut Mappings,
    pub resolver: &'a mut Resolver,
    crate_num: CrateNum,
    line: u32,
}

impl<'a> HirBuilder<'a> {
    pub fn new(mappings: &'a mut Mappings, resolver: &'a mut Resolver) -> Self {
        Self {
            mappings,
            resolver,
            crate_num: CrateNum(0),
            line: 0,
        }
    }

    fn mapping(&mut self) -> (NodeMapping, Location) {
        self.line += 1;
        let locus = Location::new(0, self.line, 1);
        (self.mappings.new_mapping(self.crate_num, locus), locus)
    }

    fn expr(&mut self, kind: ExprKind) -> Expr {
        let (mappings, locus) = self.mapping();
        Expr { mappings, locus, kind }
    }

    fn literal(&mut self, value: String, kind: LitKind, type_hint: CoreType) -> Expr {
        self.expr(ExprKind::Literal(Literal { value, kind, type_hint }))
    }

    pub fn int(&mut self, value: i128) -> Expr {
        self.literal(value.to_string(), LitKind::Int, CoreType::Unknown)
    }

    pub fn int_typed(&mut self, value: i128, hint: CoreType) -> Expr {
        self.literal(value.to_string(), LitKind::Int, hint)
    }

    pub fn float(&mut self, value: &str, hint: CoreType) -> Expr {
        self.literal(value.to_string(), LitKind::Float, hint)
    }

    pub fn boolean(&mut self, value: bool) -> Expr {
        self.literal(value.to_string(), LitKind::Bool, CoreType::Unknown)
    }

    /// A type path, bound to the builtin of that name if there is one
    pub fn type_path(&mut self, name: &str) -> Type {
        let (mappings, locus) = self.mapping();
        if let Some(builtin) = self.resolver.lookup_builtin_type(name) {
            self.resolver.insert_resolved_type(mappings.node_id, builtin);
        }
        Type {
            mappings,
            locus,
            kind: TypeKind::Path(name.to_string()),
        }
    }

    /// A type path naming a struct item
    pub fn struct_type(&mut self, item: &Item) -> Type {
        let (mappings, locus) = self.mapping();
        self.resolver.insert_resolved_type(mappings.node_id, item.mappings.node_id);
        Type {
            mappings,
            locus,
            kind: TypeKind::Path(item.name().to_string()),
        }
    }

    pub fn array_type(&mut self, element: Type, capacity: usize) -> Type {
        let (mappings, locus) = self.mapping();
        Type {
            mappings,
            locus,
            kind: TypeKind::Array { element: Box::new(element), capacity },
        }
    }

    pub fn unit_type(&mut self) -> Type {
        let (mappings, locus) = self.mapping();
        Type { mappings, locus, kind: TypeKind::Unit }
    }

    fn pattern(&mut self, name: &str, parent: NodeId) -> (IdentifierPattern, Binding) {
        let (mappings, _) = self.mapping();
        self.resolver.insert_definition(Definition {
            node: mappings.node_id,
            parent,
        });
        let pattern = IdentifierPattern {
            mappings,
            name: name.to_string(),
            mutable: true,
        };
        let binding = Binding {
            name: name.to_string(),
            decl: mappings.node_id,
        };
        (pattern, binding)
    }

    pub fn let_stmt(&mut self, name: &str, ty: Option<Type>, init: Option<Expr>) -> (Stmt, Binding) {
        let (mappings, locus) = self.mapping();
        let (pattern, binding) = self.pattern(name, mappings.node_id);
        let stmt = Stmt::Let(LetStmt {
            mappings,
            locus,
            pattern,
            ty,
            init: init.map(Box::new),
        });
        (stmt, binding)
    }

    pub fn param(&mut self, name: &str, ty: Type) -> (FunctionParam, Binding) {
        let (mappings, locus) = self.mapping();
        let (pattern, binding) = self.pattern(name, mappings.node_id);
        (FunctionParam { mappings, locus, pattern, ty }, binding)
    }

    pub fn ident(&mut self, binding: &Binding) -> Expr {
        let expr = self.expr(ExprKind::Identifier(binding.name.clone()));
        self.resolver.insert_resolved_name(expr.mappings.node_id, binding.decl);
        expr
    }

    pub fn stmt(&mut self, expr: Expr) -> Stmt {
        Stmt::Expr(expr)
    }

    pub fn block(&mut self, stmts: Vec<Stmt>, tail: Option<Expr>) -> Expr {
        self.expr(ExprKind::Block(BlockExpr {
            stmts,
            tail: tail.map(Box::new),
        }))
    }

    pub fn call(&mut self, func: &Item, args: Vec<Expr>) -> Expr {
        let callee = self.expr(ExprKind::Identifier(func.name().to_string()));
        self.resolver.insert_resolved_name(callee.mappings.node_id, func.mappings.node_id);
        self.expr(ExprKind::Call { callee: Box::new(callee), args })
    }

    pub fn ret(&mut self, value: Option<Expr>) -> Expr {
        self.expr(ExprKind::Return(value.map(Box::new)))
    }

    pub fn assign(&mut self, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::Assignment { lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    pub fn arith(&mut self, op: ArithmeticOrLogicalOp, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::ArithmeticOrLogical { op, lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    pub fn compare(&mut self, op: ComparisonOp, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::Comparison { op, lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    pub fn lazy(&mut self, op: LazyBooleanOp, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::LazyBoolean { op, lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    pub fn if_then(&mut self, condition: Expr, block: Expr) -> Expr {
        self.expr(ExprKind::If { condition: Box::new(condition), block: Box::new(block) })
    }

    pub fn if_else(&mut self, condition: Expr, if_block: Expr, else_block: Expr) -> Expr {
        self.expr(ExprKind::IfElse {
            condition: Box::new(condition),
            if_block: Box::new(if_block),
            else_block: Box::new(else_block),
        })
    }

    pub fn if_else_if(&mut self, condition: Expr, if_block: Expr, else_if: Expr) -> Expr {
        self.expr(ExprKind::IfElseIf {
            condition: Box::new(condition),
            if_block: Box::new(if_block),
            else_if: Box::new(else_if),
        })
    }

    pub fn array(&mut self, values: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Array(ArrayElems::Values(values)))
    }

    pub fn array_copied(&mut self, elem: Expr, count: usize) -> Expr {
        self.expr(ExprKind::Array(ArrayElems::Copied { elem: Box::new(elem), count }))
    }

    pub fn index(&mut self, array: Expr, index: Expr) -> Expr {
        self.expr(ExprKind::ArrayIndex { array: Box::new(array), index: Box::new(index) })
    }

    pub fn struct_expr(&mut self, item: &Item, fields: Vec<(&str, Expr)>) -> Expr {
        let (path_mappings, _) = self.mapping();
        self.resolver.insert_resolved_type(path_mappings.node_id, item.mappings.node_id);

        let fields = fields
            .into_iter()
            .map(|(name, value)| {
                let (mappings, locus) = self.mapping();
                StructExprField {
                    mappings,
                    locus,
                    name: name.to_string(),
                    value,
                }
            })
            .collect();

        self.expr(ExprKind::StructStruct(StructExpr {
            path: PathInExpression {
                mappings: path_mappings,
                name: item.name().to_string(),
            },
            fields,
        }))
    }

    fn item(&mut self, kind: ItemKind) -> Item {
        let (mappings, locus) = self.mapping();
        Item { mappings, locus, kind }
    }

    pub fn function(
        &mut self,
        name: &str,
        params: Vec<FunctionParam>,
        return_type: Option<Type>,
        stmts: Vec<Stmt>,
        tail: Option<Expr>,
    ) -> Item {
        let body = self.block(stmts, tail);
        self.item(ItemKind::Function(Function {
            name: name.to_string(),
            params,
            return_type,
            body: Box::new(body),
        }))
    }

    pub fn struct_item(&mut self, name: &str, fields: Vec<(&str, Type)>) -> Item {
        let fields = fields
            .into_iter()
            .map(|(name, ty)| {
                let (mappings, locus) = self.mapping();
                StructField {
                    mappings,
                    locus,
                    name: name.to_string(),
                    ty,
                }
            })
            .collect();
        self.item(ItemKind::Struct(StructItem {
            name: name.to_string(),
            fields,
        }))
    }

    pub fn constant(&mut self, name: &str, ty: Type, expr: Expr) -> Item {
        self.item(ItemKind::Constant(ConstantItem {
            name: name.to_string(),
            ty,
            expr: Box::new(expr),
        }))
    }

    pub fn static_item(&mut self, name: &str, ty: Type, expr: Expr) -> Item {
        self.item(ItemKind::Static(StaticItem {
            name: name.to_string(),
            mutable: false,
            ty,
            expr: Box::new(expr),
        }))
    }

    /// A reference to a top-level constant or static
    pub fn item_ref(&mut self, item: &Item) -> Expr {
        let expr = self.expr(ExprKind::Identifier(item.name().to_string()));
        self.resolver.insert_resolved_name(expr.mappings.node_id, item.mappings.node_id);
        self.resolver.insert_definition(Definition {
            node: item.mappings.node_id,
            parent: item.mappings.node_id,
        });
        expr
    }

    pub fn krate(&self, items: Vec<Item>) -> Crate {
        Crate {
            crate_num: self.crate_num,
            items,
        }
    }
}
