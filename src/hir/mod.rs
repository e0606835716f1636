//! Desugared intermediate representation consumed by the middle-end
//!
//! Every node carries a [`NodeMapping`] pairing the identity it had in the
//! surface syntax tree ([`NodeId`]) with its identity in this IR ([`HirId`]).
//! The type checker and the lowering context key all of their tables on
//! `HirId`.

pub mod expr;
pub mod mappings;
pub mod walk;

#[cfg(test)]
pub mod builder;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::Location;

pub use expr::*;
pub use mappings::Mappings;

/// Identity of a node in the surface syntax tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Identity of a node in the desugared IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HirId(pub u32);

/// Compilation unit number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CrateNum(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for HirId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hir#{}", self.0)
    }
}

/// The identities of one IR node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMapping {
    pub crate_num: CrateNum,
    pub node_id: NodeId,
    pub hir_id: HirId,
}

/// A desugared compilation unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crate {
    pub crate_num: CrateNum,
    pub items: Vec<Item>,
}

/// Top-level item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub mappings: NodeMapping,
    pub locus: Location,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ItemKind {
    Function(Function),
    Struct(StructItem),
    Constant(ConstantItem),
    Static(StaticItem),
}

impl Item {
    pub fn name(&self) -> &str {
        match &self.kind {
            ItemKind::Function(f) => &f.name,
            ItemKind::Struct(s) => &s.name,
            ItemKind::Constant(c) => &c.name,
            ItemKind::Static(s) => &s.name,
        }
    }
}

/// Function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<FunctionParam>,
    pub return_type: Option<Type>,
    /// Always an [`ExprKind::Block`]
    pub body: Box<Expr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionParam {
    pub mappings: NodeMapping,
    pub locus: Location,
    pub pattern: IdentifierPattern,
    pub ty: Type,
}

/// A binding introduced by `let` or a parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierPattern {
    pub mappings: NodeMapping,
    pub name: String,
    #[serde(default)]
    pub mutable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructItem {
    pub name: String,
    pub fields: Vec<StructField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructField {
    pub mappings: NodeMapping,
    pub locus: Location,
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantItem {
    pub name: String,
    pub ty: Type,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticItem {
    pub name: String,
    #[serde(default)]
    pub mutable: bool,
    pub ty: Type,
    pub expr: Box<Expr>,
}

/// Type annotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Type {
    pub mappings: NodeMapping,
    pub locus: Location,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeKind {
    /// Named type, bound by the resolver to a builtin or a struct item
    Path(String),
    Array { element: Box<Type>, capacity: usize },
    Unit,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Path(name) => write!(f, "{}", name),
            TypeKind::Array { element, capacity } => write!(f, "[{}; {}]", element, capacity),
            TypeKind::Unit => write!(f, "()"),
        }
    }
}

/// Statement inside a block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    Let(LetStmt),
    /// Expression evaluated for its effects
    Expr(Expr),
}

impl Stmt {
    pub fn locus(&self) -> Location {
        match self {
            Stmt::Let(l) => l.locus,
            Stmt::Expr(e) => e.locus,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetStmt {
    pub mappings: NodeMapping,
    pub locus: Location,
    pub pattern: IdentifierPattern,
    pub ty: Option<Type>,
    pub init: Option<Box<Expr>>,
}
