//! IR expressions

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{NodeMapping, Stmt};
use crate::utils::Location;

/// Expression node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub mappings: NodeMapping,
    pub locus: Location,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    Return(Option<Box<Expr>>),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Assignment {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    ArithmeticOrLogical {
        op: ArithmeticOrLogicalOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Comparison {
        op: ComparisonOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    LazyBoolean {
        op: LazyBooleanOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `if` without `else`
    If {
        condition: Box<Expr>,
        block: Box<Expr>,
    },
    /// `if .. else { .. }`
    IfElse {
        condition: Box<Expr>,
        if_block: Box<Expr>,
        else_block: Box<Expr>,
    },
    /// `if .. else if ..`
    IfElseIf {
        condition: Box<Expr>,
        if_block: Box<Expr>,
        else_if: Box<Expr>,
    },
    Block(BlockExpr),
    ArrayIndex {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Array(ArrayElems),
    StructStruct(StructExpr),
}

/// `{ stmts; tail }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockExpr {
    pub stmts: Vec<Stmt>,
    pub tail: Option<Box<Expr>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArrayElems {
    /// `[a, b, c]`
    Values(Vec<Expr>),
    /// `[value; count]`
    Copied { elem: Box<Expr>, count: usize },
}

/// `Name { field: value, .. }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructExpr {
    pub path: PathInExpression,
    pub fields: Vec<StructExprField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathInExpression {
    pub mappings: NodeMapping,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructExprField {
    pub mappings: NodeMapping,
    pub locus: Location,
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LitKind {
    Int,
    Float,
    Bool,
}

/// Suffix or context hint attached to a literal by the desugaring pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoreType {
    #[default]
    Unknown,
    I8, I16, I32, I64, I128,
    U8, U16, U32, U64, U128,
    F32, F64,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    pub kind: LitKind,
    #[serde(default)]
    pub type_hint: CoreType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithmeticOrLogicalOp {
    Add, Sub, Mul, Div, Rem,
    BitAnd, BitOr, BitXor, Shl, Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Eq, Ne, Lt, Le, Gt, Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LazyBooleanOp {
    And,
    Or,
}

impl fmt::Display for ArithmeticOrLogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for LazyBooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
        }
    }
}

impl Expr {
    pub fn hir_id(&self) -> super::HirId {
        self.mappings.hir_id
    }

    pub fn as_block(&self) -> Option<&BlockExpr> {
        match &self.kind {
            ExprKind::Block(block) => Some(block),
            _ => None,
        }
    }
}

/// Source-like rendering used in diagnostics
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{}", lit.value),
            ExprKind::Identifier(name) => write!(f, "{}", name),
            ExprKind::Return(None) => write!(f, "return"),
            ExprKind::Return(Some(e)) => write!(f, "return {}", e),
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            ExprKind::Assignment { lhs, rhs } => write!(f, "{} = {}", lhs, rhs),
            ExprKind::ArithmeticOrLogical { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
            ExprKind::Comparison { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
            ExprKind::LazyBoolean { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
            ExprKind::If { condition, .. } => write!(f, "if {} {{ .. }}", condition),
            ExprKind::IfElse { condition, .. } => write!(f, "if {} {{ .. }} else {{ .. }}", condition),
            ExprKind::IfElseIf { condition, else_if, .. } => {
                write!(f, "if {} {{ .. }} else {}", condition, else_if)
            }
            ExprKind::Block(_) => write!(f, "{{ .. }}"),
            ExprKind::ArrayIndex { array, index } => write!(f, "{}[{}]", array, index),
            ExprKind::Array(ArrayElems::Values(values)) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            ExprKind::Array(ArrayElems::Copied { elem, count }) => write!(f, "[{}; {}]", elem, count),
            ExprKind::StructStruct(s) => write!(f, "{} {{ .. }}", s.path.name),
        }
    }
}
