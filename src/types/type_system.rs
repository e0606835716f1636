//! Type representation
//!
//! A [`Ty`] is an immutable value: a variant plus the identity of the node
//! that defines it. The identity is what the lowering context uses to find a
//! previously compiled target type.

use std::fmt;

use crate::hir::HirId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8, I16, I32, I64, I128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UintKind {
    U8, U16, U32, U64, U128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    F32, F64,
}

impl IntKind {
    pub fn bits(&self) -> u32 {
        match self {
            Self::I8 => 8,
            Self::I16 => 16,
            Self::I32 => 32,
            Self::I64 => 64,
            Self::I128 => 128,
        }
    }
}

impl UintKind {
    pub fn bits(&self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
            Self::U64 => 64,
            Self::U128 => 128,
        }
    }
}

impl FloatKind {
    pub fn bits(&self) -> u32 {
        match self {
            Self::F32 => 32,
            Self::F64 => 64,
        }
    }
}

/// Function signature
#[derive(Debug, Clone, PartialEq)]
pub struct FnType {
    pub params: Vec<(String, Ty)>,
    pub ret: Box<Ty>,
}

/// Struct definition
#[derive(Debug, Clone, PartialEq)]
pub struct AdtType {
    pub identifier: String,
    pub fields: Vec<StructFieldType>,
}

impl AdtType {
    pub fn field(&self, name: &str) -> Option<&StructFieldType> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructFieldType {
    pub name: String,
    pub ty: Box<Ty>,
}

/// Generic parameter placeholder
#[derive(Debug, Clone, PartialEq)]
pub struct ParamType {
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub element: Box<Ty>,
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TyKind {
    Error,
    Unit,
    /// Not yet known; settles when combined with a concrete type
    Infer,
    Fn(FnType),
    Adt(AdtType),
    StructField(StructFieldType),
    Param(ParamType),
    Array(ArrayType),
    Bool,
    Int(IntKind),
    Uint(UintKind),
    Float(FloatKind),
}

impl TyKind {
    /// Variant for a primitive type name, as pre-declared by the resolver
    pub fn from_builtin_name(name: &str) -> Option<Self> {
        let kind = match name {
            "i8" => Self::Int(IntKind::I8),
            "i16" => Self::Int(IntKind::I16),
            "i32" => Self::Int(IntKind::I32),
            "i64" => Self::Int(IntKind::I64),
            "i128" => Self::Int(IntKind::I128),
            "u8" => Self::Uint(UintKind::U8),
            "u16" => Self::Uint(UintKind::U16),
            "u32" => Self::Uint(UintKind::U32),
            "u64" => Self::Uint(UintKind::U64),
            "u128" => Self::Uint(UintKind::U128),
            "f32" => Self::Float(FloatKind::F32),
            "f64" => Self::Float(FloatKind::F64),
            "bool" => Self::Bool,
            "()" => Self::Unit,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone)]
pub struct Ty {
    ref_id: HirId,
    kind: TyKind,
}

impl Ty {
    pub fn new(ref_id: HirId, kind: TyKind) -> Self {
        Self { ref_id, kind }
    }

    pub fn error(ref_id: HirId) -> Self {
        Self::new(ref_id, TyKind::Error)
    }

    pub fn unit(ref_id: HirId) -> Self {
        Self::new(ref_id, TyKind::Unit)
    }

    pub fn infer(ref_id: HirId) -> Self {
        Self::new(ref_id, TyKind::Infer)
    }

    pub fn bool(ref_id: HirId) -> Self {
        Self::new(ref_id, TyKind::Bool)
    }

    pub fn int(ref_id: HirId, kind: IntKind) -> Self {
        Self::new(ref_id, TyKind::Int(kind))
    }

    pub fn uint(ref_id: HirId, kind: UintKind) -> Self {
        Self::new(ref_id, TyKind::Uint(kind))
    }

    pub fn float(ref_id: HirId, kind: FloatKind) -> Self {
        Self::new(ref_id, TyKind::Float(kind))
    }

    pub fn array(ref_id: HirId, element: Ty, capacity: usize) -> Self {
        Self::new(
            ref_id,
            TyKind::Array(ArrayType {
                element: Box::new(element),
                capacity,
            }),
        )
    }

    pub fn function(ref_id: HirId, params: Vec<(String, Ty)>, ret: Ty) -> Self {
        Self::new(
            ref_id,
            TyKind::Fn(FnType {
                params,
                ret: Box::new(ret),
            }),
        )
    }

    pub fn adt(ref_id: HirId, identifier: impl Into<String>, fields: Vec<StructFieldType>) -> Self {
        Self::new(
            ref_id,
            TyKind::Adt(AdtType {
                identifier: identifier.into(),
                fields,
            }),
        )
    }

    /// Identity of the node that defines this type
    pub fn get_ref(&self) -> HirId {
        self.ref_id
    }

    pub fn kind(&self) -> &TyKind {
        &self.kind
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, TyKind::Error)
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.kind, TyKind::Unit)
    }

    pub fn is_infer(&self) -> bool {
        matches!(self.kind, TyKind::Infer)
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match &self.kind {
            TyKind::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_fn(&self) -> Option<&FnType> {
        match &self.kind {
            TyKind::Fn(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_adt(&self) -> Option<&AdtType> {
        match &self.kind {
            TyKind::Adt(a) => Some(a),
            _ => None,
        }
    }
}

/// Structural equality. The carried identity only matters for nominal types.
impl PartialEq for Ty {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (TyKind::Adt(_), TyKind::Adt(_)) | (TyKind::Param(_), TyKind::Param(_)) => {
                self.ref_id == other.ref_id
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TyKind::Error => write!(f, "<error>"),
            TyKind::Unit => write!(f, "()"),
            TyKind::Infer => write!(f, "_"),
            TyKind::Fn(func) => {
                write!(f, "fn(")?;
                for (i, (name, ty)) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, ") -> {}", func.ret)
            }
            TyKind::Adt(adt) => write!(f, "{}", adt.identifier),
            TyKind::StructField(field) => write!(f, "{}: {}", field.name, field.ty),
            TyKind::Param(param) => write!(f, "{}", param.symbol),
            TyKind::Array(array) => write!(f, "[{}; {}]", array.element, array.capacity),
            TyKind::Bool => write!(f, "bool"),
            TyKind::Int(kind) => write!(f, "i{}", kind.bits()),
            TyKind::Uint(kind) => write!(f, "u{}", kind.bits()),
            TyKind::Float(kind) => write!(f, "f{}", kind.bits()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display() {
        let elem = Ty::float(HirId(1), FloatKind::F64);
        assert_eq!(Ty::array(HirId(2), elem, 4).to_string(), "[f64; 4]");
        assert_eq!(Ty::uint(HirId(3), UintKind::U128).to_string(), "u128");
        assert_eq!(Ty::unit(HirId(4)).to_string(), "()");

        let func = Ty::function(
            HirId(5),
            vec![("x".to_string(), Ty::int(HirId(6), IntKind::I32))],
            Ty::bool(HirId(7)),
        );
        assert_eq!(func.to_string(), "fn(x: i32) -> bool");
    }

    #[test]
    fn test_equality_ignores_identity_of_structural_types() {
        assert_eq!(Ty::int(HirId(1), IntKind::I8), Ty::int(HirId(2), IntKind::I8));
        assert!(Ty::int(HirId(1), IntKind::I8) != Ty::int(HirId(1), IntKind::I16));
    }

    #[test]
    fn test_equality_of_adts_is_nominal() {
        let a = Ty::adt(HirId(1), "Point", Vec::new());
        let b = Ty::adt(HirId(2), "Point", Vec::new());
        assert!(a != b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(TyKind::from_builtin_name("u16"), Some(TyKind::Uint(UintKind::U16)));
        assert_eq!(TyKind::from_builtin_name("()"), Some(TyKind::Unit));
        assert_eq!(TyKind::from_builtin_name("String"), None);
    }
}
