//! Type unification

use thiserror::Error;

use super::type_system::{StructFieldType, Ty, TyKind};

/// Two types could not be reconciled
#[derive(Error, Debug, Clone, PartialEq)]
#[error("expected [{expected}] got [{got}]")]
pub struct TypeError {
    pub expected: String,
    pub got: String,
}

impl Ty {
    /// Reconcile `self` with `other`.
    ///
    /// `Error` absorbs everything, `Infer` takes the other side, numeric
    /// types must agree on variant and width, arrays combine element-wise at
    /// equal capacity and nominal types only combine with themselves. Neither
    /// operand is modified; a failure is returned rather than resolved in
    /// favour of either side.
    pub fn combine(&self, other: &Ty) -> Result<Ty, TypeError> {
        use TyKind::*;

        let combined = match (self.kind(), other.kind()) {
            (Error, _) => self.clone(),
            (_, Error) => other.clone(),

            (Infer, _) => other.clone(),
            (_, Infer) => self.clone(),

            (Unit, Unit) | (Bool, Bool) => self.clone(),
            (Int(a), Int(b)) if a == b => self.clone(),
            (Uint(a), Uint(b)) if a == b => self.clone(),
            (Float(a), Float(b)) if a == b => self.clone(),

            (Array(a), Array(b)) if a.capacity == b.capacity => {
                let element = a
                    .element
                    .combine(&b.element)
                    .map_err(|_| self.mismatch(other))?;
                Ty::array(self.get_ref(), element, a.capacity)
            }

            (Adt(_), Adt(_)) | (Param(_), Param(_)) if self.get_ref() == other.get_ref() => {
                self.clone()
            }

            (Fn(a), Fn(b)) if a.params.len() == b.params.len() => {
                let params = a
                    .params
                    .iter()
                    .zip(&b.params)
                    .map(|((name, pa), (_, pb))| Ok((name.clone(), pa.combine(pb)?)))
                    .collect::<Result<Vec<_>, TypeError>>()
                    .map_err(|_| self.mismatch(other))?;
                let ret = a.ret.combine(&b.ret).map_err(|_| self.mismatch(other))?;
                Ty::function(self.get_ref(), params, ret)
            }

            (StructField(a), StructField(b)) if a.name == b.name => {
                let ty = a.ty.combine(&b.ty).map_err(|_| self.mismatch(other))?;
                Ty::new(
                    self.get_ref(),
                    StructField(StructFieldType {
                        name: a.name.clone(),
                        ty: Box::new(ty),
                    }),
                )
            }

            _ => return Err(self.mismatch(other)),
        };

        log::trace!("combine {} with {} -> {}", self, other, combined);
        Ok(combined)
    }

    fn mismatch(&self, other: &Ty) -> TypeError {
        TypeError {
            expected: self.to_string(),
            got: other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::HirId;
    use crate::types::{FloatKind, IntKind, ParamType, UintKind};
    use pretty_assertions::assert_eq;

    fn i32_ty() -> Ty {
        Ty::int(HirId(1), IntKind::I32)
    }

    fn samples() -> Vec<Ty> {
        vec![
            Ty::error(HirId(10)),
            Ty::unit(HirId(11)),
            Ty::infer(HirId(12)),
            Ty::bool(HirId(13)),
            i32_ty(),
            Ty::int(HirId(14), IntKind::I64),
            Ty::uint(HirId(15), UintKind::U32),
            Ty::float(HirId(16), FloatKind::F32),
            Ty::float(HirId(17), FloatKind::F64),
            Ty::array(HirId(18), i32_ty(), 3),
            Ty::array(HirId(19), i32_ty(), 4),
            Ty::array(HirId(20), Ty::infer(HirId(21)), 3),
            Ty::adt(HirId(22), "A", Vec::new()),
            Ty::adt(HirId(23), "B", Vec::new()),
            Ty::new(HirId(24), TyKind::Param(ParamType { symbol: "T".into() })),
            Ty::function(HirId(25), vec![("x".into(), i32_ty())], Ty::bool(HirId(26))),
        ]
    }

    #[test]
    fn test_combine_is_symmetric() {
        for a in samples() {
            for b in samples() {
                let ab = a.combine(&b);
                let ba = b.combine(&a);
                assert_eq!(ab.is_ok(), ba.is_ok(), "{} vs {}", a, b);
                if let (Ok(ab), Ok(ba)) = (ab, ba) {
                    assert_eq!(ab, ba, "{} vs {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_error_absorbs() {
        let err = Ty::error(HirId(9));
        assert!(err.combine(&i32_ty()).unwrap().is_error());
        assert!(Ty::bool(HirId(3)).combine(&err).unwrap().is_error());
    }

    #[test]
    fn test_infer_takes_concrete_type() {
        let resolved = Ty::infer(HirId(5)).combine(&i32_ty()).unwrap();
        assert_eq!(resolved, i32_ty());
        assert_eq!(resolved.get_ref(), HirId(1));
    }

    #[test]
    fn test_width_and_signedness_mismatch() {
        let err = i32_ty().combine(&Ty::int(HirId(2), IntKind::I64)).unwrap_err();
        assert_eq!(err.to_string(), "expected [i32] got [i64]");
        assert!(i32_ty().combine(&Ty::uint(HirId(2), UintKind::U32)).is_err());
        assert!(Ty::bool(HirId(2)).combine(&Ty::unit(HirId(3))).is_err());
    }

    #[test]
    fn test_array_combines_elements() {
        let a = Ty::array(HirId(30), Ty::infer(HirId(31)), 2);
        let b = Ty::array(HirId(32), i32_ty(), 2);
        let c = a.combine(&b).unwrap();
        assert_eq!(c, Ty::array(HirId(0), i32_ty(), 2));
        assert_eq!(c.get_ref(), HirId(30));

        let err = b.combine(&Ty::array(HirId(33), i32_ty(), 5)).unwrap_err();
        assert_eq!(err.to_string(), "expected [[i32; 2]] got [[i32; 5]]");
    }

    #[test]
    fn test_adt_identity() {
        let a = Ty::adt(HirId(40), "Point", Vec::new());
        assert_eq!(a.combine(&a.clone()).unwrap(), a);
        assert!(a.combine(&Ty::adt(HirId(41), "Point", Vec::new())).is_err());
    }
}
