//! Materializing checked types as backend types

use crate::backend::Backend;
use crate::types::{Ty, TyKind};
use crate::utils::{Error, Result};

use super::Context;

/// Build a primitive directly. Only used to seed the compiled-type cache.
pub fn compile_builtin<B: Backend>(backend: &mut B, ty: &Ty) -> Result<B::Type> {
    match ty.kind() {
        TyKind::Bool => Ok(backend.bool_type()),
        TyKind::Int(kind) => Ok(backend.integer_type(false, kind.bits())),
        TyKind::Uint(kind) => Ok(backend.integer_type(true, kind.bits())),
        TyKind::Float(kind) => Ok(backend.float_type(kind.bits())),
        _ => Err(Error::internal(format!("{} is not a builtin type", ty))),
    }
}

/// Get the backend type for `ty`.
///
/// Nominal types and primitives must already be in the cache. Arrays are
/// built from their element type with the capacity as an `i32` constant.
pub fn compile<B: Backend>(ctx: &mut Context<'_, B>, ty: &Ty) -> Result<B::Type> {
    match ty.kind() {
        TyKind::Adt(_) | TyKind::Bool | TyKind::Int(_) | TyKind::Uint(_) | TyKind::Float(_) => ctx
            .lookup_compiled_type(ty.get_ref())
            .cloned()
            .ok_or_else(|| Error::internal(format!("type {} ({}) was never compiled", ty, ty.get_ref()))),

        TyKind::Array(array) => {
            let element = compile(ctx, &array.element)?;
            let backend = ctx.backend();
            let capacity_ty = backend.integer_type(false, 32);
            let length = backend.integer_constant_expression(&capacity_ty, array.capacity as i128);
            Ok(backend.array_type(&element, &length))
        }

        TyKind::Error
        | TyKind::Unit
        | TyKind::Infer
        | TyKind::Fn(_)
        | TyKind::StructField(_)
        | TyKind::Param(_) => Err(Error::internal(format!("cannot compile type {}", ty))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::c::CType;
    use crate::backend::CBackend;
    use crate::hir::{HirId, Mappings};
    use crate::resolve::Resolver;
    use crate::typeck::TypeCheckContext;
    use crate::types::FloatKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_array_of_builtin() {
        let mut mappings = Mappings::new();
        let resolver = Resolver::new(&mut mappings);
        let tyctx = TypeCheckContext::new(&resolver, &mut mappings);
        let mut backend = CBackend::new("x86_64-unknown-linux-gnu");
        let mut ctx = Context::new(&mut backend, &resolver, &tyctx, &mappings).unwrap();

        let f64_ty = tyctx.lookup_builtin("f64").unwrap();
        let array = Ty::array(HirId(500), f64_ty, 4);
        assert_eq!(compile(&mut ctx, &array).unwrap(), CType::Named("__array_0".into()));
        // a second array of the same shape reuses the type
        assert_eq!(compile(&mut ctx, &array).unwrap(), CType::Named("__array_0".into()));
    }

    #[test]
    fn test_uncached_and_unsupported_types() {
        let mut mappings = Mappings::new();
        let resolver = Resolver::new(&mut mappings);
        let tyctx = TypeCheckContext::new(&resolver, &mut mappings);
        let mut backend = CBackend::new("x86_64-unknown-linux-gnu");
        let mut ctx = Context::new(&mut backend, &resolver, &tyctx, &mappings).unwrap();

        let stray = Ty::float(HirId(900), FloatKind::F32);
        assert!(compile(&mut ctx, &stray).unwrap_err().is_internal());
        assert!(compile(&mut ctx, &Ty::unit(HirId(1))).unwrap_err().is_internal());
        assert!(compile(&mut ctx, &Ty::infer(HirId(2))).unwrap_err().is_internal());
        let point = Ty::adt(HirId(901), "Point", Vec::new());
        assert!(compile(&mut ctx, &point).unwrap_err().is_internal());
    }
}
