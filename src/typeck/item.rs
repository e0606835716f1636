//! Item signatures and bodies
//!
//! Checking runs in two passes. The first records a type for every item
//! signature, so calls and struct literals may refer to items declared later
//! in the crate; the second checks function bodies and initializers.

use crate::hir::{Crate, Expr, Function, Item, ItemKind, StructItem};
use crate::types::{StructFieldType, Ty, TyKind};
use crate::utils::{Error, Result};

use super::TypeChecker;

impl TypeChecker<'_> {
    pub fn check_crate(&mut self, krate: &Crate) -> Result<()> {
        log::info!("type checking {} items", krate.items.len());

        // struct types first so any signature can name them
        let (structs, others): (Vec<&Item>, Vec<&Item>) = krate
            .items
            .iter()
            .partition(|item| matches!(item.kind, ItemKind::Struct(_)));
        for item in structs.into_iter().chain(others) {
            self.resolve_item_signature(item);
        }
        for item in &krate.items {
            self.check_item(item)?;
        }
        Ok(())
    }

    fn resolve_item_signature(&mut self, item: &Item) {
        let id = item.mappings.hir_id;
        let ty = match &item.kind {
            ItemKind::Function(func) => self.resolve_fn_signature(item, func),
            ItemKind::Struct(s) => self.resolve_struct_signature(item, s),
            ItemKind::Constant(c) => self.resolve_type(&c.ty),
            ItemKind::Static(s) => self.resolve_type(&s.ty),
        };
        self.context.insert_type(id, ty);
    }

    fn resolve_fn_signature(&mut self, item: &Item, func: &Function) -> Ty {
        let mut params = Vec::with_capacity(func.params.len());
        for param in &func.params {
            let ty = self.resolve_type(&param.ty);
            self.context.insert_type(param.mappings.hir_id, ty.clone());
            self.context.insert_type(param.pattern.mappings.hir_id, ty.clone());
            params.push((param.pattern.name.clone(), ty));
        }

        let ret = match &func.return_type {
            Some(ty) => self.resolve_type(ty),
            None => Ty::unit(item.mappings.hir_id),
        };
        Ty::function(item.mappings.hir_id, params, ret)
    }

    fn resolve_struct_signature(&mut self, item: &Item, s: &StructItem) -> Ty {
        let mut fields = Vec::with_capacity(s.fields.len());
        for field in &s.fields {
            let field_ty = StructFieldType {
                name: field.name.clone(),
                ty: Box::new(self.resolve_type(&field.ty)),
            };
            let field_id = field.mappings.hir_id;
            self.context
                .insert_type(field_id, Ty::new(field_id, TyKind::StructField(field_ty.clone())));
            fields.push(field_ty);
        }
        Ty::adt(item.mappings.hir_id, s.name.clone(), fields)
    }

    fn check_item(&mut self, item: &Item) -> Result<()> {
        match &item.kind {
            ItemKind::Function(func) => self.check_function(item, func),
            ItemKind::Struct(_) => Ok(()),
            ItemKind::Constant(c) => self.check_initializer(item, &c.expr),
            ItemKind::Static(s) => self.check_initializer(item, &s.expr),
        }
    }

    fn check_function(&mut self, item: &Item, func: &Function) -> Result<()> {
        let ret = self
            .context
            .lookup_type(item.mappings.hir_id)
            .and_then(|ty| ty.as_fn().map(|f| (*f.ret).clone()))
            .ok_or_else(|| Error::internal(format!("function {} has no signature", func.name)))?;

        log::debug!("checking body of {}", func.name);
        self.context.push_return_type(ret.clone());
        let body_ty = self.resolve_expr(&func.body, true);
        self.context.pop_return_type();
        let body_ty = body_ty?;

        // the tail value is the returned value
        let tail = func.body.as_block().and_then(|b| b.tail.as_deref());
        if let (Some(tail), Some(body_ty)) = (tail, body_ty) {
            self.combine_or_report(&ret, &body_ty, tail.locus);
        }
        Ok(())
    }

    fn check_initializer(&mut self, item: &Item, init: &Expr) -> Result<()> {
        let expected = self
            .context
            .lookup_type(item.mappings.hir_id)
            .ok_or_else(|| Error::internal(format!("item {} has no type", item.name())))?;

        if let Some(init_ty) = self.resolve_expr(init, false)? {
            self.combine_or_report(&expected, &init_ty, init.locus);
        }
        Ok(())
    }
}
