//! Lowering of items
//!
//! Structs are lowered first, then constants and statics, then every function
//! signature, and only then function bodies, so any body can call any
//! function of the crate.

use crate::backend::Backend;
use crate::hir::{ConstantItem, Crate, Function, Item, ItemKind, StaticItem, StructItem};
use crate::types::Ty;
use crate::utils::{Error, Result};

use super::{tyty, Context};

impl<B: Backend> Context<'_, B> {
    /// Lower every item of a checked crate and flush the result to the backend
    pub fn compile_crate(&mut self, krate: &Crate) -> Result<()> {
        log::info!("lowering {} items", krate.items.len());

        for item in &krate.items {
            if let ItemKind::Struct(s) = &item.kind {
                self.compile_struct(item, s)?;
            }
        }
        for item in &krate.items {
            match &item.kind {
                ItemKind::Constant(c) => self.compile_constant(item, c)?,
                ItemKind::Static(s) => self.compile_static(item, s)?,
                _ => {}
            }
        }
        for item in &krate.items {
            if let ItemKind::Function(func) = &item.kind {
                self.declare_function(item, func)?;
            }
        }
        for item in &krate.items {
            if let ItemKind::Function(func) = &item.kind {
                self.compile_function(item, func)?;
            }
        }

        self.write_to_backend()
    }

    fn item_type(&self, item: &Item) -> Result<Ty> {
        self.tyctx()
            .lookup_type(item.mappings.hir_id)
            .ok_or_else(|| Error::internal(format!("item {} was not type checked", item.name())))
    }

    fn compile_struct(&mut self, item: &Item, s: &StructItem) -> Result<()> {
        let ty = self.item_type(item)?;
        let adt = ty
            .as_adt()
            .ok_or_else(|| Error::internal(format!("struct {} has type {}", s.name, ty)))?;

        let mut fields = Vec::with_capacity(adt.fields.len());
        for field in &adt.fields {
            fields.push((field.name.clone(), tyty::compile(self, &field.ty)?));
        }

        let compiled = self.backend().struct_type(&s.name, &fields);
        self.insert_compiled_type(item.mappings.hir_id, compiled.clone());
        self.push_type(compiled);
        Ok(())
    }

    fn compile_constant(&mut self, item: &Item, c: &ConstantItem) -> Result<()> {
        let ty = self.item_type(item)?;
        let compiled = tyty::compile(self, &ty)?;
        let value = self.compile_expr(&c.expr)?;

        let expr = self.backend().named_constant_expression(&compiled, &c.name, value);
        self.insert_const_decl(item.mappings.hir_id, expr.clone());
        self.push_const(expr);
        Ok(())
    }

    fn compile_static(&mut self, item: &Item, s: &StaticItem) -> Result<()> {
        let ty = self.item_type(item)?;
        let compiled = tyty::compile(self, &ty)?;
        let init = self.compile_expr(&s.expr)?;

        let var = self.backend().global_variable(&s.name, &compiled, init, s.mutable);
        self.insert_var_decl(item.mappings.hir_id, var.clone());
        self.push_var(var);
        Ok(())
    }

    fn declare_function(&mut self, item: &Item, func: &Function) -> Result<()> {
        let ty = self.item_type(item)?;
        let fn_ty = ty
            .as_fn()
            .ok_or_else(|| Error::internal(format!("function {} has type {}", func.name, ty)))?;

        let mut params = Vec::with_capacity(fn_ty.params.len());
        for (name, param_ty) in &fn_ty.params {
            params.push((name.clone(), tyty::compile(self, param_ty)?));
        }
        let ret = if fn_ty.ret.is_unit() {
            None
        } else {
            Some(tyty::compile(self, &fn_ty.ret)?)
        };

        let backend = self.backend();
        let fntype = backend.function_type(&params, ret.as_ref());
        let decl = backend.function(&func.name, &fntype)?;
        self.insert_function_decl(item.mappings.hir_id, decl);
        Ok(())
    }

    fn compile_function(&mut self, item: &Item, func: &Function) -> Result<()> {
        let decl = self
            .lookup_function_decl(item.mappings.hir_id)
            .cloned()
            .ok_or_else(|| Error::internal(format!("function {} was not declared", func.name)))?;
        if self.function_completed(&decl) {
            return Ok(());
        }

        let ty = self.item_type(item)?;
        let fn_ty = ty
            .as_fn()
            .ok_or_else(|| Error::internal(format!("function {} has type {}", func.name, ty)))?;

        for (param, (_, param_ty)) in func.params.iter().zip(&fn_ty.params) {
            let compiled = tyty::compile(self, param_ty)?;
            let var = self.backend().parameter_variable(&decl, &param.pattern.name, &compiled);
            self.insert_var_decl(param.mappings.hir_id, var);
        }

        let body = self.backend().block(&decl, None);
        self.push_block(body);

        // non-unit functions return through a slot holding the tail value
        let ret_slot = if fn_ty.ret.is_unit() {
            None
        } else {
            let compiled = tyty::compile(self, &fn_ty.ret)?;
            let backend = self.backend();
            let slot = backend.local_variable(&decl, "__ret", &compiled);
            let init = backend.init_statement(&slot, None);
            self.add_statement(init)?;
            Some(slot)
        };
        self.push_fn(decl.clone(), ret_slot.clone());

        let block = func
            .body
            .as_block()
            .ok_or_else(|| Error::internal(format!("body of {} is not a block", func.name)))?;
        let tail = self.compile_block_contents(block)?;

        match (tail, ret_slot) {
            (Some(value), Some(slot)) => {
                let backend = self.backend();
                let target = backend.var_expression(&slot);
                let assign = backend.assignment_statement(target, value);
                let result = backend.var_expression(&slot);
                let ret = backend.return_statement(&decl, Some(result));
                self.add_statement(assign)?;
                self.add_statement(ret)?;
            }
            (Some(value), None) => {
                let stmt = self.backend().expression_statement(value);
                self.add_statement(stmt)?;
            }
            (None, _) => {}
        }

        self.pop_fn()?;
        let body = self.pop_block()?;
        self.backend().function_set_body(&decl, &body)?;
        self.push_function(decl);
        log::debug!("lowered function {}", func.name);
        Ok(())
    }
}
