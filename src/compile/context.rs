//! Lowering context
//!
//! Carries the state of one lowering run: caches from IR identities to the
//! backend entities built for them, the stack of open blocks with their
//! pending statements, the stack of function activations and the global
//! declarations waiting to be flushed to the backend.

use std::collections::HashMap;
use std::fmt;

use crate::backend::Backend;
use crate::hir::{HirId, Mappings};
use crate::resolve::Resolver;
use crate::typeck::TypeCheckContext;
use crate::utils::{Error, Result};

use super::tyty;

/// The function being lowered, with the variable that holds its result
pub struct FnActivation<B: Backend> {
    pub func: B::Function,
    pub ret_slot: Option<B::Variable>,
}

impl<B: Backend> Clone for FnActivation<B> {
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
            ret_slot: self.ret_slot.clone(),
        }
    }
}

impl<B: Backend> fmt::Debug for FnActivation<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnActivation")
            .field("func", &self.func)
            .field("ret_slot", &self.ret_slot)
            .finish()
    }
}

pub struct Context<'a, B: Backend> {
    backend: &'a mut B,
    resolver: &'a Resolver,
    tyctx: &'a TypeCheckContext,
    mappings: &'a Mappings,

    fn_stack: Vec<FnActivation<B>>,
    compiled_type_mappings: HashMap<HirId, B::Type>,
    compiled_fn_decls: HashMap<HirId, B::Function>,
    compiled_var_decls: HashMap<HirId, B::Variable>,
    compiled_consts: HashMap<HirId, B::Expression>,

    scope_stack: Vec<B::Block>,
    /// Pending statements of each open block, parallel to `scope_stack`
    statements: Vec<Vec<B::Statement>>,

    // global declarations, in declaration order
    type_decls: Vec<B::Type>,
    const_decls: Vec<B::Expression>,
    func_decls: Vec<B::Function>,
    var_decls: Vec<B::Variable>,
}

impl<'a, B: Backend> Context<'a, B> {
    /// Create a context with every builtin primitive already materialized
    pub fn new(
        backend: &'a mut B,
        resolver: &'a Resolver,
        tyctx: &'a TypeCheckContext,
        mappings: &'a Mappings,
    ) -> Result<Self> {
        let mut ctx = Self {
            backend,
            resolver,
            tyctx,
            mappings,
            fn_stack: Vec::new(),
            compiled_type_mappings: HashMap::new(),
            compiled_fn_decls: HashMap::new(),
            compiled_var_decls: HashMap::new(),
            compiled_consts: HashMap::new(),
            scope_stack: Vec::new(),
            statements: Vec::new(),
            type_decls: Vec::new(),
            const_decls: Vec::new(),
            func_decls: Vec::new(),
            var_decls: Vec::new(),
        };

        for builtin in resolver.builtin_types() {
            let id = tyctx.lookup_type_by_node_id(builtin.node_id).ok_or_else(|| {
                Error::internal(format!("builtin {} has no type identity", builtin.name))
            })?;
            let ty = tyctx
                .lookup_type(id)
                .ok_or_else(|| Error::internal(format!("builtin {} has no type", builtin.name)))?;
            let compiled = tyty::compile_builtin(&mut *ctx.backend, &ty)?;
            ctx.insert_compiled_type(id, compiled);
        }

        Ok(ctx)
    }

    pub fn backend(&mut self) -> &mut B {
        &mut *self.backend
    }

    pub fn resolver(&self) -> &'a Resolver {
        self.resolver
    }

    pub fn tyctx(&self) -> &'a TypeCheckContext {
        self.tyctx
    }

    pub fn mappings(&self) -> &'a Mappings {
        self.mappings
    }

    // caches

    pub fn lookup_compiled_type(&self, id: HirId) -> Option<&B::Type> {
        self.compiled_type_mappings.get(&id)
    }

    pub fn insert_compiled_type(&mut self, id: HirId, ty: B::Type) {
        self.compiled_type_mappings.insert(id, ty);
    }

    pub fn lookup_function_decl(&self, id: HirId) -> Option<&B::Function> {
        self.compiled_fn_decls.get(&id)
    }

    pub fn insert_function_decl(&mut self, id: HirId, func: B::Function) {
        self.compiled_fn_decls.insert(id, func);
    }

    pub fn lookup_var_decl(&self, id: HirId) -> Option<&B::Variable> {
        self.compiled_var_decls.get(&id)
    }

    pub fn insert_var_decl(&mut self, id: HirId, var: B::Variable) {
        self.compiled_var_decls.insert(id, var);
    }

    pub fn lookup_const_decl(&self, id: HirId) -> Option<&B::Expression> {
        self.compiled_consts.get(&id)
    }

    pub fn insert_const_decl(&mut self, id: HirId, expr: B::Expression) {
        self.compiled_consts.insert(id, expr);
    }

    // blocks

    /// Open `scope`; statements added from now on belong to it
    pub fn push_block(&mut self, scope: B::Block) {
        log::trace!("push block (depth {})", self.scope_stack.len() + 1);
        self.scope_stack.push(scope);
        self.statements.push(Vec::new());
    }

    /// Close the innermost block, attaching its pending statements
    pub fn pop_block(&mut self) -> Result<B::Block> {
        let (Some(block), Some(stmts)) = (self.scope_stack.pop(), self.statements.pop()) else {
            return Err(Error::internal("pop_block with no open block"));
        };
        log::trace!("pop block with {} statements", stmts.len());
        self.backend.block_add_statements(&block, stmts);
        Ok(block)
    }

    pub fn add_statement(&mut self, stmt: B::Statement) -> Result<()> {
        self.statements
            .last_mut()
            .ok_or_else(|| Error::internal("statement added with no open block"))?
            .push(stmt);
        Ok(())
    }

    /// Innermost open block, if any
    pub fn peek_enclosing_scope(&self) -> Option<&B::Block> {
        self.scope_stack.last()
    }

    // function activations

    pub fn push_fn(&mut self, func: B::Function, ret_slot: Option<B::Variable>) {
        log::debug!("enter function {:?}", func);
        self.fn_stack.push(FnActivation { func, ret_slot });
    }

    pub fn pop_fn(&mut self) -> Result<FnActivation<B>> {
        self.fn_stack
            .pop()
            .ok_or_else(|| Error::internal("pop_fn with no active function"))
    }

    pub fn peek_fn(&self) -> Result<&FnActivation<B>> {
        self.fn_stack
            .last()
            .ok_or_else(|| Error::internal("peek_fn with no active function"))
    }

    // global declarations

    pub fn push_type(&mut self, ty: B::Type) {
        self.type_decls.push(ty);
    }

    pub fn push_const(&mut self, expr: B::Expression) {
        self.const_decls.push(expr);
    }

    pub fn push_function(&mut self, func: B::Function) {
        self.func_decls.push(func);
    }

    pub fn push_var(&mut self, var: B::Variable) {
        self.var_decls.push(var);
    }

    /// Whether `func` was already emitted
    pub fn function_completed(&self, func: &B::Function) -> bool {
        self.func_decls.iter().any(|f| f == func)
    }

    /// Hand every collected declaration to the backend in one batch
    pub fn write_to_backend(&mut self) -> Result<()> {
        log::debug!(
            "flushing {} types, {} constants, {} functions, {} variables to the {} backend",
            self.type_decls.len(),
            self.const_decls.len(),
            self.func_decls.len(),
            self.var_decls.len(),
            self.backend.name()
        );
        self.backend.write_global_definitions(
            &self.type_decls,
            &self.const_decls,
            &self.func_decls,
            &self.var_decls,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::c::CType;
    use crate::backend::CBackend;
    use pretty_assertions::assert_eq;

    struct Env {
        mappings: Mappings,
        resolver: Resolver,
        tyctx: TypeCheckContext,
        backend: CBackend,
    }

    fn env() -> Env {
        let mut mappings = Mappings::new();
        let resolver = Resolver::new(&mut mappings);
        let tyctx = TypeCheckContext::new(&resolver, &mut mappings);
        Env {
            mappings,
            resolver,
            tyctx,
            backend: CBackend::new("x86_64-unknown-linux-gnu"),
        }
    }

    fn context(env: &mut Env) -> Context<'_, CBackend> {
        Context::new(&mut env.backend, &env.resolver, &env.tyctx, &env.mappings).unwrap()
    }

    #[test]
    fn test_builtins_are_materialized() {
        let mut env = env();
        let ctx = context(&mut env);

        for builtin in ctx.resolver().builtin_types() {
            let id = ctx.tyctx().lookup_type_by_node_id(builtin.node_id).unwrap();
            assert!(ctx.lookup_compiled_type(id).is_some(), "{}", builtin.name);
        }

        let u16_node = ctx.resolver().lookup_builtin_type("u16").unwrap();
        let u16_id = ctx.tyctx().lookup_type_by_node_id(u16_node).unwrap();
        assert_eq!(ctx.lookup_compiled_type(u16_id), Some(&CType::Named("uint16_t".into())));
    }

    #[test]
    fn test_scope_stack_balance() {
        let mut env = env();
        let mut ctx = context(&mut env);
        let fntype = ctx.backend().function_type(&[], None);
        let func = ctx.backend().function("f", &fntype).unwrap();

        let outer = ctx.backend().block(&func, None);
        ctx.push_block(outer);
        let first = ctx.backend().expression_statement("first()".into());
        ctx.add_statement(first).unwrap();

        let inner = ctx.backend().block(&func, Some(&outer));
        ctx.push_block(inner);
        let second = ctx.backend().expression_statement("second()".into());
        ctx.add_statement(second).unwrap();
        let third = ctx.backend().expression_statement("third()".into());
        ctx.add_statement(third).unwrap();
        assert_eq!(ctx.peek_enclosing_scope(), Some(&inner));

        assert_eq!(ctx.pop_block().unwrap(), inner);
        assert_eq!(ctx.peek_enclosing_scope(), Some(&outer));
        // statements after the inner block land back in the outer one
        let nested = ctx.backend().block_statement(&inner);
        ctx.add_statement(nested).unwrap();
        let fourth = ctx.backend().expression_statement("fourth()".into());
        ctx.add_statement(fourth).unwrap();

        assert_eq!(ctx.pop_block().unwrap(), outer);
        assert_eq!(ctx.peek_enclosing_scope(), None);
        ctx.backend().function_set_body(&func, &outer).unwrap();
        ctx.push_function(func);
        ctx.write_to_backend().unwrap();
        drop(ctx);

        let source = env.backend.source();
        assert!(
            source.contains(
                "void f(void) {\n    first();\n    {\n        second();\n        third();\n    }\n    fourth();\n}"
            ),
            "{}",
            source
        );
    }

    #[test]
    fn test_empty_stacks_are_internal_errors() {
        let mut env = env();
        let mut ctx = context(&mut env);

        assert!(ctx.pop_block().unwrap_err().is_internal());
        assert!(ctx.pop_fn().unwrap_err().is_internal());
        assert!(ctx.peek_fn().is_err());
        let stmt = ctx.backend().assignment_statement("a".into(), "b".into());
        assert!(ctx.add_statement(stmt).unwrap_err().is_internal());
    }

    #[test]
    fn test_function_completed() {
        let mut env = env();
        let mut ctx = context(&mut env);
        let fntype = ctx.backend().function_type(&[], None);
        let f = ctx.backend().function("f", &fntype).unwrap();
        let g = ctx.backend().function("g", &fntype).unwrap();

        ctx.push_fn(f, None);
        assert_eq!(ctx.peek_fn().unwrap().func, f);
        let done = ctx.pop_fn().unwrap();
        ctx.push_function(done.func);

        assert!(ctx.function_completed(&f));
        assert!(!ctx.function_completed(&g));
    }
}
