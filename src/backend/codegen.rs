//! Code generation backend abstraction
//!
//! The lowering pass drives a backend through this trait and never looks
//! inside the handles it gets back. A backend builds types, expressions,
//! statements and blocks on request and emits everything once the global
//! definitions are flushed.

use std::fmt::Debug;

use crate::hir::{ArithmeticOrLogicalOp, ComparisonOp, LazyBooleanOp};
use crate::utils::Result;

/// Code generation backend trait
pub trait Backend {
    type Type: Clone + Debug;
    type Expression: Clone + Debug;
    type Statement: Clone + Debug;
    type Block: Clone + Debug;
    type Function: Clone + PartialEq + Debug;
    type Variable: Clone + Debug;

    /// Backend name
    fn name(&self) -> &str;

    // types

    fn bool_type(&mut self) -> Self::Type;
    fn integer_type(&mut self, is_unsigned: bool, bits: u32) -> Self::Type;
    fn float_type(&mut self, bits: u32) -> Self::Type;
    /// Fixed-size array; `length` is an integer constant expression
    fn array_type(&mut self, element: &Self::Type, length: &Self::Expression) -> Self::Type;
    fn struct_type(&mut self, name: &str, fields: &[(String, Self::Type)]) -> Self::Type;
    /// `ret` is `None` for functions returning unit
    fn function_type(&mut self, params: &[(String, Self::Type)], ret: Option<&Self::Type>) -> Self::Type;

    // expressions

    fn integer_constant_expression(&mut self, ty: &Self::Type, value: i128) -> Self::Expression;
    fn float_constant_expression(&mut self, ty: &Self::Type, value: f64) -> Self::Expression;
    fn boolean_constant_expression(&mut self, value: bool) -> Self::Expression;
    fn unit_expression(&mut self) -> Self::Expression;
    /// Declare a named constant and get an expression referring to it
    fn named_constant_expression(
        &mut self,
        ty: &Self::Type,
        name: &str,
        value: Self::Expression,
    ) -> Self::Expression;
    fn var_expression(&mut self, var: &Self::Variable) -> Self::Expression;
    fn arithmetic_or_logical_expression(
        &mut self,
        op: ArithmeticOrLogicalOp,
        lhs: Self::Expression,
        rhs: Self::Expression,
    ) -> Self::Expression;
    fn comparison_expression(
        &mut self,
        op: ComparisonOp,
        lhs: Self::Expression,
        rhs: Self::Expression,
    ) -> Self::Expression;
    fn lazy_boolean_expression(
        &mut self,
        op: LazyBooleanOp,
        lhs: Self::Expression,
        rhs: Self::Expression,
    ) -> Self::Expression;
    fn call_expression(&mut self, func: &Self::Function, args: Vec<Self::Expression>) -> Self::Expression;
    fn array_index_expression(&mut self, array: Self::Expression, index: Self::Expression) -> Self::Expression;
    fn array_constructor_expression(&mut self, ty: &Self::Type, values: Vec<Self::Expression>) -> Self::Expression;
    /// Struct value with fields given in declaration order
    fn constructor_expression(&mut self, ty: &Self::Type, fields: Vec<Self::Expression>) -> Self::Expression;

    // functions and variables

    fn function(&mut self, name: &str, fntype: &Self::Type) -> Result<Self::Function>;
    fn parameter_variable(&mut self, func: &Self::Function, name: &str, ty: &Self::Type) -> Self::Variable;
    fn local_variable(&mut self, func: &Self::Function, name: &str, ty: &Self::Type) -> Self::Variable;
    fn global_variable(
        &mut self,
        name: &str,
        ty: &Self::Type,
        init: Self::Expression,
        mutable: bool,
    ) -> Self::Variable;
    fn function_set_body(&mut self, func: &Self::Function, body: &Self::Block) -> Result<()>;

    // blocks and statements

    fn block(&mut self, func: &Self::Function, enclosing: Option<&Self::Block>) -> Self::Block;
    fn block_add_statements(&mut self, block: &Self::Block, stmts: Vec<Self::Statement>);
    fn block_statement(&mut self, block: &Self::Block) -> Self::Statement;
    fn expression_statement(&mut self, expr: Self::Expression) -> Self::Statement;
    /// Declare `var`, optionally initialized
    fn init_statement(&mut self, var: &Self::Variable, init: Option<Self::Expression>) -> Self::Statement;
    fn assignment_statement(&mut self, lhs: Self::Expression, rhs: Self::Expression) -> Self::Statement;
    fn return_statement(&mut self, func: &Self::Function, value: Option<Self::Expression>) -> Self::Statement;
    fn if_statement(
        &mut self,
        condition: Self::Expression,
        then_block: &Self::Block,
        else_block: Option<&Self::Block>,
    ) -> Self::Statement;

    /// Emit every collected definition
    fn write_global_definitions(
        &mut self,
        types: &[Self::Type],
        constants: &[Self::Expression],
        functions: &[Self::Function],
        variables: &[Self::Variable],
    ) -> Result<()>;
}
