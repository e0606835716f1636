//! Lowering of checked IR to a code generation backend

pub mod context;
mod expr;
mod item;
pub mod tyty;

pub use context::Context;
