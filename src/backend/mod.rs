//! Backend module - Code generation

pub mod codegen;

// C Backend (always available)
pub mod c;

pub use c::CBackend;
pub use codegen::Backend;
