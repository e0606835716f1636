//! C Backend - Generate C source from the lowered program
//!
//! The output can be compiled with any C99 compiler.

mod c_codegen;

pub use c_codegen::{BlockId, CBackend, CStmt, CType, FunctionId, VarId};
