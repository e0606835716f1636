//! Type model and unification

mod combine;
mod type_system;

pub use combine::TypeError;
pub use type_system::*;
