//! Core domain entities
//!
//! Pure value types with no I/O or external dependencies.

mod rule;
pub mod result;

pub use rule::Rule;
