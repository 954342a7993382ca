//! # Domain Module
//!
//! Core domain types for transaction preparation.

pub mod abi;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use abi::*;
pub use entities::*;
pub use envelope::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
