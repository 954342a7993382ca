//! # Algorithms Module
//!
//! Pure computations used by the pipeline:
//! - `tapos`: reference-block target and truncation
//! - `packing`: binary transaction layout
//! - `digest`: transaction id and signing digest

pub mod digest;
pub mod packing;
pub mod tapos;

pub use digest::{signing_digest, transaction_id};
pub use packing::{pack_transaction, PackWriter};
pub use tapos::{reference_block_target, truncate_ref_block_num};
