//! # Domain Invariants
//!
//! Rules that must hold before a transaction leaves the pipeline.

use super::entities::Transaction;
use super::errors::PreparationError;

/// Default reference-block look-back.
pub const DEFAULT_BLOCKS_BEHIND: u64 = 3;

/// Default expiration window in seconds.
pub const DEFAULT_EXPIRE_SECONDS: u32 = 300;

/// Only the lower 16 bits of the reference block number are carried.
pub const REF_BLOCK_NUM_MASK: u64 = 0xFFFF;

/// Invariant: a chain id already on the transaction is authoritative.
///
/// Comparison is exact; no normalization of case or whitespace.
pub fn invariant_chain_id_matches(provided: &str, fetched: &str) -> Result<(), PreparationError> {
    if provided != fetched {
        return Err(PreparationError::Mismatch {
            provided: provided.to_string(),
            fetched: fetched.to_string(),
        });
    }
    Ok(())
}

/// Invariant: a transaction is only packed once fully specified.
///
/// Checked independently of how the fields were filled in, since an
/// envelope may be requested without running the pipeline first.
pub fn invariant_submission_ready(tx: &Transaction) -> Result<(), PreparationError> {
    if tx.ref_block_num == 0 {
        return Err(incomplete("ref_block_num"));
    }
    if tx.ref_block_prefix == 0 {
        return Err(incomplete("ref_block_prefix"));
    }
    if tx.is_expiration_unset() {
        return Err(incomplete("expiration"));
    }
    if let Some(action) = tx.all_actions().find(|a| !a.is_encoded()) {
        return Err(incomplete(&format!(
            "encoded payload of action {}::{}",
            action.account, action.name
        )));
    }
    Ok(())
}

fn incomplete(field: &str) -> PreparationError {
    PreparationError::IncompleteTransaction {
        field: field.to_string(),
    }
}
