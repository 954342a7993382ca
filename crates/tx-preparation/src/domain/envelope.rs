//! # Submission Envelope
//!
//! Body of a push-transaction call: the packed transaction plus signatures.

use super::errors::PreparationError;
use crate::algorithms::transaction_id;
use serde::{Deserialize, Serialize};

/// Packed, signable transaction ready for submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEnvelope {
    /// Signatures over the signing digest, filled in after preparation.
    pub signatures: Vec<String>,
    /// Compression of `packed_trx`; always 0 (none).
    pub compression: u8,
    /// Packed context-free data, hex.
    pub packed_context_free_data: String,
    /// Packed transaction body, hex.
    pub packed_trx: String,
}

impl SubmissionEnvelope {
    /// Wrap a packed transaction body.
    pub fn new(packed_trx: &[u8]) -> Self {
        Self {
            signatures: Vec::new(),
            compression: 0,
            packed_context_free_data: String::new(),
            packed_trx: hex::encode(packed_trx),
        }
    }

    /// Packed body as bytes.
    pub fn packed_bytes(&self) -> Result<Vec<u8>, PreparationError> {
        hex::decode(&self.packed_trx)
            .map_err(|e| PreparationError::Parse(format!("packed_trx is not hex: {}", e)))
    }

    /// Packed context-free data as bytes.
    pub fn context_free_bytes(&self) -> Result<Vec<u8>, PreparationError> {
        hex::decode(&self.packed_context_free_data).map_err(|e| {
            PreparationError::Parse(format!("packed_context_free_data is not hex: {}", e))
        })
    }

    /// Id the ledger will assign to this transaction.
    pub fn transaction_id(&self) -> Result<String, PreparationError> {
        Ok(transaction_id(&self.packed_bytes()?))
    }

    /// Whether any signature has been attached.
    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }
}
