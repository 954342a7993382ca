//! # Inbound Ports
//!
//! API trait defining what the preparation service can do.

use async_trait::async_trait;
use crate::domain::{PreparationError, SubmissionEnvelope, Transaction};

/// Transaction preparation API - inbound port.
///
/// Every operation takes the transaction by reference; the caller owns it
/// and drives one preparation at a time.
#[async_trait]
pub trait TransactionPreparationApi: Send + Sync {
    /// Set a fresh expiration if the current one is unset or past.
    fn calculate_expiration(&self, tx: &mut Transaction);

    /// Fill in chain id and reference-block fields.
    async fn resolve_tapos(&self, tx: &mut Transaction) -> Result<(), PreparationError>;

    /// Fetch ABIs for every action account not yet cached.
    async fn resolve_interfaces(&self, tx: &mut Transaction) -> Result<(), PreparationError>;

    /// Encode every action that has no payload yet, using cached ABIs only.
    async fn encode_actions(&self, tx: &mut Transaction) -> Result<(), PreparationError>;

    /// Run expiration, reference block, interfaces and encoding in order.
    async fn prepare(&self, tx: &mut Transaction) -> Result<(), PreparationError>;

    /// Check completeness and pack the transaction. No network access.
    fn to_submission_envelope(&self, tx: &Transaction)
        -> Result<SubmissionEnvelope, PreparationError>;

    /// [`prepare`](Self::prepare) followed by
    /// [`to_submission_envelope`](Self::to_submission_envelope).
    async fn prepare_submission_envelope(
        &self,
        tx: &mut Transaction,
    ) -> Result<SubmissionEnvelope, PreparationError>;

    /// Sign the envelope with the configured signer and append the signatures.
    ///
    /// `required_keys` narrows the keys used; empty means all the signer holds.
    async fn sign_envelope(
        &self,
        tx: &Transaction,
        envelope: &mut SubmissionEnvelope,
        required_keys: &[String],
    ) -> Result<(), PreparationError>;
}
