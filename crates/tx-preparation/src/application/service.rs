//! # Transaction Preparer
//!
//! Application service sequencing the preparation stages:
//!
//! 1. expiration
//! 2. reference block ([`ReferenceBlockResolver`])
//! 3. interfaces ([`InterfaceResolver`])
//! 4. action encoding ([`ActionEncoding`])
//!
//! followed on request by the completeness check, packing and signing.
//! Each stage skips work whose output is already on the transaction, so
//! re-running after a failure only redoes what is still missing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use super::encoding::ActionEncoding;
use super::interface_resolver::InterfaceResolver;
use super::tapos_resolver::ReferenceBlockResolver;
use crate::algorithms::{pack_transaction, signing_digest, transaction_id};
use crate::config::PreparationConfig;
use crate::domain::{
    invariant_submission_ready, PreparationError, ProviderError, SubmissionEnvelope, Transaction,
};
use crate::ports::{
    ActionEncoder, ChainProvider, InterfaceProvider, SignatureProvider, SigningRequest,
    TransactionPreparationApi,
};

/// Transaction Preparer - drives a transaction to submission-ready.
///
/// Every collaborator is optional; a stage that needs a missing one fails
/// with [`PreparationError::Configuration`] only when it has work to do.
#[derive(Clone, Default)]
pub struct TransactionPreparer {
    /// Configuration.
    config: PreparationConfig,
    /// Chain node.
    chain: Option<Arc<dyn ChainProvider>>,
    /// ABI source. Built from `chain` on demand when absent.
    interfaces: Option<Arc<dyn InterfaceProvider>>,
    /// Action data encoder.
    encoder: Option<Arc<dyn ActionEncoder>>,
    /// Signer.
    signer: Option<Arc<dyn SignatureProvider>>,
}

impl TransactionPreparer {
    /// Create a preparer with no collaborators.
    pub fn new(config: PreparationConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Set the chain provider.
    pub fn with_chain_provider(mut self, chain: Arc<dyn ChainProvider>) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Set the interface provider.
    pub fn with_interface_provider(mut self, interfaces: Arc<dyn InterfaceProvider>) -> Self {
        self.interfaces = Some(interfaces);
        self
    }

    /// Set the action encoder.
    pub fn with_encoder(mut self, encoder: Arc<dyn ActionEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Set the signer.
    pub fn with_signer(mut self, signer: Arc<dyn SignatureProvider>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &PreparationConfig {
        &self.config
    }

    /// Empty transaction carrying the configured reference-block policy.
    pub fn new_transaction(&self) -> Transaction {
        Transaction::new().with_tapos_config(self.config.tapos)
    }

    fn tapos_resolver(&self) -> ReferenceBlockResolver<'_> {
        ReferenceBlockResolver::new(self.chain.as_deref())
    }

    fn interface_resolver(&self) -> InterfaceResolver<'_> {
        InterfaceResolver::new(self.interfaces.as_deref(), self.chain.as_ref())
            .with_fetch_concurrency(self.config.abi_fetch_concurrency)
    }

    fn action_encoding(&self) -> ActionEncoding<'_> {
        ActionEncoding::new(self.encoder.as_deref())
    }

    fn pack(&self, tx: &Transaction) -> Result<Vec<u8>, PreparationError> {
        match &self.encoder {
            Some(encoder) => encoder.encode_transaction(tx),
            None => pack_transaction(tx),
        }
    }

    /// Keys to sign with: all the signer holds, or `required_keys` if every
    /// one of them is held.
    async fn select_keys(
        signer: &dyn SignatureProvider,
        required_keys: &[String],
    ) -> Result<Vec<String>, PreparationError> {
        let available = signer.available_keys().await?;
        if required_keys.is_empty() {
            if available.is_empty() {
                return Err(ProviderError::KeyNotFound("signer holds no keys".to_string()).into());
            }
            return Ok(available);
        }

        if let Some(key) = required_keys.iter().find(|k| !available.contains(*k)) {
            return Err(ProviderError::KeyNotFound(key.clone()).into());
        }
        Ok(required_keys.to_vec())
    }
}

#[async_trait]
impl TransactionPreparationApi for TransactionPreparer {
    fn calculate_expiration(&self, tx: &mut Transaction) {
        tx.calculate_expiration(Utc::now());
    }

    async fn resolve_tapos(&self, tx: &mut Transaction) -> Result<(), PreparationError> {
        self.tapos_resolver().resolve(tx).await
    }

    async fn resolve_interfaces(&self, tx: &mut Transaction) -> Result<(), PreparationError> {
        self.interface_resolver().resolve(tx).await
    }

    async fn encode_actions(&self, tx: &mut Transaction) -> Result<(), PreparationError> {
        self.action_encoding().encode_pending(tx).await
    }

    async fn prepare(&self, tx: &mut Transaction) -> Result<(), PreparationError> {
        tx.tapos_config.validate()?;
        debug!(
            "[txp] Preparing transaction with {} action(s)",
            tx.context_free_actions.len() + tx.actions.len()
        );

        self.calculate_expiration(tx);
        self.resolve_tapos(tx).await?;
        self.resolve_interfaces(tx).await?;
        self.encode_actions(tx).await?;
        Ok(())
    }

    fn to_submission_envelope(
        &self,
        tx: &Transaction,
    ) -> Result<SubmissionEnvelope, PreparationError> {
        invariant_submission_ready(tx)?;
        let packed = self.pack(tx)?;

        info!(
            "[txp] Transaction {} ready ({} bytes)",
            transaction_id(&packed),
            packed.len()
        );
        Ok(SubmissionEnvelope::new(&packed))
    }

    async fn prepare_submission_envelope(
        &self,
        tx: &mut Transaction,
    ) -> Result<SubmissionEnvelope, PreparationError> {
        self.prepare(tx).await?;
        self.to_submission_envelope(tx)
    }

    async fn sign_envelope(
        &self,
        tx: &Transaction,
        envelope: &mut SubmissionEnvelope,
        required_keys: &[String],
    ) -> Result<(), PreparationError> {
        let signer = self.signer.as_deref().ok_or_else(|| {
            PreparationError::Configuration("a signature provider is required to sign".to_string())
        })?;
        if tx.chain_id.is_empty() {
            return Err(PreparationError::Configuration(
                "chain id must be resolved before signing".to_string(),
            ));
        }

        let packed_trx = envelope.packed_bytes()?;
        let digest = signing_digest(&tx.chain_id, &packed_trx, &envelope.context_free_bytes()?)?;
        let keys = Self::select_keys(signer, required_keys).await?;

        let signatures = signer
            .sign(&SigningRequest {
                chain_id: tx.chain_id.clone(),
                digest,
                packed_trx,
                required_keys: keys,
            })
            .await?;
        if signatures.is_empty() {
            return Err(
                ProviderError::KeyNotFound("signer returned no signatures".to_string()).into(),
            );
        }

        debug!("[txp] Attached {} signature(s)", signatures.len());
        envelope.signatures.extend(signatures);
        Ok(())
    }
}
