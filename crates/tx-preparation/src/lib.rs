//! # Transaction Preparation
//!
//! Drives a partially specified ledger transaction (actions with
//! human-readable parameters) to a packed, signable submission envelope.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Pipeline
//!
//! | Stage | Remote calls | Skipped when |
//! |-------|--------------|--------------|
//! | Expiration | none | expiration is in the future |
//! | Reference block (TAPOS) | chain head, reference block | chain id and both ref fields set |
//! | Interfaces | one ABI batch | every action account cached |
//! | Encoding | one per pending action | every action encoded |
//!
//! Every stage writes only what is missing, so the pipeline can be re-run
//! after a failure and picks up where it stopped.
//!
//! ## Module Structure
//!
//! ```text
//! tx-preparation/
//! ├── domain/          # ContractName, Action, Transaction, ABI cache, envelope, errors
//! ├── algorithms/      # TAPOS arithmetic, binary packing, digests
//! ├── ports/           # API trait (inbound) + collaborator traits and mocks (outbound)
//! ├── application/     # Stage resolvers and TransactionPreparer
//! ├── adapters/        # HTTP node client, chain-backed ABI provider
//! └── config.rs        # PreparationConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{HttpChainClient, RpcInterfaceProvider};
pub use algorithms::{
    pack_transaction, reference_block_target, signing_digest, transaction_id,
    truncate_ref_block_num,
};
pub use application::{
    ActionEncoding, InterfaceResolver, ReferenceBlockResolver, TransactionPreparer,
};
pub use config::PreparationConfig;
pub use domain::{
    Action, BlockInfo, ChainInfo, ContractName, InterfaceCache, InterfaceDefinition,
    PermissionLevel, PreparationError, ProviderError, SubmissionEnvelope, TaposConfig,
    Transaction, TransactionExtension, DEFAULT_BLOCKS_BEHIND, DEFAULT_EXPIRE_SECONDS,
};
pub use ports::{
    ActionEncoder, ChainProvider, EncodeRequest, InterfaceProvider, SignatureProvider,
    SigningRequest, TransactionPreparationApi,
    MockActionEncoder, MockChainProvider, MockInterfaceProvider, MockSigner,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
