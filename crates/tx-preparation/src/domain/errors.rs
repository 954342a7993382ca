//! # Domain Errors
//!
//! Error types for transaction preparation.
//!
//! Two layers: [`ProviderError`] is what every outbound port reports, and
//! [`PreparationError`] is what the pipeline reports. Provider failures are
//! carried through unchanged via [`PreparationError::Collaborator`].

use super::value_objects::ContractName;
use thiserror::Error;

/// Errors reported by outbound collaborators (chain node, ABI source,
/// encoder, signer).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Connectivity failure (refused connection, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The node answered with an error body.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// Status or error code reported by the node
        code: i64,
        /// Message reported by the node
        message: String,
    },

    /// Requested block or object does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An interface batch could not be served in full.
    #[error("Interfaces unavailable for: {0:?}")]
    PartialMiss(Vec<ContractName>),

    /// Action parameters do not match the interface.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Signing failed.
    #[error("Signing error: {0}")]
    Signing(String),

    /// None of the requested keys is held by the signer.
    #[error("Key not found: {0}")]
    KeyNotFound(String),
}

/// Transaction preparation error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreparationError {
    /// A required collaborator or a required prior field is absent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller-supplied chain id conflicts with the one reported by the node.
    #[error("Provided chain id {provided} does not match chain id {fetched}")]
    Mismatch {
        /// Chain id already set on the transaction
        provided: String,
        /// Chain id reported by the node
        fetched: String,
    },

    /// No interface cached under this name.
    #[error("Interface not found: {0}")]
    NotFound(ContractName),

    /// An action targets a contract whose interface is not cached.
    #[error("Cannot encode action data, interface missing for {0}")]
    MissingInterface(ContractName),

    /// Malformed interface, name, or parameter data.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Envelope requested before the transaction is fully specified.
    #[error("Incomplete transaction: {field} is not set")]
    IncompleteTransaction {
        /// Name of the offending field
        field: String,
    },

    /// Failure surfaced verbatim from a collaborator.
    #[error(transparent)]
    Collaborator(#[from] ProviderError),
}

impl PreparationError {
    /// Whether retrying the same call may succeed without changing inputs.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PreparationError::Collaborator(ProviderError::Transport(_))
        )
    }
}
