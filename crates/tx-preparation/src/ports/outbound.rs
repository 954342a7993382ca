//! # Outbound Ports
//!
//! Traits for external collaborators: chain node, ABI source, action
//! encoder, signer. The pipeline depends only on these.

use crate::algorithms::pack_transaction;
use crate::domain::{
    BlockInfo, ChainInfo, ContractName, InterfaceDefinition, PreparationError, ProviderError,
    Transaction,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Chain node - outbound port.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Current chain id and head block number.
    async fn get_info(&self) -> Result<ChainInfo, ProviderError>;

    /// Reference-block data for `block_num`.
    async fn get_block(&self, block_num: u64) -> Result<BlockInfo, ProviderError>;

    /// JSON ABI document deployed on `account`.
    async fn get_raw_abi(&self, account: &ContractName) -> Result<Vec<u8>, ProviderError>;
}

/// ABI source - outbound port.
///
/// A batch is all-or-nothing: either every requested name is returned or
/// the call fails.
#[async_trait]
pub trait InterfaceProvider: Send + Sync {
    /// Raw ABI documents for `accounts` on `chain_id`.
    async fn get_interfaces(
        &self,
        chain_id: &str,
        accounts: &[ContractName],
    ) -> Result<HashMap<ContractName, Vec<u8>>, ProviderError>;
}

/// Input to a single action encoding.
#[derive(Clone, Copy, Debug)]
pub struct EncodeRequest<'a> {
    /// Contract the action targets.
    pub account: &'a ContractName,
    /// Action name.
    pub intent: &'a ContractName,
    /// Human-readable parameters.
    pub parameters: &'a serde_json::Value,
    /// ABI of `account`.
    pub interface: &'a InterfaceDefinition,
}

/// Action data encoder - outbound port.
#[async_trait]
pub trait ActionEncoder: Send + Sync {
    /// Encode one action's parameters against its ABI.
    async fn encode_action(&self, request: EncodeRequest<'_>) -> Result<Vec<u8>, ProviderError>;

    /// Pack a complete transaction body. Defaults to the built-in layout.
    fn encode_transaction(&self, tx: &Transaction) -> Result<Vec<u8>, PreparationError> {
        pack_transaction(tx)
    }
}

/// Input to a signing call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningRequest {
    /// Chain the transaction is bound to.
    pub chain_id: String,
    /// Digest to sign.
    pub digest: [u8; 32],
    /// Packed transaction body the digest covers.
    pub packed_trx: Vec<u8>,
    /// Keys to sign with. Empty means every key the signer holds.
    pub required_keys: Vec<String>,
}

/// Signer - outbound port.
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Public keys this signer can sign with.
    async fn available_keys(&self) -> Result<Vec<String>, ProviderError>;

    /// Sign the request's digest with the selected keys.
    async fn sign(&self, request: &SigningRequest) -> Result<Vec<String>, ProviderError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock chain node with call counters.
#[derive(Default)]
pub struct MockChainProvider {
    /// Reported chain id.
    pub chain_id: String,
    /// Reported head block.
    pub head_block_num: u64,
    /// Known blocks by number.
    pub blocks: HashMap<u64, BlockInfo>,
    /// Deployed ABIs by account.
    pub abis: HashMap<ContractName, Vec<u8>>,
    /// Error returned by every call when set.
    pub failure: Option<ProviderError>,
    info_calls: AtomicUsize,
    block_calls: AtomicUsize,
    abi_calls: AtomicUsize,
    requested_blocks: Mutex<Vec<u64>>,
}

impl MockChainProvider {
    /// Node reporting `chain_id` at `head_block_num`.
    pub fn new(chain_id: impl Into<String>, head_block_num: u64) -> Self {
        Self {
            chain_id: chain_id.into(),
            head_block_num,
            ..Default::default()
        }
    }

    /// Add a block.
    pub fn with_block(mut self, block_num: u64, ref_block_prefix: u64) -> Self {
        self.blocks.insert(
            block_num,
            BlockInfo {
                block_num,
                ref_block_prefix,
            },
        );
        self
    }

    /// Add a deployed ABI.
    pub fn with_abi(mut self, account: ContractName, raw: impl Into<Vec<u8>>) -> Self {
        self.abis.insert(account, raw.into());
        self
    }

    /// Fail every call with `error`.
    pub fn failing(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Number of `get_info` calls.
    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_block` calls.
    pub fn block_calls(&self) -> usize {
        self.block_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_raw_abi` calls.
    pub fn abi_calls(&self) -> usize {
        self.abi_calls.load(Ordering::SeqCst)
    }

    /// Block numbers requested so far, in order.
    pub fn requested_blocks(&self) -> Vec<u64> {
        self.requested_blocks.lock().clone()
    }

    fn check_failure(&self) -> Result<(), ProviderError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChainProvider for MockChainProvider {
    async fn get_info(&self) -> Result<ChainInfo, ProviderError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(ChainInfo {
            chain_id: self.chain_id.clone(),
            head_block_num: self.head_block_num,
        })
    }

    async fn get_block(&self, block_num: u64) -> Result<BlockInfo, ProviderError> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_blocks.lock().push(block_num);
        self.check_failure()?;
        self.blocks
            .get(&block_num)
            .copied()
            .ok_or_else(|| ProviderError::NotFound(format!("block {}", block_num)))
    }

    async fn get_raw_abi(&self, account: &ContractName) -> Result<Vec<u8>, ProviderError> {
        self.abi_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.abis
            .get(account)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("abi for {}", account)))
    }
}

/// Mock ABI source with a call log.
#[derive(Default)]
pub struct MockInterfaceProvider {
    /// ABIs served by account.
    pub abis: HashMap<ContractName, Vec<u8>>,
    /// Error returned by every call when set.
    pub failure: Option<ProviderError>,
    requests: Mutex<Vec<(String, Vec<ContractName>)>>,
}

impl MockInterfaceProvider {
    /// Empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `raw` for `account`.
    pub fn with_abi(mut self, account: ContractName, raw: impl Into<Vec<u8>>) -> Self {
        self.abis.insert(account, raw.into());
        self
    }

    /// Fail every call with `error`.
    pub fn failing(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Number of batch requests.
    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// Batches requested so far as `(chain_id, accounts)`.
    pub fn requests(&self) -> Vec<(String, Vec<ContractName>)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl InterfaceProvider for MockInterfaceProvider {
    async fn get_interfaces(
        &self,
        chain_id: &str,
        accounts: &[ContractName],
    ) -> Result<HashMap<ContractName, Vec<u8>>, ProviderError> {
        self.requests
            .lock()
            .push((chain_id.to_string(), accounts.to_vec()));

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let missing: Vec<ContractName> = accounts
            .iter()
            .filter(|a| !self.abis.contains_key(*a))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ProviderError::PartialMiss(missing));
        }

        Ok(accounts
            .iter()
            .filter_map(|a| self.abis.get(a).map(|raw| (a.clone(), raw.clone())))
            .collect())
    }
}

/// Mock encoder: JSON-serializes the parameters.
///
/// Rejects intents the ABI does not declare, and any action on an account
/// listed in `failing_accounts`.
#[derive(Default)]
pub struct MockActionEncoder {
    /// Accounts whose actions fail to encode.
    pub failing_accounts: Vec<ContractName>,
    calls: AtomicUsize,
}

impl MockActionEncoder {
    /// Encoder that accepts every declared action.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make actions on `account` fail.
    pub fn failing_for(mut self, account: ContractName) -> Self {
        self.failing_accounts.push(account);
        self
    }

    /// Number of `encode_action` calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActionEncoder for MockActionEncoder {
    async fn encode_action(&self, request: EncodeRequest<'_>) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_accounts.contains(request.account) {
            return Err(ProviderError::Encode(format!(
                "cannot encode {}::{}",
                request.account, request.intent
            )));
        }
        if request.interface.action_type(request.intent.as_str()).is_none() {
            return Err(ProviderError::Encode(format!(
                "action {} not declared by {}",
                request.intent, request.account
            )));
        }

        serde_json::to_vec(request.parameters).map_err(|e| ProviderError::Encode(e.to_string()))
    }
}

/// Mock signer producing deterministic signature strings.
#[derive(Default)]
pub struct MockSigner {
    /// Keys held.
    pub keys: Vec<String>,
    /// Error returned by `sign` when set.
    pub failure: Option<ProviderError>,
}

impl MockSigner {
    /// Signer holding `keys`.
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys,
            failure: None,
        }
    }
}

#[async_trait]
impl SignatureProvider for MockSigner {
    async fn available_keys(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.keys.clone())
    }

    async fn sign(&self, request: &SigningRequest) -> Result<Vec<String>, ProviderError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let selected: Vec<&String> = if request.required_keys.is_empty() {
            self.keys.iter().collect()
        } else {
            self.keys
                .iter()
                .filter(|k| request.required_keys.contains(*k))
                .collect()
        };

        Ok(selected
            .into_iter()
            .map(|key| format!("SIG_MOCK_{}_{}", hex::encode(&request.digest[..8]), key))
            .collect())
    }
}
