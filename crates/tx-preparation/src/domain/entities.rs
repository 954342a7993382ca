//! # Domain Entities
//!
//! [`Action`] and the [`Transaction`] aggregate.
//!
//! A transaction starts under-specified and is filled in by the preparation
//! pipeline: expiration, reference-block fields, chain id (only when empty),
//! interface cache, and each action's encoded payload. Nothing the pipeline
//! sets is ever cleared again.

use super::abi::InterfaceCache;
use super::value_objects::{ContractName, PermissionLevel, TaposConfig};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One operation inside a transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Contract that executes the action.
    pub account: ContractName,
    /// Action (intent) name within the contract.
    pub name: ContractName,
    /// Authorizations the action runs under.
    #[serde(default)]
    pub authorization: Vec<PermissionLevel>,
    /// Human-readable parameters.
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(skip)]
    encoded_payload: Option<Vec<u8>>,
}

impl Action {
    /// Create an action without encoded data.
    pub fn new(
        account: ContractName,
        name: ContractName,
        authorization: Vec<PermissionLevel>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            account,
            name,
            authorization,
            data,
            encoded_payload: None,
        }
    }

    /// Attach bytes that were encoded elsewhere. Encoding will skip this action.
    pub fn with_encoded_payload(mut self, payload: Vec<u8>) -> Self {
        self.encoded_payload = Some(payload);
        self
    }

    /// Encoded parameters, once computed.
    pub fn encoded_payload(&self) -> Option<&[u8]> {
        self.encoded_payload.as_deref()
    }

    /// Whether the parameters have been encoded.
    pub fn is_encoded(&self) -> bool {
        self.encoded_payload.is_some()
    }

    /// Store encoded bytes. A payload that is already set is kept.
    pub(crate) fn store_encoded_payload(&mut self, payload: Vec<u8>) {
        if self.encoded_payload.is_none() {
            self.encoded_payload = Some(payload);
        }
    }
}

/// Transaction extension entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionExtension {
    /// Extension type id.
    pub ext_type: u16,
    /// Opaque extension data.
    pub data: Vec<u8>,
}

/// The transaction aggregate.
#[derive(Clone, Debug)]
pub struct Transaction {
    /// Network id. Empty until supplied or resolved; authoritative once set.
    pub chain_id: String,
    /// Expiry time. The Unix epoch means unset.
    pub expiration: DateTime<Utc>,
    /// Lower 16 bits of the reference block number. Zero means unset.
    pub ref_block_num: u16,
    /// Reference block prefix. Zero means unset.
    pub ref_block_prefix: u64,
    /// Network bandwidth limit in 8-byte words, zero for no limit.
    pub max_net_usage_words: u32,
    /// CPU limit in milliseconds, zero for no limit.
    pub max_cpu_usage_ms: u8,
    /// Delay before execution, in seconds.
    pub delay_sec: u32,
    /// Actions that run without access to chain state.
    pub context_free_actions: Vec<Action>,
    /// Actions in execution order.
    pub actions: Vec<Action>,
    /// Extensions carried verbatim.
    pub transaction_extensions: Vec<TransactionExtension>,
    /// Reference-block policy.
    pub tapos_config: TaposConfig,
    pub(crate) interface_cache: InterfaceCache,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            chain_id: String::new(),
            expiration: unset_expiration(),
            ref_block_num: 0,
            ref_block_prefix: 0,
            max_net_usage_words: 0,
            max_cpu_usage_ms: 0,
            delay_sec: 0,
            context_free_actions: Vec::new(),
            actions: Vec::new(),
            transaction_extensions: Vec::new(),
            tapos_config: TaposConfig::default(),
            interface_cache: InterfaceCache::new(),
        }
    }
}

/// The "unset" expiration sentinel.
pub fn unset_expiration() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

impl Transaction {
    /// Create an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chain id up front.
    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = chain_id.into();
        self
    }

    /// Set the reference-block policy.
    pub fn with_tapos_config(mut self, config: TaposConfig) -> Self {
        self.tapos_config = config;
        self
    }

    /// Append an action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Interface definitions known to this transaction.
    pub fn interface_cache(&self) -> &InterfaceCache {
        &self.interface_cache
    }

    /// Mutable access to the interface cache.
    pub fn interface_cache_mut(&mut self) -> &mut InterfaceCache {
        &mut self.interface_cache
    }

    /// Whether expiration still holds the sentinel.
    pub fn is_expiration_unset(&self) -> bool {
        self.expiration <= unset_expiration()
    }

    /// Whether chain id and both reference-block fields are known.
    pub fn is_tapos_resolved(&self) -> bool {
        self.ref_block_num > 0 && self.ref_block_prefix > 0 && !self.chain_id.is_empty()
    }

    /// Replace a past or unset expiration with `now + expire_seconds`,
    /// whole seconds only.
    pub fn calculate_expiration(&mut self, now: DateTime<Utc>) {
        if self.expiration < now {
            let lifetime = Duration::seconds(i64::from(self.tapos_config.expire_seconds));
            self.expiration = (now + lifetime).trunc_subsecs(0);
        }
    }

    /// Context-free actions followed by regular actions.
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.context_free_actions.iter().chain(self.actions.iter())
    }

    /// Distinct target contracts, first-seen order.
    pub fn action_accounts(&self) -> Vec<ContractName> {
        let mut seen = HashSet::new();
        self.all_actions()
            .filter(|a| seen.insert(a.account.clone()))
            .map(|a| a.account.clone())
            .collect()
    }

    /// Target contracts with no cached interface.
    pub fn accounts_missing_interfaces(&self) -> Vec<ContractName> {
        self.interface_cache.missing(self.action_accounts().iter())
    }

    /// Actions still waiting for their encoded payload.
    pub fn actions_without_encoded_payload(&self) -> Vec<&Action> {
        self.all_actions().filter(|a| !a.is_encoded()).collect()
    }

    /// Snake-case JSON form. Encoded action data is rendered as hex, data
    /// not yet encoded is rendered as given.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        let view = TransactionJson::from(self);
        if pretty {
            serde_json::to_string_pretty(&view)
        } else {
            serde_json::to_string(&view)
        }
    }
}

#[derive(Serialize)]
struct ActionJson<'a> {
    account: &'a ContractName,
    name: &'a ContractName,
    authorization: &'a [PermissionLevel],
    data: serde_json::Value,
}

impl<'a> From<&'a Action> for ActionJson<'a> {
    fn from(action: &'a Action) -> Self {
        let data = match action.encoded_payload() {
            Some(bytes) => serde_json::Value::String(hex::encode(bytes)),
            None => action.data.clone(),
        };
        Self {
            account: &action.account,
            name: &action.name,
            authorization: &action.authorization,
            data,
        }
    }
}

#[derive(Serialize)]
struct TransactionJson<'a> {
    expiration: String,
    ref_block_num: u16,
    ref_block_prefix: u64,
    max_net_usage_words: u32,
    max_cpu_usage_ms: u8,
    delay_sec: u32,
    context_free_actions: Vec<ActionJson<'a>>,
    actions: Vec<ActionJson<'a>>,
    transaction_extensions: Vec<(u16, String)>,
}

impl<'a> From<&'a Transaction> for TransactionJson<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            expiration: tx.expiration.format("%Y-%m-%dT%H:%M:%S").to_string(),
            ref_block_num: tx.ref_block_num,
            ref_block_prefix: tx.ref_block_prefix,
            max_net_usage_words: tx.max_net_usage_words,
            max_cpu_usage_ms: tx.max_cpu_usage_ms,
            delay_sec: tx.delay_sec,
            context_free_actions: tx.context_free_actions.iter().map(ActionJson::from).collect(),
            actions: tx.actions.iter().map(ActionJson::from).collect(),
            transaction_extensions: tx
                .transaction_extensions
                .iter()
                .map(|ext| (ext.ext_type, hex::encode(&ext.data)))
                .collect(),
        }
    }
}
