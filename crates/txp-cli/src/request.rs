//! Transaction request file.
//!
//! ```json
//! {
//!   "chain_id": "optional, adopted from the node when absent",
//!   "max_net_usage_words": 0,
//!   "max_cpu_usage_ms": 0,
//!   "delay_sec": 0,
//!   "actions": [
//!     {
//!       "account": "eosio.token",
//!       "name": "transfer",
//!       "authorization": [{"actor": "alice", "permission": "active"}],
//!       "data": {"from": "alice", "to": "bob", "quantity": "1.0000 SYS", "memo": ""}
//!     }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use tx_preparation::{Action, Transaction};

/// Caller-supplied part of a transaction.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionRequest {
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub max_net_usage_words: u32,
    #[serde(default)]
    pub max_cpu_usage_ms: u8,
    #[serde(default)]
    pub delay_sec: u32,
    #[serde(default)]
    pub context_free_actions: Vec<Action>,
    pub actions: Vec<Action>,
}

impl TransactionRequest {
    /// Parse a request document.
    pub fn from_json(text: &str) -> Result<Self> {
        let request: Self =
            serde_json::from_str(text).context("Transaction request is not valid JSON")?;
        if request.actions.is_empty() && request.context_free_actions.is_empty() {
            anyhow::bail!("Transaction request has no actions");
        }
        Ok(request)
    }

    /// Apply the request on top of `base`.
    pub fn into_transaction(self, mut base: Transaction) -> Transaction {
        if let Some(chain_id) = self.chain_id {
            base.chain_id = chain_id;
        }
        base.max_net_usage_words = self.max_net_usage_words;
        base.max_cpu_usage_ms = self.max_cpu_usage_ms;
        base.delay_sec = self.delay_sec;
        base.context_free_actions = self.context_free_actions;
        base.actions = self.actions;
        base
    }
}
