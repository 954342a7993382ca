//! # Preparation Configuration
//!
//! Configuration for the transaction preparation service.

use crate::domain::{TaposConfig, DEFAULT_BLOCKS_BEHIND, DEFAULT_EXPIRE_SECONDS};
use serde::{Deserialize, Serialize};
use std::env;

/// Default node endpoint.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8888";

/// Preparation service configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparationConfig {
    /// Reference-block policy given to new transactions.
    pub tapos: TaposConfig,

    /// Node endpoint used by the HTTP adapter.
    pub rpc_url: String,

    /// Per-request timeout for the HTTP adapter, in seconds.
    pub request_timeout_secs: u64,

    /// Maximum ABI fetches in flight when ABIs are fetched one account at
    /// a time through the chain provider.
    pub abi_fetch_concurrency: usize,
}

impl Default for PreparationConfig {
    fn default() -> Self {
        Self {
            tapos: TaposConfig::default(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            request_timeout_secs: 10,
            abi_fetch_concurrency: 4,
        }
    }
}

impl PreparationConfig {
    /// Create a config for testing (short timeout, sequential fetches).
    pub fn for_testing() -> Self {
        Self {
            tapos: TaposConfig::default(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            request_timeout_secs: 1,
            abi_fetch_concurrency: 1,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TXP_RPC_URL`: node endpoint (default: http://127.0.0.1:8888)
    /// - `TXP_BLOCKS_BEHIND`: reference-block look-back (default: 3)
    /// - `TXP_EXPIRE_SECONDS`: expiration window (default: 300)
    /// - `TXP_REQUEST_TIMEOUT_SECS`: HTTP timeout (default: 10)
    /// - `TXP_ABI_FETCH_CONCURRENCY`: parallel ABI fetches (default: 4)
    ///
    /// Unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            tapos: TaposConfig {
                blocks_behind: parse_env("TXP_BLOCKS_BEHIND").unwrap_or(DEFAULT_BLOCKS_BEHIND),
                expire_seconds: parse_env("TXP_EXPIRE_SECONDS").unwrap_or(DEFAULT_EXPIRE_SECONDS),
            },
            rpc_url: env::var("TXP_RPC_URL").unwrap_or(defaults.rpc_url),
            request_timeout_secs: parse_env("TXP_REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            abi_fetch_concurrency: parse_env("TXP_ABI_FETCH_CONCURRENCY")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.abi_fetch_concurrency),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
