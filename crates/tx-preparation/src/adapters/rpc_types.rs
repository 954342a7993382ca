//! Wire types for the node's `/v1/chain/*` endpoints.
//!
//! Only the fields the pipeline reads are declared; the rest of each
//! response is ignored.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

/// Response of `get_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetInfoResponse {
    pub chain_id: String,
    pub head_block_num: u64,
    #[serde(default)]
    pub server_version: Option<String>,
}

/// Request of `get_block`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBlockRequest {
    pub block_num_or_id: u64,
}

/// Response of `get_block`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBlockResponse {
    pub block_num: u64,
    pub ref_block_prefix: u64,
    #[serde(default)]
    pub id: Option<String>,
}

/// Request of `get_abi`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAbiRequest {
    pub account_name: String,
}

/// Response of `get_abi`. `abi` is absent for accounts without a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAbiResponse {
    pub account_name: String,
    #[serde(default)]
    pub abi: Option<serde_json::Value>,
}

/// Request of `abi_json_to_bin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiJsonToBinRequest {
    pub code: String,
    pub action: String,
    pub args: serde_json::Value,
}

/// Response of `abi_json_to_bin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiJsonToBinResponse {
    pub binargs: String,
}

/// Error body returned with a non-success status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcErrorResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<RpcErrorDetail>,
}

/// Inner `error` object of an error body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcErrorDetail {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub what: String,
    #[serde(default)]
    pub details: Vec<RpcErrorMessage>,
}

/// One entry of `error.details`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcErrorMessage {
    #[serde(default)]
    pub message: String,
}

impl RpcErrorResponse {
    /// Most specific code in the body.
    pub fn effective_code(&self) -> i64 {
        match &self.error {
            Some(detail) if detail.code != 0 => detail.code,
            _ => self.code,
        }
    }

    /// `what` plus the first detail message, falling back to `message`.
    pub fn describe(&self) -> String {
        match &self.error {
            Some(detail) if !detail.what.is_empty() => match detail.details.first() {
                Some(first) if !first.message.is_empty() => {
                    format!("{}: {}", detail.what, first.message)
                }
                _ => detail.what.clone(),
            },
            _ => self.message.clone(),
        }
    }
}
