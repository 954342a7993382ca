//! # Domain Value Objects
//!
//! Immutable value types for transaction preparation.

use super::errors::PreparationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters allowed in the first twelve positions of a name, in symbol order.
const NAME_CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Longest legal name.
pub const MAX_NAME_LEN: usize = 13;

/// Validated ledger account / contract name.
///
/// Up to 12 characters from `.12345a-z`, plus an optional 13th character
/// from `.12345a-j` (the last slot only has 4 bits in the packed form).
/// Trailing dots are rejected because they do not survive packing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractName(String);

impl ContractName {
    /// Validate and wrap a name.
    pub fn new(name: impl Into<String>) -> Result<Self, PreparationError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self(name))
    }

    /// The name as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Packed 64-bit form used on the wire.
    pub fn to_u64(&self) -> u64 {
        let bytes = self.0.as_bytes();
        let mut value = 0u64;
        for i in 0..MAX_NAME_LEN {
            let mut c = bytes.get(i).map(|b| char_to_symbol(*b)).unwrap_or(0);
            if i < 12 {
                c &= 0x1f;
                c <<= 64 - 5 * (i as u64 + 1);
            } else {
                c &= 0x0f;
            }
            value |= c;
        }
        value
    }

    /// Rebuild a name from its packed form.
    pub fn from_u64(value: u64) -> Result<Self, PreparationError> {
        let mut chars = [b'.'; MAX_NAME_LEN];
        let mut tmp = value;
        for i in 0..MAX_NAME_LEN {
            let mask = if i == 0 { 0x0f } else { 0x1f };
            chars[12 - i] = NAME_CHARMAP[(tmp & mask) as usize];
            tmp >>= if i == 0 { 4 } else { 5 };
        }
        let text = String::from_utf8_lossy(&chars);
        Self::new(text.trim_end_matches('.'))
    }
}

fn char_to_symbol(c: u8) -> u64 {
    match c {
        b'a'..=b'z' => (c - b'a') as u64 + 6,
        b'1'..=b'5' => (c - b'1') as u64 + 1,
        _ => 0,
    }
}

fn validate_name(name: &str) -> Result<(), PreparationError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(PreparationError::Parse(format!(
            "name '{}' must be 1-{} characters",
            name, MAX_NAME_LEN
        )));
    }

    for (i, c) in name.bytes().enumerate() {
        let allowed = if i < 12 {
            matches!(c, b'.' | b'1'..=b'5' | b'a'..=b'z')
        } else {
            matches!(c, b'.' | b'1'..=b'5' | b'a'..=b'j')
        };
        if !allowed {
            return Err(PreparationError::Parse(format!(
                "name '{}' has invalid character '{}' at position {}",
                name, c as char, i
            )));
        }
    }

    if name.ends_with('.') {
        return Err(PreparationError::Parse(format!(
            "name '{}' must not end with '.'",
            name
        )));
    }

    Ok(())
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContractName {
    type Err = PreparationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContractName {
    type Error = PreparationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContractName> for String {
    fn from(name: ContractName) -> Self {
        name.0
    }
}

impl AsRef<str> for ContractName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Actor/permission pair authorizing an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionLevel {
    /// Authorizing account.
    pub actor: ContractName,
    /// Permission of that account (usually `active`).
    pub permission: ContractName,
}

impl PermissionLevel {
    /// Create a permission level.
    pub fn new(actor: ContractName, permission: ContractName) -> Self {
        Self { actor, permission }
    }
}

/// Reference-block policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaposConfig {
    /// How many blocks behind the head the reference block sits.
    pub blocks_behind: u64,
    /// Lifetime of a freshly computed expiration.
    pub expire_seconds: u32,
}

impl Default for TaposConfig {
    fn default() -> Self {
        Self {
            blocks_behind: super::invariants::DEFAULT_BLOCKS_BEHIND,
            expire_seconds: super::invariants::DEFAULT_EXPIRE_SECONDS,
        }
    }
}

impl TaposConfig {
    /// Create a policy.
    pub fn new(blocks_behind: u64, expire_seconds: u32) -> Self {
        Self {
            blocks_behind,
            expire_seconds,
        }
    }

    /// Reject policies that can never yield a valid expiration.
    pub fn validate(&self) -> Result<(), PreparationError> {
        if self.expire_seconds == 0 {
            return Err(PreparationError::Configuration(
                "expire_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Chain head as reported by a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    /// Network identifier.
    pub chain_id: String,
    /// Current head block number.
    pub head_block_num: u64,
}

/// Reference-block data for one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block number.
    pub block_num: u64,
    /// Prefix derived from the block id.
    pub ref_block_prefix: u64,
}
