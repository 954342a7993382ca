//! # Interface Definitions
//!
//! Parsed contract ABIs and the per-transaction cache that holds them.

use super::errors::PreparationError;
use super::value_objects::ContractName;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Every accepted ABI document declares a version with this prefix.
pub const ABI_VERSION_PREFIX: &str = "eosio::abi/";

/// Type alias entry of an ABI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiTypeDef {
    /// Alias name.
    pub new_type_name: String,
    /// Aliased type.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Field of an ABI struct.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiField {
    /// Field name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Struct declared by an ABI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiStruct {
    /// Struct name.
    pub name: String,
    /// Base struct, empty when none.
    #[serde(default)]
    pub base: String,
    /// Ordered fields.
    #[serde(default)]
    pub fields: Vec<AbiField>,
}

/// Action declared by an ABI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiAction {
    /// Action name.
    pub name: String,
    /// Struct describing the action's parameters.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Ricardian contract text.
    #[serde(default)]
    pub ricardian_contract: String,
}

#[derive(Deserialize)]
struct AbiDocument {
    version: String,
    #[serde(default)]
    types: Vec<AbiTypeDef>,
    #[serde(default)]
    structs: Vec<AbiStruct>,
    #[serde(default)]
    actions: Vec<AbiAction>,
}

/// A successfully parsed contract ABI.
///
/// Only obtainable through [`InterfaceDefinition::parse`], so holding one
/// means the raw document was well-formed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceDefinition {
    version: String,
    types: Vec<AbiTypeDef>,
    structs: Vec<AbiStruct>,
    actions: Vec<AbiAction>,
    raw: Vec<u8>,
}

impl InterfaceDefinition {
    /// Parse a JSON ABI document.
    pub fn parse(raw: &[u8]) -> Result<Self, PreparationError> {
        let doc: AbiDocument = serde_json::from_slice(raw)
            .map_err(|e| PreparationError::Parse(format!("invalid ABI document: {}", e)))?;

        if !doc.version.starts_with(ABI_VERSION_PREFIX) {
            return Err(PreparationError::Parse(format!(
                "unsupported ABI version '{}'",
                doc.version
            )));
        }

        Ok(Self {
            version: doc.version,
            types: doc.types,
            structs: doc.structs,
            actions: doc.actions,
            raw: raw.to_vec(),
        })
    }

    /// Declared ABI version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Declared actions.
    pub fn actions(&self) -> &[AbiAction] {
        &self.actions
    }

    /// Declared structs.
    pub fn structs(&self) -> &[AbiStruct] {
        &self.structs
    }

    /// Declared type aliases.
    pub fn types(&self) -> &[AbiTypeDef] {
        &self.types
    }

    /// Parameter struct type for an action, if declared.
    pub fn action_type(&self, action: &str) -> Option<&str> {
        self.actions
            .iter()
            .find(|a| a.name == action)
            .map(|a| a.type_name.as_str())
    }

    /// Look up a struct by name.
    pub fn find_struct(&self, name: &str) -> Option<&AbiStruct> {
        self.structs.iter().find(|s| s.name == name)
    }

    /// The document exactly as received.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

/// Interface definitions keyed by contract name.
///
/// A key is only ever present with a definition that parsed; a failed
/// insert leaves the cache untouched.
#[derive(Clone, Debug, Default)]
pub struct InterfaceCache {
    entries: HashMap<ContractName, InterfaceDefinition>,
}

impl InterfaceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names from `names` without a cached definition, first-seen order,
    /// no duplicates.
    pub fn missing<'a, I>(&self, names: I) -> Vec<ContractName>
    where
        I: IntoIterator<Item = &'a ContractName>,
    {
        let mut seen = HashSet::new();
        names
            .into_iter()
            .filter(|name| !self.entries.contains_key(*name))
            .filter(|name| seen.insert((*name).clone()))
            .cloned()
            .collect()
    }

    /// Parse `raw` and insert or replace the entry for `name`.
    pub fn insert(&mut self, name: ContractName, raw: &[u8]) -> Result<(), PreparationError> {
        let definition = InterfaceDefinition::parse(raw)?;
        self.entries.insert(name, definition);
        Ok(())
    }

    /// Definition for `name`.
    pub fn lookup(&self, name: &ContractName) -> Result<&InterfaceDefinition, PreparationError> {
        self.entries
            .get(name)
            .ok_or_else(|| PreparationError::NotFound(name.clone()))
    }

    /// Whether `name` is cached.
    pub fn contains(&self, name: &ContractName) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of cached definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
