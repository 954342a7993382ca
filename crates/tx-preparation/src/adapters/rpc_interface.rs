//! Interface provider built on a chain provider.
//!
//! Issues one `get_raw_abi` per requested account, a bounded number at a
//! time, and reports the batch as a whole.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{ContractName, ProviderError};
use crate::ports::{ChainProvider, InterfaceProvider};

/// Default number of ABI fetches in flight.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// ABI source that fetches each account's ABI from the chain node.
#[derive(Clone)]
pub struct RpcInterfaceProvider {
    chain: Arc<dyn ChainProvider>,
    concurrency: usize,
}

impl RpcInterfaceProvider {
    /// Provider fetching through `chain`.
    pub fn new(chain: Arc<dyn ChainProvider>) -> Self {
        Self {
            chain,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Limit the fetches in flight. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

#[async_trait]
impl InterfaceProvider for RpcInterfaceProvider {
    async fn get_interfaces(
        &self,
        chain_id: &str,
        accounts: &[ContractName],
    ) -> Result<HashMap<ContractName, Vec<u8>>, ProviderError> {
        debug!(
            "[txp] Fetching {} ABI(s) from chain {} ({} at a time)",
            accounts.len(),
            chain_id,
            self.concurrency
        );

        let results: Vec<(ContractName, Result<Vec<u8>, ProviderError>)> =
            stream::iter(accounts.iter().cloned())
                .map(|account| async move {
                    let result = self.chain.get_raw_abi(&account).await;
                    (account, result)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut fetched = HashMap::with_capacity(results.len());
        let mut missing = Vec::new();
        for (account, result) in results {
            match result {
                Ok(raw) if !raw.is_empty() => {
                    fetched.insert(account, raw);
                }
                Ok(_) | Err(ProviderError::NotFound(_)) | Err(ProviderError::PartialMiss(_)) => {
                    missing.push(account)
                }
                Err(err) => return Err(err),
            }
        }

        if !missing.is_empty() {
            warn!("[txp] No ABI deployed for {:?}", missing);
            return Err(ProviderError::PartialMiss(missing));
        }
        Ok(fetched)
    }
}
