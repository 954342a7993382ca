//! # Interface Resolver
//!
//! Fetches the ABIs a transaction still lacks and merges them into its
//! interface cache.

use std::sync::Arc;
use tracing::{debug, info};

use crate::adapters::RpcInterfaceProvider;
use crate::domain::{PreparationError, ProviderError, Transaction};
use crate::ports::{ChainProvider, InterfaceProvider};

/// Resolves missing interface definitions in one batch.
pub struct InterfaceResolver<'a> {
    provider: Option<&'a dyn InterfaceProvider>,
    chain: Option<&'a Arc<dyn ChainProvider>>,
    fetch_concurrency: usize,
}

impl<'a> InterfaceResolver<'a> {
    /// Resolver using `provider`, or one built on `chain` when absent.
    pub fn new(
        provider: Option<&'a dyn InterfaceProvider>,
        chain: Option<&'a Arc<dyn ChainProvider>>,
    ) -> Self {
        Self {
            provider,
            chain,
            fetch_concurrency: 1,
        }
    }

    /// Concurrency of the provider built on the chain.
    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency;
        self
    }

    /// Fetch every interface `tx` is missing.
    ///
    /// Nothing is inserted unless the provider serves the whole batch. A
    /// malformed entry aborts the merge at that entry.
    #[tracing::instrument(skip_all)]
    pub async fn resolve(&self, tx: &mut Transaction) -> Result<(), PreparationError> {
        let missing = tx.accounts_missing_interfaces();
        if missing.is_empty() {
            debug!("[txp] All interfaces cached, skipping");
            return Ok(());
        }

        let synthesized;
        let provider: &dyn InterfaceProvider = match (self.provider, self.chain) {
            (Some(provider), _) => provider,
            (None, Some(chain)) => {
                synthesized = RpcInterfaceProvider::new(Arc::clone(chain))
                    .with_concurrency(self.fetch_concurrency);
                &synthesized
            }
            (None, None) => {
                return Err(PreparationError::Configuration(
                    "an interface provider or chain provider is required to fetch interfaces"
                        .to_string(),
                ))
            }
        };

        if tx.chain_id.is_empty() {
            return Err(PreparationError::Configuration(
                "chain id must be resolved before fetching interfaces".to_string(),
            ));
        }

        info!("[txp] Fetching {} interface(s)", missing.len());
        let mut fetched = provider.get_interfaces(&tx.chain_id, &missing).await?;

        let absent: Vec<_> = missing
            .iter()
            .filter(|name| !fetched.contains_key(*name))
            .cloned()
            .collect();
        if !absent.is_empty() {
            return Err(ProviderError::PartialMiss(absent).into());
        }

        for name in missing {
            if let Some(raw) = fetched.remove(&name) {
                tx.interface_cache_mut().insert(name, &raw)?;
            }
        }
        Ok(())
    }
}
