//! # Reference-Block Resolver
//!
//! Fills in the chain id and the TAPOS fields of a transaction.
//!
//! Makes at most two remote calls: one for the chain head, one for the
//! reference block. Either is skipped when its output is already known.

use tracing::{debug, info};

use crate::algorithms::{reference_block_target, truncate_ref_block_num};
use crate::domain::{invariant_chain_id_matches, PreparationError, Transaction};
use crate::ports::ChainProvider;

/// Resolves chain id, `ref_block_num` and `ref_block_prefix`.
pub struct ReferenceBlockResolver<'a> {
    chain: Option<&'a dyn ChainProvider>,
}

impl<'a> ReferenceBlockResolver<'a> {
    /// Resolver backed by `chain`, if any.
    pub fn new(chain: Option<&'a dyn ChainProvider>) -> Self {
        Self { chain }
    }

    /// Resolve the reference-block fields of `tx`.
    ///
    /// A transaction that already carries a chain id and both reference
    /// fields is left untouched without any remote call. A preset chain id
    /// must equal the node's; on mismatch nothing is modified.
    #[tracing::instrument(skip_all)]
    pub async fn resolve(&self, tx: &mut Transaction) -> Result<(), PreparationError> {
        if tx.is_tapos_resolved() {
            debug!("[txp] Reference block already resolved, skipping");
            return Ok(());
        }

        let chain = self.chain.ok_or_else(|| {
            PreparationError::Configuration(
                "a chain provider is required to resolve the reference block".to_string(),
            )
        })?;

        let info = chain.get_info().await?;
        if tx.chain_id.is_empty() {
            info!("[txp] Adopting chain id {}", info.chain_id);
            tx.chain_id = info.chain_id;
        } else {
            invariant_chain_id_matches(&tx.chain_id, &info.chain_id)?;
        }

        if tx.ref_block_num > 0 && tx.ref_block_prefix > 0 {
            return Ok(());
        }

        let target = reference_block_target(info.head_block_num, tx.tapos_config.blocks_behind);
        debug!(
            "[txp] Fetching reference block {} (head {}, {} behind)",
            target, info.head_block_num, tx.tapos_config.blocks_behind
        );

        let block = chain.get_block(target).await?;
        tx.ref_block_num = truncate_ref_block_num(block.block_num);
        tx.ref_block_prefix = block.ref_block_prefix;

        debug!(
            "[txp] Reference block set: num={} prefix={}",
            tx.ref_block_num, tx.ref_block_prefix
        );
        Ok(())
    }
}
