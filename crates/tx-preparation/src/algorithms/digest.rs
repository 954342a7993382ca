//! Transaction id and signing digest.

use crate::domain::PreparationError;
use sha2::{Digest, Sha256};

/// Transaction id: SHA-256 of the packed body, hex encoded.
pub fn transaction_id(packed_trx: &[u8]) -> String {
    hex::encode(Sha256::digest(packed_trx))
}

/// Digest the signer signs: `sha256(chain_id ‖ packed_trx ‖ cfd_hash)`.
///
/// `cfd_hash` is 32 zero bytes when there is no context-free data,
/// otherwise the SHA-256 of that data. The chain id must be 32 bytes of hex.
pub fn signing_digest(
    chain_id: &str,
    packed_trx: &[u8],
    context_free_data: &[u8],
) -> Result<[u8; 32], PreparationError> {
    let chain_bytes = hex::decode(chain_id)
        .map_err(|e| PreparationError::Parse(format!("chain id is not hex: {}", e)))?;
    if chain_bytes.len() != 32 {
        return Err(PreparationError::Parse(format!(
            "chain id must be 32 bytes, got {}",
            chain_bytes.len()
        )));
    }

    let cfd_hash: [u8; 32] = if context_free_data.is_empty() {
        [0u8; 32]
    } else {
        Sha256::digest(context_free_data).into()
    };

    let mut hasher = Sha256::new();
    hasher.update(&chain_bytes);
    hasher.update(packed_trx);
    hasher.update(cfd_hash);
    Ok(hasher.finalize().into())
}
