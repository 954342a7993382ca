//! # Transaction Packing
//!
//! Binary layout of a transaction body, little-endian throughout:
//!
//! ```text
//! expiration            u32  (seconds since epoch)
//! ref_block_num         u16
//! ref_block_prefix      u32
//! max_net_usage_words   varuint32
//! max_cpu_usage_ms      u8
//! delay_sec             varuint32
//! context_free_actions  vec<action>
//! actions               vec<action>
//! extensions            vec<(u16, bytes)>
//!
//! action = account u64 | name u64 | vec<(actor u64, permission u64)> | bytes
//! ```
//!
//! Vectors and byte strings carry a varuint32 length prefix.

use crate::domain::{Action, PreparationError, Transaction};

/// Append-only little-endian writer.
#[derive(Debug, Default)]
pub struct PackWriter {
    buf: Vec<u8>,
}

impl PackWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one byte.
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Write a `u16`.
    pub fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a `u32`.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a `u64`.
    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a LEB128 varuint32.
    pub fn put_varuint32(&mut self, mut value: u32) {
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.buf.push(byte);
            if value == 0 {
                break;
            }
        }
    }

    /// Write a length-prefixed byte string.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), PreparationError> {
        self.put_len(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Write a varuint32 length prefix.
    pub fn put_len(&mut self, len: usize) -> Result<(), PreparationError> {
        let len = u32::try_from(len)
            .map_err(|_| PreparationError::Parse(format!("length {} exceeds u32", len)))?;
        self.put_varuint32(len);
        Ok(())
    }

    /// Finished bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Pack a transaction body.
///
/// Callers are expected to have checked completeness first; an action
/// without an encoded payload is rejected here as well.
pub fn pack_transaction(tx: &Transaction) -> Result<Vec<u8>, PreparationError> {
    let mut w = PackWriter::new();

    let expiration = u32::try_from(tx.expiration.timestamp()).map_err(|_| {
        PreparationError::Parse(format!("expiration {} out of range", tx.expiration))
    })?;
    let ref_block_prefix = u32::try_from(tx.ref_block_prefix).map_err(|_| {
        PreparationError::Parse(format!(
            "ref_block_prefix {} does not fit in 32 bits",
            tx.ref_block_prefix
        ))
    })?;

    w.put_u32(expiration);
    w.put_u16(tx.ref_block_num);
    w.put_u32(ref_block_prefix);
    w.put_varuint32(tx.max_net_usage_words);
    w.put_u8(tx.max_cpu_usage_ms);
    w.put_varuint32(tx.delay_sec);

    pack_actions(&mut w, &tx.context_free_actions)?;
    pack_actions(&mut w, &tx.actions)?;

    w.put_len(tx.transaction_extensions.len())?;
    for ext in &tx.transaction_extensions {
        w.put_u16(ext.ext_type);
        w.put_bytes(&ext.data)?;
    }

    Ok(w.into_bytes())
}

fn pack_actions(w: &mut PackWriter, actions: &[Action]) -> Result<(), PreparationError> {
    w.put_len(actions.len())?;
    for action in actions {
        let payload = action.encoded_payload().ok_or_else(|| {
            PreparationError::IncompleteTransaction {
                field: format!("encoded payload of action {}::{}", action.account, action.name),
            }
        })?;

        w.put_u64(action.account.to_u64());
        w.put_u64(action.name.to_u64());
        w.put_len(action.authorization.len())?;
        for level in &action.authorization {
            w.put_u64(level.actor.to_u64());
            w.put_u64(level.permission.to_u64());
        }
        w.put_bytes(payload)?;
    }
    Ok(())
}
