//! Reference-block (TAPOS) arithmetic.

use crate::domain::REF_BLOCK_NUM_MASK;

/// Block to bind to: `head - min(blocks_behind, head)`.
///
/// The look-back is clamped at genesis so a young chain never underflows.
pub fn reference_block_target(head_block_num: u64, blocks_behind: u64) -> u64 {
    head_block_num - blocks_behind.min(head_block_num)
}

/// Lower 16 bits of a block number, as carried in `ref_block_num`.
pub fn truncate_ref_block_num(block_num: u64) -> u16 {
    (block_num & REF_BLOCK_NUM_MASK) as u16
}
