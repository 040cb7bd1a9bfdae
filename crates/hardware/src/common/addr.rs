//! Instruction address helpers.
//!
//! Fetch addresses are plain `u32` bus values. These helpers centralize the
//! bit slicing that the predictor, the memory port, and the checker all share:
//! 1. **Alignment:** Word-alignment tests and sequential advance.
//! 2. **Indexing:** Predictor table index (PC\[9:2\]) and memory word index.

use super::constants::{PREDICTOR_INDEX_MASK, WORD_ALIGN_MASK, WORD_BYTES, WORD_SHIFT};

/// Returns `true` when `addr` is a multiple of the instruction word size.
#[inline(always)]
pub const fn is_word_aligned(addr: u32) -> bool {
    addr & WORD_ALIGN_MASK == 0
}

/// Predictor table index for `addr`: bits \[9:2\].
#[inline(always)]
pub const fn predictor_index(addr: u32) -> usize {
    ((addr >> WORD_SHIFT) & PREDICTOR_INDEX_MASK) as usize
}

/// Word slot of `addr` in a word-addressed memory image.
#[inline(always)]
pub const fn word_index(addr: u32) -> usize {
    (addr >> WORD_SHIFT) as usize
}

/// Address of the next sequential instruction word. Wraps at the top of the
/// 32-bit address space like the hardware adder.
#[inline(always)]
pub const fn next_sequential(addr: u32) -> u32 {
    addr.wrapping_add(WORD_BYTES)
}
