//! Address Helper Tests.
//!
//! Verifies word alignment, predictor indexing by PC[9:2], word indexing,
//! and the wrapping sequential increment.

use ifetch_core::common::addr::{is_word_aligned, next_sequential, predictor_index, word_index};
use ifetch_core::common::constants::PREDICTOR_ENTRIES;
use proptest::prelude::*;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Alignment
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x0000_0000, true)]
#[case(0x0000_0004, true)]
#[case(0xFFFF_FFFC, true)]
#[case(0x0000_0001, false)]
#[case(0x0000_0002, false)]
#[case(0x0000_0203, false)]
fn alignment(#[case] addr: u32, #[case] aligned: bool) {
    assert_eq!(is_word_aligned(addr), aligned);
}

// ══════════════════════════════════════════════════════════
// 2. Predictor indexing
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x0000_0000, 0)]
#[case(0x0000_0004, 1)]
#[case(0x0000_0040, 16)]
#[case(0x0000_03FC, 255)]
#[case(0x0000_0400, 0)]
#[case(0x0000_0440, 16)]
#[case(0x8000_0080, 32)]
fn predictor_index_uses_bits_9_to_2(#[case] addr: u32, #[case] index: usize) {
    assert_eq!(predictor_index(addr), index);
}

#[test]
fn addresses_1k_apart_alias() {
    assert_eq!(predictor_index(0x40), predictor_index(0x40 + 1024));
    assert_ne!(predictor_index(0x40), predictor_index(0x44));
}

#[test]
fn word_index_divides_by_four() {
    assert_eq!(word_index(0), 0);
    assert_eq!(word_index(4), 1);
    assert_eq!(word_index(0x400), 256);
}

// ══════════════════════════════════════════════════════════
// 3. Sequential increment
// ══════════════════════════════════════════════════════════

#[test]
fn next_sequential_adds_a_word() {
    assert_eq!(next_sequential(0x100), 0x104);
}

#[test]
fn next_sequential_wraps_at_top_of_address_space() {
    assert_eq!(next_sequential(0xFFFF_FFFC), 0);
}

proptest! {
    #[test]
    fn index_always_in_table(addr in any::<u32>()) {
        prop_assert!(predictor_index(addr) < PREDICTOR_ENTRIES);
    }

    #[test]
    fn sequential_preserves_alignment(word in any::<u32>()) {
        let addr = word & !3;
        prop_assert!(is_word_aligned(next_sequential(addr)));
    }
}
