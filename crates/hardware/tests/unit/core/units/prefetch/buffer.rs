//! Prefetch Buffer Tests.
//!
//! Verifies FIFO ordering, the same-cycle read/write counter rule, boundary
//! behaviour at empty and full, flush precedence, and agreement with a
//! reference queue under random intent sequences.

use std::collections::VecDeque;

use ifetch_core::core::units::prefetch::{BufferEntry, PrefetchBuffer};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const DEPTH: usize = PrefetchBuffer::DEPTH;

fn entry(i: u32) -> BufferEntry {
    BufferEntry {
        address: i * 4,
        word: 0x1000 + i,
    }
}

/// Writes `n` entries, one per cycle.
fn filled(n: u32) -> PrefetchBuffer {
    let mut buf = PrefetchBuffer::new();
    for i in 0..n {
        let e = entry(i);
        assert!(buf.try_write(e.word, e.address));
        buf.commit();
    }
    buf
}

// ══════════════════════════════════════════════════════════
// 1. Basic FIFO behaviour
// ══════════════════════════════════════════════════════════

#[test]
fn new_buffer_is_empty() {
    let buf = PrefetchBuffer::new();
    assert!(buf.empty());
    assert!(!buf.full());
    assert_eq!(buf.occupancy(), 0);
    assert_eq!(buf.peek(), None);
}

#[test]
fn write_is_visible_after_commit() {
    let mut buf = PrefetchBuffer::new();
    assert!(buf.try_write(0xAB, 0x40));
    assert_eq!(buf.occupancy(), 0, "staged write is not yet committed");
    buf.commit();
    assert_eq!(buf.occupancy(), 1);
    assert_eq!(
        buf.peek(),
        Some(BufferEntry {
            address: 0x40,
            word: 0xAB
        })
    );
}

#[test]
fn reads_come_out_in_write_order() {
    let mut buf = filled(5);
    let mut out = Vec::new();
    while let Some(e) = buf.try_read() {
        out.push(e);
        buf.commit();
    }
    assert_eq!(out, (0..5).map(entry).collect::<Vec<_>>());
    assert!(buf.empty());
}

#[test]
fn read_of_empty_buffer_is_illegal() {
    let mut buf = PrefetchBuffer::new();
    assert_eq!(buf.try_read(), None);
    buf.commit();
    assert_eq!(buf.occupancy(), 0);
}

#[test]
fn second_write_in_one_cycle_is_rejected() {
    let mut buf = PrefetchBuffer::new();
    assert!(buf.try_write(1, 0));
    assert!(!buf.try_write(2, 4));
    buf.commit();
    assert_eq!(buf.entries().collect::<Vec<_>>(), vec![BufferEntry { address: 0, word: 1 }]);
}

// ══════════════════════════════════════════════════════════
// 2. Boundaries and same-cycle read/write
// ══════════════════════════════════════════════════════════

#[test]
fn fills_to_depth_and_rejects_further_writes() {
    let mut buf = filled(DEPTH as u32);
    assert!(buf.full());
    assert!(!buf.empty());
    assert!(!buf.try_write(0xFF, 0xFC));
    buf.commit();
    assert_eq!(buf.occupancy(), DEPTH);
    assert_eq!(buf.peek(), Some(entry(0)), "rejected write leaves contents untouched");
}

#[test]
fn simultaneous_read_and_write_keeps_occupancy() {
    let mut buf = filled(3);
    let head = buf.try_read();
    assert!(buf.try_write(0x99, 0x300));
    buf.commit();
    assert_eq!(head, Some(entry(0)));
    assert_eq!(buf.occupancy(), 3);
    assert_eq!(
        buf.entries().collect::<Vec<_>>(),
        vec![entry(1), entry(2), BufferEntry { address: 0x300, word: 0x99 }]
    );
}

#[test]
fn read_and_write_when_empty_only_writes() {
    let mut buf = PrefetchBuffer::new();
    assert_eq!(buf.try_read(), None);
    assert!(buf.try_write(7, 0x10));
    buf.commit();
    assert_eq!(buf.occupancy(), 1);
}

#[test]
fn read_and_write_when_full_only_reads() {
    let mut buf = filled(DEPTH as u32);
    assert_eq!(buf.try_read(), Some(entry(0)));
    assert!(!buf.try_write(7, 0x10));
    buf.commit();
    assert_eq!(buf.occupancy(), DEPTH - 1);
}

#[test]
fn ring_wraps_around() {
    let mut buf = filled(DEPTH as u32);
    for i in DEPTH as u32..(3 * DEPTH as u32) {
        let head = buf.try_read().unwrap();
        assert_eq!(head, entry(i - DEPTH as u32));
        buf.commit();
        let e = entry(i);
        assert!(buf.try_write(e.word, e.address));
        buf.commit();
    }
    assert!(buf.full());
}

// ══════════════════════════════════════════════════════════
// 3. Flush
// ══════════════════════════════════════════════════════════

#[test]
fn flush_empties_at_commit() {
    let mut buf = filled(6);
    buf.flush();
    assert_eq!(buf.occupancy(), 6, "flush takes effect at the boundary");
    buf.commit();
    assert!(buf.empty());
    assert_eq!(buf.peek(), None);
}

#[test]
fn flush_overrides_same_cycle_write_and_read() {
    let mut buf = filled(4);
    assert!(buf.try_read().is_some());
    assert!(buf.try_write(0x55, 0x500));
    buf.flush();
    buf.commit();
    assert_eq!(buf.occupancy(), 0);
    assert_eq!(buf.entries().count(), 0);
}

#[test]
fn flush_of_full_buffer_allows_writes_next_cycle() {
    let mut buf = filled(DEPTH as u32);
    buf.flush();
    buf.commit();
    assert!(buf.try_write(1, 0x200));
    buf.commit();
    assert_eq!(buf.peek(), Some(BufferEntry { address: 0x200, word: 1 }));
}

// ══════════════════════════════════════════════════════════
// 4. Reference model
// ══════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
struct Intent {
    write: Option<u32>,
    read: bool,
    flush: bool,
}

fn intent() -> impl Strategy<Value = Intent> {
    (
        proptest::option::weighted(0.6, any::<u32>()),
        proptest::bool::weighted(0.4),
        proptest::bool::weighted(0.05),
    )
        .prop_map(|(write, read, flush)| Intent { write, read, flush })
}

proptest! {
    #[test]
    fn matches_reference_queue(intents in proptest::collection::vec(intent(), 1..200)) {
        let mut buf = PrefetchBuffer::new();
        let mut model: VecDeque<BufferEntry> = VecDeque::new();

        for (cycle, i) in intents.iter().enumerate() {
            let start_len = model.len();
            let expected_head = model.front().copied();

            let got_head = if i.read { buf.try_read() } else { None };
            let wrote = i.write.map(|w| buf.try_write(w, cycle as u32 * 4));
            if i.flush {
                buf.flush();
            }
            buf.commit();

            if i.read {
                prop_assert_eq!(got_head, expected_head);
            }
            if let Some(accepted) = wrote {
                prop_assert_eq!(accepted, start_len < DEPTH);
            }

            if i.flush {
                model.clear();
            } else {
                if i.read && start_len > 0 {
                    let _ = model.pop_front();
                }
                if let Some(w) = i.write {
                    if start_len < DEPTH {
                        model.push_back(BufferEntry { address: cycle as u32 * 4, word: w });
                    }
                }
            }

            prop_assert_eq!(buf.occupancy(), model.len());
            prop_assert!(buf.occupancy() <= DEPTH);
            prop_assert!(!(buf.full() && buf.empty()));
            prop_assert_eq!(buf.entries().collect::<Vec<_>>(), model.iter().copied().collect::<Vec<_>>());
        }
    }
}
