//! Misprediction Recovery Tests.
//!
//! Verifies the misprediction oracle against the same-cycle lookup, the
//! flush of speculative entries, the redirect to the resolved target, and
//! predictor training on resolution.

use ifetch_core::core::pipeline::{BranchResolution, FetchState, is_mispredicted};
use ifetch_core::core::units::bru::{Prediction, SaturatingState};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::{FetchBench, word_for};

const HIT_NT: Prediction = Prediction {
    valid: true,
    taken: false,
    target: 0x200,
};
const HIT_T: Prediction = Prediction {
    valid: true,
    taken: true,
    target: 0x200,
};

// ══════════════════════════════════════════════════════════
// 1. Oracle
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(Prediction::MISS, BranchResolution::NONE, false)]
#[case(HIT_T, BranchResolution::NONE, false)]
#[case(Prediction::MISS, BranchResolution::new(0x80, false, 0x200), false)]
#[case(Prediction::MISS, BranchResolution::new(0x80, true, 0x200), true)]
#[case(HIT_NT, BranchResolution::new(0x80, false, 0x200), false)]
#[case(HIT_NT, BranchResolution::new(0x80, true, 0x200), true)]
#[case(HIT_T, BranchResolution::new(0x80, false, 0x200), true)]
#[case(HIT_T, BranchResolution::new(0x80, true, 0x200), false)]
#[case(HIT_T, BranchResolution::new(0x80, true, 0x300), true)]
#[case(HIT_NT, BranchResolution::new(0x80, false, 0x300), false)]
fn oracle_table(
    #[case] prediction: Prediction,
    #[case] resolution: BranchResolution,
    #[case] expected: bool,
) {
    assert_eq!(is_mispredicted(prediction, resolution), expected);
}

// ══════════════════════════════════════════════════════════
// 2. Flush and redirect
// ══════════════════════════════════════════════════════════

/// Trains 0x80 as a not-taken branch to 0x200 and fetches up to it.
fn bench_at_not_taken_branch() -> FetchBench {
    let mut bench = FetchBench::new();
    let _ = bench.step(true, false, BranchResolution::new(0x80, false, 0x200));
    bench.flow_until_request(0x80, 64);
    bench
}

#[test]
fn misprediction_flushes_and_redirects() {
    let mut bench = bench_at_not_taken_branch();

    let out = bench.step(true, false, BranchResolution::new(0x80, true, 0x200));
    assert_eq!(out.prediction, HIT_NT);
    assert!(out.mispredicted);
    assert!(out.flush);
    assert_eq!(out.next_address, 0x200);
    assert_eq!(
        out.next_state,
        FetchState {
            current_address: 0x200,
            request_pending: true
        }
    );

    let out = bench.flow();
    assert_eq!(out.occupancy, 0);
    assert!(out.buffer_empty);
    assert_eq!(out.request.address, 0x200);
    assert!(out.request.read_enable);
    assert!(!out.valid);

    let out = bench.flow();
    assert!(out.valid);
    assert_eq!((out.pc, out.instruction), (0x200, word_for(0x200)));
}

#[test]
fn flush_discards_every_buffered_entry() {
    let mut bench = FetchBench::new();
    let _ = bench.step(false, false, BranchResolution::new(0x80, false, 0x200));
    for _ in 0..5 {
        let _ = bench.step(false, false, BranchResolution::NONE);
    }
    assert_eq!(bench.engine.buffer().occupancy(), 5);

    // Cold taken branch at an unrelated address.
    let out = bench.step(false, false, BranchResolution::new(0x300, true, 0x400));
    assert!(out.flush);
    assert!(out.wrote, "the in-flight response is accepted, then discarded");
    assert!(bench.engine.buffer().empty());
    assert_eq!(bench.engine.request().address, 0x400);
}

#[test]
fn flush_cycle_still_delivers_the_head() {
    let mut bench = FetchBench::new();
    for _ in 0..3 {
        let _ = bench.step(false, false, BranchResolution::NONE);
    }
    let out = bench.step(true, false, BranchResolution::new(0x300, true, 0x400));
    assert!(out.flush);
    assert!(out.valid);
    assert_eq!(out.pc, 4);
}

#[test]
fn resolution_trains_the_predictor() {
    let mut bench = bench_at_not_taken_branch();
    assert_eq!(
        bench.engine.predictor().counter(0x80),
        SaturatingState::StrongNotTaken
    );
    let _ = bench.step(true, false, BranchResolution::new(0x80, true, 0x200));
    assert_eq!(
        bench.engine.predictor().counter(0x80),
        SaturatingState::WeakNotTaken
    );
}

#[test]
fn flush_overrides_stall() {
    let mut bench = bench_at_not_taken_branch();
    let out = bench.step(true, true, BranchResolution::new(0x80, true, 0x200));
    assert!(out.flush);
    assert_eq!(out.next_state.current_address, 0x200);
    assert!(out.next_state.request_pending);
}

#[test]
fn oracle_uses_the_current_fetch_address_not_the_branch() {
    // The lookup is for the address being fetched, so a resolution for a
    // different branch is judged against whatever that lookup returned.
    let mut bench = bench_at_not_taken_branch();
    let _ = bench.flow();
    let out = bench.step(true, false, BranchResolution::new(0x80, false, 0x200));
    assert_eq!(out.prediction, Prediction::MISS);
    assert!(!out.mispredicted);
}
