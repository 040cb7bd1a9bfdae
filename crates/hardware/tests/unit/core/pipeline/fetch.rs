//! Fetch Engine Tests.
//!
//! Verifies reset behaviour, sequential address generation, delivery
//! ordering, cold predictor misses, and predicted-taken redirects.

use ifetch_core::core::pipeline::{
    BranchResolution, FetchEngine, FetchInputs, FetchState, MemRequest,
};
use ifetch_core::core::units::bru::Prediction;
use pretty_assertions::assert_eq;

use crate::common::harness::{FetchBench, word_for};

// ══════════════════════════════════════════════════════════
// 1. Reset
// ══════════════════════════════════════════════════════════

#[test]
fn out_of_reset_no_request_is_pending() {
    let engine = FetchEngine::new();
    assert_eq!(engine.request(), MemRequest::IDLE);
    assert_eq!(engine.cycle(), 0);
}

#[test]
fn first_cycle_arms_request_at_four() {
    let mut bench = FetchBench::new();
    let out = bench.flow();
    assert!(!out.request.read_enable);
    assert!(!out.wrote);
    assert_eq!(out.prediction, Prediction::MISS);
    assert_eq!(out.next_address, 4);
    assert_eq!(
        out.next_state,
        FetchState {
            current_address: 4,
            request_pending: true
        }
    );
}

#[test]
fn reset_clears_buffer_predictor_and_request() {
    let mut bench = FetchBench::new();
    for _ in 0..5 {
        let _ = bench.step(false, false, BranchResolution::NONE);
    }
    let _ = bench.step(false, false, BranchResolution::new(0x40, false, 0x100));
    assert!(bench.engine.buffer().occupancy() > 0);
    assert!(bench.engine.predictor().predict(0x40, true).valid);

    let out = bench.step_with(&FetchInputs {
        reset: true,
        ..FetchInputs::default()
    });
    assert!(!out.wrote && !out.valid && !out.flush);
    assert_eq!(out.next_state, FetchState::default());
    assert_eq!(bench.engine.request(), MemRequest::IDLE);
    assert!(bench.engine.buffer().empty());
    assert_eq!(bench.engine.predictor().predict(0x40, true), Prediction::MISS);

    let out = bench.flow();
    assert_eq!(out.next_state.current_address, 4);
}

#[test]
fn cycle_counter_runs_across_reset() {
    let mut bench = FetchBench::new();
    for _ in 0..5 {
        let _ = bench.flow();
    }
    let _ = bench.step_with(&FetchInputs {
        reset: true,
        ..FetchInputs::default()
    });
    assert_eq!(bench.engine.cycle(), 6);

    bench.engine.reset();
    assert_eq!(bench.engine.cycle(), 6);
}

#[test]
fn reset_ignores_same_cycle_resolution() {
    let mut bench = FetchBench::new();
    let out = bench.step_with(&FetchInputs {
        reset: true,
        resolution: BranchResolution::new(0x40, true, 0x100),
        ..FetchInputs::default()
    });
    assert!(!out.mispredicted);
    assert_eq!(bench.engine.predictor().predict(0x40, true), Prediction::MISS);
}

// ══════════════════════════════════════════════════════════
// 2. Sequential fetch and delivery
// ══════════════════════════════════════════════════════════

#[test]
fn requests_advance_by_one_word_per_cycle() {
    let mut bench = FetchBench::new();
    let requested: Vec<u32> = (0..8)
        .map(|_| bench.flow())
        .filter(|o| o.request.read_enable)
        .map(|o| o.request.address)
        .collect();
    assert_eq!(requested, vec![4, 8, 12, 16, 20, 24, 28]);
}

#[test]
fn delivery_follows_write_by_one_cycle() {
    let mut bench = FetchBench::new();
    for _ in 0..6 {
        let _ = bench.flow();
    }
    let delivered: Vec<(u32, u32)> = bench
        .history
        .iter()
        .filter(|o| o.valid)
        .map(|o| (o.pc, o.instruction))
        .collect();
    assert_eq!(
        delivered,
        [4, 8, 12, 16].iter().map(|&pc| (pc, word_for(pc))).collect::<Vec<_>>()
    );
    // A read and a write every cycle keep one word in flight.
    assert!(bench.history[2..].iter().all(|o| o.occupancy == 1));
}

#[test]
fn consume_without_data_delivers_nothing() {
    let mut bench = FetchBench::new();
    let out = bench.flow();
    assert!(!out.valid);
    assert_eq!((out.pc, out.instruction), (0, 0));
    assert!(out.buffer_empty);
}

// ══════════════════════════════════════════════════════════
// 3. Prediction
// ══════════════════════════════════════════════════════════

#[test]
fn cold_miss_continues_sequentially() {
    let mut bench = FetchBench::new();
    bench.flow_until_request(0x40, 32);
    let out = bench.flow();
    assert_eq!(out.request.address, 0x40);
    assert_eq!(out.prediction, Prediction::MISS);
    assert!(!out.mispredicted);
    assert_eq!(out.next_address, 0x44);
    assert_eq!(bench.engine.request().address, 0x44);
}

#[test]
fn predicted_taken_branch_redirects_without_flush() {
    let mut bench = FetchBench::new();
    bench.flow_until_request(0x40, 32);

    // Cold taken resolution: a miss, so it redirects and trains the slot.
    let out = bench.step(true, false, BranchResolution::new(0x40, true, 0x100));
    assert!(out.mispredicted);
    assert_eq!(bench.engine.request().address, 0x100);

    // Jump back to 0x40 from an unrelated branch.
    let out = bench.step(true, false, BranchResolution::new(0x200, true, 0x40));
    assert!(out.flush);
    assert_eq!(bench.engine.request().address, 0x40);

    let out = bench.flow();
    assert_eq!(
        out.prediction,
        Prediction {
            valid: true,
            taken: true,
            target: 0x100
        }
    );
    assert!(!out.flush);
    assert_eq!(out.next_address, 0x100);
    assert_eq!(bench.engine.request().address, 0x100);
}

#[test]
fn matching_resolution_does_not_flush() {
    let mut bench = FetchBench::new();
    bench.flow_until_request(0x40, 32);
    let _ = bench.step(true, false, BranchResolution::new(0x40, true, 0x100));
    let _ = bench.step(true, false, BranchResolution::new(0x200, true, 0x40));

    let out = bench.step(true, false, BranchResolution::new(0x40, true, 0x100));
    assert!(out.prediction.redirects());
    assert!(!out.mispredicted);
    assert!(!out.flush);
    assert_eq!(bench.engine.request().address, 0x100);
}

#[test]
fn not_taken_resolution_on_miss_is_not_a_misprediction() {
    let mut bench = FetchBench::new();
    let _ = bench.flow();
    let out = bench.step(true, false, BranchResolution::new(0x80, false, 0x200));
    assert!(!out.mispredicted);
    assert_eq!(out.next_address, 8);
}
