//! Contract Checker Tests.
//!
//! Verifies that each contract breach is reported with its cycle, and that a
//! clean run records nothing.

use ifetch_core::common::ContractViolation;
use ifetch_core::core::pipeline::{FetchInputs, FetchOutputs, FetchState, MemRequest};
use ifetch_core::sim::{ContractChecker, FetchObserver};
use pretty_assertions::assert_eq;

use crate::common::harness::FetchBench;

#[test]
fn clean_outputs_pass() {
    assert!(ContractChecker::check(0, &FetchOutputs::default()).is_empty());
}

#[test]
fn misaligned_request_is_reported() {
    let out = FetchOutputs {
        request: MemRequest {
            address: 0x42,
            read_enable: true,
        },
        ..FetchOutputs::default()
    };
    assert_eq!(
        ContractChecker::check(7, &out),
        vec![ContractViolation::MisalignedRequest {
            cycle: 7,
            address: 0x42
        }]
    );
}

#[test]
fn misaligned_idle_request_is_ignored() {
    let out = FetchOutputs {
        request: MemRequest {
            address: 0x42,
            read_enable: false,
        },
        ..FetchOutputs::default()
    };
    assert!(ContractChecker::check(0, &out).is_empty());
}

#[test]
fn misaligned_redirect_is_reported() {
    let out = FetchOutputs {
        flush: true,
        mispredicted: true,
        next_state: FetchState {
            current_address: 0x101,
            request_pending: true,
        },
        ..FetchOutputs::default()
    };
    assert_eq!(
        ContractChecker::check(3, &out),
        vec![ContractViolation::MisalignedRedirect {
            cycle: 3,
            target: 0x101
        }]
    );
}

#[test]
fn buffer_breaches_are_reported() {
    let out = FetchOutputs {
        buffer_full: true,
        buffer_empty: true,
        occupancy: 9,
        wrote: true,
        ..FetchOutputs::default()
    };
    assert_eq!(
        ContractChecker::check(1, &out),
        vec![
            ContractViolation::FullAndEmpty { cycle: 1 },
            ContractViolation::OccupancyOutOfRange {
                cycle: 1,
                occupancy: 9,
                depth: 8
            },
            ContractViolation::WriteWhileFull { cycle: 1 },
        ]
    );
}

#[test]
fn observer_accumulates_violations() {
    let mut checker = ContractChecker::new();
    let bad = FetchOutputs {
        buffer_full: true,
        buffer_empty: true,
        ..FetchOutputs::default()
    };
    checker.on_cycle(4, &FetchInputs::default(), &FetchOutputs::default());
    checker.on_cycle(5, &FetchInputs::default(), &bad);
    checker.on_cycle(6, &FetchInputs::default(), &bad);
    assert_eq!(checker.violations().len(), 2);
    assert_eq!(checker.first_violation().map(ContractViolation::cycle), Some(5));
    assert!(!checker.is_clean());
    checker.clear();
    assert!(checker.is_clean());
}

#[test]
fn real_engine_run_is_clean() {
    let mut bench = FetchBench::new();
    let mut checker = ContractChecker::new();
    for cycle in 0..64 {
        let inputs = bench.inputs(cycle % 3 == 0, cycle % 7 == 6, Default::default());
        let out = bench.step_with(&inputs);
        checker.on_cycle(cycle, &inputs, &out);
    }
    assert!(checker.is_clean(), "{:?}", checker.violations());
}
