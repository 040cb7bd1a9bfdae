//! Randomized Fetch Engine Properties.
//!
//! Drives the engine with random memory readiness, consume, stall, and
//! branch resolutions, and checks the invariants that must hold on every
//! cycle regardless of input.

use ifetch_core::common::addr::is_word_aligned;
use ifetch_core::core::pipeline::{BranchResolution, FetchInputs, MemResponse};
use ifetch_core::core::units::prefetch::PrefetchBuffer;
use proptest::prelude::*;

use crate::common::harness::{FetchBench, word_for};

#[derive(Clone, Debug)]
struct Stimulus {
    ready: bool,
    consume: bool,
    stall: bool,
    resolution: BranchResolution,
}

fn resolution() -> impl Strategy<Value = BranchResolution> {
    prop_oneof![
        8 => Just(BranchResolution::NONE),
        2 => (0u32..64, any::<bool>(), 0u32..64).prop_map(|(pc, taken, target)| {
            BranchResolution::new(pc * 4, taken, target * 4)
        }),
    ]
}

fn stimulus() -> impl Strategy<Value = Stimulus> {
    (
        proptest::bool::weighted(0.8),
        proptest::bool::weighted(0.6),
        proptest::bool::weighted(0.15),
        resolution(),
    )
        .prop_map(|(ready, consume, stall, resolution)| Stimulus {
            ready,
            consume,
            stall,
            resolution,
        })
}

fn run(stimuli: &[Stimulus]) -> FetchBench {
    let mut bench = FetchBench::new();
    for s in stimuli {
        let request = bench.engine.request();
        let inputs = FetchInputs {
            reset: false,
            memory: MemResponse {
                data: word_for(request.address),
                ready: s.ready,
            },
            consume: s.consume,
            stall: s.stall,
            resolution: s.resolution,
        };
        let _ = bench.step_with(&inputs);
    }
    bench
}

proptest! {
    #[test]
    fn requests_are_always_word_aligned(stimuli in proptest::collection::vec(stimulus(), 1..300)) {
        let bench = run(&stimuli);
        for out in &bench.history {
            prop_assert!(!out.request.read_enable || is_word_aligned(out.request.address));
            prop_assert!(is_word_aligned(out.next_state.current_address));
        }
    }

    #[test]
    fn buffer_stays_in_bounds(stimuli in proptest::collection::vec(stimulus(), 1..300)) {
        let bench = run(&stimuli);
        for out in &bench.history {
            prop_assert!(out.occupancy <= PrefetchBuffer::DEPTH);
            prop_assert!(!(out.buffer_full && out.buffer_empty));
            prop_assert!(!(out.wrote && out.buffer_full));
            prop_assert!(!(out.valid && out.buffer_empty));
        }
    }

    #[test]
    fn flush_clears_speculation_by_next_cycle(stimuli in proptest::collection::vec(stimulus(), 2..300)) {
        let bench = run(&stimuli);
        for (cycle, pair) in bench.history.windows(2).enumerate() {
            let (now, next) = (pair[0], pair[1]);
            prop_assert_eq!(now.flush, now.mispredicted);
            if now.flush {
                let target = stimuli[cycle].resolution.target;
                prop_assert_eq!(next.occupancy, 0);
                prop_assert!(next.request.read_enable);
                prop_assert_eq!(next.request.address, target);
            }
        }
    }

    #[test]
    fn deliveries_carry_the_word_fetched_for_their_address(stimuli in proptest::collection::vec(stimulus(), 1..300)) {
        let bench = run(&stimuli);
        for out in bench.history.iter().filter(|o| o.valid) {
            prop_assert_eq!(out.instruction, word_for(out.pc));
        }
    }
}
