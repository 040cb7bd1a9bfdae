//! Contract checker.
//!
//! Validates the fetch core's external contract after every cycle:
//! 1. **Alignment:** Asserted requests and flush redirect targets are word-aligned.
//! 2. **Bounds:** Occupancy stays within `0..=DEPTH`.
//! 3. **Exclusivity:** The buffer is never full and empty at once.
//! 4. **Backpressure:** No memory response is stored while the buffer is full.

use tracing::warn;

use super::observer::FetchObserver;
use crate::common::addr::is_word_aligned;
use crate::common::constants::PREFETCH_DEPTH;
use crate::common::error::ContractViolation;
use crate::core::pipeline::{FetchInputs, FetchOutputs};

/// Observer recording every contract violation.
#[derive(Clone, Debug, Default)]
pub struct ContractChecker {
    violations: Vec<ContractViolation>,
}

impl ContractChecker {
    /// Creates a checker with no recorded violations.
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Checks one cycle and returns the violations it produced.
    pub fn check(cycle: u64, outputs: &FetchOutputs) -> Vec<ContractViolation> {
        let mut found = Vec::new();
        if outputs.request.read_enable && !is_word_aligned(outputs.request.address) {
            found.push(ContractViolation::MisalignedRequest {
                cycle,
                address: outputs.request.address,
            });
        }
        if outputs.flush && !is_word_aligned(outputs.next_state.current_address) {
            found.push(ContractViolation::MisalignedRedirect {
                cycle,
                target: outputs.next_state.current_address,
            });
        }
        if outputs.buffer_full && outputs.buffer_empty {
            found.push(ContractViolation::FullAndEmpty { cycle });
        }
        if outputs.occupancy > PREFETCH_DEPTH {
            found.push(ContractViolation::OccupancyOutOfRange {
                cycle,
                occupancy: outputs.occupancy,
                depth: PREFETCH_DEPTH,
            });
        }
        if outputs.wrote && outputs.buffer_full {
            found.push(ContractViolation::WriteWhileFull { cycle });
        }
        found
    }

    /// Every violation seen so far, in cycle order.
    pub fn violations(&self) -> &[ContractViolation] {
        &self.violations
    }

    /// The earliest violation, if any.
    pub fn first_violation(&self) -> Option<&ContractViolation> {
        self.violations.first()
    }

    /// `true` while no violation has been recorded.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Forgets recorded violations.
    pub fn clear(&mut self) {
        self.violations.clear();
    }
}

impl FetchObserver for ContractChecker {
    fn on_cycle(&mut self, cycle: u64, _inputs: &FetchInputs, outputs: &FetchOutputs) {
        for violation in Self::check(cycle, outputs) {
            warn!("{violation}");
            self.violations.push(violation);
        }
    }
}
