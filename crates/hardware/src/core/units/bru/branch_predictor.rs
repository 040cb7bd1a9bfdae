//! Bimodal branch predictor with a direct-mapped target cache.
//!
//! The predictor pairs two fixed-size tables indexed by PC\[9:2\]:
//! 1. **Direction table:** One [`SaturatingState`] per slot.
//! 2. **Target cache:** A [`Btb`] holding tag, target, and valid bit per slot.
//!
//! Lookups are single-cycle and side-effect free. Every resolved branch
//! allocates its slot, whether it was taken or not, and aliasing between
//! addresses that share an index is not corrected.
//!
//! # Performance
//!
//! - **Time Complexity:** `predict()` and `update()` are O(1).
//! - **Space Complexity:** 256 direction counters and 256 BTB entries.

use serde::Serialize;

use super::btb::Btb;
use super::counter::SaturatingState;
use crate::common::addr::predictor_index;
use crate::common::constants::PREDICTOR_ENTRIES;

/// Result of a predictor lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Prediction {
    /// The lookup hit a valid slot whose tag equals the fetch address.
    pub valid: bool,
    /// Predicted direction; `false` on a miss.
    pub taken: bool,
    /// Cached target; `0` on a miss.
    pub target: u32,
}

impl Prediction {
    /// The all-zero result returned on a miss or when lookups are disabled.
    pub const MISS: Self = Self {
        valid: false,
        taken: false,
        target: 0,
    };

    /// Returns `true` for a hit that predicts a taken branch.
    pub const fn redirects(&self) -> bool {
        self.valid && self.taken
    }
}

/// Combined view of one predictor slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PredictorEntry {
    /// Direction counter.
    pub counter: SaturatingState,
    /// Cached target.
    pub target: u32,
    /// Address of the branch that last trained this slot.
    pub tag: u32,
    /// Set once any resolved branch has mapped to this slot.
    pub valid: bool,
}

/// Direct-mapped bimodal predictor.
#[derive(Clone, Debug)]
pub struct BranchPredictor {
    counters: [SaturatingState; PREDICTOR_ENTRIES],
    btb: Btb,
}

impl Default for BranchPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchPredictor {
    /// Creates a predictor in its reset state: every counter weakly
    /// not-taken, every target slot invalid.
    pub const fn new() -> Self {
        Self {
            counters: [SaturatingState::WeakNotTaken; PREDICTOR_ENTRIES],
            btb: Btb::new(),
        }
    }

    /// Predicts direction and target for a fetch at `address`.
    ///
    /// # Arguments
    ///
    /// * `address` - Fetch address being looked up.
    /// * `enabled` - Lookup enable; a disabled lookup always misses.
    ///
    /// # Returns
    ///
    /// A hit when the slot is valid and tagged with exactly `address`;
    /// otherwise [`Prediction::MISS`].
    pub fn predict(&self, address: u32, enabled: bool) -> Prediction {
        if !enabled {
            return Prediction::MISS;
        }
        self.btb
            .lookup(address)
            .map_or(Prediction::MISS, |target| Prediction {
                valid: true,
                taken: self.counters[predictor_index(address)].predicts_taken(),
                target,
            })
    }

    /// Trains the slot for `address` with a resolved outcome.
    ///
    /// The target cache slot is overwritten on every enabled update; the
    /// direction counter moves one step toward `taken`.
    ///
    /// # Arguments
    ///
    /// * `enabled` - Update enable (the resolution-valid strobe).
    /// * `address` - Address of the resolved branch.
    /// * `taken` - Resolved direction.
    /// * `target` - Resolved target.
    pub fn update(&mut self, enabled: bool, address: u32, taken: bool, target: u32) {
        if !enabled {
            return;
        }
        let idx = predictor_index(address);
        self.btb.update(address, target);
        self.counters[idx] = self.counters[idx].train(taken);
    }

    /// Restores every slot to its reset state.
    pub fn reset(&mut self) {
        self.counters = [SaturatingState::WeakNotTaken; PREDICTOR_ENTRIES];
        self.btb.clear();
    }

    /// Direction counter currently held for `address`'s slot.
    pub fn counter(&self, address: u32) -> SaturatingState {
        self.counters[predictor_index(address)]
    }

    /// Full contents of slot `index` (taken modulo the table size).
    pub fn entry(&self, index: usize) -> PredictorEntry {
        let idx = index % PREDICTOR_ENTRIES;
        let btb = self.btb.entry(idx);
        PredictorEntry {
            counter: self.counters[idx],
            target: btb.target,
            tag: btb.tag,
            valid: btb.valid,
        }
    }
}
