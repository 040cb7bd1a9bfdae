//! Fetch Engine: address generation, buffering, and misprediction recovery.
//!
//! The engine owns the branch predictor and the prefetch buffer and advances
//! them one cycle per [`FetchEngine::step`]. Each step performs:
//! 1. **Prediction:** Looks up the current fetch address (only while a request is pending).
//! 2. **Resolution Check:** Compares an incoming resolved branch against that same lookup.
//! 3. **Next-PC Select:** Redirect target, predicted target, or the sequential address.
//! 4. **Buffering:** Stores the memory response and serves the downstream read.
//! 5. **Recovery:** Flushes the buffer on a misprediction and retrains the predictor.
//! 6. **Register Update:** Commits fetch state, buffer, and predictor together.
//!
//! All decisions in a step read state committed by the previous step, so a
//! flush or a predictor update first becomes visible on the following cycle.

use tracing::{debug, trace};

use super::signals::{BranchResolution, FetchInputs, FetchOutputs, FetchState, MemRequest};
use crate::common::addr::next_sequential;
use crate::common::constants::RESET_ADDRESS;
use crate::core::units::bru::{BranchPredictor, Prediction};
use crate::core::units::prefetch::PrefetchBuffer;

/// Instruction-fetch control state machine.
///
/// # Examples
///
/// ```
/// use ifetch_core::core::pipeline::{FetchEngine, FetchInputs, MemResponse};
///
/// let mut engine = FetchEngine::new();
/// // Out of reset no request is pending; the first step arms one.
/// let out = engine.step(&FetchInputs::default());
/// assert!(!out.request.read_enable);
/// assert_eq!(engine.request().address, 4);
///
/// let inputs = FetchInputs {
///     memory: MemResponse { data: 0x13, ready: true },
///     ..FetchInputs::default()
/// };
/// let out = engine.step(&inputs);
/// assert!(out.wrote);
/// assert_eq!(engine.buffer().occupancy(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct FetchEngine {
    state: FetchState,
    predictor: BranchPredictor,
    buffer: PrefetchBuffer,
    cycle: u64,
}

impl FetchEngine {
    /// Creates an engine in its reset state.
    pub const fn new() -> Self {
        Self {
            state: FetchState {
                current_address: RESET_ADDRESS,
                request_pending: false,
            },
            predictor: BranchPredictor::new(),
            buffer: PrefetchBuffer::new(),
            cycle: 0,
        }
    }

    /// Returns every component to its reset state.
    ///
    /// The cycle counter is not part of the design state: it measures
    /// simulated time and keeps running across resets.
    pub fn reset(&mut self) {
        self.state = FetchState {
            current_address: RESET_ADDRESS,
            request_pending: false,
        };
        self.predictor.reset();
        self.buffer.reset();
    }

    /// The memory request driven this cycle (from registered state).
    pub const fn request(&self) -> MemRequest {
        MemRequest {
            address: self.state.current_address,
            read_enable: self.state.request_pending,
        }
    }

    /// Registered fetch state.
    pub const fn state(&self) -> FetchState {
        self.state
    }

    /// Read-only view of the branch predictor.
    pub const fn predictor(&self) -> &BranchPredictor {
        &self.predictor
    }

    /// Read-only view of the prefetch buffer.
    pub const fn buffer(&self) -> &PrefetchBuffer {
        &self.buffer
    }

    /// Number of steps taken since construction, resets included.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Advances the engine by one clock cycle.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Signals sampled this cycle.
    ///
    /// # Returns
    ///
    /// The signals driven and decisions taken during the cycle.
    pub fn step(&mut self, inputs: &FetchInputs) -> FetchOutputs {
        let cycle = self.cycle;
        self.cycle += 1;

        let request = self.request();
        let buffer_full = self.buffer.full();
        let buffer_empty = self.buffer.empty();
        let occupancy = self.buffer.occupancy();

        if inputs.reset {
            self.reset();
            return FetchOutputs {
                request,
                buffer_full,
                buffer_empty,
                occupancy,
                next_state: self.state,
                ..FetchOutputs::default()
            };
        }

        let current = self.state.current_address;
        let issuing = self.state.request_pending;
        let resolution = inputs.resolution;

        let prediction = self.predictor.predict(current, issuing);
        let mispredicted = is_mispredicted(prediction, resolution);
        let flush = mispredicted;

        let next_address = if mispredicted {
            resolution.target
        } else if prediction.redirects() {
            prediction.target
        } else {
            next_sequential(current)
        };

        let write_intent = inputs.memory.ready && issuing;
        let wrote = write_intent && self.buffer.try_write(inputs.memory.data, current);
        let dropped = write_intent && !wrote;

        let delivered = if inputs.consume && !inputs.stall {
            self.buffer.try_read()
        } else {
            None
        };

        if flush {
            debug!(
                cycle,
                predicted_hit = prediction.valid,
                predicted_taken = prediction.taken,
                discarded = occupancy,
                "misprediction at {:#010x}: redirecting to {:#010x}",
                resolution.branch_address,
                resolution.target
            );
            self.buffer.flush();
        }

        self.predictor.update(
            resolution.resolved,
            resolution.branch_address,
            resolution.taken,
            resolution.target,
        );

        // Unassigned branches hold the previous register values.
        let prev = self.state;
        self.state = if flush {
            FetchState {
                current_address: resolution.target,
                request_pending: true,
            }
        } else if !inputs.stall && !buffer_full {
            FetchState {
                current_address: next_address,
                request_pending: true,
            }
        } else if buffer_full {
            if prev.request_pending {
                debug!(cycle, "prefetch buffer full: request de-asserted");
            }
            FetchState {
                current_address: prev.current_address,
                request_pending: false,
            }
        } else {
            prev
        };

        self.buffer.commit();

        trace!(
            cycle,
            req = issuing,
            occupancy = self.buffer.occupancy(),
            hit = prediction.valid,
            flush,
            "fetch {:#010x} -> {:#010x}",
            current,
            self.state.current_address
        );

        FetchOutputs {
            request,
            instruction: delivered.map_or(0, |e| e.word),
            pc: delivered.map_or(0, |e| e.address),
            valid: delivered.is_some(),
            prediction,
            mispredicted,
            flush,
            next_address,
            wrote,
            dropped,
            buffer_full,
            buffer_empty,
            occupancy,
            next_state: self.state,
        }
    }
}

/// Compares a resolved branch against this cycle's fresh lookup.
///
/// On a hit, a direction mismatch or a taken branch with a different target
/// mispredicts. On a miss, any taken branch mispredicts.
pub const fn is_mispredicted(prediction: Prediction, resolution: BranchResolution) -> bool {
    if !resolution.resolved {
        return false;
    }
    if prediction.valid {
        resolution.taken != prediction.taken
            || (resolution.taken && resolution.target != prediction.target)
    } else {
        resolution.taken
    }
}
