//! Fetch pipeline stage.
//!
//! 1. **Signals:** Per-cycle input/output bundles of the fetch stage.
//! 2. **Fetch:** The fetch-control and misprediction-recovery state machine.

/// Fetch-control state machine.
pub mod fetch;

/// Per-cycle signal bundles.
pub mod signals;

pub use self::fetch::{FetchEngine, is_mispredicted};
pub use self::signals::{
    BranchResolution, FetchInputs, FetchOutputs, FetchState, MemRequest, MemResponse,
};
