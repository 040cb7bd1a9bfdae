//! Branch prediction unit (BRU).
//!
//! This module contains the fetch core's branch predictor: a bimodal
//! direction table of two-bit saturating counters paired with a
//! direct-mapped branch target buffer (BTB).

pub use self::branch_predictor::{BranchPredictor, Prediction, PredictorEntry};
pub use self::counter::SaturatingState;

/// Bimodal predictor combining the direction table and the BTB.
pub mod branch_predictor;

/// Branch Target Buffer for storing predicted branch targets.
pub mod btb;

/// Two-bit saturating direction counter.
pub mod counter;
