//! Fetch core implementation.
//!
//! This module contains the three tightly coupled components of the
//! instruction-fetch stage: the branch predictor and prefetch buffer (the
//! functional units), and the fetch engine that orchestrates them.

/// Fetch stage (signals and the fetch-control state machine).
pub mod pipeline;

/// Functional units (branch predictor, prefetch buffer).
pub mod units;

pub use self::pipeline::FetchEngine;
