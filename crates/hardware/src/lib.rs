//! Instruction-fetch control core library.
//!
//! This crate implements a cycle-accurate model of a processor's fetch stage:
//! 1. **Core:** The fetch engine state machine, bimodal branch predictor with BTB,
//!    and the prefetch buffer between memory and decode.
//! 2. **Memory:** A program image behind a latency-modeling memory port.
//! 3. **Simulation:** Consumer and branch-resolution collaborators, a contract
//!    checker, a delivery scoreboard, and a JSON wave dump.
//! 4. **Files:** `.mem` program images, branch traces, and `branches.mem` tables.

/// Common types and constants (address helpers, sizes, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Fetch core (engine, signals, predictor, prefetch buffer).
pub mod core;
/// Simulation harness, observers, and file loading.
pub mod sim;
/// Instruction memory and its port.
pub mod soc;
/// Fetch statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The fetch engine; step it directly or through a [`Simulator`].
pub use crate::core::FetchEngine;
/// Top-level simulator wiring the engine to its collaborators.
pub use crate::sim::Simulator;
