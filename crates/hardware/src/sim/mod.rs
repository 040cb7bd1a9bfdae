//! Simulation harness around the fetch engine.
//!
//! This module drives the engine cycle by cycle and observes it. It provides:
//! 1. **Simulator:** Engine, memory port, consumer, and resolution source wired together.
//! 2. **Loader:** Program images, branch traces, and ground-truth tables.
//!    Test programs can also be assembled from source.
//! 3. **Observers:** Contract checker, delivery scoreboard, and JSON wave dump.

/// Two-pass assembler for test programs.
pub mod assembler;
/// Contract checker observer.
pub mod checker;
/// Downstream consumer and branch-resolution source.
pub mod collaborators;
/// Branch records, static extraction, and the ground-truth table.
pub mod ground_truth;
/// `.mem`, branch-trace, and `branches.mem` file handling.
pub mod loader;
/// Per-cycle observer trait.
pub mod observer;
/// Delivery scoreboard observer.
pub mod scoreboard;
/// Top-level simulator.
pub mod simulator;
/// JSON-lines wave dump observer.
pub mod wave;

pub use self::assembler::assemble;
pub use self::checker::ContractChecker;
pub use self::collaborators::{Consumer, ConsumerDrive, ResolutionSource};
pub use self::ground_truth::{BranchRecord, BranchTable, extract_branches};
pub use self::observer::FetchObserver;
pub use self::scoreboard::{Mismatch, Scoreboard};
pub use self::simulator::Simulator;
pub use self::wave::WaveDump;
