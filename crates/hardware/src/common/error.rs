//! Error and contract-violation definitions.
//!
//! The fetch core itself is total and never returns errors. This module defines
//! what the layers around it can report:
//! 1. **Contract Violations:** Breaches of the core's invariants observed by the checker.
//! 2. **Simulation Errors:** Loader, configuration, and run-time failures of the simulator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A breach of the fetch core's external contract, observed at a given cycle.
///
/// Any of these appearing in a run is a defect in the implementation under
/// test, never a recoverable condition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// The engine drove a memory request at an address that is not word-aligned.
    #[error("cycle {cycle}: memory request at misaligned address {address:#010x}")]
    MisalignedRequest {
        /// Cycle on which the request was observed.
        cycle: u64,
        /// Offending request address.
        address: u32,
    },

    /// A flush redirected fetch to a target that is not word-aligned.
    #[error("cycle {cycle}: redirect to misaligned target {target:#010x}")]
    MisalignedRedirect {
        /// Cycle on which the flush fired.
        cycle: u64,
        /// Offending redirect target.
        target: u32,
    },

    /// The buffer reported full and empty at the same time.
    #[error("cycle {cycle}: prefetch buffer reports both full and empty")]
    FullAndEmpty {
        /// Cycle on which the state was observed.
        cycle: u64,
    },

    /// Buffer occupancy left the `0..=DEPTH` range.
    #[error("cycle {cycle}: prefetch buffer occupancy {occupancy} exceeds depth {depth}")]
    OccupancyOutOfRange {
        /// Cycle on which the state was observed.
        cycle: u64,
        /// Reported occupancy.
        occupancy: usize,
        /// Configured depth.
        depth: usize,
    },

    /// A memory response was stored although the buffer was full.
    #[error("cycle {cycle}: buffer accepted a write while full")]
    WriteWhileFull {
        /// Cycle on which the write was accepted.
        cycle: u64,
    },
}

impl ContractViolation {
    /// Cycle on which the violation was observed.
    pub const fn cycle(&self) -> u64 {
        match self {
            Self::MisalignedRequest { cycle, .. }
            | Self::MisalignedRedirect { cycle, .. }
            | Self::FullAndEmpty { cycle }
            | Self::OccupancyOutOfRange { cycle, .. }
            | Self::WriteWhileFull { cycle } => *cycle,
        }
    }
}

/// Errors raised by the simulator, its loaders, and its configuration.
#[derive(Debug, Error)]
pub enum SimError {
    /// A file could not be read or written.
    #[error("could not access '{}': {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A line of a `.mem` image or branch trace could not be parsed.
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// The JSON configuration was malformed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A configuration value is out of its legal range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A program image contained no instruction words.
    #[error("program image '{}' is empty", path.display())]
    EmptyProgram {
        /// File that was loaded.
        path: PathBuf,
    },

    /// The contract checker stopped the run.
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
}

impl SimError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds a parse error for `path` at 1-based `line`.
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
