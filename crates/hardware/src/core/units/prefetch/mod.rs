//! Instruction prefetch buffering.
//!
//! This module contains the prefetch buffer that decouples memory latency
//! from the rate at which the downstream stage consumes instructions.

/// Bounded FIFO of fetched instruction words.
pub mod buffer;

pub use self::buffer::{BufferEntry, PrefetchBuffer};
