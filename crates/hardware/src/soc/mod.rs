//! Collaborators outside the fetch core.
//!
//! Only the instruction memory lives here: a program image, its latency
//! model, and the port the fetch engine drives.

/// Instruction memory, latency controllers, and the memory port.
pub mod memory;

pub use self::memory::{LatencyMemory, Memory, MemoryPort};
