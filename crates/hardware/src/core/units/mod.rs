//! Functional units of the fetch core.
//!
//! 1. **BRU:** Branch direction and target prediction.
//! 2. **Prefetch:** Buffering of fetched words ahead of consumption.

/// Branch prediction unit.
pub mod bru;

/// Prefetch buffer.
pub mod prefetch;
