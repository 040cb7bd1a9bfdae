//! Common utilities and types used throughout the fetch-core model.
//!
//! This module provides the building blocks shared by every component:
//! 1. **Address Helpers:** Word alignment and predictor/memory indexing.
//! 2. **Constants:** Table sizes, buffer depth, and instruction encodings.
//! 3. **Error Handling:** Contract violations and simulator errors.

/// Address helpers (alignment, indexing).
pub mod addr;

/// Structural constants of the fetch core.
pub mod constants;

/// Error types and contract violations.
pub mod error;

pub use addr::{is_word_aligned, next_sequential, predictor_index, word_index};
pub use constants::{PREDICTOR_ENTRIES, PREFETCH_DEPTH, WORD_BYTES};
pub use error::{ContractViolation, SimError};
