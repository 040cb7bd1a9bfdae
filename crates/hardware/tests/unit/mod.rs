//! # Unit Components
//!
//! This module serves as the central hub for the unit tests, organized the
//! way the crate is: shared helpers, the fetch core, memory, and the
//! simulation harness.
