//! Fetch-stage signal bundles.
//!
//! This module defines the per-cycle wires between the fetch engine and its
//! collaborators:
//! 1. **Memory Port:** Request and response bundles.
//! 2. **Branch Resolution:** Resolved-branch facts from a later stage.
//! 3. **Engine I/O:** Everything the engine samples and drives in one cycle.

use serde::Serialize;

use crate::core::units::bru::Prediction;

/// Request driven onto the instruction-memory port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemRequest {
    /// Word address being requested.
    pub address: u32,
    /// Request strobe.
    pub read_enable: bool,
}

impl MemRequest {
    /// A de-asserted request.
    pub const IDLE: Self = Self {
        address: 0,
        read_enable: false,
    };
}

/// Response sampled from the instruction-memory port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemResponse {
    /// Returned instruction word; meaningful only while `ready`.
    pub data: u32,
    /// The requested word is available this cycle.
    pub ready: bool,
}

impl MemResponse {
    /// No data this cycle.
    pub const NOT_READY: Self = Self {
        data: 0,
        ready: false,
    };
}

/// A resolved branch reported by a later pipeline stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BranchResolution {
    /// Strobe: the remaining fields are meaningful this cycle.
    pub resolved: bool,
    /// Resolved direction.
    pub taken: bool,
    /// Address of the resolved branch.
    pub branch_address: u32,
    /// Resolved target address.
    pub target: u32,
}

impl BranchResolution {
    /// No branch resolves this cycle.
    pub const NONE: Self = Self {
        resolved: false,
        taken: false,
        branch_address: 0,
        target: 0,
    };

    /// A resolved branch at `branch_address`.
    pub const fn new(branch_address: u32, taken: bool, target: u32) -> Self {
        Self {
            resolved: true,
            taken,
            branch_address,
            target,
        }
    }
}

/// Everything the fetch engine samples in one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FetchInputs {
    /// Synchronous reset.
    pub reset: bool,
    /// Memory port response.
    pub memory: MemResponse,
    /// Downstream stage wants an instruction.
    pub consume: bool,
    /// Flow-control stall.
    pub stall: bool,
    /// Branch resolution from a later stage.
    pub resolution: BranchResolution,
}

/// Registered fetch state owned by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FetchState {
    /// Next address to request; word-aligned.
    pub current_address: u32,
    /// Mirrors the memory request strobe.
    pub request_pending: bool,
}

/// Everything the fetch engine drives or decides in one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FetchOutputs {
    /// Request driven onto the memory port this cycle.
    pub request: MemRequest,
    /// Instruction delivered downstream; meaningful only while `valid`.
    pub instruction: u32,
    /// Address of `instruction`.
    pub pc: u32,
    /// A read was legal this cycle.
    pub valid: bool,
    /// Predictor lookup for the current fetch address.
    pub prediction: Prediction,
    /// The resolving branch disagrees with this cycle's lookup.
    pub mispredicted: bool,
    /// Speculative entries are discarded and fetch is redirected.
    pub flush: bool,
    /// Address selected for the next request.
    pub next_address: u32,
    /// The memory response was accepted into the buffer.
    pub wrote: bool,
    /// A memory response arrived while the buffer was full and was lost.
    pub dropped: bool,
    /// Buffer was full at the start of the cycle.
    pub buffer_full: bool,
    /// Buffer was empty at the start of the cycle.
    pub buffer_empty: bool,
    /// Buffer occupancy at the start of the cycle.
    pub occupancy: usize,
    /// Registered state after this cycle's update.
    pub next_state: FetchState,
}
