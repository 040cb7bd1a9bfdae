//! Instruction-memory port with modeled latency.
//!
//! The port answers the fetch engine's registered request combinationally
//! each cycle. It tracks a single access: `ready` rises on the `L`-th
//! consecutive cycle the same request is held, where `L` comes from the
//! memory controller (`L = 1` returns data in the request cycle). Changing
//! or dropping the request abandons the in-flight access, so two requests
//! never overlap on the port.

use super::Memory;
use super::controller::{self, MemoryController};
use crate::config::MemoryConfig;
use crate::core::pipeline::{MemRequest, MemResponse};

/// A memory collaborator the simulator can drive.
pub trait MemoryPort {
    /// Samples `request` for this cycle and returns the response.
    fn respond(&mut self, request: MemRequest) -> MemResponse;
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    address: u32,
    remaining: u64,
}

/// Program memory behind a latency model.
#[derive(Debug)]
pub struct LatencyMemory {
    memory: Memory,
    controller: Box<dyn MemoryController>,
    inflight: Option<InFlight>,
    accesses: u64,
}

impl LatencyMemory {
    /// Creates a port serving `memory` with latencies from `controller`.
    pub fn new(memory: Memory, controller: Box<dyn MemoryController>) -> Self {
        Self {
            memory,
            controller,
            inflight: None,
            accesses: 0,
        }
    }

    /// Creates a port serving `words` configured from `config`.
    pub fn from_config(words: Vec<u32>, config: &MemoryConfig) -> Self {
        Self::new(
            Memory::new(words, config.fill_word),
            controller::from_config(config),
        )
    }

    /// Backing program image.
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Accesses started so far (including abandoned ones).
    pub const fn accesses(&self) -> u64 {
        self.accesses
    }

    /// `true` while an access is waiting for data.
    pub const fn busy(&self) -> bool {
        self.inflight.is_some()
    }
}

impl MemoryPort for LatencyMemory {
    fn respond(&mut self, request: MemRequest) -> MemResponse {
        if !request.read_enable {
            self.inflight = None;
            return MemResponse::NOT_READY;
        }

        let mut access = match self.inflight {
            Some(access) if access.address == request.address => access,
            _ => {
                self.accesses += 1;
                InFlight {
                    address: request.address,
                    remaining: self.controller.access_latency(request.address).max(1),
                }
            }
        };

        access.remaining -= 1;
        if access.remaining == 0 {
            self.inflight = None;
            MemResponse {
                data: self.memory.read_word(request.address),
                ready: true,
            }
        } else {
            self.inflight = Some(access);
            MemResponse::NOT_READY
        }
    }
}
