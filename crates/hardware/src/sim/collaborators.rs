//! Downstream collaborators of the fetch engine.
//!
//! These stand in for the decode stage and the branch unit of a full core:
//! 1. **Consumer:** Paces `consume` and asserts `stall` windows.
//! 2. **Resolution Source:** Replays branch outcomes a fixed delay after the
//!    branch left the prefetch buffer.

use std::collections::BTreeMap;

use crate::config::{ConsumerConfig, ResolutionConfig};
use crate::core::pipeline::BranchResolution;

/// `consume`/`stall` drive for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConsumerDrive {
    /// Downstream wants an instruction.
    pub consume: bool,
    /// Downstream asserts backpressure.
    pub stall: bool,
}

/// Periodic downstream consumer.
#[derive(Clone, Debug)]
pub struct Consumer {
    consume_period: u64,
    stall_every: u64,
    stall_length: u64,
}

impl Consumer {
    /// Creates a consumer from its configuration section.
    pub const fn new(config: &ConsumerConfig) -> Self {
        Self {
            consume_period: config.consume_period,
            stall_every: config.stall_every,
            stall_length: config.stall_length,
        }
    }

    /// Signals driven on `cycle`.
    ///
    /// `consume` is asserted when `cycle` is a multiple of the consume period.
    /// With stalls enabled, the last `stall_length` cycles of every
    /// `stall_every`-cycle window are stalled.
    pub const fn drive(&self, cycle: u64) -> ConsumerDrive {
        let consume = self.consume_period != 0 && cycle % self.consume_period == 0;
        let stall = self.stall_every != 0
            && self.stall_length != 0
            && cycle % self.stall_every >= self.stall_every.saturating_sub(self.stall_length);
        ConsumerDrive { consume, stall }
    }
}

/// Delay queue of branch resolutions, at most one per cycle.
#[derive(Clone, Debug)]
pub struct ResolutionSource {
    delay: u64,
    queue: BTreeMap<u64, BranchResolution>,
}

impl ResolutionSource {
    /// Creates an empty source from its configuration section.
    pub const fn new(config: &ResolutionConfig) -> Self {
        Self {
            delay: config.delay,
            queue: BTreeMap::new(),
        }
    }

    /// Cycles between a delivery and its resolution.
    pub const fn delay(&self) -> u64 {
        self.delay
    }

    /// Queues `fact` for cycle `due`, or for the first free cycle after it.
    ///
    /// # Returns
    ///
    /// The cycle the fact will actually be presented on.
    pub fn schedule(&mut self, due: u64, fact: BranchResolution) -> u64 {
        let mut slot = due;
        while self.queue.contains_key(&slot) {
            slot += 1;
        }
        let _ = self.queue.insert(slot, fact);
        slot
    }

    /// Queues `fact` for `delay` cycles after `cycle`.
    pub fn schedule_after(&mut self, cycle: u64, fact: BranchResolution) -> u64 {
        self.schedule(cycle + self.delay, fact)
    }

    /// Removes and returns the fact due by `cycle`, or an idle fact.
    ///
    /// Facts left over from earlier cycles are presented before on-time ones.
    pub fn take(&mut self, cycle: u64) -> BranchResolution {
        match self.queue.first_key_value() {
            Some((&due, _)) if due <= cycle => self
                .queue
                .remove(&due)
                .unwrap_or(BranchResolution::NONE),
            _ => BranchResolution::NONE,
        }
    }

    /// Number of queued facts.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drops every queued fact.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
