//! Access-latency models for the instruction memory port.
//!
//! A controller only answers "how many cycles does this fetch take"; the port
//! in [`super::port`] turns that into a `ready` strobe. Two models exist:
//! 1. **Fixed:** Every fetch costs the configured latency.
//! 2. **Row buffer:** Fetches inside the open 2 KiB row pay CAS only; opening
//!    or switching rows adds RAS and precharge.

use std::fmt;

use crate::config::{MemoryConfig, MemoryController as ControllerKind};

/// Bytes covered by one DRAM row.
const ROW_BYTES: u32 = 2048;

/// Latency model consulted once per new memory access.
pub trait MemoryController: fmt::Debug + Send + Sync {
    /// Cycles until the word at `addr` is available.
    ///
    /// May update internal state (the open row), so repeated calls for the
    /// same address can return different latencies.
    fn access_latency(&mut self, addr: u32) -> u64;
}

/// Builds the controller selected by `config`.
pub fn from_config(config: &MemoryConfig) -> Box<dyn MemoryController> {
    match config.controller {
        ControllerKind::Simple => Box::new(SimpleController::new(config.latency)),
        ControllerKind::Dram => Box::new(DramController::new(
            config.t_cas,
            config.t_ras,
            config.t_pre,
        )),
    }
}

/// Constant-latency model.
#[derive(Debug, Clone)]
pub struct SimpleController {
    cycles: u64,
}

impl SimpleController {
    /// Every access will take `latency` cycles.
    pub const fn new(latency: u64) -> Self {
        Self { cycles: latency }
    }
}

impl MemoryController for SimpleController {
    fn access_latency(&mut self, _addr: u32) -> u64 {
        self.cycles
    }
}

/// Single-bank row-buffer model.
#[derive(Debug, Clone)]
pub struct DramController {
    open_row: Option<u32>,
    cas: u64,
    activate: u64,
    precharge: u64,
}

impl DramController {
    /// Creates a bank with no open row, from CAS, RAS, and precharge timings.
    pub const fn new(t_cas: u64, t_ras: u64, t_pre: u64) -> Self {
        Self {
            open_row: None,
            cas: t_cas,
            activate: t_ras,
            precharge: t_pre,
        }
    }
}

impl MemoryController for DramController {
    fn access_latency(&mut self, addr: u32) -> u64 {
        let row = addr / ROW_BYTES;
        let overhead = match self.open_row.replace(row) {
            Some(open) if open == row => 0,
            Some(_) => self.precharge + self.activate,
            None => self.activate,
        };
        overhead + self.cas
    }
}
