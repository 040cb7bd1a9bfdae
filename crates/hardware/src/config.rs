//! Configuration system for the fetch-core simulator.
//!
//! This module defines the configuration structures used to parameterize the
//! collaborators around the fetch core. It provides:
//! 1. **Defaults:** Baseline memory timing, consumer pacing, and resolution delay.
//! 2. **Structures:** Hierarchical config for general, memory, consumer, and resolution.
//! 3. **Enums:** Memory controller latency models.
//!
//! Configuration is supplied as JSON or taken from `Config::default()`. The
//! structural sizes of the core (predictor entries, buffer depth, alignment)
//! are compile-time constants in [`crate::common::constants`].

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::constants::NOP;
use crate::common::error::SimError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Cycle budget for a run.
    pub const MAX_CYCLES: u64 = 10_000;

    /// Fixed memory latency in cycles (1 = data in the request cycle).
    pub const MEM_LATENCY: u64 = 1;

    /// CAS latency for the DRAM model.
    pub const T_CAS: u64 = 2;

    /// RAS latency for the DRAM model.
    pub const T_RAS: u64 = 2;

    /// Precharge latency for the DRAM model.
    pub const T_PRE: u64 = 2;

    /// The consumer reads every cycle.
    pub const CONSUME_PERIOD: u64 = 1;

    /// Cycles between a dequeue and its branch resolution.
    pub const RESOLVE_DELAY: u64 = 1;
}

/// Memory controller latency models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum MemoryController {
    /// Every access takes `latency` cycles.
    #[default]
    Simple,
    /// Row-buffer model: CAS on a row hit, RAS+CAS on the first access,
    /// precharge+RAS+CAS on a row miss.
    #[serde(alias = "DRAM")]
    Dram,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use ifetch_core::config::{Config, MemoryController};
///
/// let config = Config::default();
/// assert_eq!(config.memory.latency, 1);
/// assert_eq!(config.consumer.consume_period, 1);
///
/// let json = r#"{
///     "general": { "max_cycles": 500, "trace": true },
///     "memory": { "controller": "Dram", "t_cas": 3 },
///     "consumer": { "stall_every": 10, "stall_length": 2 }
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.general.max_cycles, 500);
/// assert_eq!(config.memory.controller, MemoryController::Dram);
/// assert_eq!(config.memory.t_cas, 3);
/// assert_eq!(config.resolution.delay, 1);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General run settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Instruction memory model
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Downstream consumer pacing
    #[serde(default)]
    pub consumer: ConsumerConfig,
    /// Branch-resolution source
    #[serde(default)]
    pub resolution: ResolutionConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] for malformed JSON and
    /// [`SimError::InvalidConfig`] for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        Self::from_json(&text)
    }

    /// Checks that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.memory.latency == 0 {
            return Err(SimError::InvalidConfig(
                "memory.latency must be at least 1".into(),
            ));
        }
        if self.memory.controller == MemoryController::Dram && self.memory.t_cas == 0 {
            return Err(SimError::InvalidConfig(
                "memory.t_cas must be at least 1".into(),
            ));
        }
        if self.consumer.consume_period == 0 {
            return Err(SimError::InvalidConfig(
                "consumer.consume_period must be at least 1".into(),
            ));
        }
        if self.consumer.stall_every != 0 && self.consumer.stall_length >= self.consumer.stall_every
        {
            return Err(SimError::InvalidConfig(
                "consumer.stall_length must be shorter than consumer.stall_every".into(),
            ));
        }
        if self.resolution.delay == 0 {
            return Err(SimError::InvalidConfig(
                "resolution.delay must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// General run settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Cycle budget for `Simulator::run`
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,

    /// Emit a per-cycle trace line through `tracing`
    #[serde(default)]
    pub trace: bool,

    /// End the run with an error on the first contract violation
    #[serde(default = "GeneralConfig::default_stop_on_violation")]
    pub stop_on_violation: bool,
}

impl GeneralConfig {
    /// Returns the default cycle budget.
    const fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }

    /// Violations are fatal unless asked otherwise.
    const fn default_stop_on_violation() -> bool {
        true
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_cycles: defaults::MAX_CYCLES,
            trace: false,
            stop_on_violation: true,
        }
    }
}

/// Instruction memory model.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Latency model
    #[serde(default)]
    pub controller: MemoryController,

    /// Fixed latency for the simple controller (cycles, at least 1)
    #[serde(default = "MemoryConfig::default_latency")]
    pub latency: u64,

    /// CAS latency (DRAM model)
    #[serde(default = "MemoryConfig::default_t_cas")]
    pub t_cas: u64,

    /// RAS latency (DRAM model)
    #[serde(default = "MemoryConfig::default_t_ras")]
    pub t_ras: u64,

    /// Precharge latency (DRAM model)
    #[serde(default = "MemoryConfig::default_t_pre")]
    pub t_pre: u64,

    /// Word returned for addresses outside the program image
    #[serde(default = "MemoryConfig::default_fill_word")]
    pub fill_word: u32,
}

impl MemoryConfig {
    const fn default_latency() -> u64 {
        defaults::MEM_LATENCY
    }

    const fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    const fn default_t_ras() -> u64 {
        defaults::T_RAS
    }

    const fn default_t_pre() -> u64 {
        defaults::T_PRE
    }

    const fn default_fill_word() -> u32 {
        NOP
    }

    /// Overrides the fixed latency of the simple controller.
    ///
    /// # Errors
    ///
    /// `SimError::InvalidConfig` when the DRAM model is selected, whose timing
    /// comes from `t_cas`, `t_ras`, and `t_pre` instead.
    pub fn set_latency(&mut self, latency: u64) -> Result<(), SimError> {
        if self.controller == MemoryController::Dram {
            return Err(SimError::InvalidConfig(
                "latency applies to the Simple controller; set t_cas/t_ras/t_pre for Dram"
                    .into(),
            ));
        }
        self.latency = latency;
        Ok(())
    }

    /// One-line description of the active latency model.
    pub fn describe(&self) -> String {
        match self.controller {
            MemoryController::Simple => format!("simple, latency {}", self.latency),
            MemoryController::Dram => format!(
                "dram, tCAS {} tRAS {} tPRE {}",
                self.t_cas, self.t_ras, self.t_pre
            ),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            controller: MemoryController::Simple,
            latency: defaults::MEM_LATENCY,
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
            fill_word: NOP,
        }
    }
}

/// Downstream consumer pacing.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerConfig {
    /// Consume on cycles where `cycle % consume_period == 0`
    #[serde(default = "ConsumerConfig::default_consume_period")]
    pub consume_period: u64,

    /// Start a stall window every N cycles (0 disables stalls)
    #[serde(default)]
    pub stall_every: u64,

    /// Length of each stall window in cycles
    #[serde(default)]
    pub stall_length: u64,
}

impl ConsumerConfig {
    const fn default_consume_period() -> u64 {
        defaults::CONSUME_PERIOD
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            consume_period: defaults::CONSUME_PERIOD,
            stall_every: 0,
            stall_length: 0,
        }
    }
}

/// Branch-resolution source.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionConfig {
    /// Cycles between delivering a branch downstream and resolving it
    #[serde(default = "ResolutionConfig::default_delay")]
    pub delay: u64,
}

impl ResolutionConfig {
    const fn default_delay() -> u64 {
        defaults::RESOLVE_DELAY
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            delay: defaults::RESOLVE_DELAY,
        }
    }
}
