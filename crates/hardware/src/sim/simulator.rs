//! Simulator: the fetch engine wired to its collaborators.
//!
//! Each call to [`Simulator::step`] simulates one clock cycle:
//! 1. **Memory:** The port answers the engine's registered request.
//! 2. **Downstream:** The consumer drives `consume`/`stall`; a request still
//!    waiting on memory is folded into `stall` so the engine holds its address.
//! 3. **Resolution:** The resolution source presents the fact due this cycle.
//! 4. **Engine:** The engine steps and every observer is notified.
//! 5. **Feedback:** A delivered branch is looked up in the ground truth and
//!    its resolution is scheduled `delay` cycles later.
//!
//! The engine has no separate memory-wait input, so a wait is presented as
//! `stall`. That stall also gates the downstream read: while an access is in
//! flight nothing is delivered even if the buffer holds words, and with a
//! latency of `L` the buffer drains at most one word per `L` cycles. The
//! prefetch buffer therefore does not hide memory latency in this harness.

use std::fmt;
use std::mem;

use tracing::{info, trace, warn};

use super::collaborators::{Consumer, ResolutionSource};
use super::checker::ContractChecker;
use super::ground_truth::BranchTable;
use super::observer::FetchObserver;
use super::scoreboard::Scoreboard;
use crate::common::error::SimError;
use crate::config::Config;
use crate::core::pipeline::{FetchEngine, FetchInputs, FetchOutputs};
use crate::soc::memory::{LatencyMemory, Memory, MemoryPort};
use crate::stats::FetchStats;

/// Top-level simulator: fetch engine plus memory, consumer, and branch unit.
pub struct Simulator<M: MemoryPort = LatencyMemory> {
    engine: FetchEngine,
    memory: M,
    consumer: Consumer,
    resolver: ResolutionSource,
    ground_truth: BranchTable,
    stats: FetchStats,
    checker: ContractChecker,
    scoreboard: Scoreboard,
    observers: Vec<Box<dyn FetchObserver>>,
    trace: bool,
    stop_on_violation: bool,
    max_cycles: u64,
    pending_reset: bool,
}

impl Simulator<LatencyMemory> {
    /// Creates a simulator running `program` from address zero.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated before use.
    /// * `program` - Instruction words loaded at address zero.
    /// * `ground_truth` - Branch outcomes the resolution source replays.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `config` fails validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use ifetch_core::config::Config;
    /// use ifetch_core::sim::{BranchTable, Simulator};
    ///
    /// let program = vec![0x0000_0013; 64];
    /// let mut sim = Simulator::new(&Config::default(), program, BranchTable::new()).unwrap();
    /// let _ = sim.run(100).unwrap();
    /// assert!(sim.checker().is_clean());
    /// assert!(sim.scoreboard().is_clean());
    /// assert!(sim.stats().words_delivered > 0);
    /// ```
    pub fn new(
        config: &Config,
        program: Vec<u32>,
        ground_truth: BranchTable,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let image = Memory::new(program.clone(), config.memory.fill_word);
        let port = LatencyMemory::from_config(program, &config.memory);
        Ok(Self::assemble(config, port, image, ground_truth))
    }
}

impl<M: MemoryPort> Simulator<M> {
    /// Creates a simulator driving a caller-supplied memory port.
    ///
    /// `image` is what the scoreboard expects the port to return.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `config` fails validation.
    pub fn with_port(
        config: &Config,
        port: M,
        image: Memory,
        ground_truth: BranchTable,
    ) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self::assemble(config, port, image, ground_truth))
    }

    fn assemble(config: &Config, port: M, image: Memory, ground_truth: BranchTable) -> Self {
        Self {
            engine: FetchEngine::new(),
            memory: port,
            consumer: Consumer::new(&config.consumer),
            resolver: ResolutionSource::new(&config.resolution),
            ground_truth,
            stats: FetchStats::new(),
            checker: ContractChecker::new(),
            scoreboard: Scoreboard::new(image),
            observers: Vec::new(),
            trace: config.general.trace,
            stop_on_violation: config.general.stop_on_violation,
            max_cycles: config.general.max_cycles,
            pending_reset: false,
        }
    }

    /// Registers an extra observer notified after every cycle.
    pub fn add_observer(&mut self, observer: Box<dyn FetchObserver>) {
        self.observers.push(observer);
    }

    /// Presents a synchronous reset on the next cycle and drops queued
    /// resolutions.
    ///
    /// Simulated time is not rewound: [`Simulator::cycle`], consumer pacing,
    /// and resolution due-cycles continue on the same timeline.
    pub fn reset(&mut self) {
        self.pending_reset = true;
        self.resolver.clear();
    }

    /// Cycles simulated so far.
    pub const fn cycle(&self) -> u64 {
        self.engine.cycle()
    }

    /// Cycle budget from the configuration.
    pub const fn max_cycles(&self) -> u64 {
        self.max_cycles
    }

    /// The engine under test.
    pub const fn engine(&self) -> &FetchEngine {
        &self.engine
    }

    /// The memory port.
    pub const fn memory(&self) -> &M {
        &self.memory
    }

    /// Collected statistics.
    pub const fn stats(&self) -> &FetchStats {
        &self.stats
    }

    /// The contract checker.
    pub const fn checker(&self) -> &ContractChecker {
        &self.checker
    }

    /// The delivery scoreboard.
    pub const fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// The resolution source, for scheduling facts directly.
    pub const fn resolver_mut(&mut self) -> &mut ResolutionSource {
        &mut self.resolver
    }

    /// Simulates one clock cycle.
    ///
    /// # Returns
    ///
    /// The engine's outputs for the cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Contract`] when the cycle breaks the engine's
    /// contract and the run is configured to stop on violations.
    pub fn step(&mut self) -> Result<FetchOutputs, SimError> {
        let cycle = self.engine.cycle();
        let request = self.engine.request();
        let response = self.memory.respond(request);
        let drive = self.consumer.drive(cycle);
        let resolution = self.resolver.take(cycle);

        let inputs = FetchInputs {
            reset: mem::take(&mut self.pending_reset),
            memory: response,
            consume: drive.consume,
            stall: drive.stall || (request.read_enable && !response.ready),
            resolution,
        };

        let trained_from = self.engine.predictor().counter(resolution.branch_address);
        let outputs = self.engine.step(&inputs);
        if resolution.resolved && !inputs.reset {
            let trained_to = self.engine.predictor().counter(resolution.branch_address);
            self.stats.record_training(trained_from, trained_to);
        }

        let seen = self.checker.violations().len();
        self.stats.on_cycle(cycle, &inputs, &outputs);
        self.checker.on_cycle(cycle, &inputs, &outputs);
        self.scoreboard.on_cycle(cycle, &inputs, &outputs);
        for observer in &mut self.observers {
            observer.on_cycle(cycle, &inputs, &outputs);
        }

        if outputs.valid {
            if let Some(record) = self.ground_truth.lookup(outputs.pc) {
                let due = self.resolver.schedule_after(cycle, record.resolution());
                trace!(
                    cycle,
                    due,
                    taken = record.taken,
                    "branch {:#010x} delivered, resolves to {:#010x}",
                    record.pc,
                    record.target
                );
            }
        }

        if self.trace || cfg!(feature = "always-trace") {
            info!(
                "[{cycle:>6}] req={} {:#010x} rdy={} wr={} rd={} {:#010x}:{:#010x} occ={} hit={} res={} flush={}",
                u8::from(request.read_enable),
                request.address,
                u8::from(response.ready),
                u8::from(outputs.wrote),
                u8::from(outputs.valid),
                outputs.pc,
                outputs.instruction,
                outputs.occupancy,
                u8::from(outputs.prediction.valid),
                u8::from(resolution.resolved),
                u8::from(outputs.flush),
            );
        }

        if self.stop_on_violation {
            if let Some(violation) = self.checker.violations().get(seen) {
                return Err(SimError::Contract(violation.clone()));
            }
        }
        Ok(outputs)
    }

    /// Steps until `max_cycles` cycles have been simulated in total.
    ///
    /// # Returns
    ///
    /// The number of cycles simulated by this call.
    ///
    /// # Errors
    ///
    /// As [`Simulator::step`]; the run ends at the failing cycle.
    pub fn run(&mut self, max_cycles: u64) -> Result<u64, SimError> {
        let start = self.engine.cycle();
        while self.engine.cycle() < max_cycles {
            if let Err(e) = self.step() {
                warn!("run stopped at cycle {}: {e}", self.engine.cycle() - 1);
                return Err(e);
            }
        }
        let ran = self.engine.cycle() - start;
        info!(
            "run finished after {ran} cycles: {} delivered, {} mispredictions, {} scoreboard mismatches",
            self.stats.words_delivered,
            self.stats.mispredictions,
            self.scoreboard.mismatches()
        );
        Ok(ran)
    }
}

impl<M: MemoryPort + fmt::Debug> fmt::Debug for Simulator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("engine", &self.engine)
            .field("memory", &self.memory)
            .field("consumer", &self.consumer)
            .field("resolver", &self.resolver)
            .field("observers", &self.observers.len())
            .field("trace", &self.trace)
            .field("stop_on_violation", &self.stop_on_violation)
            .finish_non_exhaustive()
    }
}
