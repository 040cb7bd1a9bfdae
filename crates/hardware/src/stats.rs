//! Fetch statistics collection and reporting.
//!
//! This module tracks what the fetch core did over a run. It provides:
//! 1. **Fetch:** Cycles, requests, buffered, delivered, and dropped words.
//! 2. **Branch prediction:** Lookups, hits, predicted-taken, resolutions, and mispredictions.
//! 3. **Buffer:** Stall, full, and empty cycles plus an occupancy histogram.
//! 4. **Coverage:** Observed two-bit counter transitions.

use std::time::Instant;

use crate::common::constants::PREFETCH_DEPTH;
use crate::core::pipeline::{FetchInputs, FetchOutputs};
use crate::core::units::bru::SaturatingState;
use crate::sim::observer::FetchObserver;

/// Number of counter states.
const COUNTER_STATES: usize = SaturatingState::ALL.len();

/// Fetch statistics gathered by observing every cycle.
#[derive(Clone, Debug)]
pub struct FetchStats {
    start_time: Instant,
    /// Cycles observed.
    pub cycles: u64,
    /// Cycles with the memory request asserted.
    pub requests: u64,
    /// Memory responses stored in the buffer.
    pub words_buffered: u64,
    /// Instructions delivered downstream.
    pub words_delivered: u64,
    /// Memory responses lost to a full buffer.
    pub dropped_responses: u64,

    /// Predictor lookups (cycles with a request pending).
    pub predictor_lookups: u64,
    /// Lookups that hit a valid BTB entry.
    pub predictor_hits: u64,
    /// Lookups that redirected fetch to a predicted target.
    pub predicted_taken: u64,
    /// Branch resolutions received.
    pub resolutions: u64,
    /// Resolutions that disagreed with the lookup.
    pub mispredictions: u64,
    /// Buffer flushes.
    pub flushes: u64,

    /// Cycles with `stall` asserted.
    pub stall_cycles: u64,
    /// Cycles starting with the buffer full.
    pub full_cycles: u64,
    /// Cycles starting with the buffer empty.
    pub empty_cycles: u64,
    /// Cycles spent at each occupancy, `0..=DEPTH`.
    pub occupancy_histogram: [u64; PREFETCH_DEPTH + 1],

    /// Counter training events, indexed `[from][to]` by state encoding.
    pub counter_transitions: [[u64; COUNTER_STATES]; COUNTER_STATES],
}

impl Default for FetchStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            requests: 0,
            words_buffered: 0,
            words_delivered: 0,
            dropped_responses: 0,
            predictor_lookups: 0,
            predictor_hits: 0,
            predicted_taken: 0,
            resolutions: 0,
            mispredictions: 0,
            flushes: 0,
            stall_cycles: 0,
            full_cycles: 0,
            empty_cycles: 0,
            occupancy_histogram: [0; PREFETCH_DEPTH + 1],
            counter_transitions: [[0; COUNTER_STATES]; COUNTER_STATES],
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"fetch"`, `"branch"`, `"buffer"`, `"coverage"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "fetch", "branch", "buffer", "coverage"];

/// `part / whole` as a percentage, 0 when `whole` is 0.
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

impl FetchStats {
    /// Creates empty statistics; the host timer starts now.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one predictor training event.
    pub fn record_training(&mut self, from: SaturatingState, to: SaturatingState) {
        self.counter_transitions[from.bits() as usize][to.bits() as usize] += 1;
    }

    /// Distinct counter transitions observed.
    pub fn transitions_covered(&self) -> usize {
        self.counter_transitions
            .iter()
            .flatten()
            .filter(|&&n| n > 0)
            .count()
    }

    /// Occupancy levels visited at least once.
    pub fn occupancy_covered(&self) -> usize {
        self.occupancy_histogram.iter().filter(|&&n| n > 0).count()
    }

    /// Delivered instructions per cycle.
    pub fn delivery_rate(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.words_delivered as f64 / self.cycles as f64
        }
    }

    /// Mean buffer occupancy over the run.
    pub fn mean_occupancy(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        let weighted: u64 = self
            .occupancy_histogram
            .iter()
            .enumerate()
            .map(|(level, &n)| level as u64 * n)
            .sum();
        weighted as f64 / self.cycles as f64
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass
    /// an empty slice to print all sections (same as `print()`).
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();

        if want("summary") {
            let khz = if seconds > 0.0 {
                (self.cycles as f64 / seconds) / 1000.0
            } else {
                0.0
            };
            println!("\n==========================================================");
            println!("INSTRUCTION FETCH SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_freq                 {khz:.2} kHz");
            println!("sim_delivered            {}", self.words_delivered);
            println!("sim_delivery_rate        {:.4}", self.delivery_rate());
            println!("----------------------------------------------------------");
        }
        if want("fetch") {
            println!("FETCH");
            println!(
                "  fetch.requests         {} ({:.2}%)",
                self.requests,
                percent(self.requests, self.cycles)
            );
            println!("  fetch.buffered         {}", self.words_buffered);
            println!("  fetch.delivered        {}", self.words_delivered);
            println!("  fetch.dropped          {}", self.dropped_responses);
            println!("----------------------------------------------------------");
        }
        if want("branch") {
            println!("BRANCH PREDICTION");
            println!("  bp.lookups             {}", self.predictor_lookups);
            println!(
                "  bp.hits                {} ({:.2}%)",
                self.predictor_hits,
                percent(self.predictor_hits, self.predictor_lookups)
            );
            println!("  bp.predicted_taken     {}", self.predicted_taken);
            println!("  bp.resolutions         {}", self.resolutions);
            println!("  bp.mispredicts         {}", self.mispredictions);
            println!(
                "  bp.accuracy            {:.2}%",
                100.0 - percent(self.mispredictions, self.resolutions)
            );
            println!("  bp.flushes             {}", self.flushes);
            println!("----------------------------------------------------------");
        }
        if want("buffer") {
            println!("PREFETCH BUFFER");
            println!(
                "  buf.stall_cycles       {} ({:.2}%)",
                self.stall_cycles,
                percent(self.stall_cycles, self.cycles)
            );
            println!(
                "  buf.full_cycles        {} ({:.2}%)",
                self.full_cycles,
                percent(self.full_cycles, self.cycles)
            );
            println!(
                "  buf.empty_cycles       {} ({:.2}%)",
                self.empty_cycles,
                percent(self.empty_cycles, self.cycles)
            );
            println!("  buf.mean_occupancy     {:.2}", self.mean_occupancy());
            for (level, &n) in self.occupancy_histogram.iter().enumerate() {
                println!(
                    "  occupancy[{level}]           {n:<10} ({:.2}%)",
                    percent(n, self.cycles)
                );
            }
            println!("----------------------------------------------------------");
        }
        if want("coverage") {
            println!("COVERAGE");
            println!(
                "  cov.occupancy          {}/{}",
                self.occupancy_covered(),
                PREFETCH_DEPTH + 1
            );
            println!(
                "  cov.counter_transitions {}/{}",
                self.transitions_covered(),
                COUNTER_STATES * COUNTER_STATES
            );
            for from in SaturatingState::ALL {
                for to in SaturatingState::ALL {
                    let n = self.counter_transitions[from.bits() as usize][to.bits() as usize];
                    if n > 0 {
                        println!("    {from:?} -> {to:?}: {n}");
                    }
                }
            }
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}

impl FetchObserver for FetchStats {
    fn on_cycle(&mut self, _cycle: u64, inputs: &FetchInputs, outputs: &FetchOutputs) {
        self.cycles += 1;
        if outputs.request.read_enable {
            self.requests += 1;
            self.predictor_lookups += 1;
        }
        if outputs.prediction.valid {
            self.predictor_hits += 1;
        }
        if outputs.prediction.redirects() {
            self.predicted_taken += 1;
        }
        if inputs.resolution.resolved {
            self.resolutions += 1;
        }
        self.mispredictions += u64::from(outputs.mispredicted);
        self.flushes += u64::from(outputs.flush);
        self.words_buffered += u64::from(outputs.wrote);
        self.words_delivered += u64::from(outputs.valid);
        self.dropped_responses += u64::from(outputs.dropped);
        self.stall_cycles += u64::from(inputs.stall);
        self.full_cycles += u64::from(outputs.buffer_full);
        self.empty_cycles += u64::from(outputs.buffer_empty);
        self.occupancy_histogram[outputs.occupancy.min(PREFETCH_DEPTH)] += 1;
    }
}
