//! Delivery scoreboard.
//!
//! Every instruction the engine hands downstream must be the word the
//! program image holds at the delivered address. The scoreboard checks that
//! pairing; it does not check sequential continuity, since redirects and
//! stall re-issues legitimately reorder and repeat addresses.

use serde::Serialize;

use super::observer::FetchObserver;
use crate::core::pipeline::{FetchInputs, FetchOutputs};
use crate::soc::memory::Memory;

/// Mismatches kept for reporting.
const MAX_RECORDED: usize = 16;

/// One delivered instruction that disagreed with the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Cycle of the delivery.
    pub cycle: u64,
    /// Delivered address.
    pub pc: u32,
    /// Word the image holds at `pc`.
    pub expected: u32,
    /// Word actually delivered.
    pub actual: u32,
}

/// Observer comparing deliveries against a program image.
#[derive(Clone, Debug)]
pub struct Scoreboard {
    image: Memory,
    matches: u64,
    mismatches: u64,
    recorded: Vec<Mismatch>,
}

impl Scoreboard {
    /// Creates a scoreboard for `image`.
    pub const fn new(image: Memory) -> Self {
        Self {
            image,
            matches: 0,
            mismatches: 0,
            recorded: Vec::new(),
        }
    }

    /// Deliveries that matched the image.
    pub const fn matches(&self) -> u64 {
        self.matches
    }

    /// Deliveries that did not.
    pub const fn mismatches(&self) -> u64 {
        self.mismatches
    }

    /// The earliest mismatches (at most 16).
    pub fn first_mismatches(&self) -> &[Mismatch] {
        &self.recorded
    }

    /// `true` while every delivery has matched.
    pub const fn is_clean(&self) -> bool {
        self.mismatches == 0
    }
}

impl FetchObserver for Scoreboard {
    fn on_cycle(&mut self, cycle: u64, _inputs: &FetchInputs, outputs: &FetchOutputs) {
        if !outputs.valid {
            return;
        }
        let expected = self.image.read_word(outputs.pc);
        if expected == outputs.instruction {
            self.matches += 1;
            return;
        }
        self.mismatches += 1;
        if self.recorded.len() < MAX_RECORDED {
            self.recorded.push(Mismatch {
                cycle,
                pc: outputs.pc,
                expected,
                actual: outputs.instruction,
            });
        }
    }
}
