//! JSON-lines wave dump.
//!
//! Writes one JSON object per cycle holding the engine's sampled inputs and
//! driven outputs, for offline inspection or diffing against an RTL trace.

use std::io::{self, Write};

use serde::Serialize;

use super::observer::FetchObserver;
use crate::core::pipeline::{FetchInputs, FetchOutputs};

#[derive(Serialize)]
struct WaveRecord<'a> {
    cycle: u64,
    inputs: &'a FetchInputs,
    outputs: &'a FetchOutputs,
}

/// Observer serializing every cycle to a writer.
///
/// The first write error is kept and every later cycle is skipped; check
/// [`WaveDump::flush`] or [`WaveDump::finish`] at the end of the run.
#[derive(Debug)]
pub struct WaveDump<W: Write> {
    sink: W,
    lines: u64,
    error: Option<io::Error>,
}

impl<W: Write> WaveDump<W> {
    /// Creates a dump writing to `sink`.
    pub const fn new(sink: W) -> Self {
        Self {
            sink,
            lines: 0,
            error: None,
        }
    }

    /// Cycles written so far.
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// Flushes the sink.
    ///
    /// # Errors
    ///
    /// Returns the first error hit while writing, or the flush error.
    pub fn flush(&mut self) -> io::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.sink.flush()
    }

    /// Flushes the sink and returns it.
    ///
    /// # Errors
    ///
    /// As [`WaveDump::flush`].
    pub fn finish(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.sink)
    }

    fn write_record(&mut self, record: &WaveRecord<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.sink, record)?;
        self.sink.write_all(b"\n")
    }
}

impl<W: Write> FetchObserver for WaveDump<W> {
    fn on_cycle(&mut self, cycle: u64, inputs: &FetchInputs, outputs: &FetchOutputs) {
        if self.error.is_some() {
            return;
        }
        let record = WaveRecord {
            cycle,
            inputs,
            outputs,
        };
        match self.write_record(&record) {
            Ok(()) => self.lines += 1,
            Err(e) => self.error = Some(e),
        }
    }
}
