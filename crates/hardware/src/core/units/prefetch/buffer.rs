//! Prefetch Buffer.
//!
//! A bounded FIFO of fetched `(address, word)` pairs sitting between the
//! memory port and the downstream consumer. It is modeled as a ring of
//! `PREFETCH_DEPTH` slots with read/write pointers and an occupancy counter,
//! and it follows register-transfer timing:
//! 1. **Intents:** `try_write`, `try_read`, and `flush` stage requests against
//!    the state committed at the end of the previous cycle.
//! 2. **Commit:** `commit` applies the staged requests together at the cycle
//!    boundary. A flush overrides everything else staged that cycle.
//!
//! When a legal write and a legal read land in the same cycle the occupancy
//! counter is unchanged while the ring still advances.

use serde::Serialize;

use crate::common::constants::PREFETCH_DEPTH;

/// One fetched instruction word and the address it was fetched from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BufferEntry {
    /// Fetch address of `word`.
    pub address: u32,
    /// Instruction word returned by memory.
    pub word: u32,
}

/// Requests staged during the current cycle.
#[derive(Clone, Copy, Debug, Default)]
struct Staged {
    write: Option<BufferEntry>,
    read: bool,
    flush: bool,
}

/// Bounded FIFO with same-cycle read/write semantics.
#[derive(Clone, Debug)]
pub struct PrefetchBuffer {
    slots: [BufferEntry; PREFETCH_DEPTH],
    rd_ptr: usize,
    wr_ptr: usize,
    count: usize,
    staged: Staged,
}

impl Default for PrefetchBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefetchBuffer {
    /// Buffer depth in entries.
    pub const DEPTH: usize = PREFETCH_DEPTH;

    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self {
            slots: [BufferEntry {
                address: 0,
                word: 0,
            }; PREFETCH_DEPTH],
            rd_ptr: 0,
            wr_ptr: 0,
            count: 0,
            staged: Staged {
                write: None,
                read: false,
                flush: false,
            },
        }
    }

    /// Stages a tail append of `(address, word)` for this cycle.
    ///
    /// # Returns
    ///
    /// `true` if the write is legal (buffer not full at the start of the
    /// cycle and the write port not already used this cycle). A rejected
    /// write leaves the buffer untouched.
    pub fn try_write(&mut self, word: u32, address: u32) -> bool {
        if self.full() || self.staged.write.is_some() {
            return false;
        }
        self.staged.write = Some(BufferEntry { address, word });
        true
    }

    /// Stages removal of the head entry for this cycle.
    ///
    /// # Returns
    ///
    /// The head entry if the buffer was not empty at the start of the cycle.
    /// The entry stays observable until [`commit`](Self::commit).
    pub fn try_read(&mut self) -> Option<BufferEntry> {
        if self.empty() {
            return None;
        }
        self.staged.read = true;
        Some(self.slots[self.rd_ptr])
    }

    /// Discards every entry at the cycle boundary. Takes precedence over any
    /// read or write staged in the same cycle.
    pub fn flush(&mut self) {
        self.staged.flush = true;
    }

    /// Applies the staged intents; called once at the end of each cycle.
    pub fn commit(&mut self) {
        let staged = std::mem::take(&mut self.staged);

        if staged.flush {
            self.rd_ptr = 0;
            self.wr_ptr = 0;
            self.count = 0;
            return;
        }

        let wrote = staged.write.is_some();
        if let Some(entry) = staged.write {
            self.slots[self.wr_ptr] = entry;
            self.wr_ptr = (self.wr_ptr + 1) % PREFETCH_DEPTH;
        }
        if staged.read {
            self.rd_ptr = (self.rd_ptr + 1) % PREFETCH_DEPTH;
        }

        match (wrote, staged.read) {
            (true, false) => self.count += 1,
            (false, true) => self.count -= 1,
            _ => {}
        }
    }

    /// Returns the head entry without staging a read.
    pub fn peek(&self) -> Option<BufferEntry> {
        if self.empty() {
            None
        } else {
            Some(self.slots[self.rd_ptr])
        }
    }

    /// Entries currently held, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = BufferEntry> + '_ {
        (0..self.count).map(move |i| self.slots[(self.rd_ptr + i) % PREFETCH_DEPTH])
    }

    /// `true` when occupancy equals the depth.
    pub const fn full(&self) -> bool {
        self.count == PREFETCH_DEPTH
    }

    /// `true` when no entries are held.
    pub const fn empty(&self) -> bool {
        self.count == 0
    }

    /// Number of entries currently held.
    pub const fn occupancy(&self) -> usize {
        self.count
    }

    /// Empties the buffer and drops anything staged.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
