//! Instruction memory.
//!
//! This module implements the memory collaborator of the fetch core. It provides:
//! 1. **Memory:** A word-addressed program image mapped at address zero.
//! 2. **Controller:** Latency modeling (simple or DRAM row-buffer).
//! 3. **Port:** The request/response port the fetch engine drives.

/// Memory controller implementations for access latency modeling.
pub mod controller;

/// Latency-modeling memory port.
pub mod port;

pub use self::port::{LatencyMemory, MemoryPort};

use crate::common::addr::word_index;

/// Word-addressed program image.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    words: Vec<u32>,
    fill_word: u32,
}

impl Memory {
    /// Creates an image holding `words` from address zero. Reads past the
    /// end return `fill_word`.
    pub fn new(words: Vec<u32>, fill_word: u32) -> Self {
        Self { words, fill_word }
    }

    /// Reads the word containing `addr`.
    pub fn read_word(&self, addr: u32) -> u32 {
        self.words
            .get(word_index(addr))
            .copied()
            .unwrap_or(self.fill_word)
    }

    /// Word returned outside the image.
    pub const fn fill_word(&self) -> u32 {
        self.fill_word
    }

    /// Loaded words.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of loaded words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// `true` when no words are loaded.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
