//! Branch Target Buffer (BTB).
//!
//! The BTB is a direct-mapped cache that stores target addresses for resolved
//! branches. It lets the fetch engine redirect on a predicted-taken branch
//! without decoding the instruction. Tags are the full branch address, so two
//! branches sharing an index evict each other (last write wins).

use crate::common::addr::predictor_index;
use crate::common::constants::PREDICTOR_ENTRIES;

/// An entry in the Branch Target Buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BtbEntry {
    /// Full address of the branch that last wrote this slot.
    pub tag: u32,
    /// The cached target address.
    pub target: u32,
    /// Set once any resolved branch has mapped to this slot.
    pub valid: bool,
}

/// Branch Target Buffer structure.
#[derive(Clone, Debug)]
pub struct Btb {
    table: [BtbEntry; PREDICTOR_ENTRIES],
}

impl Default for Btb {
    fn default() -> Self {
        Self::new()
    }
}

impl Btb {
    /// Creates an empty BTB; every slot starts invalid.
    pub const fn new() -> Self {
        Self {
            table: [BtbEntry {
                tag: 0,
                target: 0,
                valid: false,
            }; PREDICTOR_ENTRIES],
        }
    }

    /// Looks up a target address for the given fetch address.
    ///
    /// # Returns
    ///
    /// The cached target if the slot is valid and its tag equals `pc`,
    /// otherwise `None`.
    pub fn lookup(&self, pc: u32) -> Option<u32> {
        let e = self.table[predictor_index(pc)];
        if e.valid && e.tag == pc {
            Some(e.target)
        } else {
            None
        }
    }

    /// Overwrites the slot for `pc` with a new tag and target.
    pub fn update(&mut self, pc: u32, target: u32) {
        self.table[predictor_index(pc)] = BtbEntry {
            tag: pc,
            target,
            valid: true,
        };
    }

    /// Raw slot contents at `index`.
    pub fn entry(&self, index: usize) -> BtbEntry {
        self.table[index % PREDICTOR_ENTRIES]
    }

    /// Invalidates every slot.
    pub fn clear(&mut self) {
        self.table = [BtbEntry::default(); PREDICTOR_ENTRIES];
    }
}
