//! Branch ground truth.
//!
//! The simulator's branch-resolution source answers from a table of known
//! branch outcomes. This module provides:
//! 1. **Records:** `(pc, taken, target)` triples from a trace or static analysis.
//! 2. **Static Analysis:** Extraction of B-type and JAL branches from machine code.
//! 3. **Table:** A 256-entry table indexed by PC\[9:2\], with the packed
//!    66-bit `{valid, taken, pc, target}` encoding used by `branches.mem`.

use crate::common::addr::predictor_index;
use crate::common::constants::{OP_BRANCH, OP_JAL, OPCODE_MASK, PREDICTOR_ENTRIES, WORD_BYTES};
use crate::core::pipeline::BranchResolution;

/// Bit position of the valid flag in a packed entry.
const VALID_BIT: u32 = 65;
/// Bit position of the taken flag in a packed entry.
const TAKEN_BIT: u32 = 64;
/// Bit position of the branch address in a packed entry.
const PC_SHIFT: u32 = 32;

/// A known branch outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchRecord {
    /// Address of the branch instruction.
    pub pc: u32,
    /// Whether the branch is taken.
    pub taken: bool,
    /// Branch target.
    pub target: u32,
}

impl BranchRecord {
    /// The resolution fact this record produces.
    pub const fn resolution(&self) -> BranchResolution {
        BranchResolution::new(self.pc, self.taken, self.target)
    }

    /// Packs the record as `{valid[65], taken[64], pc[63:32], target[31:0]}`.
    pub fn pack(&self) -> u128 {
        (1u128 << VALID_BIT)
            | (u128::from(self.taken) << TAKEN_BIT)
            | (u128::from(self.pc) << PC_SHIFT)
            | u128::from(self.target)
    }

    /// Unpacks a 66-bit entry; `None` when the valid bit is clear.
    pub fn unpack(bits: u128) -> Option<Self> {
        if (bits >> VALID_BIT) & 1 == 0 {
            return None;
        }
        Some(Self {
            pc: (bits >> PC_SHIFT) as u32,
            taken: (bits >> TAKEN_BIT) & 1 == 1,
            target: bits as u32,
        })
    }
}

/// Decodes the byte offset of a B-type instruction.
fn branch_offset(inst: u32) -> u32 {
    let imm12 = (inst >> 31) & 0x1;
    let imm10_5 = (inst >> 25) & 0x3F;
    let imm4_1 = (inst >> 8) & 0xF;
    let imm11 = (inst >> 7) & 0x1;
    let offset = (imm12 << 12) | (imm11 << 11) | (imm10_5 << 5) | (imm4_1 << 1);
    if imm12 == 1 {
        offset | 0xFFFF_E000
    } else {
        offset
    }
}

/// Decodes the byte offset of a JAL instruction.
fn jal_offset(inst: u32) -> u32 {
    let imm20 = (inst >> 31) & 0x1;
    let imm10_1 = (inst >> 21) & 0x3FF;
    let imm11 = (inst >> 20) & 0x1;
    let imm19_12 = (inst >> 12) & 0xFF;
    let offset = (imm20 << 20) | (imm19_12 << 12) | (imm11 << 11) | (imm10_1 << 1);
    if imm20 == 1 {
        offset | 0xFFE0_0000
    } else {
        offset
    }
}

/// Extracts branch records from a program image loaded at address zero.
///
/// Conditional branches are assigned an alternating pattern (taken at even
/// word index, not-taken at odd); JAL is always taken. Real outcomes should
/// come from an execution trace instead.
pub fn extract_branches(program: &[u32]) -> Vec<BranchRecord> {
    let mut branches = Vec::new();
    let mut pc: u32 = 0;
    for (i, &inst) in program.iter().enumerate() {
        match inst & OPCODE_MASK {
            OP_BRANCH => branches.push(BranchRecord {
                pc,
                taken: i % 2 == 0,
                target: pc.wrapping_add(branch_offset(inst)),
            }),
            OP_JAL => branches.push(BranchRecord {
                pc,
                taken: true,
                target: pc.wrapping_add(jal_offset(inst)),
            }),
            _ => {}
        }
        pc = pc.wrapping_add(WORD_BYTES);
    }
    branches
}

/// Direct-mapped ground-truth table indexed by PC\[9:2\].
#[derive(Clone, Debug)]
pub struct BranchTable {
    entries: [Option<BranchRecord>; PREDICTOR_ENTRIES],
}

impl Default for BranchTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchTable {
    /// Creates a table with every entry invalid.
    pub const fn new() -> Self {
        Self {
            entries: [None; PREDICTOR_ENTRIES],
        }
    }

    /// Builds a table from records; later records overwrite earlier ones
    /// sharing an index.
    pub fn from_records(records: &[BranchRecord]) -> Self {
        let mut table = Self::new();
        for record in records {
            table.insert(*record);
        }
        table
    }

    /// Stores `record` at its index.
    pub fn insert(&mut self, record: BranchRecord) {
        self.entries[predictor_index(record.pc)] = Some(record);
    }

    /// Stores a raw entry at `index`.
    pub(crate) fn set(&mut self, index: usize, record: Option<BranchRecord>) {
        self.entries[index] = record;
    }

    /// The record for exactly `pc`, if one is stored at its index.
    pub fn lookup(&self, pc: u32) -> Option<BranchRecord> {
        self.entries[predictor_index(pc)].filter(|r| r.pc == pc)
    }

    /// Raw entry at `index`.
    pub fn entry(&self, index: usize) -> Option<BranchRecord> {
        self.entries[index % PREDICTOR_ENTRIES]
    }

    /// Number of valid entries.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// `true` when no entry is valid.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// Packed 66-bit value of every entry, invalid entries as zero.
    pub fn packed(&self) -> impl Iterator<Item = u128> + '_ {
        self.entries.iter().map(|e| e.map_or(0, |r| r.pack()))
    }
}
