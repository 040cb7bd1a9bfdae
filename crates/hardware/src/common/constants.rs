//! Global Fetch-Core Constants.
//!
//! This module defines the structural constants of the fetch core. It includes:
//! 1. **Bus Constants:** Word size and alignment.
//! 2. **Predictor Constants:** Table index width and entry count.
//! 3. **Buffer Constants:** Prefetch buffer depth.
//! 4. **Instruction Constants:** Opcodes used by the assembler and branch extraction, and the fill word.

/// Size of an instruction word in bytes.
pub const WORD_BYTES: u32 = 4;

/// Number of low address bits consumed by word alignment.
pub const WORD_SHIFT: u32 = 2;

/// Mask selecting the alignment bits of an address.
pub const WORD_ALIGN_MASK: u32 = WORD_BYTES - 1;

/// Number of address bits used to index the predictor tables (PC\[9:2\]).
pub const PREDICTOR_INDEX_BITS: u32 = 8;

/// Number of entries in both the direction table and the target cache.
pub const PREDICTOR_ENTRIES: usize = 1 << PREDICTOR_INDEX_BITS;

/// Mask applied after the alignment shift to form a predictor index.
pub const PREDICTOR_INDEX_MASK: u32 = (1 << PREDICTOR_INDEX_BITS) - 1;

/// Depth of the prefetch buffer in entries.
pub const PREFETCH_DEPTH: usize = 8;

/// Address the fetch engine restarts from after reset.
pub const RESET_ADDRESS: u32 = 0;

/// Bit mask for extracting the opcode field from a RISC-V instruction.
pub const OPCODE_MASK: u32 = 0x7F;

/// Opcode of conditional branch (B-type) instructions.
pub const OP_BRANCH: u32 = 0x63;

/// Opcode of JAL.
pub const OP_JAL: u32 = 0x6F;

/// Opcode of JALR.
pub const OP_JALR: u32 = 0x67;

/// Opcode of register-immediate ALU instructions (ADDI, ANDI, ...).
pub const OP_IMM: u32 = 0x13;

/// Opcode of register-register ALU instructions (ADD, SUB, ...).
pub const OP_REG: u32 = 0x33;

/// Canonical NOP (`addi x0, x0, 0`), returned for addresses outside the program image.
pub const NOP: u32 = 0x0000_0013;
