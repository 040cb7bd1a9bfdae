//! Two-pass assembler for the small RV32I subset used by fetch test programs.
//!
//! Supported instructions:
//! 1. **Branches:** `beq`, `bne`, `blt`, `bge` with a label or byte offset.
//! 2. **Jumps:** `jal [rd,] target` (rd defaults to `ra`) and `jalr rd, rs1[, imm]`.
//! 3. **Register ALU:** `add`, `sub`, `and`, `or`, `xor`.
//! 4. **Immediate ALU:** `addi`, `andi`, `ori`, `xori`, plus `nop`.
//!
//! Registers are written `x0`..`x31` or by ABI name (`zero`, `ra`, `sp`,
//! `a0`, `fp`, ...). A label is `name:` at the start of a line and may share
//! the line with an instruction. `#` and `//` start comments. The first pass
//! assigns every label its address; the second encodes with labels resolved.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::loader::strip_comment;
use crate::common::constants::{NOP, OP_BRANCH, OP_IMM, OP_JAL, OP_JALR, OP_REG, WORD_BYTES};
use crate::common::error::SimError;

/// Name reported for sources that did not come from a file.
const INLINE_SOURCE: &str = "<assembly>";

/// ABI register names, indexed by register number.
const REG_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Reach of a B-type offset in bytes.
const BRANCH_RANGE: (i64, i64) = (-4096, 4094);

/// Reach of a J-type offset in bytes.
const JAL_RANGE: (i64, i64) = (-(1 << 20), (1 << 20) - 2);

/// Range of a 12-bit signed immediate.
const IMM12_RANGE: (i64, i64) = (-2048, 2047);

/// A counted loop, a forward conditional branch, a JAL, and a closing
/// self-loop; the program `ifetch assemble --example` writes out.
pub const EXAMPLE_PROGRAM: &str = "\
# Simple loop with branches

        addi x1, x0, 10      # loop counter
        addi x2, x0, 0       # sum

loop:
        addi x2, x2, 1
        addi x1, x1, -1
        bne x1, x0, loop

        addi x3, x0, 100
        addi x4, x0, 50

        blt x4, x3, taken
        addi x5, x0, 1       # not-taken path
        jal x0, end

taken:
        addi x5, x0, 2       # taken path

end:
        addi x6, x0, 0
        beq x0, x0, end
";

/// One source line after comment removal.
struct SourceLine<'a> {
    number: usize,
    label: Option<&'a str>,
    body: &'a str,
}

impl<'a> SourceLine<'a> {
    fn split(number: usize, raw: &'a str) -> Self {
        let text = strip_comment(raw);
        let (label, body) = match text.split_once(':') {
            Some((label, rest)) => (Some(label.trim()), rest.trim()),
            None => (None, text),
        };
        Self {
            number,
            label,
            body,
        }
    }
}

/// Assembles `source` into instruction words placed from address zero.
///
/// # Errors
///
/// Returns [`SimError::Parse`] naming the 1-based line of the first bad
/// label, mnemonic, operand, or out-of-range offset.
///
/// # Examples
///
/// ```
/// use ifetch_core::sim::assembler::assemble;
///
/// let words = assemble("loop: addi x1, x1, -1\n bne x1, zero, loop\n").unwrap();
/// assert_eq!(words, vec![0xFFF0_8093, 0xFE00_9EE3]);
/// ```
pub fn assemble(source: &str) -> Result<Vec<u32>, SimError> {
    assemble_source(source, Path::new(INLINE_SOURCE))
}

/// Assembles `source`, reporting errors against `path`.
///
/// # Errors
///
/// As [`assemble`].
pub fn assemble_source(source: &str, path: &Path) -> Result<Vec<u32>, SimError> {
    let lines: Vec<SourceLine<'_>> = source
        .lines()
        .enumerate()
        .map(|(n, raw)| SourceLine::split(n + 1, raw))
        .collect();

    let mut labels: HashMap<&str, u32> = HashMap::new();
    let mut pc: u32 = 0;
    for line in &lines {
        if let Some(label) = line.label {
            if !is_label(label) {
                return Err(SimError::parse(
                    path,
                    line.number,
                    format!("invalid label '{label}'"),
                ));
            }
            if labels.insert(label, pc).is_some() {
                return Err(SimError::parse(
                    path,
                    line.number,
                    format!("label '{label}' defined twice"),
                ));
            }
        }
        if !line.body.is_empty() {
            pc = pc.wrapping_add(WORD_BYTES);
        }
    }

    let mut words = Vec::new();
    let mut pc: u32 = 0;
    for line in lines.iter().filter(|l| !l.body.is_empty()) {
        let word = encode(line.body, pc, &labels)
            .map_err(|message| SimError::parse(path, line.number, message))?;
        debug!("{pc:#010x}: {word:08X}  {}", line.body);
        words.push(word);
        pc = pc.wrapping_add(WORD_BYTES);
    }
    Ok(words)
}

/// Reads and assembles a source file.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be read, otherwise as
/// [`assemble`].
pub fn load_assembly(path: impl AsRef<Path>) -> Result<Vec<u32>, SimError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
    let words = assemble_source(&source, path)?;
    info!("assembled {} instructions from {}", words.len(), path.display());
    Ok(words)
}

fn is_label(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '.')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Encodes one instruction at `pc`.
fn encode(body: &str, pc: u32, labels: &HashMap<&str, u32>) -> Result<u32, String> {
    let mut tokens = body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty());
    let mnemonic = tokens.next().unwrap_or_default().to_ascii_lowercase();
    let operands: Vec<&str> = tokens.collect();
    let m = mnemonic.as_str();

    match m {
        "nop" => {
            let [] = take::<0>(m, &operands)?;
            Ok(NOP)
        }
        "beq" | "bne" | "blt" | "bge" => {
            let funct3 = match m {
                "beq" => 0b000,
                "bne" => 0b001,
                "blt" => 0b100,
                _ => 0b101,
            };
            let [rs1, rs2, target] = take(m, &operands)?;
            let offset = jump_offset(target, pc, labels, BRANCH_RANGE)?;
            Ok(b_type(offset, register(rs2)?, register(rs1)?, funct3))
        }
        "jal" => {
            let (rd, target) = match operands.as_slice() {
                [target] => (1, *target),
                [rd, target] => (register(rd)?, *target),
                _ => return Err(arity(m, "1 or 2", operands.len())),
            };
            let offset = jump_offset(target, pc, labels, JAL_RANGE)?;
            Ok(j_type(offset, rd))
        }
        "jalr" => {
            let (rd, rs1, imm) = match operands.as_slice() {
                [rd, rs1] => (*rd, *rs1, 0),
                [rd, rs1, imm] => (*rd, *rs1, immediate(imm, IMM12_RANGE)?),
                _ => return Err(arity(m, "2 or 3", operands.len())),
            };
            Ok(i_type(imm, register(rs1)?, 0b000, register(rd)?, OP_JALR))
        }
        "add" | "sub" | "and" | "or" | "xor" => {
            let (funct3, funct7) = match m {
                "add" => (0b000, 0b000_0000),
                "sub" => (0b000, 0b010_0000),
                "and" => (0b111, 0b000_0000),
                "or" => (0b110, 0b000_0000),
                _ => (0b100, 0b000_0000),
            };
            let [rd, rs1, rs2] = take(m, &operands)?;
            Ok(r_type(
                funct7,
                register(rs2)?,
                register(rs1)?,
                funct3,
                register(rd)?,
            ))
        }
        "addi" | "andi" | "ori" | "xori" => {
            let funct3 = match m {
                "addi" => 0b000,
                "andi" => 0b111,
                "ori" => 0b110,
                _ => 0b100,
            };
            let [rd, rs1, imm] = take(m, &operands)?;
            Ok(i_type(
                immediate(imm, IMM12_RANGE)?,
                register(rs1)?,
                funct3,
                register(rd)?,
                OP_IMM,
            ))
        }
        _ => Err(format!("unknown instruction '{mnemonic}'")),
    }
}

fn arity(mnemonic: &str, expected: &str, found: usize) -> String {
    format!("'{mnemonic}' takes {expected} operands, found {found}")
}

/// Exactly `N` operands.
fn take<'a, const N: usize>(mnemonic: &str, operands: &[&'a str]) -> Result<[&'a str; N], String> {
    <[&str; N]>::try_from(operands).map_err(|_| arity(mnemonic, &N.to_string(), operands.len()))
}

/// Parses `x0`..`x31` or an ABI register name.
fn register(token: &str) -> Result<u32, String> {
    let name = token.to_ascii_lowercase();
    if let Some(n) = name.strip_prefix('x').and_then(|d| d.parse::<u32>().ok()) {
        if n < 32 {
            return Ok(n);
        }
    }
    if name == "fp" {
        return Ok(8);
    }
    REG_NAMES
        .iter()
        .position(|&r| r == name)
        .map(|i| i as u32)
        .ok_or_else(|| format!("unknown register '{token}'"))
}

/// Parses a decimal or `0x` hex literal, optionally negative.
fn literal(token: &str) -> Option<i64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None if digits.starts_with(|c: char| c.is_ascii_digit()) => digits.parse().ok()?,
        None => return None,
    };
    Some(if negative { -value } else { value })
}

/// Parses an immediate and checks it against `(min, max)`.
fn immediate(token: &str, (min, max): (i64, i64)) -> Result<i32, String> {
    let value = literal(token).ok_or_else(|| format!("invalid immediate '{token}'"))?;
    if !(min..=max).contains(&value) {
        return Err(format!("immediate {value} outside {min}..={max}"));
    }
    Ok(value as i32)
}

/// Resolves a label or literal byte offset relative to `pc`.
fn jump_offset(
    target: &str,
    pc: u32,
    labels: &HashMap<&str, u32>,
    (min, max): (i64, i64),
) -> Result<i32, String> {
    let offset = match labels.get(target) {
        Some(&address) => i64::from(address) - i64::from(pc),
        None => literal(target).ok_or_else(|| format!("undefined label '{target}'"))?,
    };
    if offset % 2 != 0 {
        return Err(format!("jump offset {offset} is not a multiple of 2"));
    }
    if !(min..=max).contains(&offset) {
        return Err(format!("jump offset {offset} outside {min}..={max}"));
    }
    Ok(offset as i32)
}

/// Two's-complement bits of a signed immediate.
#[allow(clippy::cast_sign_loss)]
const fn bits(imm: i32) -> u32 {
    imm as u32
}

const fn r_type(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32) -> u32 {
    (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | OP_REG
}

const fn i_type(imm: i32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    ((bits(imm) & 0xFFF) << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
}

const fn b_type(offset: i32, rs2: u32, rs1: u32, funct3: u32) -> u32 {
    let imm = bits(offset);
    (((imm >> 12) & 1) << 31)
        | (((imm >> 5) & 0x3F) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (funct3 << 12)
        | (((imm >> 1) & 0xF) << 8)
        | (((imm >> 11) & 1) << 7)
        | OP_BRANCH
}

const fn j_type(offset: i32, rd: u32) -> u32 {
    let imm = bits(offset);
    (((imm >> 20) & 1) << 31)
        | (((imm >> 1) & 0x3FF) << 21)
        | (((imm >> 11) & 1) << 20)
        | (((imm >> 12) & 0xFF) << 12)
        | (rd << 7)
        | OP_JAL
}
