//! Program and branch-file loading.
//!
//! This module reads and writes the text files that initialize a run. It performs:
//! 1. **Program images:** `.mem` files of hex instruction words (BRAM init format).
//! 2. **Branch traces:** `PC TAKEN TARGET` lines recorded from an execution.
//! 3. **Ground truth:** `branches.mem` files of packed 66-bit table entries.
//!
//! Parsing is split from file access so images can also be built in memory.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::info;

use super::ground_truth::{BranchRecord, BranchTable};
use crate::common::addr::predictor_index;
use crate::common::constants::PREDICTOR_ENTRIES;
use crate::common::error::SimError;

/// Hex digits per `branches.mem` line.
const BRANCH_ENTRY_DIGITS: usize = 18;

/// Significant bits of a packed ground-truth entry.
const BRANCH_ENTRY_BITS: u32 = 66;

/// Strips `#` and `//` comments and surrounding whitespace.
pub(crate) fn strip_comment(line: &str) -> &str {
    let end = [line.find('#'), line.find("//")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(line.len());
    line[..end].trim()
}

/// Parses a hex token with an optional `0x` prefix.
fn parse_hex_u32(token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u32::from_str_radix(digits, 16).ok()
}

/// Reads a file to a string, tagging errors with the path.
fn read_text(path: &Path) -> Result<String, SimError> {
    fs::read_to_string(path).map_err(|e| SimError::io(path, e))
}

/// Parses the contents of a `.mem` program image.
///
/// Each non-comment line holds one or more whitespace-separated hex words;
/// they are placed at consecutive word addresses from zero.
///
/// # Errors
///
/// Returns [`SimError::Parse`] naming the first malformed token.
pub fn parse_program_mem(text: &str, path: &Path) -> Result<Vec<u32>, SimError> {
    let mut words = Vec::new();
    for (n, raw) in text.lines().enumerate() {
        for token in strip_comment(raw).split_whitespace() {
            let word = parse_hex_u32(token).ok_or_else(|| {
                SimError::parse(path, n + 1, format!("invalid instruction word '{token}'"))
            })?;
            words.push(word);
        }
    }
    Ok(words)
}

/// Loads a `.mem` program image from disk.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be read, [`SimError::Parse`]
/// on a malformed word, and [`SimError::EmptyProgram`] if no words remain.
pub fn load_program_mem(path: impl AsRef<Path>) -> Result<Vec<u32>, SimError> {
    let path = path.as_ref();
    let words = parse_program_mem(&read_text(path)?, path)?;
    if words.is_empty() {
        return Err(SimError::EmptyProgram {
            path: path.to_path_buf(),
        });
    }
    info!("loaded {} instruction words from {}", words.len(), path.display());
    Ok(words)
}

/// Renders a program image as `.mem` text: one 8-digit uppercase word per line.
pub fn format_program_mem(words: &[u32]) -> String {
    let mut out = String::with_capacity(words.len() * 9);
    for word in words {
        let _ = writeln!(out, "{word:08X}");
    }
    out
}

/// Writes a program image as a `.mem` file.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be written.
pub fn save_program_mem(path: impl AsRef<Path>, words: &[u32]) -> Result<(), SimError> {
    let path = path.as_ref();
    fs::write(path, format_program_mem(words)).map_err(|e| SimError::io(path, e))?;
    info!("wrote {} instruction words to {}", words.len(), path.display());
    Ok(())
}

/// Parses a branch trace.
///
/// Each line is `PC TAKEN TARGET` with hex addresses and a decimal taken
/// flag (non-zero = taken), e.g. `0x00000040 1 0x00000100`. Lines with fewer
/// than three fields are ignored.
///
/// # Errors
///
/// Returns [`SimError::Parse`] if a field of a complete line is malformed.
pub fn parse_branch_trace(text: &str, path: &Path) -> Result<Vec<BranchRecord>, SimError> {
    let mut records = Vec::new();
    for (n, raw) in text.lines().enumerate() {
        let fields: Vec<&str> = strip_comment(raw).split_whitespace().collect();
        let [pc, taken, target, ..] = fields.as_slice() else {
            continue;
        };
        let line = n + 1;
        let pc = parse_hex_u32(pc)
            .ok_or_else(|| SimError::parse(path, line, format!("invalid branch address '{pc}'")))?;
        let taken = taken
            .parse::<i64>()
            .map_err(|_| SimError::parse(path, line, format!("invalid taken flag '{taken}'")))?
            != 0;
        let target = parse_hex_u32(target)
            .ok_or_else(|| SimError::parse(path, line, format!("invalid target '{target}'")))?;
        records.push(BranchRecord { pc, taken, target });
    }
    Ok(records)
}

/// Loads a branch trace from disk.
///
/// # Errors
///
/// As [`parse_branch_trace`], plus [`SimError::Io`] if the file cannot be read.
pub fn load_branch_trace(path: impl AsRef<Path>) -> Result<Vec<BranchRecord>, SimError> {
    let path = path.as_ref();
    let records = parse_branch_trace(&read_text(path)?, path)?;
    info!("loaded {} branch records from {}", records.len(), path.display());
    Ok(records)
}

/// Renders a ground-truth table as `branches.mem` text: 256 lines of
/// 18 hex digits, invalid entries as zero.
pub fn format_branch_mem(table: &BranchTable) -> String {
    let mut out = String::with_capacity(PREDICTOR_ENTRIES * 19);
    for bits in table.packed() {
        let _ = writeln!(out, "{bits:018X}");
    }
    out
}

/// Parses `branches.mem` text; line `i` (ignoring comments and blanks) is
/// table entry `i`.
///
/// # Errors
///
/// Returns [`SimError::Parse`] for malformed entries, entries wider than 66
/// bits, valid entries whose pc indexes a different line, or more than 256
/// entries.
pub fn parse_branch_mem(text: &str, path: &Path) -> Result<BranchTable, SimError> {
    let mut table = BranchTable::new();
    let mut index = 0;
    for (n, raw) in text.lines().enumerate() {
        let token = strip_comment(raw);
        if token.is_empty() {
            continue;
        }
        if index >= PREDICTOR_ENTRIES {
            return Err(SimError::parse(
                path,
                n + 1,
                format!("more than {PREDICTOR_ENTRIES} entries"),
            ));
        }
        let line = n + 1;
        if token.len() > BRANCH_ENTRY_DIGITS {
            return Err(SimError::parse(
                path,
                line,
                format!("branch entry '{token}' is wider than {BRANCH_ENTRY_DIGITS} hex digits"),
            ));
        }
        let bits = u128::from_str_radix(token, 16)
            .map_err(|_| SimError::parse(path, line, format!("invalid branch entry '{token}'")))?;
        if bits >> BRANCH_ENTRY_BITS != 0 {
            return Err(SimError::parse(
                path,
                line,
                format!("branch entry '{token}' sets bits above {}", BRANCH_ENTRY_BITS - 1),
            ));
        }
        let record = BranchRecord::unpack(bits);
        if let Some(r) = record {
            if predictor_index(r.pc) != index {
                return Err(SimError::parse(
                    path,
                    line,
                    format!(
                        "branch at {:#010x} belongs in entry {}, found in entry {index}",
                        r.pc,
                        predictor_index(r.pc)
                    ),
                ));
            }
        }
        table.set(index, record);
        index += 1;
    }
    Ok(table)
}

/// Loads a `branches.mem` ground-truth table from disk.
///
/// # Errors
///
/// As [`parse_branch_mem`], plus [`SimError::Io`] if the file cannot be read.
pub fn load_branch_mem(path: impl AsRef<Path>) -> Result<BranchTable, SimError> {
    let path = path.as_ref();
    let table = parse_branch_mem(&read_text(path)?, path)?;
    info!("loaded {} ground-truth entries from {}", table.len(), path.display());
    Ok(table)
}

/// Writes a ground-truth table as a `branches.mem` file.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be written.
pub fn save_branch_mem(path: impl AsRef<Path>, table: &BranchTable) -> Result<(), SimError> {
    let path = path.as_ref();
    fs::write(path, format_branch_mem(table)).map_err(|e| SimError::io(path, e))?;
    info!("wrote {} ground-truth entries to {}", table.len(), path.display());
    Ok(())
}
