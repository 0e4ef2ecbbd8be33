//! Parses the plain-text memory image format read from stdin.
//!
//! Each line is either blank (ignored), an `@HEX` directive that resets the
//! write cursor, or a run of whitespace-separated hex byte values written
//! starting at the current cursor.

use std::io::BufRead;

use crate::common::error::{SimError, SimResult};
use crate::core::memory::Memory;

/// Reads a memory image from `reader` into `memory`, starting every byte at
/// address 0 unless redirected by an `@` directive.
pub fn load_image(reader: impl BufRead, memory: &mut Memory) -> SimResult<()> {
    let mut address: usize = 0;
    tracing::debug!("loading memory image");

    for line in reader.lines() {
        let line = line.map_err(|e| malformed(format!("failed to read input: {e}")))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(hex) = line.strip_prefix('@') {
            address = usize::from_str_radix(hex.trim(), 16).map_err(|e| malformed(format!("bad address directive '{line}': {e}")))?;
            continue;
        }

        for token in line.split_whitespace() {
            let byte = u8::from_str_radix(token, 16).map_err(|e| malformed(format!("bad byte literal '{token}': {e}")))?;
            if address >= memory.len() {
                return Err(malformed(format!("address {address:#x} exceeds memory size {:#x}", memory.len())));
            }
            memory.write_byte(address as u32, byte)?;
            address += 1;
        }
    }

    Ok(())
}

fn malformed(detail: String) -> SimError {
    SimError::MalformedImage { detail }
}
