//! Fixed-latency load/store functional unit.
//!
//! Stores commit to memory immediately on acceptance (not at ROB commit);
//! this is safe because RS-Mem never issues a store until every
//! outstanding branch ahead of it has committed (`Qm`). Loads decode
//! sign/zero-extension by `func3`, mirroring the architectural load/store
//! instructions.

use crate::common::cdb::CdbMessage;
use crate::common::constants::MEMORY_LATENCY;
use crate::common::error::{SimError, SimResult};
use crate::core::memory::Memory;

/// One cycle's worth of RS-Mem issue, or nothing (`dest == 0`).
#[derive(Clone, Copy, Debug, Default)]
pub struct MemOpInput {
    /// `false` = load, `true` = store.
    pub is_store: bool,
    /// `func3`, selecting width/sign-extension.
    pub op: u8,
    /// rs1 (base address).
    pub rs1: u32,
    /// rs2 (store data; unused for loads).
    pub rs2: u32,
    /// Sign-extended 12-bit offset.
    pub offset: i32,
    /// ROB id to report to; `0` disables the unit this cycle.
    pub dest: usize,
}

/// Whether the unit accepted this cycle's issue (`recv`) and what it
/// broadcasts on the CDB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemOpOutput {
    /// Whether the offered operation was accepted this cycle. RS-Mem must
    /// keep resending the same operation until this is `true`.
    pub recv: bool,
    /// This cycle's CDB broadcast (`CdbMessage::NONE` except on completion).
    pub cdb: CdbMessage,
}

/// Fixed-latency memory functional unit: a single in-flight operation,
/// `MEMORY_LATENCY` cycles from acceptance to broadcast.
#[derive(Clone, Debug, Default)]
pub struct MemoryUnit {
    state: u8,
    rob_id: usize,
    value: u32,
}

impl MemoryUnit {
    /// Creates an idle unit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one cycle, mutating `memory` immediately for an accepted
    /// store.
    pub fn tick(&mut self, flush: bool, input: MemOpInput, memory: &mut Memory) -> SimResult<MemOpOutput> {
        if flush {
            self.state = 0;
            self.rob_id = 0;
            self.value = 0;
            return Ok(MemOpOutput { recv: false, cdb: CdbMessage::NONE });
        }

        if self.state == 0 {
            if input.dest != 0 {
                self.rob_id = input.dest;
                self.value = if input.is_store {
                    store(memory, &input)?;
                    0
                } else {
                    load(memory, &input)?
                };
                self.state = 1;
                return Ok(MemOpOutput { recv: true, cdb: CdbMessage::NONE });
            }
            return Ok(MemOpOutput { recv: false, cdb: CdbMessage::NONE });
        }

        if self.state == MEMORY_LATENCY {
            let cdb = CdbMessage { rob_id: self.rob_id, value: self.value };
            self.state = 0;
            return Ok(MemOpOutput { recv: false, cdb });
        }

        self.state += 1;
        Ok(MemOpOutput { recv: false, cdb: CdbMessage::NONE })
    }
}

fn address(input: &MemOpInput) -> u32 {
    input.rs1.wrapping_add(input.offset as u32)
}

fn load(memory: &Memory, input: &MemOpInput) -> SimResult<u32> {
    let addr = address(input);
    match input.op {
        0b000 => Ok(memory.read_byte(addr)? as i8 as i32 as u32),
        0b001 => Ok(memory.read_half(addr)? as i16 as i32 as u32),
        0b010 => memory.read_word(addr),
        0b100 => Ok(u32::from(memory.read_byte(addr)?)),
        0b101 => Ok(u32::from(memory.read_half(addr)?)),
        other => Err(SimError::InvariantViolation { detail: format!("MemoryUnit: unknown load func3 {other:#05b}") }),
    }
}

fn store(memory: &mut Memory, input: &MemOpInput) -> SimResult<()> {
    let addr = address(input);
    match input.op {
        0b000 => memory.write_byte(addr, input.rs2 as u8),
        0b001 => memory.write_half(addr, input.rs2 as u16),
        0b010 => memory.write_word(addr, input.rs2),
        other => Err(SimError::InvariantViolation { detail: format!("MemoryUnit: unknown store func3 {other:#05b}") }),
    }
}
