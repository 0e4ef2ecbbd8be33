//! Reservation station for the integer ALU.
//!
//! A 16-entry array of pending operations, woken by CDB snooping and issued
//! one at a time (first-ready-wins) to the ALU.

use crate::common::cdb::CdbMessage;
use crate::common::constants::RS_SIZE;
use crate::core::units::alu::AluInput;

#[derive(Clone, Copy, Debug, Default)]
struct Entry {
    busy: bool,
    op: u8,
    vj: u32,
    vk: u32,
    qj: usize,
    qk: usize,
    dest: usize,
}

impl Entry {
    const fn ready(self) -> bool {
        self.busy && self.qj == 0 && self.qk == 0
    }
}

/// A new ALU operation dispatched by the decoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct AluDispatch {
    /// 4-bit op: `{funct7[30], funct3}`.
    pub op: u8,
    /// First operand value (valid only if `qj == 0`).
    pub vj: u32,
    /// Second operand value (valid only if `qk == 0`).
    pub vk: u32,
    /// Producer tag for `vj`, or `0` if already valid.
    pub qj: usize,
    /// Producer tag for `vk`, or `0` if already valid.
    pub qk: usize,
    /// ROB id this operation will write back to.
    pub dest: usize,
}

/// 16-entry reservation station feeding the ALU.
#[derive(Clone, Debug)]
pub struct RsAlu {
    entries: [Entry; RS_SIZE],
}

impl Default for RsAlu {
    fn default() -> Self {
        Self { entries: [Entry::default(); RS_SIZE] }
    }
}

impl RsAlu {
    /// Creates an empty reservation station.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of free entries, as published to the decoder's fullness check.
    #[must_use]
    pub fn vacancy(&self) -> usize {
        self.entries.iter().filter(|e| !e.busy).count()
    }

    /// Advances one cycle: optionally accepts a dispatch, snoops both CDBs,
    /// and issues at most one ready entry to the ALU.
    pub fn tick(
        &mut self,
        flush: bool,
        dispatch: Option<AluDispatch>,
        cdb_alu: CdbMessage,
        cdb_mem: CdbMessage,
    ) -> AluInput {
        if flush {
            self.entries = [Entry::default(); RS_SIZE];
            return AluInput::default();
        }

        if let Some(d) = dispatch {
            if let Some(slot) = self.entries.iter_mut().find(|e| !e.busy) {
                *slot = Entry { busy: true, op: d.op, vj: d.vj, vk: d.vk, qj: d.qj, qk: d.qk, dest: d.dest };
            }
        }

        for cdb in [cdb_alu, cdb_mem] {
            if !cdb.is_valid() {
                continue;
            }
            for e in &mut self.entries {
                if !e.busy {
                    continue;
                }
                if e.qj == cdb.rob_id {
                    e.vj = cdb.value;
                    e.qj = 0;
                }
                if e.qk == cdb.rob_id {
                    e.vk = cdb.value;
                    e.qk = 0;
                }
            }
        }

        if let Some(slot) = self.entries.iter_mut().find(|e| e.ready()) {
            let out = AluInput { dest: slot.dest, op: slot.op, vj: slot.vj, vk: slot.vk };
            slot.busy = false;
            return out;
        }
        AluInput::default()
    }
}
