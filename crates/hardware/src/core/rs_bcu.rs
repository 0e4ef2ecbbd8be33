//! Reservation station for the branch comparison unit.
//!
//! Structurally identical to [`crate::core::rs_alu::RsAlu`] with two extra
//! fixed fields (`pc_fallthrough`, `pc_target`) carried alongside the
//! operands.

use crate::common::cdb::CdbMessage;
use crate::common::constants::RS_SIZE;
use crate::core::units::bcu::BcuInput;

#[derive(Clone, Copy, Debug, Default)]
struct Entry {
    busy: bool,
    op: u8,
    vj: u32,
    vk: u32,
    qj: usize,
    qk: usize,
    dest: usize,
    pc_fallthrough: u32,
    pc_target: u32,
}

impl Entry {
    const fn ready(self) -> bool {
        self.busy && self.qj == 0 && self.qk == 0
    }
}

/// A new branch dispatched by the decoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct BcuDispatch {
    /// `funct3`, selecting the comparison.
    pub op: u8,
    /// rs1 value (valid only if `qj == 0`).
    pub vj: u32,
    /// rs2 value (valid only if `qk == 0`).
    pub vk: u32,
    /// Producer tag for `vj`, or `0` if already valid.
    pub qj: usize,
    /// Producer tag for `vk`, or `0` if already valid.
    pub qk: usize,
    /// ROB id this branch will report to.
    pub dest: usize,
    /// PC + 4.
    pub pc_fallthrough: u32,
    /// Branch target address.
    pub pc_target: u32,
}

/// 16-entry reservation station feeding the BCU.
#[derive(Clone, Debug)]
pub struct RsBcu {
    entries: [Entry; RS_SIZE],
}

impl Default for RsBcu {
    fn default() -> Self {
        Self { entries: [Entry::default(); RS_SIZE] }
    }
}

impl RsBcu {
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

    /// Advances one cycle.
    pub fn tick(
        &mut self,
        flush: bool,
        dispatch: Option<BcuDispatch>,
        cdb_alu: CdbMessage,
        cdb_mem: CdbMessage,
    ) -> BcuInput {
        if flush {
            self.entries = [Entry::default(); RS_SIZE];
            return BcuInput::default();
        }

        if let Some(d) = dispatch {
            if let Some(slot) = self.entries.iter_mut().find(|e| !e.busy) {
                *slot = Entry {
                    busy: true,
                    op: d.op,
                    vj: d.vj,
                    vk: d.vk,
                    qj: d.qj,
                    qk: d.qk,
                    dest: d.dest,
                    pc_fallthrough: d.pc_fallthrough,
                    pc_target: d.pc_target,
                };
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
            let out = BcuInput {
                dest: slot.dest,
                op: slot.op,
                vj: slot.vj,
                vk: slot.vk,
                pc_fallthrough: slot.pc_fallthrough,
                pc_target: slot.pc_target,
            };
            slot.busy = false;
            return out;
        }
        BcuInput::default()
    }
}
