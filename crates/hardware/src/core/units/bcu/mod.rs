//! Branch comparison unit: resolves a branch's condition and next PC.
//!
//! Unlike the ALU, the BCU's result bus is consumed only by the ROB (RS-ALU
//! and RS-Mem never wait on a branch's boolean outcome).

use crate::common::cdb::BranchResult;

/// One cycle's worth of RS-BCU issue, or nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct BcuInput {
    /// ROB id to report to; `0` disables the unit this cycle.
    pub dest: usize,
    /// `funct3`, selecting the comparison.
    pub op: u8,
    /// rs1 value.
    pub vj: u32,
    /// rs2 value.
    pub vk: u32,
    /// PC + 4: next PC if not taken.
    pub pc_fallthrough: u32,
    /// Branch target: next PC if taken.
    pub pc_target: u32,
}

/// Stateless branch comparator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bcu;

impl Bcu {
    /// Computes this cycle's branch-bus broadcast from the given issue.
    #[must_use]
    pub fn tick(input: BcuInput) -> BranchResult {
        if input.dest == 0 {
            return BranchResult::NONE;
        }
        let taken = compare(input.op, input.vj, input.vk);
        let value = if taken { input.pc_target } else { input.pc_fallthrough };
        BranchResult { rob_id: input.dest, taken, value }
    }
}

fn compare(op: u8, vj: u32, vk: u32) -> bool {
    let (vj_s, vk_s) = (vj as i32, vk as i32);
    match op {
        0b000 => vj == vk,       // BEQ
        0b001 => vj != vk,       // BNE
        0b100 => vj_s < vk_s,    // BLT
        0b101 => vj_s >= vk_s,   // BGE
        0b110 => vj < vk,        // BLTU
        0b111 => vj >= vk,       // BGEU
        _ => false,
    }
}
