//! Instruction decode, register renaming, and dispatch.
//!
//! One instruction is issued per cycle at most. The FSM exists entirely to
//! handle backpressure: when the destination reservation station or the ROB
//! has no room, the decoder caches the instruction it just tried, asks the
//! Fetcher to move on to `pc + 4` anyway (so the next instruction is ready
//! the moment issue succeeds), and keeps retrying the cached one until it
//! is accepted.

use crate::common::cdb::{CdbMessage, CommitInfo};
use crate::common::constants::{HALT_INSTRUCTION, ROB_SIZE};
use crate::core::register_file::{RegisterFile, RenameWrite};
use crate::core::rob::{Op, RobDispatch};
use crate::core::rs_alu::AluDispatch;
use crate::core::rs_bcu::BcuDispatch;
use crate::core::rs_mem::{LoadDispatch, StoreDispatch};
use crate::core::signals::DecoderToFetcher;
use crate::isa::decode::Fields;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    SkipCycle,
    TryIssue,
    ReplayPrevious,
    WaitJalr,
}

#[derive(Clone, Copy, Debug, Default)]
struct Cached {
    instruction: u32,
    pc: u32,
    predicted_branch_taken: bool,
}

/// Which reservation stations and the ROB currently have room. A "full"
/// flag here means "not safe to allocate into this cycle", which the
/// driver computes from each module's published vacancy.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fullness {
    /// RS-ALU has no free entry.
    pub rs_alu: bool,
    /// RS-BCU has no free entry.
    pub rs_bcu: bool,
    /// RS-Mem's load queue has no free entry.
    pub rs_mem_load: bool,
    /// RS-Mem's store queue has no free entry.
    pub rs_mem_store: bool,
    /// The ROB has no free entry.
    pub rob: bool,
}

/// Everything the decoder produces in one cycle; every field is an
/// `Option` standing in for "write-disabled" in the reference machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecoderOutput {
    /// Fetcher PC override, used on replay-stall and on control-flow ops
    /// that resolve their own target (`JAL`/`RET`/predicted branch path).
    pub to_fetcher: DecoderToFetcher,
    /// New ROB allocation.
    pub to_rob: Option<RobDispatch>,
    /// New RS-ALU entry.
    pub to_rs_alu: Option<AluDispatch>,
    /// New RS-BCU entry.
    pub to_rs_bcu: Option<BcuDispatch>,
    /// New RS-Mem load entry.
    pub to_rs_mem_load: Option<LoadDispatch>,
    /// New RS-Mem store entry.
    pub to_rs_mem_store: Option<StoreDispatch>,
    /// RegFile rename (destination register tagged with the new ROB id).
    pub to_reg_file: Option<RenameWrite>,
    /// Set when the fetched opcode doesn't match any implemented
    /// instruction. This is not backpressure (the ROB/RS fullness arms use
    /// [`Decoder::issue_failure`] instead) — it is a fatal condition the
    /// driver turns into a [`crate::common::error::SimError::InvariantViolation`].
    pub trap: Option<&'static str>,
}

/// Decode/rename/dispatch stage.
#[derive(Clone, Debug)]
pub struct Decoder {
    state: State,
    last_branch_id: usize,
    cached: Cached,
}

impl Default for Decoder {
    fn default() -> Self {
        Self { state: State::SkipCycle, last_branch_id: 0, cached: Cached::default() }
    }
}

impl Decoder {
    /// Creates a decoder in its post-reset state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one cycle.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        flush: bool,
        fetch_instruction: u32,
        fetch_pc: u32,
        fetch_predicted_branch_taken: bool,
        regfile: &RegisterFile,
        rob_value: &[u32; ROB_SIZE],
        rob_ready: &[bool; ROB_SIZE],
        cdb_alu: CdbMessage,
        cdb_mem: CdbMessage,
        full: Fullness,
        next_rob_id: usize,
        commit_info: CommitInfo,
    ) -> DecoderOutput {
        if flush {
            tracing::trace!("decoder flush");
            *self = Self::default();
            return DecoderOutput::default();
        }

        if commit_info.rob_id != 0 && commit_info.rob_id == self.last_branch_id {
            self.last_branch_id = 0;
        }

        match self.state {
            State::SkipCycle => {
                self.state = State::TryIssue;
                return DecoderOutput::default();
            }
            State::WaitJalr => {
                if self.last_branch_id == 0 {
                    self.state = State::TryIssue;
                }
                return DecoderOutput::default();
            }
            State::TryIssue | State::ReplayPrevious => {}
        }

        let (instruction, pc, predicted_branch_taken) = if self.state == State::TryIssue {
            (fetch_instruction, fetch_pc, fetch_predicted_branch_taken)
        } else {
            (self.cached.instruction, self.cached.pc, self.cached.predicted_branch_taken)
        };

        let out = self.issue(
            instruction,
            pc,
            predicted_branch_taken,
            regfile,
            rob_value,
            rob_ready,
            cdb_alu,
            cdb_mem,
            full,
            next_rob_id,
        );
        self.cached = Cached { instruction, pc, predicted_branch_taken };
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn issue(
        &mut self,
        instruction: u32,
        pc: u32,
        predicted_branch_taken: bool,
        regfile: &RegisterFile,
        rob_value: &[u32; ROB_SIZE],
        rob_ready: &[bool; ROB_SIZE],
        cdb_alu: CdbMessage,
        cdb_mem: CdbMessage,
        full: Fullness,
        rob_id: usize,
    ) -> DecoderOutput {
        if full.rob {
            return self.issue_failure(pc);
        }

        if instruction == HALT_INSTRUCTION {
            self.state = State::TryIssue;
            return DecoderOutput {
                to_rob: Some(RobDispatch {
                    op: Op::Halt,
                    value_ready: true,
                    value: 0,
                    alt_value: 0,
                    dest: 0,
                    predicted_branch_taken: false,
                }),
                ..DecoderOutput::default()
            };
        }

        let f = Fields::decode(instruction);
        tracing::trace!(pc, opcode = f.opcode, rob_id, "decoder dispatch");
        let query = |reg: u32| query_register(reg, regfile, rob_value, rob_ready, cdb_alu, cdb_mem);
        let (rs1_v, rs1_q) = query(f.rs1);
        let (rs2_v, rs2_q) = query(f.rs2);

        match f.opcode {
            0b0110111 => {
                // LUI
                self.state = State::TryIssue;
                DecoderOutput {
                    to_rob: Some(RobDispatch {
                        op: Op::Other,
                        value_ready: true,
                        value: f.imm_u,
                        alt_value: 0,
                        dest: f.rd,
                        predicted_branch_taken: false,
                    }),
                    to_reg_file: Some(RenameWrite { reg_id: f.rd, rob_id }),
                    ..DecoderOutput::default()
                }
            }
            0b0010111 => {
                // AUIPC
                if full.rs_alu {
                    return self.issue_failure(pc);
                }
                self.state = State::TryIssue;
                DecoderOutput {
                    to_rob: Some(RobDispatch {
                        op: Op::Other,
                        value_ready: false,
                        value: 0,
                        alt_value: 0,
                        dest: f.rd,
                        predicted_branch_taken: false,
                    }),
                    to_rs_alu: Some(AluDispatch { op: 0b0000, vj: pc, vk: f.imm_u, qj: 0, qk: 0, dest: rob_id }),
                    to_reg_file: Some(RenameWrite { reg_id: f.rd, rob_id }),
                    ..DecoderOutput::default()
                }
            }
            0b1101111 => {
                // JAL
                let target = pc.wrapping_add(f.imm_j as u32);
                self.state = State::SkipCycle;
                DecoderOutput {
                    to_rob: Some(RobDispatch {
                        op: Op::Other,
                        value_ready: true,
                        value: pc.wrapping_add(4),
                        alt_value: 0,
                        dest: f.rd,
                        predicted_branch_taken: false,
                    }),
                    to_reg_file: Some(RenameWrite { reg_id: f.rd, rob_id }),
                    to_fetcher: DecoderToFetcher { pc_enabled: true, pc: target },
                    ..DecoderOutput::default()
                }
            }
            0b1100111 => {
                // JALR / RET
                let is_ret = f.rs1 == 1 && f.imm_i == 0 && f.rd == 0;
                if is_ret && rs1_q == 0 {
                    self.state = State::SkipCycle;
                    return DecoderOutput {
                        to_rob: Some(RobDispatch {
                            op: Op::Other,
                            value_ready: true,
                            value: pc.wrapping_add(4),
                            alt_value: 0,
                            dest: 0,
                            predicted_branch_taken: false,
                        }),
                        to_fetcher: DecoderToFetcher { pc_enabled: true, pc: rs1_v },
                        ..DecoderOutput::default()
                    };
                }

                if full.rs_alu {
                    return self.issue_failure(pc);
                }
                self.state = State::WaitJalr;
                self.last_branch_id = rob_id;
                DecoderOutput {
                    to_rob: Some(RobDispatch {
                        op: Op::Jalr,
                        value_ready: false,
                        value: 0,
                        alt_value: pc.wrapping_add(4),
                        dest: f.rd,
                        predicted_branch_taken: false,
                    }),
                    to_rs_alu: Some(AluDispatch { op: 0b0000, vj: rs1_v, vk: f.imm_i as u32, qj: rs1_q, qk: 0, dest: rob_id }),
                    to_reg_file: Some(RenameWrite { reg_id: f.rd, rob_id }),
                    ..DecoderOutput::default()
                }
            }
            0b1100011 => {
                // Branches
                if full.rs_bcu {
                    return self.issue_failure(pc);
                }
                let target = pc.wrapping_add(f.imm_b as u32);
                let predicted_pc = if predicted_branch_taken { target } else { pc.wrapping_add(4) };
                self.state = State::SkipCycle;
                self.last_branch_id = rob_id;
                DecoderOutput {
                    to_rob: Some(RobDispatch {
                        op: Op::Branch,
                        value_ready: false,
                        value: 0,
                        alt_value: pc,
                        dest: 0,
                        predicted_branch_taken,
                    }),
                    to_rs_bcu: Some(BcuDispatch {
                        op: f.funct3 as u8,
                        vj: rs1_v,
                        vk: rs2_v,
                        qj: rs1_q,
                        qk: rs2_q,
                        dest: rob_id,
                        pc_fallthrough: pc.wrapping_add(4),
                        pc_target: target,
                    }),
                    to_fetcher: DecoderToFetcher { pc_enabled: true, pc: predicted_pc },
                    ..DecoderOutput::default()
                }
            }
            0b0000011 => {
                // Loads
                if full.rs_mem_load {
                    return self.issue_failure(pc);
                }
                self.state = State::TryIssue;
                DecoderOutput {
                    to_rob: Some(RobDispatch {
                        op: Op::Other,
                        value_ready: false,
                        value: 0,
                        alt_value: 0,
                        dest: f.rd,
                        predicted_branch_taken: false,
                    }),
                    to_rs_mem_load: Some(LoadDispatch { op: f.funct3 as u8, vj: rs1_v, qj: rs1_q, dest: rob_id, offset: f.imm_i }),
                    to_reg_file: Some(RenameWrite { reg_id: f.rd, rob_id }),
                    ..DecoderOutput::default()
                }
            }
            0b0100011 => {
                // Stores
                if full.rs_mem_store {
                    return self.issue_failure(pc);
                }
                self.state = State::TryIssue;
                DecoderOutput {
                    to_rob: Some(RobDispatch {
                        op: Op::Other,
                        value_ready: false,
                        value: 0,
                        alt_value: 0,
                        dest: 0,
                        predicted_branch_taken: false,
                    }),
                    to_rs_mem_store: Some(StoreDispatch {
                        op: f.funct3 as u8,
                        vj: rs1_v,
                        vk: rs2_v,
                        qj: rs1_q,
                        qk: rs2_q,
                        qm: self.last_branch_id,
                        dest: rob_id,
                        offset: f.imm_s,
                    }),
                    ..DecoderOutput::default()
                }
            }
            0b0010011 => {
                // I-type ALU
                if full.rs_alu {
                    return self.issue_failure(pc);
                }
                let is_shift = f.funct3 == 0b001 || f.funct3 == 0b101;
                let op = if is_shift { ((f.alt_bit()) << 3) as u8 | f.funct3 as u8 } else { f.funct3 as u8 };
                let vk = if is_shift { f.shamt() } else { f.imm_i as u32 };
                self.state = State::TryIssue;
                DecoderOutput {
                    to_rob: Some(RobDispatch {
                        op: Op::Other,
                        value_ready: false,
                        value: 0,
                        alt_value: 0,
                        dest: f.rd,
                        predicted_branch_taken: false,
                    }),
                    to_rs_alu: Some(AluDispatch { op, vj: rs1_v, vk, qj: rs1_q, qk: 0, dest: rob_id }),
                    to_reg_file: Some(RenameWrite { reg_id: f.rd, rob_id }),
                    ..DecoderOutput::default()
                }
            }
            0b0110011 => {
                // R-type ALU
                if full.rs_alu {
                    return self.issue_failure(pc);
                }
                let op = ((f.alt_bit()) << 3) as u8 | f.funct3 as u8;
                self.state = State::TryIssue;
                DecoderOutput {
                    to_rob: Some(RobDispatch {
                        op: Op::Other,
                        value_ready: false,
                        value: 0,
                        alt_value: 0,
                        dest: f.rd,
                        predicted_branch_taken: false,
                    }),
                    to_rs_alu: Some(AluDispatch { op, vj: rs1_v, vk: rs2_v, qj: rs1_q, qk: rs2_q, dest: rob_id }),
                    to_reg_file: Some(RenameWrite { reg_id: f.rd, rob_id }),
                    ..DecoderOutput::default()
                }
            }
            _ => DecoderOutput { trap: Some("unrecognized opcode"), ..DecoderOutput::default() },
        }
    }

    fn issue_failure(&mut self, pc: u32) -> DecoderOutput {
        tracing::trace!(pc, "decoder issue failed, replaying");
        self.state = State::ReplayPrevious;
        DecoderOutput { to_fetcher: DecoderToFetcher { pc_enabled: true, pc: pc.wrapping_add(4) }, ..DecoderOutput::default() }
    }
}

fn query_register(
    reg: u32,
    regfile: &RegisterFile,
    rob_value: &[u32; ROB_SIZE],
    rob_ready: &[bool; ROB_SIZE],
    cdb_alu: CdbMessage,
    cdb_mem: CdbMessage,
) -> (u32, usize) {
    let tag = regfile.tag(reg);
    if tag == 0 {
        return (regfile.value(reg), 0);
    }
    if cdb_alu.rob_id == tag {
        return (cdb_alu.value, 0);
    }
    if cdb_mem.rob_id == tag {
        return (cdb_mem.value, 0);
    }
    if rob_ready[tag] {
        return (rob_value[tag], 0);
    }
    (0, tag)
}
