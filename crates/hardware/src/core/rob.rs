//! Reorder Buffer: in-order commit, flush control, and halt detection.
//!
//! Slot 0 is never used — it is the sentinel ROB id meaning "no producer"
//! everywhere else in the core — so the buffer is logically 31 usable
//! entries addressed `[1, ROB_SIZE)`, wrapping from `ROB_SIZE - 1` back to
//! `1`.

use crate::common::cdb::{BranchResult, CdbMessage, CommitInfo};
use crate::common::constants::ROB_SIZE;
use crate::core::register_file::CommitWrite;
use crate::core::signals::RobToFetcher;
use crate::stats::Stats;

/// What kind of instruction a ROB entry holds, determining commit behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Op {
    /// Indirect jump: writes `alt_value` (PC+4) to `dest`, then redirects
    /// the Fetcher to the ALU-resolved target in `value`.
    Jalr,
    /// Conditional branch: flushes on misprediction, trains the predictor
    /// either way.
    Branch,
    /// Everything else that writes a register (or nothing, for stores).
    #[default]
    Other,
    /// The halt sentinel.
    Halt,
}

#[derive(Clone, Copy, Debug, Default)]
struct Entry {
    busy: bool,
    op: Op,
    value_ready: bool,
    value: u32,
    alt_value: u32,
    dest: u32,
    branch_taken: bool,
    pred_branch_taken: bool,
}

/// A new instruction dispatched by the decoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct RobDispatch {
    /// Commit-time behavior.
    pub op: Op,
    /// Whether `value` is already known at dispatch (true for LUI/JAL).
    pub value_ready: bool,
    /// See [`Op`] for per-op meaning.
    pub value: u32,
    /// See [`Op`] for per-op meaning.
    pub alt_value: u32,
    /// Destination register, or `0` for none.
    pub dest: u32,
    /// The prediction made at fetch time, for branches.
    pub predicted_branch_taken: bool,
}

/// Everything the ROB produces in one cycle.
#[derive(Clone, Debug, Default)]
pub struct RobTickOutput {
    /// Write-back to the register file, if this cycle committed a
    /// value-producing instruction.
    pub to_reg_file: Option<CommitWrite>,
    /// Broadcast of which ROB id committed this cycle (`0` if none), used
    /// to release `Qm`/`last_branch_id` dependency chains.
    pub commit_info: CommitInfo,
    /// PC redirect / predictor training for the Fetcher.
    pub to_fetcher: RobToFetcher,
    /// Free ROB entries (excluding the permanently unused slot 0).
    pub vacancy: usize,
    /// The slot the next dispatched instruction would land in.
    pub next_tail: usize,
    /// Per-slot value readback, consumed directly by the decoder.
    pub decoder_value: [u32; ROB_SIZE],
    /// Per-slot ready readback, consumed directly by the decoder.
    pub decoder_ready: [bool; ROB_SIZE],
    /// Whether a flush was asserted this cycle.
    pub flush_output: bool,
    /// Whether the halt instruction committed this cycle.
    pub halted: bool,
}

/// Reorder Buffer.
#[derive(Clone, Debug)]
pub struct Rob {
    entries: [Entry; ROB_SIZE],
    head: usize,
    tail: usize,
    first_run: bool,
    flushed_last_cycle: bool,
}

impl Default for Rob {
    fn default() -> Self {
        Self {
            entries: [Entry::default(); ROB_SIZE],
            head: 1,
            tail: 0,
            first_run: true,
            flushed_last_cycle: true,
        }
    }
}

impl Rob {
    /// Creates a ROB in its post-reset state (equivalent to having already
    /// run the first-cycle implicit flush).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn next_tail(tail: usize) -> usize {
        if tail == ROB_SIZE - 1 {
            1
        } else {
            tail + 1
        }
    }

    /// Advances one cycle.
    pub fn tick(
        &mut self,
        dispatch: Option<RobDispatch>,
        cdb_alu: CdbMessage,
        cdb_mem: CdbMessage,
        bcu: BranchResult,
        stats: &mut Stats,
    ) -> RobTickOutput {
        if self.first_run {
            self.first_run = false;
            return self.flush(0, 0, false, false);
        }

        if let Some(d) = dispatch {
            if !self.flushed_last_cycle {
                let slot = Self::next_tail(self.tail);
                debug_assert!(!self.entries[slot].busy, "ROB: allocation into a busy slot");
                self.entries[slot] = Entry {
                    busy: true,
                    op: d.op,
                    value_ready: d.value_ready,
                    value: d.value,
                    alt_value: d.alt_value,
                    dest: d.dest,
                    branch_taken: false,
                    pred_branch_taken: d.predicted_branch_taken,
                };
                self.tail = slot;
                tracing::trace!(rob_id = slot, op = ?d.op, "rob dispatch");
            }
        }

        if cdb_alu.is_valid() {
            self.apply_cdb(cdb_alu);
        }
        if cdb_mem.is_valid() {
            self.apply_cdb(cdb_mem);
        }
        if bcu.is_valid() {
            let e = &mut self.entries[bcu.rob_id];
            if e.busy && !e.value_ready && e.op == Op::Branch {
                e.value = bcu.value;
                e.value_ready = true;
                e.branch_taken = bcu.taken;
            }
        }

        self.flushed_last_cycle = false;

        let head_entry = self.entries[self.head];
        if head_entry.busy && head_entry.value_ready {
            self.commit(stats)
        } else {
            RobTickOutput {
                to_reg_file: None,
                commit_info: CommitInfo::NONE,
                to_fetcher: RobToFetcher::default(),
                vacancy: self.vacancy(),
                next_tail: Self::next_tail(self.tail),
                decoder_value: self.decoder_value(),
                decoder_ready: self.decoder_ready(),
                flush_output: false,
                halted: false,
            }
        }
    }

    fn apply_cdb(&mut self, cdb: CdbMessage) {
        let e = &mut self.entries[cdb.rob_id];
        if e.busy && !e.value_ready {
            e.value = cdb.value;
            e.value_ready = true;
        }
    }

    fn commit(&mut self, stats: &mut Stats) -> RobTickOutput {
        let head = self.head;
        let entry = self.entries[head];

        let (to_reg_file, to_fetcher, halted) = match entry.op {
            Op::Jalr => {
                let rf = Some(CommitWrite { reg_id: entry.dest, data: entry.alt_value, rob_id: head });
                let fetcher = RobToFetcher { pc_enabled: true, pc: entry.value, ..RobToFetcher::default() };
                (rf, fetcher, false)
            }
            Op::Branch => {
                stats.record_branch_prediction_result(entry.pred_branch_taken, entry.branch_taken);
                if entry.branch_taken != entry.pred_branch_taken {
                    tracing::trace!(rob_id = head, target = entry.value, "branch misprediction, flushing");
                    return self.flush(entry.value, entry.alt_value, entry.branch_taken, true);
                }
                let fetcher = RobToFetcher {
                    branch_record_enabled: true,
                    branch_pc: entry.value,
                    branch_taken: entry.branch_taken,
                    ..RobToFetcher::default()
                };
                (None, fetcher, false)
            }
            Op::Other => {
                let rf = Some(CommitWrite { reg_id: entry.dest, data: entry.value, rob_id: head });
                (rf, RobToFetcher::default(), false)
            }
            Op::Halt => {
                tracing::debug!(rob_id = head, "halt instruction committed");
                (None, RobToFetcher::default(), true)
            }
        };

        #[cfg(feature = "commit-log")]
        tracing::debug!(rob_id = head, op = ?entry.op, "rob commit");
        #[cfg(not(feature = "commit-log"))]
        tracing::trace!(rob_id = head, op = ?entry.op, "rob commit");

        self.entries[head].busy = false;
        self.head = Self::next_tail(head);

        RobTickOutput {
            to_reg_file,
            commit_info: CommitInfo { rob_id: head },
            to_fetcher,
            vacancy: self.vacancy(),
            next_tail: Self::next_tail(self.tail),
            decoder_value: self.decoder_value(),
            decoder_ready: self.decoder_ready(),
            flush_output: false,
            halted,
        }
    }

    fn flush(&mut self, new_pc: u32, branch_pc: u32, branch_taken: bool, record: bool) -> RobTickOutput {
        tracing::trace!(new_pc, "rob flush");
        self.entries = [Entry::default(); ROB_SIZE];
        self.head = 1;
        self.tail = 0;
        self.flushed_last_cycle = true;

        RobTickOutput {
            to_reg_file: None,
            commit_info: CommitInfo::NONE,
            to_fetcher: RobToFetcher {
                pc_enabled: true,
                pc: new_pc,
                branch_pc,
                branch_taken,
                branch_record_enabled: record,
            },
            vacancy: self.vacancy(),
            next_tail: Self::next_tail(self.tail),
            decoder_value: self.decoder_value(),
            decoder_ready: self.decoder_ready(),
            flush_output: true,
            halted: false,
        }
    }

    fn vacancy(&self) -> usize {
        self.entries.iter().filter(|e| !e.busy).count() - 1
    }

    fn decoder_value(&self) -> [u32; ROB_SIZE] {
        let mut out = [0; ROB_SIZE];
        for (i, e) in self.entries.iter().enumerate() {
            out[i] = e.value;
        }
        out
    }

    fn decoder_ready(&self) -> [bool; ROB_SIZE] {
        let mut out = [false; ROB_SIZE];
        for (i, e) in self.entries.iter().enumerate() {
            out[i] = e.value_ready;
        }
        out
    }
}
