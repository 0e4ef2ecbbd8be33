//! Reservation station for loads and stores.
//!
//! Loads and stores occupy separate 16-entry queues sharing one memory
//! port. Two dependency chains order them: `Ql` (this entry must wait for
//! the most recently dispatched, not-yet-accepted store) and `Qm`
//! (a store must wait for the most recent outstanding branch to commit,
//! since stores write memory immediately on acceptance). The memory unit
//! accepts at most one operation per cycle and may refuse it (`recv ==
//! false`), in which case the same entry is resent next cycle rather than
//! trying a different one. An entry stays `busy` from dispatch through that
//! whole resend window; only a confirmed `recv` frees its slot, so a later
//! dispatch can never reclaim an entry whose completion is still in flight.

use crate::common::cdb::{CdbMessage, CommitInfo};
use crate::common::constants::RS_SIZE;
use crate::core::units::lsu::MemOpInput;

#[derive(Clone, Copy, Debug, Default)]
struct LoadEntry {
    busy: bool,
    op: u8,
    vj: u32,
    qj: usize,
    ql: usize,
    dest: usize,
    offset: i32,
}

#[derive(Clone, Copy, Debug, Default)]
struct StoreEntry {
    busy: bool,
    op: u8,
    vj: u32,
    vk: u32,
    qj: usize,
    qk: usize,
    ql: usize,
    qm: usize,
    dest: usize,
    offset: i32,
}

#[derive(Clone, Copy, Debug)]
struct LastIssue {
    is_store: bool,
    rs_id: usize,
    dest: usize,
}

/// A new load dispatched by the decoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadDispatch {
    /// `func3`, selecting width/sign-extension.
    pub op: u8,
    /// rs1 value (valid only if `qj == 0`).
    pub vj: u32,
    /// Producer tag for `vj`, or `0` if already valid.
    pub qj: usize,
    /// ROB id this load will write back to.
    pub dest: usize,
    /// Sign-extended 12-bit offset.
    pub offset: i32,
}

/// A new store dispatched by the decoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoreDispatch {
    /// `func3`, selecting width.
    pub op: u8,
    /// rs1 value (valid only if `qj == 0`).
    pub vj: u32,
    /// rs2 value (valid only if `qk == 0`).
    pub vk: u32,
    /// Producer tag for `vj`, or `0` if already valid.
    pub qj: usize,
    /// Producer tag for `vk`, or `0` if already valid.
    pub qk: usize,
    /// ROB id of the most recent outstanding branch at dispatch time.
    pub qm: usize,
    /// ROB id this store is tagged with (no register destination).
    pub dest: usize,
    /// Sign-extended 12-bit offset.
    pub offset: i32,
}

/// Outputs of one [`RsMem::tick`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RsMemOutput {
    /// Free load-queue entries.
    pub load_vacancy: usize,
    /// Free store-queue entries.
    pub store_vacancy: usize,
    /// This cycle's issue to the memory unit, if any.
    pub to_mem: MemOpInput,
}

/// Split load/store reservation station feeding the [`crate::core::units::lsu::MemoryUnit`].
#[derive(Clone, Debug, Default)]
pub struct RsMem {
    loads: [LoadEntry; RS_SIZE],
    stores: [StoreEntry; RS_SIZE],
    last_store_id: usize,
    last_issue: Option<LastIssue>,
}

impl RsMem {
    /// Creates an empty reservation station.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one cycle.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        flush: bool,
        load: Option<LoadDispatch>,
        store: Option<StoreDispatch>,
        cdb_alu: CdbMessage,
        cdb_mem: CdbMessage,
        commit: CommitInfo,
        recv: bool,
    ) -> RsMemOutput {
        if flush {
            *self = Self::default();
            return RsMemOutput { load_vacancy: RS_SIZE, store_vacancy: RS_SIZE, to_mem: MemOpInput::default() };
        }

        if let Some(d) = load {
            if let Some(slot) = self.loads.iter_mut().find(|e| !e.busy) {
                *slot = LoadEntry { busy: true, op: d.op, vj: d.vj, qj: d.qj, ql: self.last_store_id, dest: d.dest, offset: d.offset };
            }
        } else if let Some(d) = store {
            if let Some(slot) = self.stores.iter_mut().find(|e| !e.busy) {
                *slot = StoreEntry {
                    busy: true,
                    op: d.op,
                    vj: d.vj,
                    vk: d.vk,
                    qj: d.qj,
                    qk: d.qk,
                    ql: self.last_store_id,
                    qm: d.qm,
                    dest: d.dest,
                    offset: d.offset,
                };
            }
            self.last_store_id = d.dest;
        }

        if recv {
            if let Some(li) = self.last_issue.take() {
                if li.is_store {
                    self.stores[li.rs_id].busy = false;
                    if self.last_store_id == li.dest {
                        self.last_store_id = 0;
                    }
                    for e in &mut self.loads {
                        if e.ql == li.dest {
                            e.ql = 0;
                        }
                    }
                    for e in &mut self.stores {
                        if e.ql == li.dest {
                            e.ql = 0;
                        }
                    }
                } else {
                    self.loads[li.rs_id].busy = false;
                }
            }
        }

        for cdb in [cdb_alu, cdb_mem] {
            if !cdb.is_valid() {
                continue;
            }
            for e in &mut self.loads {
                if e.busy && e.qj == cdb.rob_id {
                    e.vj = cdb.value;
                    e.qj = 0;
                }
            }
            for e in &mut self.stores {
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

        if commit.rob_id != 0 {
            for e in &mut self.stores {
                if e.qm == commit.rob_id {
                    e.qm = 0;
                }
            }
        }

        let to_mem = self.issue();

        RsMemOutput {
            load_vacancy: self.loads.iter().filter(|e| !e.busy).count(),
            store_vacancy: self.stores.iter().filter(|e| !e.busy).count(),
            to_mem,
        }
    }

    fn can_store(&self) -> bool {
        !self.loads.iter().any(|e| e.busy && e.ql == 0)
    }

    fn issue(&mut self) -> MemOpInput {
        if let Some(li) = self.last_issue {
            return if li.is_store {
                to_mem_store(&self.stores[li.rs_id])
            } else {
                to_mem_load(&self.loads[li.rs_id])
            };
        }

        if let Some((i, e)) = self.loads.iter().enumerate().find(|(_, e)| e.busy && e.qj == 0 && e.ql == 0) {
            let out = to_mem_load(e);
            self.last_issue = Some(LastIssue { is_store: false, rs_id: i, dest: out.dest });
            return out;
        }

        if self.can_store() {
            if let Some((i, e)) = self.stores.iter().enumerate().find(|(_, e)| e.busy && e.qj == 0 && e.qk == 0 && e.ql == 0 && e.qm == 0)
            {
                let out = to_mem_store(e);
                self.last_issue = Some(LastIssue { is_store: true, rs_id: i, dest: out.dest });
                return out;
            }
        }

        MemOpInput::default()
    }
}

fn to_mem_load(e: &LoadEntry) -> MemOpInput {
    MemOpInput { is_store: false, op: e.op, rs1: e.vj, rs2: 0, offset: e.offset, dest: e.dest }
}

fn to_mem_store(e: &StoreEntry) -> MemOpInput {
    MemOpInput { is_store: true, op: e.op, rs1: e.vj, rs2: e.vk, offset: e.offset, dest: e.dest }
}
