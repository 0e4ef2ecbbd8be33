//! The cycle-by-cycle driver wiring every pipeline structure together.
//!
//! Each [`Simulator::tick`] call implements the two-phase discipline the
//! whole core is built on: every module's `tick` this cycle consumes only
//! the previous cycle's [`Snapshot`] (plus its own internal state), and the
//! fresh outputs it produces become next cycle's snapshot. No module ever
//! observes another module's same-cycle output *through the snapshot*, so
//! reordering the snapshot-fed `tick` calls below is irrelevant to
//! correctness. One pair is the exception: the decoder reads `&self.regfile`
//! directly rather than through `Snapshot`, which is only last cycle's
//! register state because `self.decoder.tick()` runs before
//! `self.regfile.tick()` in this same function. Do not swap that order —
//! doing so would let the decoder observe this cycle's own register writes.

use std::io::BufRead;

use crate::common::cdb::{BranchResult, CdbMessage};
use crate::common::error::{SimError, SimResult};
use crate::config::Config;
use crate::core::decoder::{Decoder, DecoderOutput, Fullness};
use crate::core::fetch::{FetchOutput, Fetcher};
use crate::core::memory::Memory;
use crate::core::register_file::RegisterFile;
use crate::core::rob::{Rob, RobTickOutput};
use crate::core::rs_alu::RsAlu;
use crate::core::rs_bcu::RsBcu;
use crate::core::rs_mem::{RsMem, RsMemOutput};
use crate::core::units::alu::{Alu, AluInput};
use crate::core::units::bcu::{Bcu, BcuInput};
use crate::core::units::lsu::{MemOpOutput, MemoryUnit};
use crate::sim::loader;
use crate::stats::Stats;

/// Every module's registered output from the previous cycle: the sole
/// input surface for this cycle's `tick` calls.
#[derive(Clone, Debug, Default)]
struct Snapshot {
    fetch: FetchOutput,
    decoder: DecoderOutput,
    rob: RobTickOutput,
    rs_alu_issue: AluInput,
    rs_bcu_issue: BcuInput,
    rs_mem: RsMemOutput,
    alu_cdb: CdbMessage,
    mem_op: MemOpOutput,
    bcu_result: BranchResult,
}

/// The whole out-of-order core, plus the main memory and architectural
/// register file it operates on.
#[derive(Clone, Debug)]
pub struct Simulator {
    config: Config,
    memory: Memory,
    regfile: RegisterFile,
    fetcher: Fetcher,
    decoder: Decoder,
    rob: Rob,
    rs_alu: RsAlu,
    rs_bcu: RsBcu,
    rs_mem: RsMem,
    mem_unit: MemoryUnit,
    stats: Stats,
    snapshot: Snapshot,
    cycle: u64,
}

impl Simulator {
    /// Creates a simulator with a zeroed memory of `config.memory_size`
    /// bytes, ready to have a program image loaded into it.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            memory: Memory::new(config.memory_size),
            config,
            regfile: RegisterFile::new(),
            fetcher: Fetcher::new(),
            decoder: Decoder::new(),
            rob: Rob::new(),
            rs_alu: RsAlu::new(),
            rs_bcu: RsBcu::new(),
            rs_mem: RsMem::new(),
            mem_unit: MemoryUnit::new(),
            stats: Stats::new(),
            snapshot: Snapshot::default(),
            cycle: 0,
        }
    }

    /// Loads a program image (the `@addr` / hex-byte text format) into
    /// this simulator's memory.
    pub fn load_image(&mut self, reader: impl BufRead) -> SimResult<()> {
        loader::load_image(reader, &mut self.memory)
    }

    /// The current committed value of an architectural register.
    #[must_use]
    pub fn register(&self, reg_id: u32) -> u32 {
        self.regfile.value(reg_id)
    }

    /// Cycles elapsed so far.
    #[must_use]
    pub const fn cycle_count(&self) -> u64 {
        self.cycle
    }

    /// Accumulated branch statistics.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Runs until the program halts or the configured cycle budget is
    /// exhausted.
    pub fn run(&mut self) -> SimResult<()> {
        loop {
            if self.tick()? {
                return Ok(());
            }
        }
    }

    /// Advances the whole core by one cycle. Returns `Ok(true)` if the
    /// halt instruction committed this cycle.
    pub fn tick(&mut self) -> SimResult<bool> {
        if self.cycle >= self.config.cycle_budget {
            return Err(SimError::CycleBudgetExceeded { cycles: self.cycle });
        }

        let snap = self.snapshot.clone();
        let flush = snap.rob.flush_output;

        let fetch_out = self.fetcher.tick(snap.rob.to_fetcher, snap.decoder.to_fetcher, &self.memory)?;

        let fullness = Fullness {
            rs_alu: self.rs_alu.vacancy() == 0,
            rs_bcu: self.rs_bcu.vacancy() == 0,
            rs_mem_load: snap.rs_mem.load_vacancy == 0,
            rs_mem_store: snap.rs_mem.store_vacancy == 0,
            rob: snap.rob.vacancy == 0,
        };

        let decoder_out = self.decoder.tick(
            flush,
            snap.fetch.instruction,
            snap.fetch.pc,
            snap.fetch.predicted_branch_taken,
            &self.regfile,
            &snap.rob.decoder_value,
            &snap.rob.decoder_ready,
            snap.alu_cdb,
            snap.mem_op.cdb,
            fullness,
            snap.rob.next_tail,
            snap.rob.commit_info,
        );
        if let Some(detail) = decoder_out.trap {
            return Err(SimError::InvariantViolation { detail: detail.to_string() });
        }

        let rob_out = self.rob.tick(snap.decoder.to_rob, snap.alu_cdb, snap.mem_op.cdb, snap.bcu_result, &mut self.stats);
        let halted = rob_out.halted;

        let rs_alu_issue = self.rs_alu.tick(flush, snap.decoder.to_rs_alu, snap.alu_cdb, snap.mem_op.cdb);
        let rs_bcu_issue = self.rs_bcu.tick(flush, snap.decoder.to_rs_bcu, snap.alu_cdb, snap.mem_op.cdb);
        let rs_mem_out = self.rs_mem.tick(
            flush,
            snap.decoder.to_rs_mem_load,
            snap.decoder.to_rs_mem_store,
            snap.alu_cdb,
            snap.mem_op.cdb,
            snap.rob.commit_info,
            snap.mem_op.recv,
        );

        let alu_cdb = Alu::tick(snap.rs_alu_issue);
        let bcu_result = Bcu::tick(snap.rs_bcu_issue);
        let mem_op = self.mem_unit.tick(flush, snap.rs_mem.to_mem, &mut self.memory)?;

        self.regfile.tick(flush, snap.rob.to_reg_file, snap.decoder.to_reg_file);

        self.snapshot = Snapshot {
            fetch: fetch_out,
            decoder: decoder_out,
            rob: rob_out,
            rs_alu_issue,
            rs_bcu_issue,
            rs_mem: rs_mem_out,
            alu_cdb,
            mem_op,
            bcu_result,
        };
        self.cycle += 1;

        Ok(halted)
    }
}
