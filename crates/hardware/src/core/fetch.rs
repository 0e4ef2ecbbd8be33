//! Instruction fetch and branch prediction.
//!
//! Fetches the word at the current PC every cycle and predicts whether it
//! is a taken branch, on the assumption that *every* fetched instruction
//! might be one — the Decoder is the one that knows whether the prediction
//! is actually meaningful for this opcode. PC selection prioritizes the ROB
//! (flush/JALR redirect) over the Decoder (replay redirect) over the
//! sequential PC+4 fallthrough.

use crate::common::error::SimResult;
use crate::core::memory::Memory;
use crate::core::signals::{DecoderToFetcher, RobToFetcher};
use crate::core::units::bru::BimodalPredictor;

/// One cycle's fetch result, handed to the Decoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchOutput {
    /// The raw instruction word at `pc`.
    pub instruction: u32,
    /// The PC this instruction was fetched from.
    pub pc: u32,
    /// The predictor's call for this PC, meaningful only if the Decoder
    /// finds this is actually a conditional branch.
    pub predicted_branch_taken: bool,
}

/// Fetch stage: current PC plus the architectural predictor state.
#[derive(Clone, Debug)]
pub struct Fetcher {
    pc: u32,
    predictor: BimodalPredictor,
    first_run: bool,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self { pc: 0, predictor: BimodalPredictor::new(), first_run: true }
    }
}

impl Fetcher {
    /// Creates a fetcher reset to PC 0 with a freshly initialized predictor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one cycle.
    pub fn tick(&mut self, rob: RobToFetcher, decoder: DecoderToFetcher, memory: &Memory) -> SimResult<FetchOutput> {
        if self.first_run {
            self.first_run = false;
            self.pc = 0;
            let instruction = memory.read_word(0)?;
            return Ok(FetchOutput { instruction, pc: 0, predicted_branch_taken: false });
        }

        let pc = if rob.pc_enabled {
            rob.pc
        } else if decoder.pc_enabled {
            decoder.pc
        } else {
            self.pc.wrapping_add(4)
        };

        if rob.branch_record_enabled {
            self.predictor.update(rob.branch_pc, rob.branch_taken);
        }

        let instruction = memory.read_word(pc)?;
        let predicted_branch_taken = self.predictor.predict(pc);
        self.pc = pc;

        Ok(FetchOutput { instruction, pc, predicted_branch_taken })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cycle_fetches_from_zero() {
        let mut mem = Memory::new(16);
        mem.write_word(0, 0xdead_beef).unwrap();
        let mut f = Fetcher::new();
        let out = f.tick(RobToFetcher::default(), DecoderToFetcher::default(), &mem).unwrap();
        assert_eq!(out.pc, 0);
        assert_eq!(out.instruction, 0xdead_beef);
        assert!(!out.predicted_branch_taken);
    }

    #[test]
    fn falls_through_by_default() {
        let mut mem = Memory::new(16);
        let mut f = Fetcher::new();
        let _ = f.tick(RobToFetcher::default(), DecoderToFetcher::default(), &mem).unwrap();
        let out = f.tick(RobToFetcher::default(), DecoderToFetcher::default(), &mem).unwrap();
        assert_eq!(out.pc, 4);
    }

    #[test]
    fn rob_redirect_wins_over_decoder() {
        let mem = Memory::new(0x200);
        let mut f = Fetcher::new();
        let _ = f.tick(RobToFetcher::default(), DecoderToFetcher::default(), &mem).unwrap();
        let rob = RobToFetcher { pc_enabled: true, pc: 0x100, ..RobToFetcher::default() };
        let decoder = DecoderToFetcher { pc_enabled: true, pc: 0x40 };
        let out = f.tick(rob, decoder, &mem).unwrap();
        assert_eq!(out.pc, 0x100);
    }

    #[test]
    fn decoder_redirect_used_when_rob_silent() {
        let mut mem = Memory::new(0x200);
        let mut f = Fetcher::new();
        let _ = f.tick(RobToFetcher::default(), DecoderToFetcher::default(), &mem).unwrap();
        let decoder = DecoderToFetcher { pc_enabled: true, pc: 0x40 };
        let out = f.tick(RobToFetcher::default(), decoder, &mem).unwrap();
        assert_eq!(out.pc, 0x40);
    }
}
