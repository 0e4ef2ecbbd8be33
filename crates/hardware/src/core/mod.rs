//! The clocked execution core: every structural unit of the out-of-order
//! pipeline, wired together by [`crate::sim::simulator::Simulator`].
//!
//! Each submodule owns one pipeline structure (a functional unit, a
//! reservation station, the ROB, ...) and exposes a `tick` that is pure
//! given its inputs — no submodule reaches into another's state. The
//! driver snapshots every module's previous-cycle outputs first, then
//! calls every `tick` from that snapshot, so invocation order here never
//! matters.

/// Decode, register renaming, and opcode dispatch.
pub mod decoder;
/// Instruction fetch and branch prediction.
pub mod fetch;
/// Byte-addressed main memory.
pub mod memory;
/// Architectural register file with ROB-id renaming tags.
pub mod register_file;
/// Reorder Buffer: commit, flush, and halt detection.
pub mod rob;
/// Reservation station feeding the ALU.
pub mod rs_alu;
/// Reservation station feeding the BCU.
pub mod rs_bcu;
/// Split load/store reservation station feeding the memory unit.
pub mod rs_mem;
/// Small wiring structs shared between the ROB/Decoder and the Fetcher.
pub mod signals;
/// Functional units: ALU, BCU, branch predictor, memory unit.
pub mod units;
