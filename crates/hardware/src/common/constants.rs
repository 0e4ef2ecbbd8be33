//! Fixed sizes and magic values.
//!
//! These mirror the reference machine's `constants.h` exactly: the core is
//! sized for a 32-entry ROB and 16-entry reservation stations, not
//! configurable at runtime (unlike [`crate::config::Config`], which only
//! covers the cycle budget and memory size).

/// Number of entries in the Reorder Buffer, including the unused slot 0.
pub const ROB_SIZE: usize = 32;

/// Number of entries in each reservation station (ALU, BCU, and each of the
/// load/store queues inside RS-Mem).
pub const RS_SIZE: usize = 16;

/// Size of the byte-addressed memory, in bytes.
pub const MEMORY_SIZE: usize = 1_048_576;

/// Cycles from a memory operation's acceptance to its CDB broadcast.
pub const MEMORY_LATENCY: u8 = 4;

/// Number of entries in the bimodal branch predictor's counter table.
pub const PREDICTOR_TABLE_SIZE: usize = 1024;

/// Instruction encoding that halts the simulator (`addi x10, x0, 0xff`,
/// treated specially by the decoder and ROB rather than executed).
pub const HALT_INSTRUCTION: u32 = 0x0ff0_0513;

/// Default fatal cycle budget: if the program has not halted by this many
/// cycles, the simulation is assumed to be stuck in an infinite loop.
pub const DEFAULT_CYCLE_BUDGET: u64 = 1_000_000_000;

/// ROB id 0 is reserved to mean "no producer" / "not renamed". No
/// instruction is ever allocated into slot 0.
pub const NO_ROB_ID: usize = 0;
