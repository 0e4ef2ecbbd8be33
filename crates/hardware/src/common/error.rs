//! The fatal-error type for the simulation core.
//!
//! There are no recoverable runtime errors: speculation failure is handled
//! by flush, not by this type. Every variant here is a reason to abort the
//! whole simulation.

use thiserror::Error;

/// A fatal condition that stops the simulation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// An internal consistency check failed: an allocation into a busy ROB
    /// or reservation-station slot, an unrecognized opcode, or similar.
    #[error("invariant violation: {detail}")]
    InvariantViolation {
        /// Human-readable description of what was violated.
        detail: String,
    },

    /// The configured cycle budget elapsed without the program halting.
    #[error("cycle budget of {cycles} exceeded without a halt")]
    CycleBudgetExceeded {
        /// The budget that was exceeded.
        cycles: u64,
    },

    /// The stdin memory image could not be parsed, or named an address
    /// outside the memory.
    #[error("malformed memory image: {detail}")]
    MalformedImage {
        /// Human-readable description of the parse failure.
        detail: String,
    },
}

/// Convenience alias for fallible core operations.
pub type SimResult<T> = Result<T, SimError>;
