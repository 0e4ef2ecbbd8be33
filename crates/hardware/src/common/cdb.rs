//! Common-data-bus and commit-info message shapes.
//!
//! Every functional unit broadcasts through one of these; reservation
//! stations and the ROB snoop them combinationally each cycle. A `rob_id`
//! of [`crate::common::constants::NO_ROB_ID`] means "nothing broadcast this
//! cycle" and must never match a real tag.

use serde::{Deserialize, Serialize};

/// A single CDB broadcast: a result tagged with the ROB id that produced it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdbMessage {
    /// Destination ROB id, or `0` if nothing is being broadcast.
    pub rob_id: usize,
    /// The produced value.
    pub value: u32,
}

impl CdbMessage {
    /// The disabled broadcast: no producer this cycle.
    pub const NONE: Self = Self { rob_id: 0, value: 0 };

    /// Whether this message actually names a producer.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.rob_id != 0
    }
}

/// The BCU's dedicated result bus: unlike the ALU/memory CDB, branch outcomes
/// are consumed only by the ROB, never snooped by reservation stations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchResult {
    /// Destination ROB id, or `0` if nothing is being broadcast.
    pub rob_id: usize,
    /// Whether the branch was actually taken.
    pub taken: bool,
    /// The resolved next PC (`pc_target` if taken, `pc_fallthrough` otherwise).
    pub value: u32,
}

impl BranchResult {
    /// The disabled broadcast: no producer this cycle.
    pub const NONE: Self = Self { rob_id: 0, taken: false, value: 0 };

    /// Whether this message actually names a producer.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.rob_id != 0
    }
}

/// Broadcast from the ROB at commit time, used to release dependency chains
/// (RS-Mem's `Qm`, the decoder's `last_branch_id`) that are keyed on a
/// specific ROB id having retired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// ROB id that committed this cycle, or `0` if nothing committed.
    pub rob_id: usize,
}

impl CommitInfo {
    /// No commit this cycle.
    pub const NONE: Self = Self { rob_id: 0 };
}
