//! Small wiring structs shared between the ROB and the Fetcher.
//!
//! Everything else module-to-module is either a plain value, a
//! [`crate::common::cdb::CdbMessage`]/[`crate::common::cdb::BranchResult`],
//! or a per-module dispatch type defined alongside that module.

/// The ROB's PC-redirect and predictor-training output, consumed by the
/// Fetcher. Asserted on JALR commit (fetch redirect), on a branch
/// misprediction (flush redirect), and on every correctly predicted branch
/// commit (predictor training only, no redirect).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RobToFetcher {
    /// Whether `pc` should override the Fetcher's own PC+4/predicted-path
    /// computation this cycle.
    pub pc_enabled: bool,
    /// The redirect target, valid only if `pc_enabled`.
    pub pc: u32,
    /// Whether a branch commit is reported this cycle (for predictor
    /// training), independent of `pc_enabled`.
    pub branch_record_enabled: bool,
    /// PC of the branch being reported.
    pub branch_pc: u32,
    /// Actual outcome of that branch.
    pub branch_taken: bool,
}

/// The Decoder's PC-redirect output, consumed by the Fetcher when it could
/// not issue an instruction this cycle (dependency-stall replay) or just
/// resolved a `JALR`/branch whose target only it currently knows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderToFetcher {
    /// Whether `pc` should override the Fetcher's own PC+4 computation,
    /// provided the ROB isn't redirecting it this cycle too (ROB wins ties).
    pub pc_enabled: bool,
    /// The redirect target, valid only if `pc_enabled`.
    pub pc: u32,
}
