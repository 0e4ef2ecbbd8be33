//! Architectural register file with ROB-id renaming tags.
//!
//! Each register carries, besides its committed value, a tag naming the ROB
//! entry that will next produce its value (`0` meaning "already
//! architectural, read `value` directly"). Two write ports feed it: the ROB
//! at commit time, and the Decoder at dispatch time when it renames a
//! destination register.

/// Write request from the ROB at commit.
#[derive(Clone, Copy, Debug)]
pub struct CommitWrite {
    /// Destination register.
    pub reg_id: u32,
    /// Committed value.
    pub data: u32,
    /// ROB id of the committing instruction (used to decide whether the
    /// tag should clear: a later rename of the same register must not be
    /// stomped by a stale commit).
    pub rob_id: usize,
}

/// Rename request from the Decoder at dispatch.
#[derive(Clone, Copy, Debug)]
pub struct RenameWrite {
    /// Destination register.
    pub reg_id: u32,
    /// ROB id that will produce this register's next value.
    pub rob_id: usize,
}

/// The 32 architectural registers, plus their outstanding-producer tags.
///
/// `x0` is hard-wired to value `0` with tag `0` at all times.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    value: [u32; 32],
    tag: [usize; 32],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self { value: [0; 32], tag: [0; 32] }
    }
}

impl RegisterFile {
    /// Creates a fresh register file, all zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current committed value of a register.
    #[must_use]
    pub fn value(&self, reg_id: u32) -> u32 {
        self.value[reg_id as usize]
    }

    /// The current outstanding-producer tag of a register (`0` = none).
    #[must_use]
    pub fn tag(&self, reg_id: u32) -> usize {
        self.tag[reg_id as usize]
    }

    /// Advances one cycle. Order matters: the ROB's write lands first, then
    /// the Decoder's rename, so a same-cycle commit-then-rename of the same
    /// register correctly leaves the new rename in place.
    pub fn tick(&mut self, flush: bool, commit: Option<CommitWrite>, rename: Option<RenameWrite>) {
        if flush {
            self.tag = [0; 32];
            return;
        }
        if let Some(w) = commit {
            let r = w.reg_id as usize;
            self.value[r] = w.data;
            if self.tag[r] == w.rob_id {
                self.tag[r] = 0;
            }
        }
        if let Some(w) = rename {
            self.tag[w.reg_id as usize] = w.rob_id;
        }
        self.tag[0] = 0;
        self.value[0] = 0;
    }
}
