//! Configuration for the simulation driver.
//!
//! Unlike [`crate::common::constants`] (which fixes the ROB/RS geometry),
//! this covers the two things a caller can reasonably want to override: how
//! long to run before giving up, and how much memory to back the image with.

use serde::{Deserialize, Serialize};

use crate::common::constants;

/// Default values for [`Config`].
pub mod defaults {
    use crate::common::constants;

    /// Default cycle budget before [`crate::common::error::SimError::CycleBudgetExceeded`].
    pub const CYCLE_BUDGET: u64 = constants::DEFAULT_CYCLE_BUDGET;

    /// Default memory size, matching the reference machine.
    pub const MEMORY_SIZE: usize = constants::MEMORY_SIZE;
}

/// Top-level configuration for a [`crate::sim::simulator::Simulator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cycles to run before declaring the program stuck.
    pub cycle_budget: u64,
    /// Size of the backing memory, in bytes.
    pub memory_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cycle_budget: defaults::CYCLE_BUDGET,
            memory_size: defaults::MEMORY_SIZE,
        }
    }
}

impl Config {
    /// Returns a config using the reference machine's fixed memory size,
    /// overriding only the cycle budget.
    #[must_use]
    pub fn with_cycle_budget(cycle_budget: u64) -> Self {
        Self { cycle_budget, memory_size: constants::MEMORY_SIZE }
    }
}
