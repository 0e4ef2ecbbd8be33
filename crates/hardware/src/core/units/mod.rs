//! Functional units: the consumers at the end of each reservation station.

/// Integer ALU.
pub mod alu;
/// Branch comparator.
pub mod bcu;
/// Branch predictor (consumed by the Fetcher, not a reservation station).
pub mod bru;
/// Fixed-latency load/store unit.
pub mod lsu;
