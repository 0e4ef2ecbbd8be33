//! Cross-module and end-to-end tests.

/// The six concrete end-to-end scenarios and their expected exit bytes.
pub mod end_to_end;
/// Edge cases named explicitly as boundary conditions.
pub mod boundary;
/// Property-based conformance against the reference interpreter.
pub mod property;
