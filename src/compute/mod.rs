//! Compute layer for spatial lookups and input checks.
//!
//! Independent of the output table: everything here reads borrowed inputs
//! and returns owned results.

pub mod spatial;
pub mod validation;
