//! Shared utilities.
//!
//! Content hashing for completion markers, plus test doubles.

pub mod hash;

#[cfg(test)]
pub mod testutil;
