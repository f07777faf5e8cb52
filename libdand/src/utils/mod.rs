//! Small helpers used across the crate, mostly for log and debug output.

pub mod hex;

pub use hex::*;
