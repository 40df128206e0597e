//! Utility modules for bayespool.

pub mod math;
pub mod varint;
