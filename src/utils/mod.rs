//! Utility functions shared across the codebase

pub mod counting;
pub mod math;

// Re-export commonly used utilities
pub use counting::OrderedCounter;
pub use math::{clamp_signed_unit, clamp_unit, cosine_similarity, round3};
