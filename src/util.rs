//! Shared utility modules used across Annex components.

pub mod cancel;
pub mod simd;
