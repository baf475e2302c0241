//! # Domain Module
//!
//! Fork records and the tip-scoring function.

pub mod entities;
pub mod scoring;

pub use entities::*;
pub use scoring::{score_tip, TipEvidence};
