//! # Ports
//!
//! Outbound dependencies injected by collaborators.

pub mod outbound;

pub use outbound::*;
