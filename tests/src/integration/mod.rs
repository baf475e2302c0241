//! # Integration Flows
//!
//! Cross-subsystem tests: block acceptance through the validator and fork
//! detector, and partition reconciliation through the synchronizer with
//! NonceGuard replay protection.

pub mod block_acceptance;
pub mod partition_merge;
