//! # Block Verdict
//!
//! The public result of validation: accept/reject plus a structured reason
//! string for the audit trail. Rejection is an answer, not an exception --
//! the pipeline never panics or throws across its contract boundary.

use super::errors::ValidationError;
use serde::{Deserialize, Serialize};
use shared_types::ForkStatus;

/// Outcome of validating one candidate block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockVerdict {
    /// Whether the block passed every consensus rule.
    pub valid: bool,
    /// Rejection reason for logs and audit trails; `None` on acceptance.
    pub reason: Option<String>,
    /// Fork classification from the detector consultation, attached on
    /// acceptance as advisory context.
    pub fork_status: Option<ForkStatus>,
}

impl BlockVerdict {
    /// An accepting verdict carrying the fork classification.
    pub fn accepted(fork_status: ForkStatus) -> Self {
        Self {
            valid: true,
            reason: None,
            fork_status: Some(fork_status),
        }
    }

    /// A rejecting verdict rendered from the failed rule.
    pub fn rejected(error: &ValidationError) -> Self {
        Self {
            valid: false,
            reason: Some(error.to_string()),
            fork_status: None,
        }
    }
}
