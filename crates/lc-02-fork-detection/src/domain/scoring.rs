//! # Tip Scoring
//!
//! The concrete score behind `ChainTip::score`. A tip's weight is its
//! witness coverage discounted by age: online tips are witnessed by trusted
//! quorum votes, offgrid tips by mesh validator proofs, and a tip carrying
//! both kinds (a bridge block minted during partition re-merge) is scored
//! on whichever coverage is stronger.
//!
//! The function is monotonic: more confirmations never lower the score and
//! a larger age never raises it, which keeps the orphan (0.8 absolute,
//! 90% relative) and manipulation (1.5x) thresholds meaningful.

/// Quorum votes a fully-confirmed online tip is expected to carry.
pub const EXPECTED_QUORUM_CONFIRMATIONS: u32 = 3;

/// Mesh validator proofs a fully-witnessed offgrid tip is expected to carry.
pub const EXPECTED_MESH_CONFIRMATIONS: u32 = 2;

/// Age at which the latency penalty saturates (seconds).
pub const MAX_ACCEPTABLE_LATENCY_SECS: u64 = 3_600;

/// Confirmation evidence for one tip.
#[derive(Debug, Clone, Copy, Default)]
pub struct TipEvidence {
    /// Trusted-node quorum votes observed for the tip.
    pub quorum_confirmations: u32,
    /// Mesh validator proofs observed for the tip.
    pub mesh_confirmations: u32,
    /// Seconds between the tip's timestamp and its observation.
    pub age_secs: u64,
}

/// Score a tip from its confirmation evidence. Result is in `[0, 1]`.
pub fn score_tip(evidence: &TipEvidence) -> f64 {
    let quorum_coverage = coverage(
        evidence.quorum_confirmations,
        EXPECTED_QUORUM_CONFIRMATIONS,
    );
    let mesh_coverage = coverage(evidence.mesh_confirmations, EXPECTED_MESH_CONFIRMATIONS);

    // A tip cannot carry witnesses its partition does not produce, so the
    // stronger class speaks for the tip; taking the max keeps the score
    // monotone in both confirmation counts.
    let witness_coverage = quorum_coverage.max(mesh_coverage);

    (1.0 - latency_penalty(evidence.age_secs)) * witness_coverage
}

fn coverage(got: u32, expected: u32) -> f64 {
    (f64::from(got) / f64::from(expected)).min(1.0)
}

fn latency_penalty(age_secs: u64) -> f64 {
    (age_secs as f64 / MAX_ACCEPTABLE_LATENCY_SECS as f64).min(1.0)
}
