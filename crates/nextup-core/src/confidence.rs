//! Confidence estimation for the top recommendation.
//!
//! Confidence grows with the score gap between the winner and the runner-up
//! and shrinks with every feature the winner derived from a missing input.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::FeatureSet;

/// Score gap (in points) that saturates the gap term at full confidence.
const GAP_SATURATION: f64 = 30.0;

/// Base confidence when there is no runner-up to compare against.
const SINGLE_CANDIDATE_CONFIDENCE: f64 = 0.6;

/// Confidence lost per feature derived from a defaulted input.
const INCOMPLETENESS_PENALTY: f64 = 0.1;

/// Confidence bucket for display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBucket {
    /// Value >= 0.75
    High,
    /// Value >= 0.5
    Medium,
    /// Everything below
    Low,
}

impl ConfidenceBucket {
    /// Bucket a confidence value.
    pub fn from_value(value: f64) -> Self {
        if value >= 0.75 {
            ConfidenceBucket::High
        } else if value >= 0.5 {
            ConfidenceBucket::Medium
        } else {
            ConfidenceBucket::Low
        }
    }
}

impl fmt::Display for ConfidenceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfidenceBucket::High => "high",
            ConfidenceBucket::Medium => "medium",
            ConfidenceBucket::Low => "low",
        };
        write!(f, "{s}")
    }
}

/// Scalar confidence with its display bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    /// Confidence in [0, 1]
    pub value: f64,
    /// Display bucket
    pub bucket: ConfidenceBucket,
}

impl Confidence {
    /// Wrap a value, clamping to [0, 1] and bucketing.
    pub fn from_value(value: f64) -> Self {
        let value = value.clamp(0.0, 1.0);
        Confidence {
            value,
            bucket: ConfidenceBucket::from_value(value),
        }
    }

    /// Confidence for an empty candidate set.
    pub fn none() -> Self {
        Confidence::from_value(0.0)
    }
}

/// Estimate confidence for the winning candidate.
///
/// `runner_up_score` is `None` when fewer than two candidates were ranked.
pub fn estimate(
    top_score: f64,
    runner_up_score: Option<f64>,
    winner_features: &FeatureSet,
) -> Confidence {
    let base = match runner_up_score {
        Some(runner_up) => ((top_score - runner_up) / GAP_SATURATION + 0.5).min(1.0),
        None => SINGLE_CANDIDATE_CONFIDENCE,
    };
    let penalty = INCOMPLETENESS_PENALTY * winner_features.defaulted_count() as f64;
    Confidence::from_value(base - penalty)
}
