//! Deterministic ranking of scored candidates.
//!
//! Primary key is the final score, descending. Scores within [`SCORE_EPSILON`]
//! of each other are tied and broken by earlier deadline, then higher
//! importance, then lexicographically smaller id, which makes the ordering a
//! total order and every ranking pass reproducible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{FactorScore, ScoreBreakdown, SCORE_EPSILON};

/// Raw value at or below which a factor counts as holding a candidate back.
const PENALTY_RAW_MAX: f64 = 20.0;

/// Raw value at or above which a factor counts as a boost.
const BOOST_RAW_MIN: f64 = 70.0;

/// A candidate ready for ranking: identity, tie-break inputs, and its score.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    /// Candidate id
    pub id: String,
    /// Candidate title
    pub title: String,
    /// Deadline, for tie-breaking
    pub deadline: Option<DateTime<Utc>>,
    /// Importance rating (1-10), for tie-breaking
    pub importance: u8,
    /// Scoring breakdown
    pub breakdown: ScoreBreakdown,
}

/// One ranked candidate in the final result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Candidate id
    pub id: String,
    /// Candidate title
    pub title: String,
    /// Final score (0-100)
    pub score: f64,
    /// 1-based rank, unique and gapless
    pub rank: u32,
    /// Per-factor breakdown in canonical order
    pub factors: Vec<FactorScore>,
    /// Reasoning bullets: primary, boost, and penalty factors
    pub reasons: Vec<String>,
}

/// Order scored entries into ranked results, optionally truncated to top-N.
pub fn rank(entries: Vec<ScoredEntry>, top_n: Option<usize>) -> Vec<RankedCandidate> {
    let mut entries = entries;
    entries.sort_by_key(|entry| {
        (
            // Quantize to the tie tolerance so equal-within-epsilon scores
            // fall through to the tie-break chain.
            std::cmp::Reverse((entry.breakdown.total / SCORE_EPSILON).round() as i64),
            entry.deadline.unwrap_or(DateTime::<Utc>::MAX_UTC),
            std::cmp::Reverse(entry.importance),
            entry.id.clone(),
        )
    });

    let mut ranked: Vec<RankedCandidate> = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let reasons = build_reasons(&entry.breakdown);
            RankedCandidate {
                id: entry.id,
                title: entry.title,
                score: entry.breakdown.total,
                rank: (index + 1) as u32,
                factors: entry.breakdown.factors,
                reasons,
            }
        })
        .collect();

    if let Some(n) = top_n {
        ranked.truncate(n);
    }
    ranked
}

/// Primary/boost/penalty bullets for one breakdown.
fn build_reasons(breakdown: &ScoreBreakdown) -> Vec<String> {
    let mut reasons = Vec::new();

    if let Some(top) = breakdown.top_factor() {
        reasons.push(format!(
            "strongest factor: {} ({:.1} of {:.1} points)",
            top.name.describe(),
            top.contribution,
            breakdown.total
        ));
        for factor in &breakdown.factors {
            if factor.name != top.name && factor.raw >= BOOST_RAW_MIN {
                reasons.push(format!(
                    "boosted by {} (raw {:.0})",
                    factor.name.describe(),
                    factor.raw
                ));
            }
        }
    }
    for factor in &breakdown.factors {
        if factor.raw <= PENALTY_RAW_MAX {
            reasons.push(format!(
                "held back by {} (raw {:.0})",
                factor.name.describe(),
                factor.raw
            ));
        }
    }

    reasons
}
