//! Weighted multi-factor scoring engine.
//!
//! Combines a candidate's normalized feature set with a validated weight
//! vector into one final score (0-100) plus a per-factor contribution
//! breakdown in canonical factor order, so explanation rendering is
//! deterministic. Identical inputs always yield bit-identical output: there
//! is no randomness and no wall-clock read anywhere in this module.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::features::{Factor, FeatureSet};

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Tie tolerance for treating two final scores as equal.
pub const SCORE_EPSILON: f64 = 0.01;

/// Named weights for each factor, each in [0, 1], summing to 1.0.
///
/// Validated once at engine construction and treated as read-only
/// configuration afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    /// Weight for deadline-driven urgency
    pub urgency: f64,
    /// Weight for user-rated importance
    pub importance: f64,
    /// Weight for effort fit
    pub effort: f64,
    /// Weight for goal alignment
    pub alignment: f64,
    /// Weight for momentum
    pub momentum: f64,
    /// Weight for energy match
    pub energy: f64,
    /// Weight for context match
    pub context: f64,
}

impl FactorWeights {
    /// Default balanced profile.
    pub fn balanced() -> Self {
        FactorWeights {
            urgency: 0.25,
            importance: 0.20,
            effort: 0.15,
            alignment: 0.15,
            momentum: 0.10,
            energy: 0.10,
            context: 0.05,
        }
    }

    /// Profile that chases deadlines first.
    pub fn deadline_focused() -> Self {
        FactorWeights {
            urgency: 0.40,
            importance: 0.20,
            effort: 0.10,
            alignment: 0.10,
            momentum: 0.05,
            energy: 0.10,
            context: 0.05,
        }
    }

    /// Profile for protected deep-work sessions: alignment and energy over
    /// deadline chasing.
    pub fn deep_work() -> Self {
        FactorWeights {
            urgency: 0.10,
            importance: 0.20,
            effort: 0.10,
            alignment: 0.20,
            momentum: 0.10,
            energy: 0.20,
            context: 0.10,
        }
    }

    /// Profile favoring small tasks that fit the current slot.
    pub fn quick_wins() -> Self {
        FactorWeights {
            urgency: 0.15,
            importance: 0.15,
            effort: 0.35,
            alignment: 0.10,
            momentum: 0.10,
            energy: 0.10,
            context: 0.05,
        }
    }

    /// Look up a named preset profile.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "balanced" => Some(Self::balanced()),
            "deadline_focused" => Some(Self::deadline_focused()),
            "deep_work" => Some(Self::deep_work()),
            "quick_wins" => Some(Self::quick_wins()),
            _ => None,
        }
    }

    /// Names of the available presets.
    pub fn preset_names() -> &'static [&'static str] {
        &["balanced", "deadline_focused", "deep_work", "quick_wins"]
    }

    /// Weight for a factor.
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Urgency => self.urgency,
            Factor::Importance => self.importance,
            Factor::Effort => self.effort,
            Factor::Alignment => self.alignment,
            Factor::Momentum => self.momentum,
            Factor::Energy => self.energy,
            Factor::Context => self.context,
        }
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        Factor::CANONICAL.iter().map(|f| self.get(*f)).sum()
    }

    /// Scale all weights so they sum to 1.0.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum > 0.0 {
            self.urgency /= sum;
            self.importance /= sum;
            self.effort /= sum;
            self.alignment /= sum;
            self.momentum /= sum;
            self.energy /= sum;
            self.context /= sum;
        }
    }

    /// Validate ranges and the unit-sum invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for factor in Factor::CANONICAL {
            let value = self.get(factor);
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::WeightOutOfRange {
                    name: factor.name(),
                    value,
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidWeightSum {
                sum,
                tolerance: WEIGHT_SUM_TOLERANCE,
            });
        }
        Ok(())
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        FactorWeights::balanced()
    }
}

/// One factor's contribution to a candidate's final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    /// Factor name
    pub name: Factor,
    /// Raw normalized value (0-100)
    pub raw: f64,
    /// Weight applied (0-1)
    pub weight: f64,
    /// raw * weight
    pub contribution: f64,
}

impl FactorScore {
    /// Build a factor score, computing the contribution.
    pub fn new(name: Factor, raw: f64, weight: f64) -> Self {
        FactorScore {
            name,
            raw,
            weight,
            contribution: raw * weight,
        }
    }
}

/// Complete per-candidate scoring breakdown.
///
/// Factors appear in canonical order; contributions sum to `total` within
/// floating tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Per-factor scores in canonical order
    pub factors: Vec<FactorScore>,
    /// Final weighted score (0-100)
    pub total: f64,
}

impl ScoreBreakdown {
    /// Factor with the largest contribution.
    pub fn top_factor(&self) -> Option<&FactorScore> {
        self.factors
            .iter()
            .max_by(|a, b| a.contribution.total_cmp(&b.contribution))
    }

    /// Factor with the smallest contribution.
    pub fn weakest_factor(&self) -> Option<&FactorScore> {
        self.factors
            .iter()
            .min_by(|a, b| a.contribution.total_cmp(&b.contribution))
    }

    /// Factors sorted by contribution, descending.
    pub fn factors_by_contribution(&self) -> Vec<&FactorScore> {
        let mut sorted: Vec<_> = self.factors.iter().collect();
        sorted.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
        sorted
    }

    /// Look up one factor's score.
    pub fn factor(&self, name: Factor) -> Option<&FactorScore> {
        self.factors.iter().find(|f| f.name == name)
    }
}

/// Multi-factor scoring engine.
#[derive(Debug)]
pub struct ScoringEngine {
    weights: FactorWeights,
}

impl ScoringEngine {
    /// Create an engine with validated weights.
    pub fn new(weights: FactorWeights) -> Result<Self, ConfigError> {
        weights.validate()?;
        Ok(ScoringEngine { weights })
    }

    /// Current weights.
    pub fn weights(&self) -> &FactorWeights {
        &self.weights
    }

    /// Score one feature set.
    pub fn score(&self, features: &FeatureSet) -> ScoreBreakdown {
        let mut factors = Vec::with_capacity(Factor::CANONICAL.len());
        let mut total = 0.0;
        for factor in Factor::CANONICAL {
            let score = FactorScore::new(factor, features.get(factor), self.weights.get(factor));
            total += score.contribution;
            factors.push(score);
        }
        ScoreBreakdown {
            factors,
            total: total.clamp(0.0, 100.0),
        }
    }
}
