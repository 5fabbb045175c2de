//! Feature extraction: candidate + context -> normalized feature set.
//!
//! Each candidate is reduced to seven named features, all on a 0-100 scale.
//! Extraction is composed from ordered [`FeatureContributor`] strategies so
//! alternative prioritization theories can replace or extend the built-in
//! set without touching the scoring engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::candidate::{Candidate, Context, EnergyDemand};

/// Urgency assigned when a candidate has no deadline.
pub const NO_DEADLINE_URGENCY: f64 = 30.0;

/// Default deadline horizon in days for urgency scaling.
pub const DEFAULT_HORIZON_DAYS: f64 = 14.0;

/// Momentum baseline when no completion history applies.
const MOMENTUM_BASELINE: f64 = 50.0;

/// Momentum boost for sharing a project or tag with a satisfying completion.
const MOMENTUM_BOOST: f64 = 20.0;

/// Satisfaction rating at which a completion starts feeding momentum.
const MOMENTUM_SATISFACTION_MIN: u8 = 7;

/// The seven scoring factors, in canonical order.
///
/// The order is fixed so factor breakdowns and explanation rendering are
/// deterministic across calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// Deadline proximity, decay-adjusted
    Urgency,
    /// User-rated importance
    Importance,
    /// Fit between effort estimate and available time
    Effort,
    /// User-rated goal alignment
    Alignment,
    /// Recent wins on related work
    Momentum,
    /// Match between demanded and current energy
    Energy,
    /// Overlap with the active context labels
    Context,
}

impl Factor {
    /// All factors in canonical order.
    pub const CANONICAL: [Factor; 7] = [
        Factor::Urgency,
        Factor::Importance,
        Factor::Effort,
        Factor::Alignment,
        Factor::Momentum,
        Factor::Energy,
        Factor::Context,
    ];

    /// Stable snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            Factor::Urgency => "urgency",
            Factor::Importance => "importance",
            Factor::Effort => "effort",
            Factor::Alignment => "alignment",
            Factor::Momentum => "momentum",
            Factor::Energy => "energy",
            Factor::Context => "context",
        }
    }

    /// Short human-readable description used in explanations.
    pub fn describe(&self) -> &'static str {
        match self {
            Factor::Urgency => "deadline proximity",
            Factor::Importance => "importance",
            Factor::Effort => "effort fit",
            Factor::Alignment => "goal alignment",
            Factor::Momentum => "momentum",
            Factor::Energy => "energy match",
            Factor::Context => "context match",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Normalized feature values for one candidate, each in [0, 100].
///
/// Features derived from missing inputs (no deadline, no effort estimate,
/// no tags, unknown time budget) are tracked in `defaulted`; the confidence
/// estimator penalizes recommendations built on such defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSet {
    /// Deadline-driven urgency (pre- or post-decay depending on stage)
    pub urgency: f64,
    /// Importance, rescaled from the 1-10 rating
    pub importance: f64,
    /// Effort fit against the available time budget
    pub effort: f64,
    /// Goal alignment, rescaled from the 1-10 rating
    pub alignment: f64,
    /// Momentum from recent related completions
    pub momentum: f64,
    /// Energy match between demand and current level
    pub energy: f64,
    /// Context label overlap
    pub context: f64,
    /// Factors whose value came from a missing/defaulted input
    #[serde(default)]
    pub defaulted: Vec<Factor>,
}

impl FeatureSet {
    /// An all-zero feature set with no defaults recorded.
    pub fn empty() -> Self {
        FeatureSet {
            urgency: 0.0,
            importance: 0.0,
            effort: 0.0,
            alignment: 0.0,
            momentum: 0.0,
            energy: 0.0,
            context: 0.0,
            defaulted: Vec::new(),
        }
    }

    /// Read a feature by factor.
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

    /// Write a feature by factor, clamped to [0, 100].
    pub fn set(&mut self, factor: Factor, value: f64) {
        let value = value.clamp(0.0, 100.0);
        match factor {
            Factor::Urgency => self.urgency = value,
            Factor::Importance => self.importance = value,
            Factor::Effort => self.effort = value,
            Factor::Alignment => self.alignment = value,
            Factor::Momentum => self.momentum = value,
            Factor::Energy => self.energy = value,
            Factor::Context => self.context = value,
        }
    }

    /// Record that a factor was derived from a missing input.
    pub fn mark_defaulted(&mut self, factor: Factor) {
        if !self.defaulted.contains(&factor) {
            self.defaulted.push(factor);
        }
    }

    /// Whether a factor was derived from a missing input.
    pub fn is_defaulted(&self, factor: Factor) -> bool {
        self.defaulted.contains(&factor)
    }

    /// Number of defaulted factors.
    pub fn defaulted_count(&self) -> usize {
        self.defaulted.len()
    }
}

/// Linear rescale of a 1-10 rating onto 0-100.
pub fn rescale_rating(rating: u8) -> f64 {
    ((rating.clamp(1, 10) - 1) as f64 / 9.0) * 100.0
}

/// A strategy that fills part of a feature set from candidate + context.
///
/// The built-in extractor composes an ordered list of contributors; swapping
/// in a different prioritization theory means swapping contributors, not
/// rewriting the scoring engine.
pub trait FeatureContributor: Send + Sync {
    /// Stable contributor name.
    fn name(&self) -> &'static str;

    /// Fill the features this contributor owns.
    fn contribute(&self, candidate: &Candidate, context: &Context, features: &mut FeatureSet);
}

/// Deadline-driven urgency relative to a horizon.
pub struct DeadlineContributor {
    /// Horizon in days over which urgency scales from 100 down to 0.
    pub horizon_days: f64,
}

impl Default for DeadlineContributor {
    fn default() -> Self {
        DeadlineContributor {
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl FeatureContributor for DeadlineContributor {
    fn name(&self) -> &'static str {
        "deadline"
    }

    fn contribute(&self, candidate: &Candidate, context: &Context, features: &mut FeatureSet) {
        let Some(deadline) = candidate.deadline else {
            features.set(Factor::Urgency, NO_DEADLINE_URGENCY);
            features.mark_defaulted(Factor::Urgency);
            return;
        };

        let remaining_minutes = (deadline - context.now).num_minutes();
        if remaining_minutes <= 0 {
            features.set(Factor::Urgency, 100.0);
            return;
        }

        let remaining_days = remaining_minutes as f64 / (24.0 * 60.0);
        let horizon = self.horizon_days.max(1.0);
        let urgency = ((horizon - remaining_days) / horizon) * 100.0;
        features.set(Factor::Urgency, urgency.clamp(0.0, 100.0));
    }
}

/// Importance and alignment from the candidate's own 1-10 ratings.
pub struct ProfileContributor;

impl FeatureContributor for ProfileContributor {
    fn name(&self) -> &'static str {
        "profile"
    }

    fn contribute(&self, candidate: &Candidate, _context: &Context, features: &mut FeatureSet) {
        features.set(Factor::Importance, rescale_rating(candidate.importance));
        features.set(Factor::Alignment, rescale_rating(candidate.alignment));
    }
}

/// Situational fit: effort vs time budget, energy match, context overlap.
pub struct FitContributor;

impl FitContributor {
    fn effort_fit(candidate: &Candidate, context: &Context, features: &mut FeatureSet) {
        let (Some(estimate), Some(available)) =
            (candidate.estimated_minutes, context.available_minutes)
        else {
            features.set(Factor::Effort, 50.0);
            features.mark_defaulted(Factor::Effort);
            return;
        };

        if available == 0 {
            features.set(Factor::Effort, 0.0);
            return;
        }

        // Exactly filling the slot scores 20; anything over the budget is
        // capped below 20 and reaches 0 at twice the budget.
        let ratio = estimate as f64 / available as f64;
        let fit = if ratio <= 1.0 {
            20.0 + 80.0 * (1.0 - ratio)
        } else {
            (20.0 - 20.0 * (ratio - 1.0)).max(0.0)
        };
        features.set(Factor::Effort, fit);
    }

    fn energy_match(candidate: &Candidate, context: &Context, features: &mut FeatureSet) {
        let current = EnergyDemand::from_scale(context.energy);
        let score = match candidate.energy.distance(current) {
            0 => 100.0,
            1 => 50.0,
            _ => 0.0,
        };
        features.set(Factor::Energy, score);
    }

    fn context_match(candidate: &Candidate, context: &Context, features: &mut FeatureSet) {
        if candidate.tags.is_empty() {
            features.set(Factor::Context, 50.0);
            features.mark_defaulted(Factor::Context);
            return;
        }

        let labels = context.label_set();
        let matched = candidate
            .tags
            .iter()
            .filter(|tag| labels.contains(&tag.to_lowercase()))
            .count();
        let score = (matched as f64 / candidate.tags.len() as f64) * 100.0;
        features.set(Factor::Context, score);
    }
}

impl FeatureContributor for FitContributor {
    fn name(&self) -> &'static str {
        "fit"
    }

    fn contribute(&self, candidate: &Candidate, context: &Context, features: &mut FeatureSet) {
        Self::effort_fit(candidate, context, features);
        Self::energy_match(candidate, context, features);
        Self::context_match(candidate, context, features);
    }
}

/// Momentum from recent satisfying completions on related work.
pub struct MomentumContributor;

impl MomentumContributor {
    fn shares_thread(candidate: &Candidate, context: &Context) -> bool {
        context
            .recent_completions
            .iter()
            .filter(|done| done.satisfaction >= MOMENTUM_SATISFACTION_MIN)
            .any(|done| {
                let same_project = match (&candidate.project_id, &done.project_id) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                };
                let shared_tag = candidate.tags.iter().any(|tag| {
                    done.tags
                        .iter()
                        .any(|other| other.eq_ignore_ascii_case(tag))
                });
                same_project || shared_tag
            })
    }
}

impl FeatureContributor for MomentumContributor {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn contribute(&self, candidate: &Candidate, context: &Context, features: &mut FeatureSet) {
        let mut score = MOMENTUM_BASELINE;
        if Self::shares_thread(candidate, context) {
            score = (score + MOMENTUM_BOOST).min(100.0);
        }
        features.set(Factor::Momentum, score);
    }
}

/// Composes contributors into the full seven-feature extraction.
pub struct FeatureExtractor {
    contributors: Vec<Box<dyn FeatureContributor>>,
}

impl std::fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureExtractor")
            .field("contributors", &self.contributors.len())
            .finish()
    }
}

impl FeatureExtractor {
    /// Create an extractor with the built-in contributor set.
    pub fn new(horizon_days: f64) -> Self {
        FeatureExtractor {
            contributors: vec![
                Box::new(DeadlineContributor { horizon_days }),
                Box::new(ProfileContributor),
                Box::new(FitContributor),
                Box::new(MomentumContributor),
            ],
        }
    }

    /// Create an extractor from a custom contributor list.
    pub fn with_contributors(contributors: Vec<Box<dyn FeatureContributor>>) -> Self {
        FeatureExtractor { contributors }
    }

    /// Contributor names in application order.
    pub fn contributor_names(&self) -> Vec<&'static str> {
        self.contributors.iter().map(|c| c.name()).collect()
    }

    /// Extract the normalized feature set for one candidate.
    pub fn extract(&self, candidate: &Candidate, context: &Context) -> FeatureSet {
        let mut features = FeatureSet::empty();
        for contributor in &self.contributors {
            contributor.contribute(candidate, context, &mut features);
        }
        features
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        FeatureExtractor::new(DEFAULT_HORIZON_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::CompletedItem;
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn extract(candidate: &Candidate, context: &Context) -> FeatureSet {
        FeatureExtractor::default().extract(candidate, context)
    }

    #[test]
    fn test_rescale_rating_bounds() {
        assert_eq!(rescale_rating(1), 0.0);
        assert_eq!(rescale_rating(10), 100.0);
        assert!((rescale_rating(5) - 44.444).abs() < 0.01);
    }

    #[test]
    fn test_urgency_without_deadline_is_defaulted() {
        let candidate = Candidate::new("c1", "Inbox zero", now());
        let features = extract(&candidate, &Context::at(now()));
        assert_eq!(features.urgency, NO_DEADLINE_URGENCY);
        assert!(features.is_defaulted(Factor::Urgency));
    }

    #[test]
    fn test_urgency_overdue_is_max() {
        let candidate =
            Candidate::new("c1", "File taxes", now()).with_deadline(now() - Duration::hours(2));
        let features = extract(&candidate, &Context::at(now()));
        assert_eq!(features.urgency, 100.0);
        assert!(!features.is_defaulted(Factor::Urgency));
    }

    #[test]
    fn test_urgency_scales_with_deadline_distance() {
        let close = Candidate::new("c1", "Soon", now()).with_deadline(now() + Duration::days(3));
        let far = Candidate::new("c2", "Later", now()).with_deadline(now() + Duration::days(12));
        let ctx = Context::at(now());
        let close_urgency = extract(&close, &ctx).urgency;
        let far_urgency = extract(&far, &ctx).urgency;
        assert!(close_urgency > far_urgency);
        // Beyond the horizon the value bottoms out at zero.
        let distant =
            Candidate::new("c3", "Someday", now()).with_deadline(now() + Duration::days(60));
        assert_eq!(extract(&distant, &ctx).urgency, 0.0);
    }

    #[test]
    fn test_effort_fit_boundary_at_budget() {
        let ctx = Context::at(now()).with_available_minutes(60);
        let fits = Candidate::new("c1", "Quick", now()).with_estimated_minutes(30);
        let exact = Candidate::new("c2", "Exact", now()).with_estimated_minutes(60);
        let over = Candidate::new("c3", "Over", now()).with_estimated_minutes(90);
        let double = Candidate::new("c4", "Double", now()).with_estimated_minutes(120);

        assert!(extract(&fits, &ctx).effort > 20.0);
        assert!((extract(&exact, &ctx).effort - 20.0).abs() < 1e-9);
        let over_fit = extract(&over, &ctx).effort;
        assert!(over_fit < 20.0 && over_fit > 0.0);
        assert_eq!(extract(&double, &ctx).effort, 0.0);
    }

    #[test]
    fn test_effort_fit_defaults_without_budget() {
        let candidate = Candidate::new("c1", "Quick", now()).with_estimated_minutes(30);
        let features = extract(&candidate, &Context::at(now()));
        assert_eq!(features.effort, 50.0);
        assert!(features.is_defaulted(Factor::Effort));
    }

    #[test]
    fn test_energy_match_levels() {
        let exact = Candidate::new("c1", "Deep", now()).with_energy(EnergyDemand::Medium);
        let one_off = Candidate::new("c2", "Hard", now()).with_energy(EnergyDemand::High);
        let two_off = Candidate::new("c3", "Hardest", now()).with_energy(EnergyDemand::Peak);
        let ctx = Context::at(now()).with_energy(5); // medium

        assert_eq!(extract(&exact, &ctx).energy, 100.0);
        assert_eq!(extract(&one_off, &ctx).energy, 50.0);
        assert_eq!(extract(&two_off, &ctx).energy, 0.0);
    }

    #[test]
    fn test_context_match_overlap() {
        let ctx = Context::at(now())
            .with_focus_label("deep_work")
            .with_active_tags(vec!["writing".into()]);

        let full = Candidate::new("c1", "Draft", now())
            .with_tags(vec!["deep_work".into(), "writing".into()]);
        let partial = Candidate::new("c2", "Edit", now())
            .with_tags(vec!["writing".into(), "email".into()]);
        let none = Candidate::new("c3", "Call", now()).with_tags(vec!["phone".into()]);
        let untagged = Candidate::new("c4", "Misc", now());

        assert_eq!(extract(&full, &ctx).context, 100.0);
        assert_eq!(extract(&partial, &ctx).context, 50.0);
        assert_eq!(extract(&none, &ctx).context, 0.0);
        let untagged_features = extract(&untagged, &ctx);
        assert_eq!(untagged_features.context, 50.0);
        assert!(untagged_features.is_defaulted(Factor::Context));
    }

    #[test]
    fn test_momentum_boost_from_satisfying_completion() {
        let completion = CompletedItem {
            candidate_id: "done-1".into(),
            project_id: Some("proj-a".into()),
            tags: vec!["writing".into()],
            satisfaction: 8,
            completed_at: now() - Duration::hours(3),
        };
        let ctx = Context::at(now()).with_recent_completions(vec![completion]);

        let same_project =
            Candidate::new("c1", "Next chapter", now()).with_project("proj-a");
        let shared_tag =
            Candidate::new("c2", "Blog post", now()).with_tags(vec!["Writing".into()]);
        let unrelated = Candidate::new("c3", "Taxes", now()).with_project("proj-b");

        assert_eq!(extract(&same_project, &ctx).momentum, 70.0);
        assert_eq!(extract(&shared_tag, &ctx).momentum, 70.0);
        assert_eq!(extract(&unrelated, &ctx).momentum, 50.0);
    }

    #[test]
    fn test_momentum_ignores_low_satisfaction() {
        let completion = CompletedItem {
            candidate_id: "done-1".into(),
            project_id: Some("proj-a".into()),
            tags: vec![],
            satisfaction: 4,
            completed_at: now() - Duration::hours(3),
        };
        let ctx = Context::at(now()).with_recent_completions(vec![completion]);
        let candidate = Candidate::new("c1", "Next chapter", now()).with_project("proj-a");
        assert_eq!(extract(&candidate, &ctx).momentum, 50.0);
    }

    #[test]
    fn test_all_features_in_range() {
        let candidate = Candidate::new("c1", "Anything", now())
            .with_deadline(now() + Duration::days(2))
            .with_estimated_minutes(45)
            .with_importance(9)
            .with_alignment(2)
            .with_tags(vec!["deep_work".into()]);
        let ctx = Context::at(now())
            .with_available_minutes(60)
            .with_energy(8)
            .with_focus_label("deep_work");
        let features = extract(&candidate, &ctx);
        for factor in Factor::CANONICAL {
            let value = features.get(factor);
            assert!((0.0..=100.0).contains(&value), "{factor} out of range: {value}");
        }
    }
}
