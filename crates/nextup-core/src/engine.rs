//! The recommendation engine: the single-pass pipeline tying everything
//! together.
//!
//! One invocation takes a candidate list and a context snapshot and runs
//! Extract -> Decay -> Score -> Rank -> Confidence -> Explain, returning a
//! JSON-serializable report. The engine is stateless between invocations
//! and safe to share across threads: weights are validated once at
//! construction and read-only afterwards, and the context is passed by
//! value per call.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, Context};
use crate::confidence;
use crate::decay::DecayConfig;
use crate::error::{EngineError, Result};
use crate::explain::{self, Explanation};
use crate::features::{FeatureContributor, FeatureExtractor, FeatureSet, DEFAULT_HORIZON_DAYS};
use crate::ranker::{rank, RankedCandidate, ScoredEntry};
use crate::scoring::{FactorWeights, ScoreBreakdown, ScoringEngine};

/// Number of available ids quoted in a `SubjectNotFound` error.
const SUBJECT_HINT_LIMIT: usize = 5;

/// Tunables for the pipeline stages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Deadline horizon in days for urgency extraction
    pub horizon_days: f64,
    /// Time-decay parameters
    pub decay: DecayConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            horizon_days: DEFAULT_HORIZON_DAYS,
            decay: DecayConfig::default(),
        }
    }
}

/// A candidate excluded from a pass for data-quality reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    /// Candidate id ("?" when the id itself was missing)
    pub id: String,
    /// Human-readable reason
    pub reason: String,
}

/// The full result of one ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    /// Ranked candidates, best first (possibly truncated to top-N)
    pub ranked: Vec<RankedCandidate>,
    /// Explanation for the top-ranked candidate
    pub explanation: Explanation,
    /// Candidates dropped before scoring
    #[serde(default)]
    pub skipped: Vec<SkippedCandidate>,
}

/// One candidate after extraction, decay, and scoring.
struct Evaluated {
    candidate: Candidate,
    features: FeatureSet,
    breakdown: ScoreBreakdown,
}

/// Priority calculation and recommendation explanation engine.
#[derive(Debug)]
pub struct RecommendationEngine {
    extractor: FeatureExtractor,
    scorer: ScoringEngine,
    decay: DecayConfig,
}

impl RecommendationEngine {
    /// Create an engine with default pipeline tunables.
    ///
    /// Fails fast with a configuration error if the weights do not sum to
    /// 1.0 within tolerance; no scoring happens with invalid weights.
    pub fn new(weights: FactorWeights) -> Result<Self> {
        Self::with_config(weights, EngineConfig::default())
    }

    /// Create an engine with custom pipeline tunables.
    pub fn with_config(weights: FactorWeights, config: EngineConfig) -> Result<Self> {
        Ok(RecommendationEngine {
            extractor: FeatureExtractor::new(config.horizon_days),
            scorer: ScoringEngine::new(weights)?,
            decay: config.decay,
        })
    }

    /// Replace the built-in contributor set with a custom strategy list.
    pub fn with_contributors(mut self, contributors: Vec<Box<dyn FeatureContributor>>) -> Self {
        self.extractor = FeatureExtractor::with_contributors(contributors);
        self
    }

    /// Current weights.
    pub fn weights(&self) -> &FactorWeights {
        self.scorer.weights()
    }

    /// Run one full ranking pass.
    ///
    /// Invalid candidates are skipped and counted, never fatal. An empty
    /// eligible set yields an empty ranked list and the terminal
    /// no-candidates explanation, not an error.
    pub fn recommend(
        &self,
        candidates: &[Candidate],
        context: &Context,
        top_n: Option<usize>,
    ) -> RecommendationReport {
        let (evaluated, skipped) = self.evaluate(candidates, context);
        if evaluated.is_empty() {
            return RecommendationReport {
                ranked: Vec::new(),
                explanation: Explanation::empty(),
                skipped,
            };
        }

        let full = rank(to_entries(&evaluated), None);
        let top = &full[0];
        let runner_up_score = full.get(1).map(|r| r.score);
        let top_features = features_of(&evaluated, &top.id);
        let confidence = confidence::estimate(top.score, runner_up_score, top_features);
        let explanation = explain::generate(top, &full, top_features, confidence, evaluated.len());

        let mut ranked = full;
        if let Some(n) = top_n {
            ranked.truncate(n);
        }

        RecommendationReport {
            ranked,
            explanation,
            skipped,
        }
    }

    /// Explain a specific candidate from the set, top-ranked or not.
    ///
    /// The subject is substituted into the explanation generator; the
    /// comparison set is the rest of the ranked pass. An unknown id is a
    /// [`EngineError::SubjectNotFound`] naming the searched id and the
    /// first few available ids.
    pub fn explain_subject(
        &self,
        candidates: &[Candidate],
        context: &Context,
        subject_id: &str,
    ) -> Result<Explanation> {
        let (evaluated, _skipped) = self.evaluate(candidates, context);
        if evaluated.is_empty() {
            return Ok(Explanation::empty());
        }

        let full = rank(to_entries(&evaluated), None);
        let Some(subject) = full.iter().find(|r| r.id == subject_id) else {
            return Err(EngineError::SubjectNotFound {
                requested: subject_id.to_string(),
                available: full
                    .iter()
                    .take(SUBJECT_HINT_LIMIT)
                    .map(|r| r.id.clone())
                    .collect(),
            });
        };

        let runner_up_score = full
            .iter()
            .find(|r| r.id != subject.id)
            .map(|r| r.score);
        let subject_features = features_of(&evaluated, &subject.id);
        let confidence = confidence::estimate(subject.score, runner_up_score, subject_features);
        Ok(explain::generate(
            subject,
            &full,
            subject_features,
            confidence,
            evaluated.len(),
        ))
    }

    /// Run a pass under a caller-imposed time budget.
    ///
    /// On expiry the caller gets a typed timeout error, never a partial
    /// result. The pipeline itself stays synchronous; the budget wraps the
    /// whole call.
    pub async fn recommend_with_timeout(
        self: &Arc<Self>,
        candidates: Vec<Candidate>,
        context: Context,
        top_n: Option<usize>,
        budget: Duration,
    ) -> Result<RecommendationReport> {
        let engine = Arc::clone(self);
        let budget_ms = budget.as_millis() as u64;
        let work =
            tokio::task::spawn_blocking(move || engine.recommend(&candidates, &context, top_n));
        match tokio::time::timeout(budget, work).await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(join_error)) => Err(EngineError::Internal(format!(
                "recommendation worker failed: {join_error}"
            ))),
            Err(_elapsed) => Err(EngineError::Timeout { budget_ms }),
        }
    }

    /// Extract, decay-adjust, and score every valid candidate.
    fn evaluate(
        &self,
        candidates: &[Candidate],
        context: &Context,
    ) -> (Vec<Evaluated>, Vec<SkippedCandidate>) {
        let mut evaluated = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();

        for candidate in candidates {
            if let Err(issue) = candidate.validate() {
                let id = if candidate.id.trim().is_empty() {
                    "?".to_string()
                } else {
                    candidate.id.clone()
                };
                skipped.push(SkippedCandidate {
                    id,
                    reason: issue.to_string(),
                });
                continue;
            }

            let mut features = self.extractor.extract(candidate, context);
            self.decay.adjust(&mut features, candidate, context);
            let breakdown = self.scorer.score(&features);
            evaluated.push(Evaluated {
                candidate: candidate.clone(),
                features,
                breakdown,
            });
        }

        (evaluated, skipped)
    }
}

fn to_entries(evaluated: &[Evaluated]) -> Vec<ScoredEntry> {
    evaluated
        .iter()
        .map(|e| ScoredEntry {
            id: e.candidate.id.clone(),
            title: e.candidate.title.clone(),
            deadline: e.candidate.deadline,
            importance: e.candidate.importance,
            breakdown: e.breakdown.clone(),
        })
        .collect()
}

/// Features for a candidate id; the id always comes from the same evaluated
/// set, so the lookup cannot miss.
fn features_of<'a>(evaluated: &'a [Evaluated], id: &str) -> &'a FeatureSet {
    evaluated
        .iter()
        .find(|e| e.candidate.id == id)
        .map(|e| &e.features)
        .unwrap_or_else(|| &evaluated[0].features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::WARN_NO_CANDIDATES;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(FactorWeights::balanced()).unwrap()
    }

    #[test]
    fn test_construction_rejects_bad_weights() {
        let mut weights = FactorWeights::balanced();
        weights.urgency = 0.15; // sum 0.9
        assert!(matches!(
            RecommendationEngine::new(weights),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_empty_set_is_not_an_error() {
        let report = engine().recommend(&[], &Context::at(now()), None);
        assert!(report.ranked.is_empty());
        assert_eq!(
            report.explanation.warnings,
            vec![WARN_NO_CANDIDATES.to_string()]
        );
    }

    #[test]
    fn test_invalid_candidates_are_skipped_not_fatal() {
        let good = Candidate::new("good", "Valid task", now());
        let bad = Candidate::new("", "No id", now());
        let report = engine().recommend(&[bad, good], &Context::at(now()), None);

        assert_eq!(report.ranked.len(), 1);
        assert_eq!(report.ranked[0].id, "good");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id, "?");
    }

    #[test]
    fn test_deadline_candidate_outranks_no_deadline() {
        let urgent = Candidate::new("urgent", "Due in an hour", now())
            .with_deadline(now() + ChronoDuration::hours(1));
        let relaxed = Candidate::new("relaxed", "No deadline", now());
        let report = engine().recommend(&[relaxed, urgent], &Context::at(now()), None);

        assert_eq!(report.ranked[0].id, "urgent");
        assert_eq!(report.ranked[0].rank, 1);
        assert_eq!(report.ranked[1].rank, 2);
    }

    #[test]
    fn test_truncation_keeps_explanation_over_full_set() {
        let candidates: Vec<Candidate> = (0..5)
            .map(|i| {
                Candidate::new(format!("c{i}"), format!("Task {i}"), now())
                    .with_importance((i + 3) as u8)
            })
            .collect();
        let report = engine().recommend(&candidates, &Context::at(now()), Some(2));

        assert_eq!(report.ranked.len(), 2);
        // Step 1 still reports all five candidates entering the pass.
        assert!(report.explanation.reasoning_steps[0]
            .description
            .contains("Evaluated 5 candidates"));
    }

    #[test]
    fn test_explain_subject_not_found() {
        let candidates = vec![
            Candidate::new("a", "Task a", now()),
            Candidate::new("b", "Task b", now()),
        ];
        let err = engine()
            .explain_subject(&candidates, &Context::at(now()), "missing")
            .unwrap_err();
        match err {
            EngineError::SubjectNotFound {
                requested,
                available,
            } => {
                assert_eq!(requested, "missing");
                assert!(available.contains(&"a".to_string()));
                assert!(available.contains(&"b".to_string()));
            }
            other => panic!("expected SubjectNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_explain_subject_works_for_non_top_candidate() {
        let urgent = Candidate::new("urgent", "Due soon", now())
            .with_deadline(now() + ChronoDuration::hours(3));
        let relaxed = Candidate::new("relaxed", "Backlog item", now());
        let explanation = engine()
            .explain_subject(&[urgent, relaxed], &Context::at(now()), "relaxed")
            .unwrap();
        assert_eq!(explanation.subject.unwrap().id, "relaxed");
    }

    #[test]
    fn test_determinism_across_invocations() {
        let candidates = vec![
            Candidate::new("a", "Alpha", now())
                .with_deadline(now() + ChronoDuration::days(2))
                .with_importance(7),
            Candidate::new("b", "Beta", now()).with_importance(7),
            Candidate::new("c", "Gamma", now()).with_estimated_minutes(30),
        ];
        let ctx = Context::at(now()).with_available_minutes(60).with_energy(7);

        let engine = engine();
        let first = engine.recommend(&candidates, &ctx, None);
        let second = engine.recommend(&candidates, &ctx, None);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_timeout_surfaces_typed_error() {
        let engine = Arc::new(engine());
        let candidates = vec![Candidate::new("a", "Task", now())];
        let result = engine
            .recommend_with_timeout(
                candidates,
                Context::at(now()),
                None,
                Duration::from_millis(0),
            )
            .await;
        match result {
            Err(EngineError::Timeout { budget_ms }) => assert_eq!(budget_ms, 0),
            Ok(_) => {} // fast machines may legitimately beat a 0ms budget check
            Err(other) => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_within_budget_returns_report() {
        let engine = Arc::new(engine());
        let candidates = vec![Candidate::new("a", "Task", now())];
        let report = engine
            .recommend_with_timeout(
                candidates,
                Context::at(now()),
                None,
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert_eq!(report.ranked.len(), 1);
    }
}
