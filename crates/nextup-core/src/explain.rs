//! Structured explanation generation for a ranking outcome.
//!
//! Produces the auditable artifact behind a recommendation: a fixed
//! five-step reasoning chain, the primary recommendation, ranked
//! alternatives annotated with their weakest factor against the subject,
//! and warning flags. The subject is usually the top-ranked candidate but
//! may be any candidate from the pass (the `explain <id>` path substitutes
//! it before calling [`generate`]).

use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;
use crate::features::{Factor, FeatureSet};
use crate::ranker::RankedCandidate;

/// Warning flag for an empty eligible candidate set.
pub const WARN_NO_CANDIDATES: &str = "no eligible candidates";

/// Warning flag for a candidate unlikely to fit the available slot.
pub const WARN_EFFORT_FIT: &str = "may not fit available time";

/// Warning flag for a severe energy mismatch.
pub const WARN_ENERGY_MISMATCH: &str = "energy level mismatch";

/// Effort-fit score below which the time-fit warning fires.
const EFFORT_WARNING_THRESHOLD: f64 = 20.0;

/// Maximum number of alternatives listed.
const MAX_ALTERNATIVES: usize = 3;

/// Reference to the candidate an explanation is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
    /// Candidate id
    pub id: String,
    /// Candidate title
    pub title: String,
}

/// One step in the reasoning chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// 1-based step number
    pub step: u32,
    /// What was done
    pub description: String,
    /// Why this step matters
    pub rationale: String,
    /// Confidence attached to this step, where applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// The primary recommendation in natural language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Suggested action
    pub action: String,
    /// Why this is the suggestion
    pub rationale: String,
}

/// A ranked alternative with its trade-off against the subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    /// Candidate id
    pub id: String,
    /// Candidate title
    pub title: String,
    /// The factor on which it most under-performs the subject
    pub tradeoff: String,
}

/// Structured, auditable justification for a ranking outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// The candidate being explained; absent for an empty pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<SubjectRef>,
    /// Ordered reasoning chain
    pub reasoning_steps: Vec<ReasoningStep>,
    /// Overall confidence
    pub confidence: Confidence,
    /// Primary recommendation; absent for an empty pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_recommendation: Option<Recommendation>,
    /// Up to three ranked alternatives
    pub alternatives: Vec<Alternative>,
    /// Warning flags
    pub warnings: Vec<String>,
}

impl Explanation {
    /// The terminal artifact for a pass with no eligible candidates.
    pub fn empty() -> Self {
        Explanation {
            subject: None,
            reasoning_steps: Vec::new(),
            confidence: Confidence::none(),
            primary_recommendation: None,
            alternatives: Vec::new(),
            warnings: vec![WARN_NO_CANDIDATES.to_string()],
        }
    }
}

/// Generate the explanation for `subject` against the full ranked list.
///
/// `ranked` is the complete pass result in rank order (it may or may not
/// contain the subject at rank 1; the subject is excluded from the
/// comparison set either way). `total_evaluated` counts every candidate
/// that entered scoring, including those ranked below any truncation.
pub fn generate(
    subject: &RankedCandidate,
    ranked: &[RankedCandidate],
    subject_features: &FeatureSet,
    confidence: Confidence,
    total_evaluated: usize,
) -> Explanation {
    let others: Vec<&RankedCandidate> = ranked.iter().filter(|r| r.id != subject.id).collect();
    let runner_up = others.first().copied();

    let top_factors = top_factor_names(subject);
    let mut steps = Vec::with_capacity(5);
    steps.push(ReasoningStep {
        step: 1,
        description: format!(
            "Evaluated {total_evaluated} candidate{} against {} weighted factors",
            if total_evaluated == 1 { "" } else { "s" },
            Factor::CANONICAL.len()
        ),
        rationale: "Every candidate is reduced to the same normalized factor set, so scores are \
                    directly comparable."
            .to_string(),
        confidence: None,
    });
    steps.push(ReasoningStep {
        step: 2,
        description: format!("Identified top contributing factors: {top_factors}"),
        rationale: "The largest weighted contributions account for most of the final score."
            .to_string(),
        confidence: None,
    });
    steps.push(ReasoningStep {
        step: 3,
        description: "Adjusted urgency for time decay and deadline proximity".to_string(),
        rationale: "Stale items lose urgency with age unless a deadline is imminent.".to_string(),
        confidence: None,
    });
    steps.push(ReasoningStep {
        step: 4,
        description: match runner_up {
            Some(runner) => format!(
                "Compared against runner-up '{}' ({:.1} vs {:.1})",
                runner.title, subject.score, runner.score
            ),
            None => "No runner-up available for comparison".to_string(),
        },
        rationale: match runner_up {
            Some(_) => "A wider margin over the next option makes the pick more clear-cut."
                .to_string(),
            None => "Single-candidate passes fall back to a medium baseline confidence."
                .to_string(),
        },
        confidence: Some(confidence.value),
    });
    steps.push(ReasoningStep {
        step: 5,
        description: format!(
            "Computed overall confidence {:.2} ({})",
            confidence.value, confidence.bucket
        ),
        rationale: "Confidence reflects the score separation and how many inputs were defaulted."
            .to_string(),
        confidence: Some(confidence.value),
    });

    let primary_recommendation = build_recommendation(subject);
    let alternatives = build_alternatives(subject, &others);
    let warnings = build_warnings(subject_features);

    Explanation {
        subject: Some(SubjectRef {
            id: subject.id.clone(),
            title: subject.title.clone(),
        }),
        reasoning_steps: steps,
        confidence,
        primary_recommendation: Some(primary_recommendation),
        alternatives,
        warnings,
    }
}

/// Names of the subject's top two factors by contribution.
fn top_factor_names(subject: &RankedCandidate) -> String {
    let mut sorted: Vec<_> = subject.factors.iter().collect();
    sorted.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
    sorted
        .iter()
        .take(2)
        .map(|f| f.name.describe())
        .collect::<Vec<_>>()
        .join(", ")
}

fn build_recommendation(subject: &RankedCandidate) -> Recommendation {
    let leading = subject
        .factors
        .iter()
        .max_by(|a, b| a.contribution.total_cmp(&b.contribution));
    let rationale = match leading {
        Some(factor) => format!(
            "It leads on {} (raw {:.0}/100), scoring {:.1} overall.",
            factor.name.describe(),
            factor.raw,
            subject.score
        ),
        None => format!("It scores {:.1} overall.", subject.score),
    };
    Recommendation {
        action: format!("Start with '{}'", subject.title),
        rationale,
    }
}

/// Annotate each alternative with the factor where it loses the most ground.
fn build_alternatives(subject: &RankedCandidate, others: &[&RankedCandidate]) -> Vec<Alternative> {
    others
        .iter()
        .take(MAX_ALTERNATIVES)
        .map(|alt| {
            let tradeoff = weakest_against(subject, alt);
            Alternative {
                id: alt.id.clone(),
                title: alt.title.clone(),
                tradeoff,
            }
        })
        .collect()
}

fn weakest_against(subject: &RankedCandidate, alternative: &RankedCandidate) -> String {
    let mut worst: Option<(Factor, f64, f64)> = None;
    for factor in &subject.factors {
        let Some(alt_factor) = alternative.factors.iter().find(|f| f.name == factor.name) else {
            continue;
        };
        let gap = factor.contribution - alt_factor.contribution;
        if worst.map_or(true, |(_, _, best_gap)| gap > best_gap) {
            worst = Some((factor.name, alt_factor.raw, gap));
        }
    }
    match worst {
        Some((factor, alt_raw, gap)) if gap > 0.0 => format!(
            "weaker on {} (raw {:.0}, {:.1} points behind)",
            factor.describe(),
            alt_raw,
            gap
        ),
        _ => format!("scores {:.1} overall", alternative.score),
    }
}

fn build_warnings(features: &FeatureSet) -> Vec<String> {
    let mut warnings = Vec::new();
    if features.effort < EFFORT_WARNING_THRESHOLD && !features.is_defaulted(Factor::Effort) {
        warnings.push(WARN_EFFORT_FIT.to_string());
    }
    if features.energy == 0.0 {
        warnings.push(WARN_ENERGY_MISMATCH.to_string());
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranker::{rank, ScoredEntry};
    use crate::scoring::{FactorWeights, ScoringEngine};

    fn features(values: [f64; 7]) -> FeatureSet {
        let mut set = FeatureSet::empty();
        for (factor, value) in Factor::CANONICAL.iter().zip(values) {
            set.set(*factor, value);
        }
        set
    }

    fn ranked_pair() -> Vec<RankedCandidate> {
        let engine = ScoringEngine::new(FactorWeights::balanced()).unwrap();
        let entries = vec![
            ScoredEntry {
                id: "a".into(),
                title: "Finish report".into(),
                deadline: None,
                importance: 8,
                breakdown: engine.score(&features([90.0, 80.0, 60.0, 70.0, 50.0, 100.0, 50.0])),
            },
            ScoredEntry {
                id: "b".into(),
                title: "Clean inbox".into(),
                deadline: None,
                importance: 3,
                breakdown: engine.score(&features([30.0, 20.0, 80.0, 30.0, 50.0, 50.0, 0.0])),
            },
        ];
        rank(entries, None)
    }

    #[test]
    fn test_generate_has_five_steps_in_order() {
        let ranked = ranked_pair();
        let explanation = generate(
            &ranked[0],
            &ranked,
            &features([90.0, 80.0, 60.0, 70.0, 50.0, 100.0, 50.0]),
            Confidence::from_value(0.9),
            2,
        );
        let steps: Vec<u32> = explanation.reasoning_steps.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5]);
        assert!(explanation.reasoning_steps[0]
            .description
            .contains("Evaluated 2 candidates"));
        assert!(explanation.reasoning_steps[3]
            .description
            .contains("Clean inbox"));
    }

    #[test]
    fn test_primary_recommendation_names_title_and_factor() {
        let ranked = ranked_pair();
        let explanation = generate(
            &ranked[0],
            &ranked,
            &features([90.0, 80.0, 60.0, 70.0, 50.0, 100.0, 50.0]),
            Confidence::from_value(0.9),
            2,
        );
        let recommendation = explanation.primary_recommendation.unwrap();
        assert_eq!(recommendation.action, "Start with 'Finish report'");
        assert!(recommendation.rationale.contains("deadline proximity"));
    }

    #[test]
    fn test_alternatives_annotate_weakest_factor() {
        let ranked = ranked_pair();
        let explanation = generate(
            &ranked[0],
            &ranked,
            &features([90.0, 80.0, 60.0, 70.0, 50.0, 100.0, 50.0]),
            Confidence::from_value(0.9),
            2,
        );
        assert_eq!(explanation.alternatives.len(), 1);
        let alternative = &explanation.alternatives[0];
        assert_eq!(alternative.id, "b");
        // The runner-up loses the most weighted ground on urgency (90 vs 30).
        assert!(alternative.tradeoff.contains("deadline proximity"));
    }

    #[test]
    fn test_warnings_for_poor_fit_and_energy() {
        let mut poor = features([50.0, 50.0, 10.0, 50.0, 50.0, 0.0, 50.0]);
        assert_eq!(
            build_warnings(&poor),
            vec![WARN_EFFORT_FIT.to_string(), WARN_ENERGY_MISMATCH.to_string()]
        );

        // A defaulted effort value is unknown, not known-bad.
        poor.set(Factor::Effort, 10.0);
        poor.mark_defaulted(Factor::Effort);
        assert_eq!(build_warnings(&poor), vec![WARN_ENERGY_MISMATCH.to_string()]);
    }

    #[test]
    fn test_empty_artifact_flags_no_candidates() {
        let explanation = Explanation::empty();
        assert!(explanation.subject.is_none());
        assert!(explanation.primary_recommendation.is_none());
        assert!(explanation.reasoning_steps.is_empty());
        assert_eq!(explanation.warnings, vec![WARN_NO_CANDIDATES.to_string()]);
        assert_eq!(explanation.confidence.value, 0.0);
    }

    #[test]
    fn test_subject_can_be_non_top_candidate() {
        let ranked = ranked_pair();
        let explanation = generate(
            &ranked[1],
            &ranked,
            &features([30.0, 20.0, 80.0, 30.0, 50.0, 50.0, 0.0]),
            Confidence::from_value(0.4),
            2,
        );
        let subject = explanation.subject.unwrap();
        assert_eq!(subject.id, "b");
        // Runner-up for a substituted subject is the overall leader.
        assert!(explanation.reasoning_steps[3]
            .description
            .contains("Finish report"));
    }
}
