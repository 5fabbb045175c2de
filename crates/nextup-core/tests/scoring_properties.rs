//! Property tests for the scoring laws.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use nextup_core::confidence;
use nextup_core::{
    Candidate, Context, EnergyDemand, FactorWeights, FeatureSet, RecommendationEngine,
};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
}

fn energy_strategy() -> impl Strategy<Value = EnergyDemand> {
    prop_oneof![
        Just(EnergyDemand::Low),
        Just(EnergyDemand::Medium),
        Just(EnergyDemand::High),
        Just(EnergyDemand::Peak),
    ]
}

/// Raw candidate ingredients: deadline offset hours, effort minutes,
/// importance, urgency, alignment, energy, age days, whether tagged.
type CandidateParts = (
    Option<i64>,
    Option<u32>,
    u8,
    u8,
    u8,
    EnergyDemand,
    i64,
    bool,
);

fn parts_strategy() -> impl Strategy<Value = CandidateParts> {
    (
        proptest::option::of(-48i64..=400),
        proptest::option::of(5u32..=480),
        1u8..=10,
        1u8..=10,
        1u8..=10,
        energy_strategy(),
        0i64..=120,
        any::<bool>(),
    )
}

fn build_candidate(index: usize, parts: CandidateParts) -> Candidate {
    let (deadline_hours, minutes, importance, urgency, alignment, energy, age_days, tagged) = parts;
    let created = base_time() - Duration::days(age_days);
    let mut candidate =
        Candidate::new(format!("cand-{index:03}"), format!("Task {index}"), created)
            .with_importance(importance)
            .with_alignment(alignment)
            .with_energy(energy);
    candidate.urgency = urgency;
    candidate.deadline = deadline_hours.map(|h| base_time() + Duration::hours(h));
    candidate.estimated_minutes = minutes;
    if tagged {
        candidate.tags = vec!["deep_work".into()];
    }
    candidate
}

fn candidates_strategy(max: usize) -> impl Strategy<Value = Vec<Candidate>> {
    proptest::collection::vec(parts_strategy(), 1..=max).prop_map(|all| {
        all.into_iter()
            .enumerate()
            .map(|(index, parts)| build_candidate(index, parts))
            .collect()
    })
}

fn context_strategy() -> impl Strategy<Value = Context> {
    (proptest::option::of(10u32..=480), 1u8..=10, any::<bool>()).prop_map(
        |(available, energy, focused)| {
            let mut ctx = Context::at(base_time()).with_energy(energy);
            ctx.available_minutes = available;
            if focused {
                ctx.focus_label = Some("deep_work".into());
            }
            ctx
        },
    )
}

proptest! {
    /// Every factor raw is in [0,100] and contributions reconcile exactly.
    #[test]
    fn factor_scores_are_bounded_and_reconcile(
        candidates in candidates_strategy(8),
        ctx in context_strategy(),
    ) {
        let engine = RecommendationEngine::new(FactorWeights::balanced()).unwrap();
        let report = engine.recommend(&candidates, &ctx, None);

        for item in &report.ranked {
            let mut sum = 0.0;
            for factor in &item.factors {
                prop_assert!((0.0..=100.0).contains(&factor.raw));
                prop_assert!((factor.contribution - factor.raw * factor.weight).abs() < 1e-6);
                sum += factor.contribution;
            }
            prop_assert!((sum - item.score).abs() < 1e-6);
            prop_assert!((0.0..=100.0).contains(&item.score));
        }
    }

    /// Ranks form a gapless 1..N total order.
    #[test]
    fn ranking_is_total_and_gapless(
        candidates in candidates_strategy(10),
        ctx in context_strategy(),
    ) {
        let engine = RecommendationEngine::new(FactorWeights::balanced()).unwrap();
        let report = engine.recommend(&candidates, &ctx, None);

        prop_assert_eq!(report.ranked.len(), candidates.len());
        for (index, item) in report.ranked.iter().enumerate() {
            prop_assert_eq!(item.rank, (index + 1) as u32);
        }
        // Scores are non-increasing down the list.
        for pair in report.ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score - 0.01);
        }
    }

    /// The same inputs always produce the same report.
    #[test]
    fn pipeline_is_deterministic(
        candidates in candidates_strategy(6),
        ctx in context_strategy(),
    ) {
        let engine = RecommendationEngine::new(FactorWeights::deadline_focused()).unwrap();
        let first = engine.recommend(&candidates, &ctx, None);
        let second = engine.recommend(&candidates, &ctx, None);
        prop_assert_eq!(first, second);
    }

    /// Moving a deadline closer never lowers the candidate's score.
    #[test]
    fn deadline_urgency_is_monotone(
        near_hours in 1i64..=336,
        far_extra in 1i64..=200,
        importance in 1u8..=10,
        age_days in 0i64..=60,
    ) {
        let engine = RecommendationEngine::new(FactorWeights::balanced()).unwrap();
        let ctx = Context::at(base_time());
        let created = base_time() - Duration::days(age_days);

        let near = Candidate::new("c", "Task", created)
            .with_importance(importance)
            .with_deadline(base_time() + Duration::hours(near_hours));
        let far = Candidate::new("c", "Task", created)
            .with_importance(importance)
            .with_deadline(base_time() + Duration::hours(near_hours + far_extra));

        let near_score = engine.recommend(&[near], &ctx, None).ranked[0].score;
        let far_score = engine.recommend(&[far], &ctx, None).ranked[0].score;
        prop_assert!(near_score >= far_score - 1e-9);
    }

    /// Confidence never decreases as the score gap widens.
    #[test]
    fn confidence_is_monotone_in_gap(
        top in 0.0f64..=100.0,
        gap_small in 0.0f64..=50.0,
        gap_extra in 0.0f64..=50.0,
        defaulted_count in 0usize..=7,
    ) {
        let mut features = FeatureSet::empty();
        for factor in nextup_core::Factor::CANONICAL.iter().take(defaulted_count) {
            features.mark_defaulted(*factor);
        }

        let narrow = confidence::estimate(top, Some(top - gap_small), &features);
        let wide = confidence::estimate(top, Some(top - gap_small - gap_extra), &features);
        prop_assert!(wide.value >= narrow.value - 1e-9);
    }

    /// Truncation returns a prefix of the full ranking.
    #[test]
    fn truncation_is_a_prefix(
        candidates in candidates_strategy(8),
        ctx in context_strategy(),
        keep in 1usize..=8,
    ) {
        let engine = RecommendationEngine::new(FactorWeights::balanced()).unwrap();
        let full = engine.recommend(&candidates, &ctx, None);
        let truncated = engine.recommend(&candidates, &ctx, Some(keep));

        let expected = keep.min(full.ranked.len());
        prop_assert_eq!(truncated.ranked.len(), expected);
        for (a, b) in truncated.ranked.iter().zip(full.ranked.iter()) {
            prop_assert_eq!(a, b);
        }
    }
}
