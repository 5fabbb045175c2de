//! The recommend ("what should I do now?") command.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use nextup_core::RecommendationReport;

use super::common::{load_engine_inputs, print_json, ContextArgs};

#[derive(Args)]
pub struct RecommendArgs {
    /// Limit output to the top N candidates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
    /// Output the full report as JSON
    #[arg(long)]
    pub json: bool,
    /// Abort with an error if the pass exceeds this budget in milliseconds
    #[arg(long)]
    pub budget_ms: Option<u64>,
    #[command(flatten)]
    pub context: ContextArgs,
}

pub fn run(args: RecommendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (engine, candidates, context) = load_engine_inputs(&args.context)?;

    let report = match args.budget_ms {
        Some(budget_ms) => {
            let engine = Arc::new(engine);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(engine.recommend_with_timeout(
                candidates,
                context,
                args.count,
                Duration::from_millis(budget_ms),
            ))?
        }
        None => engine.recommend(&candidates, &context, args.count),
    };

    if args.json {
        return print_json(&report);
    }
    render(&report);
    Ok(())
}

fn render(report: &RecommendationReport) {
    if report.ranked.is_empty() {
        println!("No candidates to rank yet.");
        println!("Add one with: nextup task add <title>");
        return;
    }

    println!("Recommendations:");
    for item in &report.ranked {
        println!("  {}. {} (score {:.1})  [{}]", item.rank, item.title, item.score, item.id);
        if let Some(reason) = item.reasons.first() {
            println!("     {reason}");
        }
    }

    if let Some(recommendation) = &report.explanation.primary_recommendation {
        println!();
        println!("{} -- {}", recommendation.action, recommendation.rationale);
    }
    println!(
        "Confidence: {:.2} ({})",
        report.explanation.confidence.value, report.explanation.confidence.bucket
    );
    for warning in &report.explanation.warnings {
        println!("warning: {warning}");
    }
    for skipped in &report.skipped {
        eprintln!("skipped {}: {}", skipped.id, skipped.reason);
    }
}
