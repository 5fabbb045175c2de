//! The explain command: why does a candidate rank where it does?

use clap::Args;
use nextup_core::Explanation;

use super::common::{load_engine_inputs, print_json, ContextArgs};

#[derive(Args)]
pub struct ExplainArgs {
    /// Candidate id to explain
    pub id: String,
    /// Output the explanation as JSON
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub context: ContextArgs,
}

pub fn run(args: ExplainArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (engine, candidates, context) = load_engine_inputs(&args.context)?;
    let explanation = engine.explain_subject(&candidates, &context, &args.id)?;

    if args.json {
        return print_json(&explanation);
    }
    render(&explanation);
    Ok(())
}

fn render(explanation: &Explanation) {
    match &explanation.subject {
        Some(subject) => println!("Explanation for '{}' [{}]:", subject.title, subject.id),
        None => {
            println!("Nothing to explain: no eligible candidates.");
            println!("Add one with: nextup task add <title>");
            return;
        }
    }

    for step in &explanation.reasoning_steps {
        match step.confidence {
            Some(confidence) => {
                println!("  {}. {} (confidence {:.2})", step.step, step.description, confidence)
            }
            None => println!("  {}. {}", step.step, step.description),
        }
        println!("     {}", step.rationale);
    }

    if let Some(recommendation) = &explanation.primary_recommendation {
        println!();
        println!("{} -- {}", recommendation.action, recommendation.rationale);
    }

    if !explanation.alternatives.is_empty() {
        println!("Alternatives:");
        for alternative in &explanation.alternatives {
            println!("  - {} [{}]: {}", alternative.title, alternative.id, alternative.tradeoff);
        }
    }

    for warning in &explanation.warnings {
        println!("warning: {warning}");
    }
}
