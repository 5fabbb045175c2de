//! Shared helpers for CLI commands.

use chrono::Utc;
use nextup_core::storage::{CandidateDb, Config};
use nextup_core::{Candidate, Context, RecommendationEngine};

/// Context overrides supplied on the command line.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ContextArgs {
    /// Available time budget in minutes
    #[arg(long)]
    pub available: Option<u32>,
    /// Current energy level (1-10)
    #[arg(long)]
    pub energy: Option<u8>,
    /// Current focus label (e.g. deep_work)
    #[arg(long)]
    pub focus: Option<String>,
}

/// Assemble the engine and its inputs from config + storage.
///
/// Command-line overrides win over config defaults; everything else comes
/// from the stored config and the candidate database.
pub fn load_engine_inputs(
    overrides: &ContextArgs,
) -> Result<(RecommendationEngine, Vec<Candidate>, Context), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let weights = config.resolve_weights()?;
    let engine = RecommendationEngine::with_config(weights, config.engine_config())?;

    let db = CandidateDb::open()?;
    let candidates = db.list_open()?;

    let now = Utc::now();
    let completions = db.recent_completions(now, config.context.completion_window_days)?;

    let mut context = Context::at(now)
        .with_energy(overrides.energy.unwrap_or(config.context.energy))
        .with_recent_completions(completions);
    context.available_minutes = overrides.available.or(config.context.available_minutes);
    context.focus_label = overrides
        .focus
        .clone()
        .or_else(|| config.context.focus_label.clone());

    Ok((engine, candidates, context))
}

/// Print a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
