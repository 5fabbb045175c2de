//! Configuration management commands.

use clap::Subcommand;
use nextup_core::storage::Config;
use nextup_core::FactorWeights;

use super::common::print_json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Select a weight profile
    SetProfile {
        /// Profile name: balanced, deadline_focused, deep_work, quick_wins
        name: String,
    },
    /// Set fully custom factor weights (must sum to 1.0)
    SetWeights {
        urgency: f64,
        importance: f64,
        effort: f64,
        alignment: f64,
        momentum: f64,
        energy: f64,
        context: f64,
    },
    /// Drop custom weights and fall back to the selected profile
    ClearWeights,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show { json } => {
            let config = Config::load()?;
            if json {
                return print_json(&config);
            }
            let weights = config.resolve_weights()?;
            println!("Profile: {}", config.weights.profile);
            if config.weights.custom.is_some() {
                println!("(custom weights override the profile)");
            }
            println!(
                "Weights: urgency {:.2}, importance {:.2}, effort {:.2}, alignment {:.2}, \
                 momentum {:.2}, energy {:.2}, context {:.2}",
                weights.urgency,
                weights.importance,
                weights.effort,
                weights.alignment,
                weights.momentum,
                weights.energy,
                weights.context
            );
            println!(
                "Engine: horizon {} days, decay {}/day, urgency floor {}, override window {} h",
                config.engine.horizon_days,
                config.engine.decay_rate_per_day,
                config.engine.urgency_floor,
                config.engine.deadline_override_hours
            );
        }
        ConfigAction::SetProfile { name } => {
            if FactorWeights::preset(&name).is_none() {
                return Err(format!(
                    "unknown profile '{}' (available: {})",
                    name,
                    FactorWeights::preset_names().join(", ")
                )
                .into());
            }
            let mut config = Config::load()?;
            config.weights.profile = name.clone();
            config.save()?;
            println!("Profile set: {name}");
        }
        ConfigAction::SetWeights {
            urgency,
            importance,
            effort,
            alignment,
            momentum,
            energy,
            context,
        } => {
            let weights = FactorWeights {
                urgency,
                importance,
                effort,
                alignment,
                momentum,
                energy,
                context,
            };
            // Fail here, not at the next recommend call.
            weights.validate()?;
            let mut config = Config::load()?;
            config.weights.custom = Some(weights);
            config.save()?;
            println!("Custom weights saved.");
        }
        ConfigAction::ClearWeights => {
            let mut config = Config::load()?;
            config.weights.custom = None;
            config.save()?;
            println!("Custom weights cleared; using profile '{}'.", config.weights.profile);
        }
    }

    Ok(())
}
