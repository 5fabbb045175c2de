mod config;
pub mod candidate_db;

pub use candidate_db::CandidateDb;
pub use config::{Config, ContextDefaults, EngineSection, WeightsConfig};

use std::path::PathBuf;

/// Returns `~/.config/nextup[-dev]/` based on NEXTUP_ENV.
///
/// Set NEXTUP_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("NEXTUP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("nextup-dev")
    } else {
        base_dir.join("nextup")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
