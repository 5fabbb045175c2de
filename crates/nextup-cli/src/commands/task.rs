//! Task management commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use nextup_core::storage::CandidateDb;
use nextup_core::{Candidate, EnergyDemand};
use uuid::Uuid;

use super::common::print_json;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Deadline (RFC3339, e.g. 2026-03-15T17:00:00Z)
        #[arg(long)]
        deadline: Option<String>,
        /// Estimated effort in minutes
        #[arg(long)]
        minutes: Option<u32>,
        /// Importance rating (1-10)
        #[arg(long, default_value = "5")]
        importance: u8,
        /// Urgency rating (1-10)
        #[arg(long, default_value = "5")]
        urgency: u8,
        /// Goal-alignment rating (1-10)
        #[arg(long, default_value = "5")]
        alignment: u8,
        /// Energy demand: low, medium, high, or peak
        #[arg(long, default_value = "medium")]
        energy: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Project ID to associate with
        #[arg(long)]
        project_id: Option<String>,
    },
    /// List open tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record progress on a task
    Touch {
        /// Task ID
        id: String,
    },
    /// Complete a task
    Done {
        /// Task ID
        id: String,
        /// Satisfaction rating (1-10)
        #[arg(long, default_value = "7")]
        satisfaction: u8,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

fn parse_energy(raw: &str) -> Result<EnergyDemand, String> {
    match raw.to_lowercase().as_str() {
        "low" => Ok(EnergyDemand::Low),
        "medium" => Ok(EnergyDemand::Medium),
        "high" => Ok(EnergyDemand::High),
        "peak" => Ok(EnergyDemand::Peak),
        other => Err(format!(
            "unknown energy level '{other}' (expected low, medium, high, or peak)"
        )),
    }
}

fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid deadline '{raw}': {e}"))
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = CandidateDb::open()?;

    match action {
        TaskAction::Add {
            title,
            description,
            deadline,
            minutes,
            importance,
            urgency,
            alignment,
            energy,
            tags,
            project_id,
        } => {
            let mut candidate = Candidate::new(Uuid::new_v4().to_string(), title, Utc::now());
            candidate.description = description;
            candidate.deadline = deadline.as_deref().map(parse_deadline).transpose()?;
            candidate.estimated_minutes = minutes;
            candidate.importance = importance;
            candidate.urgency = urgency;
            candidate.alignment = alignment;
            candidate.energy = parse_energy(&energy)?;
            candidate.tags = tags
                .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default();
            candidate.project_id = project_id;

            candidate.validate().map_err(|issue| issue.to_string())?;
            db.insert(&candidate)?;
            println!("Task created: {}", candidate.id);
        }
        TaskAction::List { json } => {
            let candidates = db.list_open()?;
            if json {
                return print_json(&candidates);
            }
            if candidates.is_empty() {
                println!("No open tasks.");
                return Ok(());
            }
            for candidate in candidates {
                let deadline = candidate
                    .deadline
                    .map(|d| d.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {}  (importance {}, deadline {})",
                    candidate.id, candidate.title, candidate.importance, deadline
                );
            }
        }
        TaskAction::Touch { id } => {
            db.touch(&id, Utc::now())?;
            println!("Progress recorded: {id}");
        }
        TaskAction::Done { id, satisfaction } => {
            db.complete(&id, satisfaction, Utc::now())?;
            println!("Task completed: {id}");
        }
        TaskAction::Delete { id } => {
            db.delete(&id)?;
            println!("Task deleted: {id}");
        }
    }

    Ok(())
}
