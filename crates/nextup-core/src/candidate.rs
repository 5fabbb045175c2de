//! Candidate and context types for the priority engine.
//!
//! A [`Candidate`] is a task or project eligible for ranking. A [`Context`]
//! is the caller-supplied snapshot of the evaluation-time situation: current
//! time, energy, available minutes, active focus labels, and recent
//! completion history. Both are plain data; the engine never mutates them
//! and owns nothing persistent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Energy a candidate demands from whoever works on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnergyDemand {
    /// Routine work, fine for a tired hour
    Low,
    /// Ordinary focused work (default)
    Medium,
    /// Demanding work needing sustained attention
    High,
    /// Hardest work, reserved for the best hours
    Peak,
}

impl Default for EnergyDemand {
    fn default() -> Self {
        EnergyDemand::Medium
    }
}

impl EnergyDemand {
    /// Ordinal position on the low..peak ladder.
    pub fn level(&self) -> u8 {
        match self {
            EnergyDemand::Low => 0,
            EnergyDemand::Medium => 1,
            EnergyDemand::High => 2,
            EnergyDemand::Peak => 3,
        }
    }

    /// Map a 1-10 current-energy rating onto the same ladder.
    pub fn from_scale(energy: u8) -> Self {
        match energy {
            0..=3 => EnergyDemand::Low,
            4..=6 => EnergyDemand::Medium,
            7..=8 => EnergyDemand::High,
            _ => EnergyDemand::Peak,
        }
    }

    /// Level distance between two demands.
    pub fn distance(&self, other: EnergyDemand) -> u8 {
        self.level().abs_diff(other.level())
    }
}

impl fmt::Display for EnergyDemand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnergyDemand::Low => "low",
            EnergyDemand::Medium => "medium",
            EnergyDemand::High => "high",
            EnergyDemand::Peak => "peak",
        };
        write!(f, "{s}")
    }
}

/// A task or project being scored.
///
/// Importance, urgency and alignment are 1-10 user ratings; effort is an
/// estimate in minutes and must be positive when present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Unique identifier
    pub id: String,
    /// Candidate title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Hard deadline, if any
    pub deadline: Option<DateTime<Utc>>,
    /// Estimated effort in minutes
    pub estimated_minutes: Option<u32>,
    /// Importance rating (1-10)
    pub importance: u8,
    /// Urgency rating (1-10)
    pub urgency: u8,
    /// Goal-alignment rating (1-10)
    pub alignment: u8,
    /// Energy the work demands
    #[serde(default)]
    pub energy: EnergyDemand,
    /// Tags / context labels
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional project ID
    pub project_id: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last recorded progress, if any
    pub last_progress_at: Option<DateTime<Utc>>,
}

impl Candidate {
    /// Create a new candidate with default ratings.
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Candidate {
            id: id.into(),
            title: title.into(),
            description: None,
            deadline: None,
            estimated_minutes: None,
            importance: 5,
            urgency: 5,
            alignment: 5,
            energy: EnergyDemand::Medium,
            tags: Vec::new(),
            project_id: None,
            created_at,
            last_progress_at: None,
        }
    }

    /// Set the deadline.
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the effort estimate in minutes.
    pub fn with_estimated_minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    /// Set the importance rating (1-10).
    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = importance;
        self
    }

    /// Set the goal-alignment rating (1-10).
    pub fn with_alignment(mut self, alignment: u8) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the energy demand.
    pub fn with_energy(mut self, energy: EnergyDemand) -> Self {
        self.energy = energy;
        self
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the project id.
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Check the candidate is complete enough to score.
    ///
    /// A failed check means the caller handed us bad data; the engine skips
    /// such candidates and counts them, it does not abort the batch.
    pub fn validate(&self) -> Result<(), CandidateIssue> {
        if self.id.trim().is_empty() {
            return Err(CandidateIssue::MissingId);
        }
        if self.title.trim().is_empty() {
            return Err(CandidateIssue::MissingTitle { id: self.id.clone() });
        }
        if let Some(minutes) = self.estimated_minutes {
            if minutes == 0 {
                return Err(CandidateIssue::ZeroEffort { id: self.id.clone() });
            }
        }
        for (name, value) in [
            ("importance", self.importance),
            ("urgency", self.urgency),
            ("alignment", self.alignment),
        ] {
            if !(1..=10).contains(&value) {
                return Err(CandidateIssue::RatingOutOfRange {
                    id: self.id.clone(),
                    field: name,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Days elapsed since the last progress (or creation), relative to `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        let reference = self.last_progress_at.unwrap_or(self.created_at);
        let minutes = (now - reference).num_minutes();
        (minutes.max(0) as f64) / (24.0 * 60.0)
    }
}

/// Why a candidate was excluded from a ranking pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CandidateIssue {
    /// Candidate has no id
    MissingId,
    /// Candidate has no title
    MissingTitle { id: String },
    /// Effort estimate present but zero
    ZeroEffort { id: String },
    /// A 1-10 rating is outside its range
    RatingOutOfRange {
        id: String,
        field: &'static str,
        value: u8,
    },
}

impl fmt::Display for CandidateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateIssue::MissingId => write!(f, "candidate has no id"),
            CandidateIssue::MissingTitle { id } => write!(f, "candidate '{id}' has no title"),
            CandidateIssue::ZeroEffort { id } => {
                write!(f, "candidate '{id}' has a zero effort estimate")
            }
            CandidateIssue::RatingOutOfRange { id, field, value } => {
                write!(f, "candidate '{id}': {field} must be 1-10, got {value}")
            }
        }
    }
}

/// A recently-completed item, used for momentum scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedItem {
    /// Id of the completed candidate
    pub candidate_id: String,
    /// Project it belonged to, if any
    pub project_id: Option<String>,
    /// Tags it carried
    #[serde(default)]
    pub tags: Vec<String>,
    /// Satisfaction rating (1-10) reported on completion
    pub satisfaction: u8,
    /// Completion timestamp
    pub completed_at: DateTime<Utc>,
}

/// The evaluation-time situation.
///
/// Immutable for the duration of one scoring pass. Time is injected here so
/// nothing inside the pipeline ever reads the wall clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Current timestamp
    pub now: DateTime<Utc>,
    /// Available time budget in minutes, if known
    pub available_minutes: Option<u32>,
    /// Current energy level (1-10)
    #[serde(default = "default_energy")]
    pub energy: u8,
    /// Current context label (e.g. "deep_work", "meeting")
    pub focus_label: Option<String>,
    /// Additional active tags
    #[serde(default)]
    pub active_tags: Vec<String>,
    /// Recently-completed items with satisfaction ratings
    #[serde(default)]
    pub recent_completions: Vec<CompletedItem>,
}

fn default_energy() -> u8 {
    5
}

impl Context {
    /// Create a context at a specific instant with sensible defaults.
    pub fn at(now: DateTime<Utc>) -> Self {
        Context {
            now,
            available_minutes: None,
            energy: default_energy(),
            focus_label: None,
            active_tags: Vec::new(),
            recent_completions: Vec::new(),
        }
    }

    /// Set the available time budget.
    pub fn with_available_minutes(mut self, minutes: u32) -> Self {
        self.available_minutes = Some(minutes);
        self
    }

    /// Set the current energy level (1-10).
    pub fn with_energy(mut self, energy: u8) -> Self {
        self.energy = energy;
        self
    }

    /// Set the current focus label.
    pub fn with_focus_label(mut self, label: impl Into<String>) -> Self {
        self.focus_label = Some(label.into());
        self
    }

    /// Set additional active tags.
    pub fn with_active_tags(mut self, tags: Vec<String>) -> Self {
        self.active_tags = tags;
        self
    }

    /// Set the recent completion history.
    pub fn with_recent_completions(mut self, completions: Vec<CompletedItem>) -> Self {
        self.recent_completions = completions;
        self
    }

    /// All labels the context currently matches against (focus label + tags),
    /// lowercased.
    pub fn label_set(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .focus_label
            .iter()
            .chain(self.active_tags.iter())
            .map(|s| s.to_lowercase())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::at(Utc::now())
    }
}
