//! SQLite-based storage for candidates and the completion log.
//!
//! This is the boundary collaborator that feeds the engine: the CLI loads
//! open candidates and recent completions from here, builds a context, and
//! hands both to the pure pipeline. The engine itself never touches this
//! module.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::data_dir;
use crate::candidate::{Candidate, CompletedItem, EnergyDemand};
use crate::error::StorageError;

// === Helper Functions ===

/// Parse energy demand from database string
fn parse_energy(energy_str: &str) -> EnergyDemand {
    match energy_str {
        "low" => EnergyDemand::Low,
        "high" => EnergyDemand::High,
        "peak" => EnergyDemand::Peak,
        _ => EnergyDemand::Medium,
    }
}

/// Format energy demand for database storage
fn format_energy(energy: EnergyDemand) -> &'static str {
    match energy {
        EnergyDemand::Low => "low",
        EnergyDemand::Medium => "medium",
        EnergyDemand::High => "high",
        EnergyDemand::Peak => "peak",
    }
}

/// Encode a tag list as a JSON array string
fn format_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON array string into a tag list
fn parse_tags(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a Candidate from a database row
fn row_to_candidate(row: &rusqlite::Row) -> Result<Candidate, rusqlite::Error> {
    let deadline: Option<String> = row.get(3)?;
    let energy: String = row.get(8)?;
    let tags: String = row.get(9)?;
    let created_at: String = row.get(11)?;
    let last_progress_at: Option<String> = row.get(12)?;

    Ok(Candidate {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        deadline: deadline.as_deref().map(parse_datetime_fallback),
        estimated_minutes: row.get(4)?,
        importance: row.get::<_, i64>(5)? as u8,
        urgency: row.get::<_, i64>(6)? as u8,
        alignment: row.get::<_, i64>(7)? as u8,
        energy: parse_energy(&energy),
        tags: parse_tags(&tags),
        project_id: row.get(10)?,
        created_at: parse_datetime_fallback(&created_at),
        last_progress_at: last_progress_at.as_deref().map(parse_datetime_fallback),
    })
}

const CANDIDATE_COLUMNS: &str = "id, title, description, deadline, estimated_minutes, importance, \
                                 urgency, alignment, energy, tags, project_id, created_at, \
                                 last_progress_at";

/// SQLite store for candidates and completions.
pub struct CandidateDb {
    conn: Connection,
}

impl CandidateDb {
    /// Open (or create) the database in the standard data directory.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| StorageError::DataDirFailed(e.to_string()))?;
        Self::open_at(&dir.join("candidates.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let db = CandidateDb { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS candidates (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT,
                    deadline TEXT,
                    estimated_minutes INTEGER,
                    importance INTEGER NOT NULL DEFAULT 5,
                    urgency INTEGER NOT NULL DEFAULT 5,
                    alignment INTEGER NOT NULL DEFAULT 5,
                    energy TEXT NOT NULL DEFAULT 'medium',
                    tags TEXT NOT NULL DEFAULT '[]',
                    project_id TEXT,
                    created_at TEXT NOT NULL,
                    last_progress_at TEXT,
                    done INTEGER NOT NULL DEFAULT 0
                );
                CREATE TABLE IF NOT EXISTS completions (
                    candidate_id TEXT NOT NULL,
                    project_id TEXT,
                    tags TEXT NOT NULL DEFAULT '[]',
                    satisfaction INTEGER NOT NULL,
                    completed_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_completions_at
                    ON completions(completed_at);",
            )
            .map_err(|e| StorageError::SchemaFailed(e.to_string()))
    }

    /// Insert a candidate.
    pub fn insert(&self, candidate: &Candidate) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO candidates (id, title, description, deadline, estimated_minutes, \
             importance, urgency, alignment, energy, tags, project_id, created_at, \
             last_progress_at, done)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0)",
            params![
                candidate.id,
                candidate.title,
                candidate.description,
                candidate.deadline.map(|d| d.to_rfc3339()),
                candidate.estimated_minutes,
                candidate.importance as i64,
                candidate.urgency as i64,
                candidate.alignment as i64,
                format_energy(candidate.energy),
                format_tags(&candidate.tags),
                candidate.project_id,
                candidate.created_at.to_rfc3339(),
                candidate.last_progress_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Fetch one candidate by id (open or done).
    pub fn get(&self, id: &str) -> Result<Option<Candidate>, StorageError> {
        let candidate = self
            .conn
            .query_row(
                &format!("SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE id = ?1"),
                params![id],
                row_to_candidate,
            )
            .optional()?;
        Ok(candidate)
    }

    /// List all open (not yet completed) candidates, oldest first.
    pub fn list_open(&self) -> Result<Vec<Candidate>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE done = 0 ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map([], row_to_candidate)?;
        let mut candidates = Vec::new();
        for row in rows {
            candidates.push(row?);
        }
        Ok(candidates)
    }

    /// Record progress on a candidate.
    pub fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<(), StorageError> {
        let updated = self.conn.execute(
            "UPDATE candidates SET last_progress_at = ?2 WHERE id = ?1 AND done = 0",
            params![id, at.to_rfc3339()],
        )?;
        if updated == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Complete a candidate, appending it to the completion log.
    pub fn complete(
        &self,
        id: &str,
        satisfaction: u8,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let Some(candidate) = self.get(id)? else {
            return Err(StorageError::NotFound(id.to_string()));
        };
        self.conn.execute(
            "UPDATE candidates SET done = 1 WHERE id = ?1",
            params![id],
        )?;
        self.conn.execute(
            "INSERT INTO completions (candidate_id, project_id, tags, satisfaction, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                candidate.id,
                candidate.project_id,
                format_tags(&candidate.tags),
                satisfaction.clamp(1, 10) as i64,
                at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Delete a candidate.
    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        let deleted = self
            .conn
            .execute("DELETE FROM candidates WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Completions within the last `window_days` before `now`, newest first.
    pub fn recent_completions(
        &self,
        now: DateTime<Utc>,
        window_days: u32,
    ) -> Result<Vec<CompletedItem>, StorageError> {
        let cutoff = now - Duration::days(window_days as i64);
        let mut stmt = self.conn.prepare(
            "SELECT candidate_id, project_id, tags, satisfaction, completed_at
             FROM completions WHERE completed_at >= ?1 ORDER BY completed_at DESC",
        )?;
        let rows = stmt.query_map(params![cutoff.to_rfc3339()], |row| {
            let tags: String = row.get(2)?;
            let completed_at: String = row.get(4)?;
            Ok(CompletedItem {
                candidate_id: row.get(0)?,
                project_id: row.get(1)?,
                tags: parse_tags(&tags),
                satisfaction: row.get::<_, i64>(3)? as u8,
                completed_at: parse_datetime_fallback(&completed_at),
            })
        })?;
        let mut completions = Vec::new();
        for row in rows {
            completions.push(row?);
        }
        Ok(completions)
    }
}
