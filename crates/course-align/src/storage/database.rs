//! SQLite persistence for submissions and analysis results

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{AnalysisRecord, AnalysisStatus, Finding, Submission, SubmissionStatus};

/// SQLite-backed submission store
pub struct SubmissionDb {
    conn: Arc<Mutex<Connection>>,
}

impl SubmissionDb {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::database(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::database(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
        "#,
        )
        .map_err(|e| Error::database(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS course_submissions (
                id TEXT PRIMARY KEY,
                file_paths TEXT NOT NULL,
                original_filenames TEXT NOT NULL,
                form_fields TEXT NOT NULL DEFAULT '{}',
                submission_status TEXT NOT NULL,
                analysis_status TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS analysis_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                submission_id TEXT NOT NULL REFERENCES course_submissions(id),
                framework_matches TEXT NOT NULL,
                overall_score REAL NOT NULL,
                ai_analysis TEXT NOT NULL,
                recommendations TEXT NOT NULL,
                detailed_feedback TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_analysis_results_submission
                ON analysis_results(submission_id);
        "#,
        )
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

        tracing::debug!("Database migrations complete");
        Ok(())
    }

    // ==================== Submissions ====================

    /// Insert a new submission
    pub fn create_submission(&self, submission: &Submission) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            r#"
            INSERT INTO course_submissions (
                id, file_paths, original_filenames, form_fields,
                submission_status, analysis_status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                submission.id.to_string(),
                serde_json::to_string(&submission.file_paths)?,
                serde_json::to_string(&submission.original_filenames)?,
                serde_json::to_string(&submission.form_fields)?,
                submission.submission_status.as_str(),
                submission.analysis_status.as_str(),
                submission.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::database(format!("Failed to create submission: {}", e)))?;

        Ok(())
    }

    /// Get a submission by ID
    pub fn get_submission(&self, id: &Uuid) -> Result<Option<Submission>> {
        let conn = self.conn.lock();

        conn.query_row(
            r#"
            SELECT id, file_paths, original_filenames, form_fields,
                   submission_status, analysis_status, created_at
            FROM course_submissions WHERE id = ?1
            "#,
            params![id.to_string()],
            row_to_submission,
        )
        .optional()
        .map_err(|e| Error::database(format!("Failed to get submission: {}", e)))
    }

    /// Update the analysis status; returns false if the submission is unknown
    pub fn set_analysis_status(&self, id: &Uuid, status: AnalysisStatus) -> Result<bool> {
        let conn = self.conn.lock();

        let updated = conn
            .execute(
                "UPDATE course_submissions SET analysis_status = ?1 WHERE id = ?2",
                params![status.as_str(), id.to_string()],
            )
            .map_err(|e| Error::database(format!("Failed to update status: {}", e)))?;

        Ok(updated > 0)
    }

    // ==================== Analysis results ====================

    /// Persist a classification result and return its row ID
    pub fn store_analysis(&self, submission_id: &Uuid, findings: &[Finding]) -> Result<i64> {
        let overall_score = Finding::overall_score(findings);
        let ai_analysis = findings
            .first()
            .map(|f| f.analysis.clone())
            .unwrap_or_default();
        let recommendations = findings
            .iter()
            .filter_map(|f| f.recommendations.first().cloned())
            .collect::<Vec<_>>()
            .join(" | ");

        let now = Utc::now();
        let categories: BTreeSet<&str> = findings.iter().map(|f| f.category.as_str()).collect();
        let detailed_feedback = json!({
            "total_matches": Finding::match_count(findings),
            "avg_similarity": Finding::average_similarity(findings),
            "analysis_timestamp": now.to_rfc3339(),
            "framework_areas_covered": categories,
        });

        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO analysis_results (
                submission_id, framework_matches, overall_score, ai_analysis,
                recommendations, detailed_feedback, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                submission_id.to_string(),
                serde_json::to_string(findings)?,
                overall_score,
                ai_analysis,
                recommendations,
                detailed_feedback.to_string(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::database(format!("Failed to store analysis: {}", e)))?;

        Ok(conn.last_insert_rowid())
    }

    /// Most recent analysis for a submission
    pub fn latest_analysis(&self, submission_id: &Uuid) -> Result<Option<AnalysisRecord>> {
        let conn = self.conn.lock();

        conn.query_row(
            r#"
            SELECT id, submission_id, framework_matches, overall_score, ai_analysis,
                   recommendations, detailed_feedback, created_at
            FROM analysis_results
            WHERE submission_id = ?1
            ORDER BY id DESC
            LIMIT 1
            "#,
            params![submission_id.to_string()],
            row_to_analysis,
        )
        .optional()
        .map_err(|e| Error::database(format!("Failed to get analysis: {}", e)))
    }

    /// Number of stored submissions
    pub fn count_submissions(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM course_submissions", [], |row| row.get(0))
            .map_err(|e| Error::database(format!("Failed to count submissions: {}", e)))?;
        Ok(count as usize)
    }
}

fn conversion_error(column: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_uuid(column: usize, raw: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| conversion_error(column, e))
}

fn parse_time(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

fn parse_json<T: serde::de::DeserializeOwned>(column: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw).map_err(|e| conversion_error(column, e))
}

fn row_to_submission(row: &rusqlite::Row) -> rusqlite::Result<Submission> {
    let id: String = row.get(0)?;
    let file_paths: String = row.get(1)?;
    let original_filenames: String = row.get(2)?;
    let form_fields: String = row.get(3)?;
    let submission_status: String = row.get(4)?;
    let analysis_status: String = row.get(5)?;
    let created_at: String = row.get(6)?;

    Ok(Submission {
        id: parse_uuid(0, &id)?,
        file_paths: parse_json(1, &file_paths)?,
        original_filenames: parse_json(2, &original_filenames)?,
        form_fields: parse_json(3, &form_fields)?,
        submission_status: SubmissionStatus::parse(&submission_status),
        analysis_status: AnalysisStatus::parse(&analysis_status),
        created_at: parse_time(6, &created_at)?,
    })
}

fn row_to_analysis(row: &rusqlite::Row) -> rusqlite::Result<AnalysisRecord> {
    let submission_id: String = row.get(1)?;
    let framework_matches: String = row.get(2)?;
    let detailed_feedback: String = row.get(6)?;
    let created_at: String = row.get(7)?;

    Ok(AnalysisRecord {
        id: row.get(0)?,
        submission_id: parse_uuid(1, &submission_id)?,
        framework_matches: parse_json(2, &framework_matches)?,
        overall_score: row.get(3)?,
        ai_analysis: row.get(4)?,
        recommendations: row.get(5)?,
        detailed_feedback: parse_json(6, &detailed_feedback)?,
        created_at: parse_time(7, &created_at)?,
    })
}
