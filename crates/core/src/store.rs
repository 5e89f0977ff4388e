//! Durable storage for completed interview sessions.
//!
//! SQLite through rusqlite with r2d2 connection pooling. Two tables: one row
//! per completed session, one row per question keyed back to its session.
//! Evaluation list fields are JSON-encoded text columns.

use crate::model::{Evaluation, QuestionAnswer, SessionConfig, SessionRecord};
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("interview {0} not found")]
    NotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        StoreError::Pool(e.to_string())
    }
}

/// Store contract required by the orchestrator.
///
/// `fetch_all` returns a finite listing ordered by timestamp descending and
/// may be re-queried at any time.
#[cfg_attr(test, automock)]
pub trait InterviewStore {
    fn save(
        &self,
        config: &SessionConfig,
        transcript: &[QuestionAnswer],
        evaluation: &Evaluation,
    ) -> Result<i64, StoreError>;

    fn fetch_all(&self) -> Result<Vec<SessionRecord>, StoreError>;

    fn fetch_one(&self, id: i64) -> Result<SessionRecord, StoreError>;
}

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(path.as_ref());
        let pool = Pool::builder().max_size(4).build(manager)?;
        let store = Self { pool };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory database with the production schema, for tests.
    pub fn in_memory() -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::memory();
        // A single connection: each in-memory connection is its own database.
        let pool = Pool::builder().max_size(1).build(manager)?;
        let store = Self { pool };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS interview_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                profession TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                language TEXT NOT NULL,
                overall_score INTEGER NOT NULL,
                strengths TEXT NOT NULL,
                weaknesses TEXT NOT NULL,
                recommendations TEXT NOT NULL,
                detailed_feedback TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS interview_questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                interview_id INTEGER NOT NULL
                    REFERENCES interview_records(id) ON DELETE CASCADE,
                question_number INTEGER NOT NULL,
                question TEXT NOT NULL,
                answer TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_interview_questions_interview
                ON interview_questions(interview_id)",
            [],
        )?;
        Ok(())
    }

    fn questions_for(
        conn: &rusqlite::Connection,
        interview_id: i64,
    ) -> Result<Vec<QuestionAnswer>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT question, answer FROM interview_questions
             WHERE interview_id = ?1 ORDER BY question_number ASC",
        )?;
        let rows = stmt.query_map(params![interview_id], |row| {
            Ok(QuestionAnswer {
                question: row.get(0)?,
                answer: row.get(1)?,
            })
        })?;
        let mut questions = Vec::new();
        for row in rows {
            questions.push(row?);
        }
        Ok(questions)
    }

    fn record_from_row(row: &rusqlite::Row<'_>) -> Result<SessionRecord, StoreError> {
        let id: i64 = row.get(0).map_err(StoreError::Database)?;
        let date: String = row.get(1).map_err(StoreError::Database)?;
        let profession: String = row.get(2).map_err(StoreError::Database)?;
        let difficulty: String = row.get(3).map_err(StoreError::Database)?;
        let language: String = row.get(4).map_err(StoreError::Database)?;
        let overall_score: i64 = row.get(5).map_err(StoreError::Database)?;
        let strengths: String = row.get(6).map_err(StoreError::Database)?;
        let weaknesses: String = row.get(7).map_err(StoreError::Database)?;
        let recommendations: String = row.get(8).map_err(StoreError::Database)?;
        let detailed_feedback: String = row.get(9).map_err(StoreError::Database)?;

        let timestamp = DateTime::parse_from_rfc3339(&date)
            .map_err(|e| StoreError::Corrupt(format!("record {id}: bad timestamp: {e}")))?
            .with_timezone(&Utc);
        let difficulty = difficulty
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("record {id}: {e}")))?;
        let language = language
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("record {id}: {e}")))?;
        let decode_list = |field: &str, value: &str| -> Result<Vec<String>, StoreError> {
            serde_json::from_str(value)
                .map_err(|e| StoreError::Corrupt(format!("record {id}: bad {field}: {e}")))
        };

        Ok(SessionRecord {
            id,
            timestamp,
            profession,
            difficulty,
            language,
            evaluation: Evaluation {
                overall_score: overall_score.clamp(0, 100) as u8,
                strengths: decode_list("strengths", &strengths)?,
                weaknesses: decode_list("weaknesses", &weaknesses)?,
                recommendations: decode_list("recommendations", &recommendations)?,
                detailed_feedback,
            },
            questions: Vec::new(),
        })
    }
}

const SELECT_RECORD: &str = "SELECT id, date, profession, difficulty, language, overall_score,
            strengths, weaknesses, recommendations, detailed_feedback
     FROM interview_records";

impl InterviewStore for SqliteStore {
    fn save(
        &self,
        config: &SessionConfig,
        transcript: &[QuestionAnswer],
        evaluation: &Evaluation,
    ) -> Result<i64, StoreError> {
        let encode = |list: &[String]| -> Result<String, StoreError> {
            serde_json::to_string(list)
                .map_err(|e| StoreError::Corrupt(format!("encoding list: {e}")))
        };

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO interview_records
                (date, profession, difficulty, language, overall_score,
                 strengths, weaknesses, recommendations, detailed_feedback)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                Utc::now().to_rfc3339(),
                config.profession,
                config.difficulty.label(),
                config.language.label(),
                evaluation.overall_score,
                encode(&evaluation.strengths)?,
                encode(&evaluation.weaknesses)?,
                encode(&evaluation.recommendations)?,
                evaluation.detailed_feedback,
            ],
        )?;
        let interview_id = tx.last_insert_rowid();

        for (index, qa) in transcript.iter().enumerate() {
            tx.execute(
                "INSERT INTO interview_questions
                    (interview_id, question_number, question, answer)
                 VALUES (?1, ?2, ?3, ?4)",
                params![interview_id, (index + 1) as i64, qa.question, qa.answer],
            )?;
        }
        tx.commit()?;

        tracing::debug!(interview_id, questions = transcript.len(), "session saved");
        Ok(interview_id)
    }

    fn fetch_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("{SELECT_RECORD} ORDER BY date DESC, id DESC"))?;
        let rows = stmt.query_map([], |row| {
            // Defer typed decoding so corruption maps to StoreError, not a
            // rusqlite conversion error.
            Ok(Self::record_from_row(row))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let mut record = row??;
            record.questions = Self::questions_for(&conn, record.id)?;
            records.push(record);
        }
        Ok(records)
    }

    fn fetch_one(&self, id: i64) -> Result<SessionRecord, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("{SELECT_RECORD} WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], |row| Ok(Self::record_from_row(row)))?;
        let record = match rows.next() {
            Some(row) => row??,
            None => return Err(StoreError::NotFound(id)),
        };
        let mut record = record;
        record.questions = Self::questions_for(&conn, record.id)?;
        Ok(record)
    }
}
