//! Persistence of finished analyses.
//!
//! The pipeline only depends on the `AnalysisStore` trait; the SQLite
//! implementation backs the HTTP service's per-user history.

use std::str::FromStr;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::{HealthAnalysisRecord, InputKind};

/// Generic "save record" collaborator.
pub trait AnalysisStore {
    fn save(
        &self,
        user_id: &str,
        input_kind: InputKind,
        analysis: &str,
        recommendation: &str,
    ) -> Result<HealthAnalysisRecord, DatabaseError>;

    /// Saved analyses for one user, newest first.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<HealthAnalysisRecord>, DatabaseError>;
}

/// SQLite-backed store. The connection is serialized behind a mutex so the
/// store can be shared across request handlers.
pub struct SqliteAnalysisStore {
    conn: Mutex<Connection>,
}

impl SqliteAnalysisStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let guard = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&guard)
    }
}

impl AnalysisStore for SqliteAnalysisStore {
    fn save(
        &self,
        user_id: &str,
        input_kind: InputKind,
        analysis: &str,
        recommendation: &str,
    ) -> Result<HealthAnalysisRecord, DatabaseError> {
        let record = HealthAnalysisRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            input_kind,
            analysis: analysis.to_string(),
            recommendation: recommendation.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO health_analyses (id, user_id, input_type, analysis, recommendation, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id.to_string(),
                    record.user_id,
                    record.input_kind.as_str(),
                    record.analysis,
                    record.recommendation,
                    record.created_at,
                ],
            )?;
            Ok(())
        })?;

        tracing::debug!(record_id = %record.id, input_kind = %input_kind, "Analysis saved");
        Ok(record)
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<HealthAnalysisRecord>, DatabaseError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, input_type, analysis, recommendation, created_at
                 FROM health_analyses WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;

            let rows = stmt.query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?;

            let mut records = Vec::new();
            for row in rows {
                let (id, user_id, input_type, analysis, recommendation, created_at) = row?;
                let id = Uuid::parse_str(&id).map_err(|_| DatabaseError::InvalidEnum {
                    field: "id".into(),
                    value: id.clone(),
                })?;
                records.push(HealthAnalysisRecord {
                    id,
                    user_id,
                    input_kind: InputKind::from_str(&input_type)?,
                    analysis,
                    recommendation: recommendation.unwrap_or_default(),
                    created_at,
                });
            }
            Ok(records)
        })
    }
}
