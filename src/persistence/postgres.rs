//! PostgreSQL implementation of the snapshot store.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::EventSnapshot;
use crate::error::ApiError;

/// PostgreSQL-backed snapshot store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    pool: PgPool,
}

impl SnapshotStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Saves one event snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn save_snapshot(
        &self,
        event_id: Uuid,
        event_json: &serde_json::Value,
        registrations_json: &serde_json::Value,
    ) -> Result<i64, ApiError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO event_snapshots (event_id, event_json, registrations_json) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(event_id)
        .bind(event_json)
        .bind(registrations_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::Persistence(e.to_string()))?;

        Ok(row)
    }

    /// Loads the latest snapshot for each event using `DISTINCT ON`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn load_latest_snapshots(&self) -> Result<Vec<EventSnapshot>, ApiError> {
        let rows = sqlx::query_as::<
            _,
            (
                i64,
                Uuid,
                serde_json::Value,
                serde_json::Value,
                DateTime<Utc>,
            ),
        >(
            "SELECT DISTINCT ON (event_id) id, event_id, event_json, registrations_json, snapshot_at \
             FROM event_snapshots ORDER BY event_id, snapshot_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApiError::Persistence(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, event_id, event_json, registrations_json, snapshot_at)| EventSnapshot {
                    id,
                    event_id,
                    event_json,
                    registrations_json,
                    snapshot_at,
                },
            )
            .collect())
    }

    /// Deletes snapshots older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, ApiError> {
        let cutoff =
            Utc::now() - chrono::Duration::days(i64::try_from(before_days).unwrap_or(i64::MAX));

        let result = sqlx::query("DELETE FROM event_snapshots WHERE snapshot_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| ApiError::Persistence(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
