//! Database models for state snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event snapshot row from the `event_snapshots` table.
///
/// Each row captures one event and all of its registrations as JSONB,
/// so restoring a row rebuilds the event together with the
/// registrations that back its attendee counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Event that was snapshotted.
    pub event_id: Uuid,
    /// Full event record as JSONB.
    pub event_json: serde_json::Value,
    /// Registrations for the event as a JSONB array.
    pub registrations_json: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}
