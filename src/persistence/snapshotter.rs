//! Periodic snapshot loop and startup restore.
//!
//! The in-memory registries remain the store of record; snapshots are a
//! durability aid across restarts. Every failure here is logged and
//! skipped: persistence trouble must never take the API down.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{EventRecord, EventRegistry, RegistrationLedger, RegistrationRecord};

use super::postgres::SnapshotStore;

/// Rehydrates the registries from the latest snapshots, typically at
/// startup. Rows that fail to decode are skipped with a warning.
pub async fn restore(
    store: &SnapshotStore,
    registry: &Arc<EventRegistry>,
    ledger: &Arc<RegistrationLedger>,
) {
    let snapshots = match store.load_latest_snapshots().await {
        Ok(snapshots) => snapshots,
        Err(err) => {
            tracing::warn!(error = %err, "snapshot restore skipped");
            return;
        }
    };

    let mut restored_events = 0usize;
    let mut restored_registrations = 0usize;
    for snapshot in snapshots {
        let event: EventRecord = match serde_json::from_value(snapshot.event_json) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(event_id = %snapshot.event_id, error = %err,
                    "undecodable event snapshot skipped");
                continue;
            }
        };
        if let Err(err) = registry.insert(event).await {
            tracing::warn!(event_id = %snapshot.event_id, error = %err,
                "event snapshot not restored");
            continue;
        }
        restored_events += 1;

        let registrations: Vec<RegistrationRecord> =
            match serde_json::from_value(snapshot.registrations_json) {
                Ok(registrations) => registrations,
                Err(err) => {
                    tracing::warn!(event_id = %snapshot.event_id, error = %err,
                        "undecodable registrations skipped");
                    continue;
                }
            };
        for registration in registrations {
            if ledger.insert(registration).await.is_ok() {
                restored_registrations += 1;
            }
        }
    }

    tracing::info!(
        events = restored_events,
        registrations = restored_registrations,
        "state restored from snapshots"
    );
}

/// Runs the snapshot loop forever: every `interval_secs` dump each
/// event with its registrations, then prune old rows.
pub async fn run_snapshot_loop(
    store: SnapshotStore,
    registry: Arc<EventRegistry>,
    ledger: Arc<RegistrationLedger>,
    interval_secs: u64,
    cleanup_after_days: u64,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    // The first tick fires immediately; skip it so startup restore and
    // the first snapshot don't race.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        snapshot_all(&store, &registry, &ledger).await;

        if cleanup_after_days > 0 {
            match store.delete_old_snapshots(cleanup_after_days).await {
                Ok(deleted) if deleted > 0 => {
                    tracing::debug!(deleted, "old snapshots pruned");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "snapshot cleanup failed"),
            }
        }
    }
}

async fn snapshot_all(
    store: &SnapshotStore,
    registry: &Arc<EventRegistry>,
    ledger: &Arc<RegistrationLedger>,
) {
    for event in registry.list().await {
        let registrations = ledger.list_for_event(event.id).await;
        let event_id = *event.id.as_uuid();

        let event_json = match serde_json::to_value(&event) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(%event_id, error = %err, "event not serializable; skipped");
                continue;
            }
        };
        let registrations_json = match serde_json::to_value(&registrations) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(%event_id, error = %err, "registrations not serializable; skipped");
                continue;
            }
        };

        if let Err(err) = store
            .save_snapshot(event_id, &event_json, &registrations_json)
            .await
        {
            tracing::warn!(%event_id, error = %err, "snapshot write failed");
        }
    }
}
