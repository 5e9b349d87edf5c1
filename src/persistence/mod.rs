//! Persistence layer: PostgreSQL state snapshots.
//!
//! Optional durability aid behind `PERSISTENCE_ENABLED`: the registries
//! stay the store of record, snapshots let a restart pick up where the
//! previous process left off.

pub mod models;
pub mod postgres;
pub mod snapshotter;

pub use postgres::SnapshotStore;
