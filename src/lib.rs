//! # convene
//!
//! REST API for event registration, capacity management, and payment
//! attachments. Organizers create events with finite capacity and
//! optional payment configuration, attendees register with free-form
//! answers and payment screenshots, and admins check attendees in,
//! broadcast email, and read aggregate statistics.
//!
//! The load-bearing piece is the consistency unit formed by an event's
//! capacity counter, its registrations, and the uploaded binaries:
//! registration reserves a capacity slot atomically, attachment
//! failures roll the reservation back, and attachment replacement never
//! leaves a record pointing at bytes that were not stored.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── Access Guard (auth/)
//!     │
//!     ├── EventService / RegistrationService (service/)
//!     ├── Notifier + Mailer (domain/, service/)
//!     │
//!     ├── EventRegistry / RegistrationLedger / UserDirectory (domain/)
//!     ├── BlobStore (blob/)
//!     │
//!     └── PostgreSQL snapshots (persistence/, optional)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod blob;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
