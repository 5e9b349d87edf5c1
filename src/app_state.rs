//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::blob::BlobStore;
use crate::service::{AuthService, EventService, RegistrationService, StatsService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event CRUD, attachments, and broadcast.
    pub events: Arc<EventService>,
    /// Registration, check-in, and listings.
    pub registrations: Arc<RegistrationService>,
    /// Account creation and login.
    pub auth: Arc<AuthService>,
    /// Admin dashboard aggregates.
    pub stats: Arc<StatsService>,
    /// Direct blob access for the file-serving endpoint.
    pub blobs: Arc<BlobStore>,
    /// Token verification keys for the auth extractor.
    pub token_keys: Arc<TokenKeys>,
    /// Base URL for composing shareable event links.
    pub public_base_url: String,
}
