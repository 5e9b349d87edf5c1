//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod auth;
pub mod events;
pub mod files;
pub mod public;
pub mod registrations;
pub mod system;
pub(crate) mod upload;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(events::routes())
        .merge(registrations::routes())
        .merge(auth::routes())
        .merge(public::routes())
        .merge(files::routes())
        .merge(admin::routes())
}
