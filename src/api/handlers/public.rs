//! Public handlers: unauthenticated share-token event reads.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::EventResponse;
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `GET /api/public/events/:share_id` — Read one event by its share
/// token. No authentication.
///
/// # Errors
///
/// Returns [`ApiError::ShareNotFound`] for an unknown token.
#[utoipa::path(
    get,
    path = "/api/public/events/{share_id}",
    tag = "Public",
    summary = "Read an event by share token",
    params(
        ("share_id" = String, Path, description = "Unguessable share token"),
    ),
    responses(
        (status = 200, description = "Event details", body = serde_json::Value),
        (status = 404, description = "Unknown share token", body = ErrorResponse),
    )
)]
pub async fn event_by_share_id(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.events.get_event_by_share_id(&share_id).await?;
    Ok(Json(EventResponse::new(record, &state.public_base_url)))
}

/// Public routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/public/events/{share_id}", get(event_by_share_id))
}
