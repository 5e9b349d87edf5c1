//! Admin handlers: aggregate statistics.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, ErrorResponse};

/// `GET /api/admin/stats` — Dashboard aggregates scoped to the
/// caller's events (admin only).
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] for non-admin callers.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Admin",
    summary = "Admin dashboard statistics",
    responses(
        (status = 200, description = "Aggregate report", body = serde_json::Value),
        (status = 403, description = "Admin access required", body = ErrorResponse),
    )
)]
pub async fn stats(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.stats.admin_stats(&caller).await?;
    Ok(Json(report))
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/stats", get(stats))
}
