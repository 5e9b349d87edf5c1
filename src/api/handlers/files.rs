//! File-serving handler streaming stored blobs by id.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::app_state::AppState;
use crate::domain::BlobId;
use crate::error::{ApiError, ErrorResponse};

/// `GET /api/files/:id` — Serve a stored blob with its recorded
/// content type. No authentication: blob ids are unguessable.
///
/// # Errors
///
/// Returns [`ApiError::BlobNotFound`] for unknown ids and
/// [`ApiError::Storage`] before the store is initialized.
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "Files",
    summary = "Fetch a stored file",
    params(
        ("id" = uuid::Uuid, Path, description = "Blob UUID"),
    ),
    responses(
        (status = 200, description = "File bytes with original content type"),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Blob store not initialized", body = ErrorResponse),
    )
)]
pub async fn serve_file(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let blob = state.blobs.get(BlobId::from_uuid(id)).await?;
    Ok(([(header::CONTENT_TYPE, blob.content_type)], blob.bytes))
}

/// File routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/files/{id}", get(serve_file))
}
