//! Registration handlers: signup, listing, answer updates, check-in.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{post, put};
use axum::{Json, Router};

use crate::api::dto::{UpdateRegistrationRequest, UserRegistrationResponse};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{EventId, RegistrationId};
use crate::error::{ApiError, ErrorResponse};

use super::upload::{parse_data, split_upload};

/// `POST /api/registrations` — Register the caller for an event.
///
/// Multipart: a `data` part with the free-form answers JSON (must
/// include `event_id`) plus an optional `payment_screenshot` image.
///
/// # Errors
///
/// Returns [`ApiError::Capacity`] when the event is full and
/// [`ApiError::Storage`] when the screenshot cannot be stored (no
/// registration is created in either case).
#[utoipa::path(
    post,
    path = "/api/registrations",
    tag = "Registrations",
    summary = "Register for an event",
    description = "Multipart body: `data` JSON (with `event_id`) plus optional `payment_screenshot` file. Capacity is enforced atomically.",
    responses(
        (status = 201, description = "Registration created", body = serde_json::Value),
        (status = 400, description = "Event full or bad input", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Screenshot storage failed", body = ErrorResponse),
    )
)]
pub async fn create_registration(
    State(state): State<AppState>,
    caller: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (data, screenshot) = split_upload(multipart, "payment_screenshot").await?;
    let registration_data: serde_json::Value = parse_data(data, "registration")?;

    let event_id = registration_data
        .get("event_id")
        .and_then(|v| v.as_str())
        .and_then(|s| uuid::Uuid::parse_str(s).ok())
        .map(EventId::from_uuid)
        .ok_or_else(|| ApiError::Validation("event id is required".to_string()))?;

    let record = state
        .registrations
        .register(&caller, event_id, registration_data, screenshot)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/registrations` — The caller's registrations, each with
/// its parent event snapshot (or `null` if the event was deleted).
///
/// # Errors
///
/// Returns [`ApiError`] on auth failures.
#[utoipa::path(
    get,
    path = "/api/registrations",
    tag = "Registrations",
    summary = "List own registrations",
    responses(
        (status = 200, description = "Registrations with event snapshots", body = serde_json::Value),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_registrations(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let annotated = state.registrations.list_for_user(&caller).await;
    let response: Vec<UserRegistrationResponse> = annotated
        .into_iter()
        .map(|(registration, event)| UserRegistrationResponse {
            registration,
            event,
        })
        .collect();
    Ok(Json(response))
}

/// `PUT /api/registrations/:id` — Replace the caller's signup answers.
///
/// # Errors
///
/// Returns [`ApiError::RegistrationNotFound`] when the record is
/// absent or owned by someone else.
#[utoipa::path(
    put,
    path = "/api/registrations/{id}",
    tag = "Registrations",
    summary = "Update registration answers",
    params(
        ("id" = uuid::Uuid, Path, description = "Registration UUID"),
    ),
    responses(
        (status = 200, description = "Updated registration", body = serde_json::Value),
        (status = 404, description = "Registration not found", body = ErrorResponse),
    )
)]
pub async fn update_registration(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<uuid::Uuid>,
    Json(body): Json<UpdateRegistrationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .registrations
        .update_answers(
            &caller,
            RegistrationId::from_uuid(id),
            body.registration_data,
        )
        .await?;
    Ok(Json(record))
}

/// `POST /api/registrations/:id/check-in` — Check an attendee in
/// (admin only, idempotent).
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] for non-admins and
/// [`ApiError::RegistrationNotFound`] when absent.
#[utoipa::path(
    post,
    path = "/api/registrations/{id}/check-in",
    tag = "Registrations",
    summary = "Check an attendee in",
    description = "Admin only. Idempotent: a second call returns the record unchanged.",
    params(
        ("id" = uuid::Uuid, Path, description = "Registration UUID"),
    ),
    responses(
        (status = 200, description = "Registration after check-in", body = serde_json::Value),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Registration not found", body = ErrorResponse),
    )
)]
pub async fn check_in(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .registrations
        .check_in(&caller, RegistrationId::from_uuid(id))
        .await?;
    Ok(Json(record))
}

/// Registration routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/registrations",
            post(create_registration).get(list_registrations),
        )
        .route("/registrations/{id}", put(update_registration))
        .route("/registrations/{id}/check-in", post(check_in))
}
