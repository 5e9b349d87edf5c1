//! Event handlers: CRUD, attendee listing, and broadcast.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AttendeeResponse, EventResponse, MessageResponse, SearchParams};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::EventId;
use crate::domain::event::{CreateEventInput, UpdateEventInput};
use crate::error::{ApiError, ErrorResponse};
use crate::service::event_service::BroadcastInput;

use super::upload::{parse_data, split_upload};

/// `GET /api/events` — List events scoped by caller role.
///
/// # Errors
///
/// Returns [`ApiError`] on auth failures.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    summary = "List events",
    description = "Admins see only events they created; attendees see only future-dated events. `q` filters by title/description substring.",
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive search term"),
    ),
    responses(
        (status = 200, description = "Event list", body = serde_json::Value),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state
        .events
        .list_events(&caller, params.q.as_deref())
        .await;
    let response: Vec<EventResponse> = records
        .into_iter()
        .map(|record| EventResponse::new(record, &state.public_base_url))
        .collect();
    Ok(Json(response))
}

/// `POST /api/events` — Create an event (admin only).
///
/// Multipart: a `data` part with the event JSON plus an optional
/// `qr_code` image part.
///
/// # Errors
///
/// Returns [`ApiError`] on validation, authorization, or storage
/// failures.
#[utoipa::path(
    post,
    path = "/api/events",
    tag = "Events",
    summary = "Create an event",
    description = "Admin only. Multipart body: `data` JSON plus optional `qr_code` file. A storage failure aborts creation.",
    responses(
        (status = 201, description = "Event created", body = serde_json::Value),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    caller: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (data, qr_file) = split_upload(multipart, "qr_code").await?;
    let input: CreateEventInput = parse_data(data, "event")?;

    let record = state.events.create_event(&caller, input, qr_file).await?;
    let response = EventResponse::new(record, &state.public_base_url);
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /api/events/:id` — Fetch one event (admin or owner).
///
/// # Errors
///
/// Returns [`ApiError::EventNotFound`] or [`ApiError::Forbidden`].
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    tag = "Events",
    summary = "Get event details",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = serde_json::Value),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .events
        .get_event(&caller, EventId::from_uuid(id))
        .await?;
    Ok(Json(EventResponse::new(record, &state.public_base_url)))
}

/// `PUT /api/events/:id` — Update an event (owning admin only).
///
/// Same multipart contract as create. A new `qr_code` replaces the
/// stored one: old blob deleted best-effort, id swapped only after the
/// new blob is stored.
///
/// # Errors
///
/// Returns [`ApiError`] on validation, authorization, or storage
/// failures.
#[utoipa::path(
    put,
    path = "/api/events/{id}",
    tag = "Events",
    summary = "Update an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Updated event", body = serde_json::Value),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Not the owning admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<uuid::Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (data, qr_file) = split_upload(multipart, "qr_code").await?;
    let input: UpdateEventInput = parse_data(data, "event")?;

    let record = state
        .events
        .update_event(&caller, EventId::from_uuid(id), input, qr_file)
        .await?;
    Ok(Json(EventResponse::new(record, &state.public_base_url)))
}

/// `DELETE /api/events/:id` — Delete an event (owning admin only).
///
/// # Errors
///
/// Returns [`ApiError::EventNotFound`] or [`ApiError::Forbidden`].
#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    description = "Deletes the event and, best-effort, its QR blob. Registrations are not cascaded.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event deleted", body = serde_json::Value),
        (status = 403, description = "Not the owning admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .events
        .delete_event(&caller, EventId::from_uuid(id))
        .await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

/// `GET /api/events/:id/registrations` — Attendee list (admin/owner).
///
/// # Errors
///
/// Returns [`ApiError::EventNotFound`] or [`ApiError::Forbidden`].
#[utoipa::path(
    get,
    path = "/api/events/{id}/registrations",
    tag = "Events",
    summary = "List an event's registrations",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Registrations with contact details", body = serde_json::Value),
        (status = 403, description = "Not authorized for this event", body = ErrorResponse),
    )
)]
pub async fn event_registrations(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let attendees = state
        .registrations
        .list_for_event(&caller, EventId::from_uuid(id))
        .await?;
    let response: Vec<AttendeeResponse> =
        attendees.into_iter().map(AttendeeResponse::from).collect();
    Ok(Json(response))
}

/// `POST /api/events/:id/broadcast` — Queue a broadcast email to every
/// registrant (admin/owner). Delivery is fire-and-forget.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] on empty subject/message or zero
/// recipients.
#[utoipa::path(
    post,
    path = "/api/events/{id}/broadcast",
    tag = "Events",
    summary = "Broadcast email to registrants",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Broadcast queued", body = serde_json::Value),
        (status = 400, description = "No recipients or bad input", body = ErrorResponse),
    )
)]
pub async fn broadcast_email(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<uuid::Uuid>,
    Json(input): Json<BroadcastInput>,
) -> Result<impl IntoResponse, ApiError> {
    let recipients = state
        .events
        .broadcast(&caller, EventId::from_uuid(id), input)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "Broadcast email sent to {recipients} recipients"
    ))))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/{id}/registrations", get(event_registrations))
        .route("/events/{id}/broadcast", post(broadcast_email))
}
