//! Auth handlers: sign-up, login, profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AuthResponse, UserProfile};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, ErrorResponse};
use crate::service::auth_service::{LoginInput, SignupInput};

/// `POST /api/auth/register` — Create an account and issue a token.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] on empty fields and
/// [`ApiError::Conflict`] when the email is taken.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    summary = "Create an account",
    responses(
        (status = 201, description = "Account created", body = serde_json::Value),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.auth.register(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: outcome.token,
            user: UserProfile::from(outcome.user),
        }),
    ))
}

/// `POST /api/auth/login` — Verify credentials and issue a token.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] on any credential mismatch.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    summary = "Log in",
    responses(
        (status = 200, description = "Token issued", body = serde_json::Value),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.auth.login(input).await?;
    Ok(Json(AuthResponse {
        token: outcome.token,
        user: UserProfile::from(outcome.user),
    }))
}

/// `GET /api/auth/me` — The caller's profile.
///
/// # Errors
///
/// Returns [`ApiError::UserNotFound`] when the account behind a still-
/// valid token no longer exists.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    summary = "Current profile",
    responses(
        (status = 200, description = "Account profile", body = serde_json::Value),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.auth.profile(caller.user_id).await?;
    Ok(Json(UserProfile::from(record)))
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}
