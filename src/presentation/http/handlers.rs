//! HTTP Handlers
//!
//! Health probe and the language-preference endpoints. Preference writes go
//! through the service so the change notification fires.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::shared::auth::{AuthenticatedUser, TokenVerifier};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Basic health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub active_connections: usize,
}

/// Basic health check
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_connections: state.gateway.session_count(),
    })
}

/// Set-language request body
#[derive(Debug, Deserialize)]
pub struct SetLanguageRequest {
    pub chat_room: i64,
    pub language: String,
}

/// Language preference response
#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub chat_room: i64,
    pub language: String,
}

/// Get-language query parameters
#[derive(Debug, Deserialize)]
pub struct GetLanguageQuery {
    pub chat_room: i64,
}

/// `POST /api/chat/set-language`
pub async fn set_language(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SetLanguageRequest>,
) -> Result<Json<LanguageResponse>, AppError> {
    let user = authenticate(&state, &headers)?;

    state
        .preferences
        .set(user.id, request.chat_room, &request.language)
        .await?;

    Ok(Json(LanguageResponse {
        chat_room: request.chat_room,
        language: request.language,
    }))
}

/// `GET /api/chat/get-language?chat_room={id}`
pub async fn get_language(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GetLanguageQuery>,
) -> Result<Json<LanguageResponse>, AppError> {
    let user = authenticate(&state, &headers)?;

    let language = state.preferences.get(user.id, query.chat_room).await;

    Ok(Json(LanguageResponse {
        chat_room: query.chat_room,
        language,
    }))
}

/// Resolve the caller from the `Authorization: Bearer <token>` header.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedUser, AppError> {
    let token = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".into()))?;

    state.verifier.verify(token)
}
