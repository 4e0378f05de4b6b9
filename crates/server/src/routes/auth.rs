use axum::{
    Extension, Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::post,
};
use db::models::worker::Worker;
use serde::{Deserialize, Serialize};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, http::auth::AuthContext};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub worker: Worker,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, ApiError> {
    let worker = Worker::authenticate(&state.db().conn, &payload.username, &payload.password)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let session = state.sessions().create(worker.id).await;
    tracing::debug!("worker '{}' signed in", worker.username);

    Ok(ResponseJson(ApiResponse::success(LoginResponse {
        token: session.token,
        worker,
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.sessions().revoke(ctx.token).await;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Routes reachable without a session.
pub fn router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Routes that live behind the session middleware.
pub fn authed_router() -> Router<AppState> {
    Router::new().route("/auth/logout", post(logout))
}
