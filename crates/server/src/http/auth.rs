use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use db::models::worker::Worker;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::AppState;

/// The signed-in worker behind the current request, inserted as a request
/// extension by `require_session_auth`.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub token: Uuid,
    pub worker: Worker,
}

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn extract_request_token(req: &Request) -> Option<Uuid> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)?;
    Uuid::parse_str(value).ok()
}

fn unauthorized() -> Response {
    let response = ApiResponse::<()>::error("Unauthorized. Please sign in again.");
    (StatusCode::UNAUTHORIZED, Json(response)).into_response()
}

/// Every operation requires a signed-in worker; unauthenticated callers are
/// rejected before any handler runs.
pub async fn require_session_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_request_token(&req) else {
        tracing::warn!(
            path = %req.uri().path(),
            method = %req.method(),
            reason = "missing_token",
            "Unauthorized API request"
        );
        return unauthorized();
    };

    let Some(session) = state.sessions().get(token).await else {
        tracing::warn!(
            path = %req.uri().path(),
            method = %req.method(),
            reason = "unknown_token",
            "Unauthorized API request"
        );
        return unauthorized();
    };

    // The worker row may have been deleted since login; drop the session.
    let worker = match Worker::find_by_id(&state.db().conn, session.worker_id).await {
        Ok(Some(worker)) if worker.is_active => worker,
        Ok(_) => {
            state.sessions().revoke(token).await;
            return unauthorized();
        }
        Err(error) => {
            tracing::error!("Failed to load worker for session: {error}");
            let response = ApiResponse::<()>::error("Internal server error");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
    };

    req.extensions_mut().insert(AuthContext { token, worker });
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_parsing_is_case_insensitive_and_trimmed() {
        assert_eq!(parse_authorization_bearer("Bearer abc"), Some("abc"));
        assert_eq!(parse_authorization_bearer("bearer  abc "), Some("abc"));
        assert_eq!(parse_authorization_bearer("BEARER abc"), Some("abc"));
        assert_eq!(parse_authorization_bearer("Basic abc"), None);
        assert_eq!(parse_authorization_bearer("Bearer "), None);
        assert_eq!(parse_authorization_bearer("Bearer"), None);
    }
}
