use axum::{Router, middleware::from_fn_with_state, routing::get};

use crate::{AppState, routes};

pub mod auth;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::dashboard::router())
        .merge(routes::task_types::router(&state))
        .merge(routes::positions::router(&state))
        .merge(routes::tags::router(&state))
        .merge(routes::workers::router(&state))
        .merge(routes::tasks::router(&state))
        .merge(routes::auth::authed_router())
        .layer(from_fn_with_state(
            state.clone(),
            auth::require_session_auth,
        ))
        .merge(routes::auth::router());

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use db::{
        DBService,
        models::worker::{CreateWorker, Worker},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;

    async fn setup_state() -> AppState {
        let db = DBService::new("sqlite::memory:").await.unwrap();
        AppState::new(db)
    }

    async fn create_alice(state: &AppState) {
        Worker::create(
            &state.db().conn,
            &CreateWorker {
                username: "alice".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Reed".to_string(),
                email: "alice@example.com".to_string(),
                password: "correct-horse".to_string(),
                position_id: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_open_but_api_requires_a_session() {
        let state = setup_state().await;
        let app = router(state);

        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/api/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_issues_a_token_that_opens_the_api() {
        let state = setup_state().await;
        create_alice(&state).await;
        let app = router(state);

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"username": "alice", "password": "correct-horse"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::get("/api/dashboard")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["num_workers"], 1);
        assert_eq!(body["data"]["num_visits"], 1);
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let state = setup_state().await;
        create_alice(&state).await;
        let app = router(state);

        let response = app
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"username": "alice", "password": "wrong"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
