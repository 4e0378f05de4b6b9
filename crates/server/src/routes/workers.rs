use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::worker::{
    CreateWorker, UpdateWorker, Worker, WorkerWithDetails, WorkerWithTaskCount,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_worker_middleware};

pub async fn list_workers(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<WorkerWithTaskCount>>>, ApiError> {
    let workers = Worker::find_all_with_task_counts(&state.db().conn).await?;
    Ok(ResponseJson(ApiResponse::success(workers)))
}

pub async fn create_worker(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorker>,
) -> Result<ResponseJson<ApiResponse<Worker>>, ApiError> {
    let worker = Worker::create(&state.db().conn, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(worker)))
}

pub async fn get_worker(
    State(state): State<AppState>,
    Extension(worker): Extension<Worker>,
) -> Result<ResponseJson<ApiResponse<WorkerWithDetails>>, ApiError> {
    let details = Worker::find_with_details(&state.db().conn, worker.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Worker not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(details)))
}

pub async fn update_worker(
    State(state): State<AppState>,
    Extension(worker): Extension<Worker>,
    Json(payload): Json<UpdateWorker>,
) -> Result<ResponseJson<ApiResponse<Worker>>, ApiError> {
    let updated = Worker::update(&state.db().conn, worker.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

/// Removing a worker also drops their live sessions.
pub async fn delete_worker(
    State(state): State<AppState>,
    Extension(worker): Extension<Worker>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Worker::delete(&state.db().conn, worker.id).await?;
    state.sessions().revoke_for_worker(worker.id).await;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let id_router = Router::new()
        .route(
            "/",
            get(get_worker).put(update_worker).delete(delete_worker),
        )
        .layer(from_fn_with_state(state.clone(), load_worker_middleware));

    Router::new().nest(
        "/workers",
        Router::new()
            .route("/", get(list_workers).post(create_worker))
            .nest("/{id}", id_router),
    )
}
