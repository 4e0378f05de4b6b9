use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::task_type::{CreateTaskType, TaskType, UpdateTaskType};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_task_type_middleware};

pub async fn list_task_types(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<TaskType>>>, ApiError> {
    let task_types = TaskType::find_all(&state.db().conn).await?;
    Ok(ResponseJson(ApiResponse::success(task_types)))
}

pub async fn create_task_type(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskType>,
) -> Result<ResponseJson<ApiResponse<TaskType>>, ApiError> {
    let task_type = TaskType::create(&state.db().conn, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(task_type)))
}

pub async fn get_task_type(
    Extension(task_type): Extension<TaskType>,
) -> Result<ResponseJson<ApiResponse<TaskType>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(task_type)))
}

pub async fn update_task_type(
    State(state): State<AppState>,
    Extension(task_type): Extension<TaskType>,
    Json(payload): Json<UpdateTaskType>,
) -> Result<ResponseJson<ApiResponse<TaskType>>, ApiError> {
    let updated = TaskType::update(&state.db().conn, task_type.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_task_type(
    State(state): State<AppState>,
    Extension(task_type): Extension<TaskType>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    TaskType::delete(&state.db().conn, task_type.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let id_router = Router::new()
        .route(
            "/",
            get(get_task_type)
                .put(update_task_type)
                .delete(delete_task_type),
        )
        .layer(from_fn_with_state(state.clone(), load_task_type_middleware));

    Router::new().nest(
        "/task-types",
        Router::new()
            .route("/", get(list_task_types).post(create_task_type))
            .nest("/{id}", id_router),
    )
}
