use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{
    task::{
        AssignmentChange, CreateTask, Task, TaskListQuery, TaskPage, TaskWithDetails, UpdateTask,
    },
    worker::Worker,
};
use serde::Serialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState, error::ApiError, http::auth::AuthContext, middleware::load_task_middleware,
};

#[derive(Debug, Serialize)]
pub struct ToggleAssignmentResponse {
    pub change: AssignmentChange,
    pub assignees: Vec<Worker>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Result<ResponseJson<ApiResponse<TaskPage>>, ApiError> {
    let page = Task::find_page(&state.db().conn, &query).await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = Task::create(&state.db().conn, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(task): Extension<Task>,
) -> Result<ResponseJson<ApiResponse<TaskWithDetails>>, ApiError> {
    let details = Task::find_with_details(&state.db().conn, task.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(details)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(task): Extension<Task>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let updated = Task::update(&state.db().conn, task.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(task): Extension<Task>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Task::delete(&state.db().conn, task.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Flip the calling worker's membership in the task's assignee set.
pub async fn toggle_assignment(
    State(state): State<AppState>,
    Extension(task): Extension<Task>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<ResponseJson<ApiResponse<ToggleAssignmentResponse>>, ApiError> {
    let conn = &state.db().conn;
    let change = Task::toggle_assignment(conn, task.id, ctx.worker.id).await?;
    let assignees = Task::assignees(conn, task.id).await?;

    let message = match change {
        AssignmentChange::Joined => "You have joined this task",
        AssignmentChange::Left => "You have left this task",
    };
    Ok(ResponseJson(ApiResponse::success_with_message(
        ToggleAssignmentResponse { change, assignees },
        message,
    )))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let id_router = Router::new()
        .route("/", get(get_task).put(update_task).delete(delete_task))
        .route("/toggle-assignment", post(toggle_assignment))
        .layer(from_fn_with_state(state.clone(), load_task_middleware));

    Router::new().nest(
        "/tasks",
        Router::new()
            .route("/", get(list_tasks).post(create_task))
            .nest("/{id}", id_router),
    )
}
