use axum::{
    Extension, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{task::Task, task_type::TaskType, worker::Worker};
use serde::Serialize;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, http::auth::AuthContext};

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub num_task_types: i64,
    pub num_workers: i64,
    pub num_tasks: i64,
    pub num_visits: u64,
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<ResponseJson<ApiResponse<DashboardStats>>, ApiError> {
    let conn = &state.db().conn;
    let num_task_types = TaskType::count(conn).await?;
    let num_workers = Worker::count(conn).await?;
    let num_tasks = Task::count(conn).await?;
    let num_visits = state
        .sessions()
        .record_visit(ctx.token)
        .await
        .unwrap_or_default();

    Ok(ResponseJson(ApiResponse::success(DashboardStats {
        num_task_types,
        num_workers,
        num_tasks,
        num_visits,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}
