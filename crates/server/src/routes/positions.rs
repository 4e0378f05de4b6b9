use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::position::{CreatePosition, Position, UpdatePosition};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_position_middleware};

pub async fn list_positions(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Position>>>, ApiError> {
    let positions = Position::find_all(&state.db().conn).await?;
    Ok(ResponseJson(ApiResponse::success(positions)))
}

pub async fn create_position(
    State(state): State<AppState>,
    Json(payload): Json<CreatePosition>,
) -> Result<ResponseJson<ApiResponse<Position>>, ApiError> {
    let position = Position::create(&state.db().conn, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(position)))
}

pub async fn get_position(
    Extension(position): Extension<Position>,
) -> Result<ResponseJson<ApiResponse<Position>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(position)))
}

pub async fn update_position(
    State(state): State<AppState>,
    Extension(position): Extension<Position>,
    Json(payload): Json<UpdatePosition>,
) -> Result<ResponseJson<ApiResponse<Position>>, ApiError> {
    let updated = Position::update(&state.db().conn, position.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_position(
    State(state): State<AppState>,
    Extension(position): Extension<Position>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Position::delete(&state.db().conn, position.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let id_router = Router::new()
        .route(
            "/",
            get(get_position)
                .put(update_position)
                .delete(delete_position),
        )
        .layer(from_fn_with_state(state.clone(), load_position_middleware));

    Router::new().nest(
        "/positions",
        Router::new()
            .route("/", get(list_positions).post(create_position))
            .nest("/{id}", id_router),
    )
}
