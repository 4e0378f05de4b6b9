use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::tag::{CreateTag, Tag, UpdateTag};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_tag_middleware};

pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Tag>>>, ApiError> {
    let tags = Tag::find_all(&state.db().conn).await?;
    Ok(ResponseJson(ApiResponse::success(tags)))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Json(payload): Json<CreateTag>,
) -> Result<ResponseJson<ApiResponse<Tag>>, ApiError> {
    let tag = Tag::create(&state.db().conn, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(tag)))
}

pub async fn get_tag(
    Extension(tag): Extension<Tag>,
) -> Result<ResponseJson<ApiResponse<Tag>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(tag)))
}

pub async fn update_tag(
    State(state): State<AppState>,
    Extension(tag): Extension<Tag>,
    Json(payload): Json<UpdateTag>,
) -> Result<ResponseJson<ApiResponse<Tag>>, ApiError> {
    let updated = Tag::update(&state.db().conn, tag.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(tag): Extension<Tag>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Tag::delete(&state.db().conn, tag.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let id_router = Router::new()
        .route("/", get(get_tag).put(update_tag).delete(delete_tag))
        .layer(from_fn_with_state(state.clone(), load_tag_middleware));

    Router::new().nest(
        "/tags",
        Router::new()
            .route("/", get(list_tags).post(create_tag))
            .nest("/{id}", id_router),
    )
}
