use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{
    DbErr,
    models::{
        integrity::EntityKind, position::PositionError, tag::TagError, task::TaskError,
        task_type::TaskTypeError, worker::WorkerError,
    },
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    TaskType(#[from] TaskTypeError),
    #[error(transparent)]
    Position(#[from] PositionError),
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Worker(#[from] WorkerError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::TaskType(err) => match err {
                TaskTypeError::NotFound => (StatusCode::NOT_FOUND, "TaskTypeError"),
                TaskTypeError::InUse(_) => (StatusCode::CONFLICT, "TaskTypeError"),
                TaskTypeError::ValidationError(_) => (StatusCode::BAD_REQUEST, "TaskTypeError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "TaskTypeError"),
            },
            ApiError::Position(err) => match err {
                PositionError::NotFound => (StatusCode::NOT_FOUND, "PositionError"),
                PositionError::InUse(_) => (StatusCode::CONFLICT, "PositionError"),
                PositionError::ValidationError(_) => (StatusCode::BAD_REQUEST, "PositionError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "PositionError"),
            },
            ApiError::Tag(err) => match err {
                TagError::NotFound => (StatusCode::NOT_FOUND, "TagError"),
                TagError::InUse(_) => (StatusCode::CONFLICT, "TagError"),
                TagError::ValidationError(_) => (StatusCode::BAD_REQUEST, "TagError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "TagError"),
            },
            ApiError::Worker(err) => match err {
                WorkerError::NotFound => (StatusCode::NOT_FOUND, "WorkerError"),
                WorkerError::PositionNotFound => (StatusCode::BAD_REQUEST, "WorkerError"),
                WorkerError::ValidationError(_) => (StatusCode::BAD_REQUEST, "WorkerError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "WorkerError"),
            },
            ApiError::Task(err) => match err {
                TaskError::NotFound => (StatusCode::NOT_FOUND, "TaskError"),
                TaskError::TaskTypeNotFound
                | TaskError::WorkerNotFound
                | TaskError::TagNotFound
                | TaskError::ValidationError(_) => (StatusCode::BAD_REQUEST, "TaskError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "TaskError"),
            },
            ApiError::Database(db_err) => match db_err {
                DbErr::RecordNotFound(_) => (StatusCode::NOT_FOUND, "DatabaseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        };

        let error_message = match &self {
            ApiError::TaskType(TaskTypeError::InUse(_)) => {
                "Cannot delete task type because it is used by tasks.".to_string()
            }
            ApiError::Position(PositionError::InUse(_)) => {
                "Cannot delete position because it is assigned to workers.".to_string()
            }
            ApiError::Tag(TagError::InUse(_)) => {
                "Cannot delete tag because it is used in tasks.".to_string()
            }
            ApiError::TaskType(TaskTypeError::ValidationError(msg))
            | ApiError::Position(PositionError::ValidationError(msg))
            | ApiError::Tag(TagError::ValidationError(msg))
            | ApiError::Worker(WorkerError::ValidationError(msg))
            | ApiError::Task(TaskError::ValidationError(msg)) => msg.clone(),
            ApiError::Unauthorized => "Unauthorized. Please sign in again.".to_string(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Internal(msg) => msg.clone(),
            _ => format!("{}: {}", error_type, self),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}

// Referenced-delete errors carry the entity kind for callers that want to
// branch on it; keep that reachable from the top-level error too.
impl ApiError {
    pub fn referenced_entity_kind(&self) -> Option<EntityKind> {
        match self {
            ApiError::TaskType(TaskTypeError::InUse(err)) => Some(err.kind),
            ApiError::Position(PositionError::InUse(err)) => Some(err.kind),
            ApiError::Tag(TagError::InUse(err)) => Some(err.kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use db::models::integrity::ReferencedEntityError;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn api_error_maps_to_expected_http_statuses() {
        assert_eq!(
            ApiError::BadRequest("bad".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("missing".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("boom".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_errors_map_to_expected_http_statuses() {
        assert_eq!(
            ApiError::from(TaskTypeError::NotFound)
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(WorkerError::ValidationError("bad".to_string()))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(TaskError::TaskTypeNotFound)
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn referenced_delete_is_a_conflict() {
        let err = ApiError::from(TagError::InUse(ReferencedEntityError {
            kind: EntityKind::Tag,
            id: Uuid::new_v4(),
            dependents: 3,
        }));
        assert_eq!(err.referenced_entity_kind(), Some(EntityKind::Tag));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
