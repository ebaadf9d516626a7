use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use giftdesk_core::{AuthError, MediaError, RepoError, ServiceError};
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "invalid_argument",
            AppError::PermissionDenied(_) => "permission_denied",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "already_exists",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("event=request_failed module=server status=error code={} error={self}", self.code());
        } else {
            warn!("event=request_rejected module=server status=error code={} error={self}", self.code());
        }

        (status, Json(json!({ "error": self.to_string(), "code": self.code() }))).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(_) | ServiceError::MissingReference { .. } => {
                AppError::BadRequest(value.to_string())
            }
            ServiceError::Media(err) => err.into(),
            ServiceError::NotFound { .. } => AppError::NotFound(value.to_string()),
            ServiceError::Duplicate(_) => AppError::Conflict(value.to_string()),
            ServiceError::Repo(err) => err.into(),
            ServiceError::InconsistentState(_) => AppError::Internal(value.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(_) => AppError::BadRequest(value.to_string()),
            RepoError::NotFound(_) => AppError::NotFound(value.to_string()),
            RepoError::Duplicate(_) => AppError::Conflict(value.to_string()),
            RepoError::Db(_) | RepoError::InvalidData(_) => AppError::Internal(value.to_string()),
        }
    }
}

impl From<MediaError> for AppError {
    fn from(value: MediaError) -> Self {
        if value.is_client_error() {
            AppError::BadRequest(value.to_string())
        } else if matches!(value, MediaError::NotFound(_)) {
            AppError::NotFound(value.to_string())
        } else {
            AppError::Internal(value.to_string())
        }
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Repo(err) => err.into(),
            other => AppError::PermissionDenied(other.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(value: MultipartError) -> Self {
        AppError::BadRequest(format!("Malformed multipart payload: {}", value.body_text()))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(value: MultipartRejection) -> Self {
        AppError::BadRequest(format!("Expected a multipart form: {}", value.body_text()))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(value: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use axum::http::StatusCode;
    use giftdesk_core::model::ValidationError;
    use giftdesk_core::{AuthError, ServiceError};

    #[test]
    fn auth_failures_are_permission_denied() {
        let err: AppError = AuthError::MissingToken.into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.code(), "permission_denied");
    }

    #[test]
    fn service_errors_map_to_status_table() {
        let validation: AppError =
            ServiceError::Validation(ValidationError::BlankField("name")).into();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let duplicate: AppError = ServiceError::Duplicate("a@b.co".to_string()).into();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let broken: AppError = ServiceError::InconsistentState("read-back").into();
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
