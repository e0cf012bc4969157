use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::DbErr;
use services::services::ServiceError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::Service(err) => match err {
                ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
                ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden"),
                ServiceError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "InvalidArgument"),
                ServiceError::InvariantViolation(_) => {
                    (StatusCode::CONFLICT, "InvariantViolation")
                }
                ServiceError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
                ServiceError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
        };

        let error_message = match &self {
            ApiError::Service(ServiceError::Forbidden(_)) => {
                "You do not have permission to do that.".to_string()
            }
            ApiError::Service(ServiceError::Database(_)) | ApiError::Database(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg.clone(),
            _ => self.to_string(),
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
