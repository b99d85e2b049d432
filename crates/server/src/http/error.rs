use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::BlogError;
use serde_json::json;

/// HTTP face of [`BlogError`].
#[derive(Debug)]
pub struct ApiError(pub BlogError);

impl From<BlogError> for ApiError {
    fn from(err: BlogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            BlogError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "field": field }),
            ),
            BlogError::UnknownType(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.0.to_string(), "field": "content_type" }),
            ),
            BlogError::AuthRequired => {
                (StatusCode::UNAUTHORIZED, json!({ "error": self.0.to_string() }))
            }
            BlogError::PermissionDenied => {
                (StatusCode::FORBIDDEN, json!({ "error": self.0.to_string() }))
            }
            BlogError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, json!({ "error": self.0.to_string() }))
            }
            BlogError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
