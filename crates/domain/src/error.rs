use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Authentication required")]
    AuthRequired,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("Unknown content type: {0}")]
    UnknownType(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl BlogError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::validation(field, "This field is required.")
    }
}

pub type BlogResult<T> = Result<T, BlogError>;
