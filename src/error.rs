use axum::http::StatusCode;
use tracing::{error, warn};

use crate::users::StoreError;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const ALREADY_EXISTS: &str = "Username or email already exists";
pub const TRY_AGAIN_LATER: &str = "Something went wrong. Please try again later.";

/// Problems with the uploaded profile image.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("invalid file type: {0}")]
    InvalidType(String),
    #[error("upload did not complete")]
    Transport,
}

/// Everything a page handler can fail with.
///
/// Only `public_messages` is ever shown to the client. `Display` and `Debug`
/// may carry store or filesystem detail and go to the log.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("username or email already exists")]
    Conflict,
    #[error("invalid credentials")]
    Authentication,
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation => AppError::Conflict,
            StoreError::Backend(e) => AppError::Internal(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Authentication => StatusCode::UNAUTHORIZED,
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_messages(&self) -> Vec<String> {
        match self {
            AppError::Validation(messages) => messages.clone(),
            AppError::Conflict => vec![ALREADY_EXISTS.to_string()],
            AppError::Authentication => vec![INVALID_CREDENTIALS.to_string()],
            AppError::Upload(UploadError::InvalidType(_)) => vec![
                "Invalid file type. Only JPEG, PNG, GIF and WEBP images are allowed.".to_string(),
            ],
            AppError::Upload(UploadError::Transport) => {
                vec!["The file upload did not complete. Please try again.".to_string()]
            }
            AppError::Internal(_) => vec![TRY_AGAIN_LATER.to_string()],
        }
    }

    /// Log at the handler boundary, full detail for internal errors only.
    pub fn log(&self, action: &str) {
        match self {
            AppError::Internal(e) => error!(action, error = ?e, "request failed"),
            other => warn!(action, error = %other, "request rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_their_cause() {
        let err = AppError::from(anyhow::anyhow!("connection refused: 10.0.0.5:5432"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let shown = err.public_messages().join(" ");
        assert!(!shown.contains("10.0.0.5"));
        assert_eq!(shown, TRY_AGAIN_LATER);
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let err = AppError::from(StoreError::UniqueViolation);
        assert!(matches!(err, AppError::Conflict));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.public_messages(), vec![ALREADY_EXISTS.to_string()]);
    }

    #[test]
    fn backend_store_error_becomes_internal() {
        let err = AppError::from(StoreError::Backend(anyhow::anyhow!("pool timed out")));
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn validation_keeps_every_message() {
        let err = AppError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.public_messages().len(), 2);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
