//! Mapping of errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lifeline_common::LifelineError;
use serde_json::json;

/// Result type of API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An error returned from a handler.
#[derive(Debug)]
pub enum ApiError {
    /// A domain error; the status follows from its kind.
    Lifeline(LifelineError),
    /// The request was malformed.
    BadRequest(String),
}

impl ApiError {
    /// Status code this error is reported with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Lifeline(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Lifeline(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Lifeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<LifelineError> for ApiError {
    fn from(err: LifelineError) -> Self {
        Self::Lifeline(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Lifeline(e) => {
                if status.is_server_error() {
                    tracing::error!(error = %e, "Request failed");
                }
                e.to_string()
            }
            Self::BadRequest(message) => message,
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let not_found = ApiError::from(LifelineError::ChannelNotFound { id: "x".into() });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(LifelineError::InvalidContainerId { id: "/".into() });
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let storage = ApiError::from(LifelineError::storage("disk full"));
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            ApiError::BadRequest("missing".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
