//! REST error responses.
//!
//! Every handler failure becomes a JSON body of the form
//! `{"error": "<message>"}` with an appropriate status code.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use camisa_store::StoreError;

use crate::media::MediaError;

/// Errors surfaced by REST handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required fields were absent or empty.
    #[error("missing required fields")]
    MissingFields,

    /// A path parameter that must be numeric was not.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// The addressed row does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A shirt referenced a person that does not exist.
    #[error("unknown person: {0}")]
    UnknownPerson(String),

    /// The person still has shirts referencing it.
    #[error("person still has shirts")]
    PersonInUse,

    /// The multipart payload could not be read.
    #[error("invalid multipart request: {0}")]
    Multipart(#[from] MultipartError),

    /// Media store failure.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Catalog store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingFields
            | ApiError::InvalidId(_)
            | ApiError::UnknownPerson(_)
            | ApiError::Multipart(_)
            | ApiError::Media(
                MediaError::UnsupportedType { .. } | MediaError::InvalidName { .. },
            ) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::Media(MediaError::NotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            ApiError::PersonInUse => StatusCode::CONFLICT,
            ApiError::Media(MediaError::Io(_)) | ApiError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn client_errors_are_400() {
        assert_eq!(status_of(ApiError::MissingFields), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ApiError::InvalidId("abc".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::UnknownPerson("per_x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Media(MediaError::UnsupportedType {
                mime: "text/plain".into()
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Media(MediaError::InvalidName {
                name: "../x".into()
            })),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_rows_are_404() {
        assert_eq!(status_of(ApiError::NotFound("shirt")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ApiError::Media(MediaError::NotFound {
                name: "gone.png".into()
            })),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn person_in_use_is_409() {
        assert_eq!(status_of(ApiError::PersonInUse), StatusCode::CONFLICT);
    }

    #[test]
    fn store_failures_are_500() {
        let err = ApiError::Store(StoreError::Migration {
            message: "schema out of date".into(),
        });
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn body_is_json_with_error_key() {
        let resp = ApiError::NotFound("shirt").into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "shirt not found");
    }
}
