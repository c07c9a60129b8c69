//! HTTP rendering of enrollment failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use enrolld_core::{EnrollError, ErrorClass};

/// HTTP-facing wrapper around [`EnrollError`].
///
/// Produces consistent JSON error responses: client-class failures become
/// 400, everything else 500. Failed enrollments never produce a reply
/// event, only this error body.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] EnrollError);

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = &self.0;
        let status = match error.class() {
            ErrorClass::Client => StatusCode::BAD_REQUEST,
            ErrorClass::Server => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match error.class() {
            ErrorClass::Client => {
                tracing::warn!(error = %error, code = error.code(), "Rejected enrollment event")
            }
            ErrorClass::Server => {
                tracing::error!(error = %error, code = error.code(), "Enrollment failed")
            }
        }

        let body = json!({
            "error": error.to_string(),
            "code": error.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: EnrollError) -> StatusCode {
        ApiError(error).into_response().status()
    }

    #[test]
    fn decode_failures_are_bad_request() {
        assert_eq!(status_of(EnrollError::Decode("bad".into())), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn everything_else_is_internal_server_error() {
        for error in [
            EnrollError::Schema("bad".into()),
            EnrollError::Detection,
            EnrollError::InsertUndelivered("refused".into()),
            EnrollError::InsertAckMissing,
            EnrollError::Encode("json".into()),
            EnrollError::WorkerGone,
        ] {
            assert_eq!(status_of(error), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
