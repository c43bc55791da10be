use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::DispatchError;

/// Call-boundary error. Every failure of a single call ends up here and is
/// turned into a response; none of them stop the server.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The request body could not be read or decoded.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type RpcResult<T> = Result<T, RpcError>;

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            RpcError::Dispatch(err) => match err {
                DispatchError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                DispatchError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                DispatchError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
                DispatchError::StorageUnavailable(source) => {
                    tracing::error!(error = %source, "Storage unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "STORAGE_UNAVAILABLE",
                        "The intervention store is unavailable".to_string(),
                    )
                }
            },
            RpcError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                RpcError::from(DispatchError::Validation("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                RpcError::from(DispatchError::NotFound("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                RpcError::from(DispatchError::Conflict("x".into())),
                StatusCode::CONFLICT,
            ),
            (
                RpcError::from(DispatchError::StorageUnavailable(sqlx::Error::PoolTimedOut)),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (RpcError::BadRequest("junk".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
