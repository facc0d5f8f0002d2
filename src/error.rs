//! Client-facing errors.
//!
//! Every handler returns `Result<_, ApiError>`; this is the single place where a failure is
//! turned into a status code and body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::upstream::UpstreamError;

/// Downstream statuses forwarded to the client as-is.
pub const PASSTHROUGH_CODES: &[u16] = &[400, 401, 403, 404, 409, 413, 422];

/// Narrower passthrough set used by the credential routes.
pub const AUTH_PASSTHROUGH_CODES: &[u16] = &[400, 413, 422];

/// One entry of a validation error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetail {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Validation error body, shaped like the microservices' own 422 responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpValidationError {
    pub detail: Vec<ValidationDetail>,
}

impl HttpValidationError {
    pub fn single(loc: &[&str], msg: impl Into<String>, kind: &str) -> Self {
        Self {
            detail: vec![ValidationDetail {
                loc: loc.iter().map(|s| s.to_string()).collect(),
                msg: msg.into(),
                kind: kind.to_string(),
            }],
        }
    }

    /// A path parameter that is not a UUID.
    pub fn invalid_uuid(field: &str) -> Self {
        Self::single(
            &["path", field],
            format!("Parameter {{{field}}} is not a valid UUID."),
            "type_error.uuid",
        )
    }

    /// A body field that failed validation.
    pub fn invalid_param(field: &str) -> Self {
        Self::single(&["body", field], format!("Parameter {field} not valid."), "param")
    }

    pub fn missing_credentials() -> Self {
        Self::single(&["body"], "Missing required parameters.", "parameter")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0:?}")]
    Validation(HttpValidationError),

    /// 401; with a detail message the body is `{"detail": ...}`, otherwise empty.
    #[error("unauthorized")]
    Unauthorized(Option<&'static str>),

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    /// A downstream error forwarded with its original status and body.
    #[error("upstream responded with {status}")]
    Passthrough { status: StatusCode, body: Value },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map an upstream failure, forwarding the status when it is in `codes`.
    pub fn from_upstream(err: UpstreamError, codes: &[u16]) -> Self {
        match err {
            UpstreamError::Status { status, body, .. } if codes.contains(&status.as_u16()) => {
                ApiError::Passthrough { status, body }
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::from_upstream(err, PASSTHROUGH_CODES)
    }
}

impl From<HttpValidationError> for ApiError {
    fn from(err: HttpValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(body) => (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response(),
            ApiError::Unauthorized(Some(detail)) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response()
            }
            ApiError::Unauthorized(None) => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
            }
            ApiError::Passthrough { status, body } => (status, Json(body)).into_response(),
            ApiError::Internal(reason) => {
                tracing::error!(error = %reason, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
