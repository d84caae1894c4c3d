//! Error taxonomy and the structured problem body.
//!
//! Expected outcomes (unknown id, rejected payload) are ordinary responses
//! built by handlers and stages. Only unexpected failures travel as
//! [`ApiError`] values through the pipeline, where the error boundary turns
//! them into a sanitized `500` [`Problem`] body.

use serde::Serialize;
use thiserror::Error;

use crate::http::{Response, StatusCode};

/// The outcome type flowing through the pipeline: a response, or an
/// unexpected failure bound for the error boundary.
pub type HandlerResult = Result<Response, ApiError>;

/// Unexpected failures a stage or handler can propagate.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A response payload failed to serialize.
    #[error("response serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A handler expected a validated payload that no upstream stage provided.
    /// Indicates a route wired without its validation stage.
    #[error("no validated {type_name} payload in the request context")]
    MissingPayload { type_name: &'static str },

    /// The middleware chain ran out without any stage producing a response.
    #[error("middleware chain exhausted without a response")]
    ChainExhausted,

    /// A failure injected through the fault query parameter.
    #[error("injected fault: {0}")]
    Injected(String),
}

/// JSON body emitted for unexpected failures.
///
/// Serializes as `{"Title": ..., "Status": 500, "Detail": ...}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Problem {
    title: String,
    status: u16,
    detail: String,
}

impl Problem {
    const TITLE: &'static str = "An unexpected error occurred.";
    const REDACTED_DETAIL: &'static str = "Please contact support.";

    /// Builds the internal-error problem body.
    ///
    /// `detail` carries the underlying error text when the caller is allowed
    /// to reveal it; `None` produces the fixed support message.
    pub fn internal(detail: Option<String>) -> Self {
        Self {
            title: Self::TITLE.to_owned(),
            status: StatusCode::InternalServerError.as_u16(),
            detail: detail.unwrap_or_else(|| Self::REDACTED_DETAIL.to_owned()),
        }
    }

    /// Renders the problem as a `500` JSON response.
    pub fn into_response(self) -> Response {
        match Response::json(StatusCode::InternalServerError, &self) {
            Ok(response) => response,
            // A three-field struct cannot realistically fail to serialize;
            // fall back to plain text rather than panic.
            Err(_) => Response::new(StatusCode::InternalServerError).body(self.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_reveals_detail_when_given() {
        let problem = Problem::internal(Some("boom".to_owned()));
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["Title"], "An unexpected error occurred.");
        assert_eq!(json["Status"], 500);
        assert_eq!(json["Detail"], "boom");
    }

    #[test]
    fn problem_redacts_detail_when_absent() {
        let problem = Problem::internal(None);
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["Detail"], "Please contact support.");
    }

    #[test]
    fn problem_response_is_500_json() {
        let response = Problem::internal(None).into_response();
        assert_eq!(response.status(), StatusCode::InternalServerError);
        assert_eq!(response.headers().get("content-type"), Some("application/json"));
    }

    #[test]
    fn api_error_messages() {
        let err = ApiError::Injected("simulated".to_owned());
        assert_eq!(err.to_string(), "injected fault: simulated");
        assert!(
            ApiError::ChainExhausted
                .to_string()
                .contains("chain exhausted")
        );
    }
}
