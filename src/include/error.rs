//! Error types for include resolution.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Boxed cause carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while resolving a single include.
#[derive(Debug, Error)]
pub enum IncludeError {
    /// The outbound GET could not complete.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The fetched body was not valid JSON.
    #[error("invalid JSON from {url}: {source}")]
    Parse {
        url: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response being augmented could not be read or re-encoded.
    #[error("unreadable response payload: {0}")]
    Payload(String),
}

impl IncludeError {
    /// URL of the fetch that failed, if the failure came from a fetch.
    pub fn url(&self) -> Option<&str> {
        match self {
            IncludeError::Transport { url, .. } | IncludeError::Parse { url, .. } => Some(url),
            IncludeError::Payload(_) => None,
        }
    }
}

/// An include failure routed to the request's error channel.
///
/// Rendered as `500 Internal Server Error` with a `{code, message}` body.
#[derive(Debug, Error)]
#[error("Error while including data: {source}")]
pub struct InclusionFailure {
    #[from]
    source: IncludeError,
}

impl InclusionFailure {
    /// The underlying cause.
    pub fn cause(&self) -> &IncludeError {
        &self.source
    }
}

impl IntoResponse for InclusionFailure {
    fn into_response(self) -> Response {
        let body = json!({
            "code": "InternalError",
            "message": self.to_string(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_is_prefixed() {
        let source = serde_json::from_str::<serde_json::Value>("{a:1}").unwrap_err();
        let err = IncludeError::Parse {
            url: "http://x/y".into(),
            body: "{a:1}".into(),
            source,
        };
        let failure = InclusionFailure::from(err);
        let message = failure.to_string();
        assert!(message.starts_with("Error while including data: invalid JSON from http://x/y"));
        assert_eq!(failure.cause().url(), Some("http://x/y"));
    }

    #[tokio::test]
    async fn failure_renders_internal_error() {
        let failure = InclusionFailure::from(IncludeError::Transport {
            url: "http://x/y".into(),
            source: "connection refused".into(),
        });
        let response = failure.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "InternalError");
        assert_eq!(
            body["message"],
            "Error while including data: request to http://x/y failed: connection refused"
        );
    }
}
