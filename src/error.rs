use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{pipeline::validate::ValidationFailure, redact};

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Input rejected before anything external ran. Surfaced verbatim.
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// Session over its request budget. The message carries the wait.
    #[error("{0}")]
    RateLimited(String),

    /// Model call failed. `notice` holds the user-facing message the first
    /// time a session hits a given failure state, and is empty on repeats.
    #[error("Recommendation model unavailable")]
    Llm { notice: Option<String> },

    /// Upstream metadata or model endpoint misbehaved. Scrubbed before it
    /// reaches a response; the resolver normally swallows these entirely.
    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(failure) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": failure.to_string() }),
            ),
            AppError::RateLimited(message) => {
                (StatusCode::TOO_MANY_REQUESTS, json!({ "error": message }))
            }
            AppError::Llm { notice } => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": "Recommendation model unavailable", "notice": notice }),
            ),
            AppError::ExternalApi(message) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": redact::scrub(&message) }),
            ),
            AppError::HttpClient(source) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": redact::scrub(&source.to_string()) }),
            ),
            AppError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": redact::scrub(&message) }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_maps_to_422_with_verbatim_message() {
        let (status, body) = body_json(AppError::Validation(ValidationFailure::TooLong)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Movie title is too long (200 characters max)");
    }

    #[tokio::test]
    async fn test_rate_limited_maps_to_429() {
        let (status, body) =
            body_json(AppError::RateLimited("Too many requests. Please try again in 300 seconds.".into())).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["error"].as_str().unwrap().contains("300 seconds"));
    }

    #[tokio::test]
    async fn test_llm_error_carries_notice_field() {
        let (status, body) = body_json(AppError::Llm {
            notice: Some("Try again in a moment.".into()),
        })
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["notice"], "Try again in a moment.");

        let (_, repeat) = body_json(AppError::Llm { notice: None }).await;
        assert!(repeat["notice"].is_null());
    }

    #[tokio::test]
    async fn test_external_api_error_is_scrubbed() {
        let (status, body) = body_json(AppError::ExternalApi(
            "lookup failed at /etc/app/credentials for key abcdefghij0123456789xyz".into(),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("[PATH]"));
        assert!(message.contains("[REDACTED]"));
        assert!(!message.contains("/etc/app/credentials"));
    }

    #[tokio::test]
    async fn test_internal_error_is_scrubbed() {
        let (status, body) =
            body_json(AppError::Internal("boom at /var/lib/app/state".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("/var/lib"));
    }
}
