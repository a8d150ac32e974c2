//! Error types and handling for the `TripMate` backend

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Main error type for the `TripMate` backend
#[derive(Error, Debug)]
pub enum TripMateError {
    /// Malformed input (invalid date ordering, missing required field)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A trip, activity or packing item id does not resolve
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Caller identity missing or mismatched with the resource owner
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// External weather call failed or returned unusable data
    #[error("Weather provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// Database errors
    #[error("Database error: {source}")]
    Database {
        #[from]
        source: sqlx::Error,
    },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TripMateError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new unauthorized error
    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a new provider error carrying the upstream status and body
    pub fn provider<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Provider {
            status,
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl IntoResponse for TripMateError {
    fn into_response(self) -> Response {
        let status = match &self {
            TripMateError::Validation { .. } => StatusCode::BAD_REQUEST,
            TripMateError::NotFound { .. } => StatusCode::NOT_FOUND,
            TripMateError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            TripMateError::Provider { .. }
            | TripMateError::Database { .. }
            | TripMateError::Config { .. }
            | TripMateError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let validation_err = TripMateError::validation("end_date before start_date");
        assert!(matches!(validation_err, TripMateError::Validation { .. }));

        let not_found_err = TripMateError::not_found("no trip with id 42");
        assert!(matches!(not_found_err, TripMateError::NotFound { .. }));

        let provider_err = TripMateError::provider(503, "upstream unavailable");
        assert!(matches!(
            provider_err,
            TripMateError::Provider { status: 503, .. }
        ));
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                TripMateError::validation("bad dates"),
                StatusCode::BAD_REQUEST,
            ),
            (TripMateError::not_found("gone"), StatusCode::NOT_FOUND),
            (
                TripMateError::unauthorized("no caller"),
                StatusCode::UNAUTHORIZED,
            ),
            (
                TripMateError::provider(502, "boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_provider_message_carries_upstream_body() {
        let err = TripMateError::provider(429, "rate limited");
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("rate limited"));
    }
}
