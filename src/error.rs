//! Error types for the rime client.
//!
//! This module defines `RimeError`, the unified error type used by the
//! client's internal plumbing. The four public ticket operations never
//! surface these errors; they log them and return their documented
//! empty/`None`/`false` sentinel instead (see [`crate::snow_client`]).
//!
//! # Security
//!
//! Passwords and tokens must never appear in logs or error messages.
//! Use `sanitize_message()` when constructing messages from external
//! sources such as response bodies.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for all rime operations.
///
/// Each variant provides specific context about the failure without
/// leaking credentials.
#[derive(Error, Debug)]
pub enum RimeError {
    /// Configuration error - missing credentials or invalid settings.
    ///
    /// This is the only error category that is fatal to the caller:
    /// constructing a client without any credential fails fast here.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed during transmission (connection refused,
    /// DNS failure, broken pipe).
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// HTTP response returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The sanitized response body, truncated for logging.
        body: String,
    },

    /// Request timed out.
    #[error("request timed out after {duration:?} - the instance may be slow or unreachable")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The operation that timed out.
        operation: String,
    },

    /// JSON serialization or deserialization failed.
    ///
    /// Covers malformed response bodies, including a missing `result`
    /// envelope field.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lookup by ticket number yielded no records.
    #[error("ticket not found: {number}")]
    NotFound {
        /// The ticket number that was not found.
        number: String,
    },
}

impl RimeError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        RimeError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        RimeError::Config(message.into())
    }

    /// Creates a not found error for a ticket number.
    pub fn not_found(number: impl Into<String>) -> Self {
        RimeError::NotFound {
            number: number.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        RimeError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Sanitizes a message to remove any occurrence of a secret.
    ///
    /// Passwords and tokens must never appear in logs, error messages,
    /// or responses to callers.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to sanitize
    /// * `secret` - The secret to strip from the message
    ///
    /// # Returns
    ///
    /// The message with any occurrence of the secret replaced with `[REDACTED]`
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_error() {
        let err = RimeError::missing_env("SERVICENOW_INSTANCE");
        assert!(err.to_string().contains("SERVICENOW_INSTANCE"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_invalid_config_error() {
        let err = RimeError::invalid_config("instance must be a hostname");
        assert_eq!(
            err.to_string(),
            "configuration error: instance must be a hostname"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = RimeError::not_found("CHG0030042");
        assert_eq!(err.to_string(), "ticket not found: CHG0030042");
    }

    #[test]
    fn test_timeout_error() {
        let err = RimeError::timeout(Duration::from_secs(30), "list_tickets");
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("30s"));
    }

    #[test]
    fn test_sanitize_message_removes_secret() {
        let secret = "hunter2_super_secret";
        let message = format!("basic auth with {} rejected", secret);
        let sanitized = RimeError::sanitize_message(&message, secret);
        assert!(!sanitized.contains(secret));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_message_empty_secret() {
        let message = "Some error message";
        let sanitized = RimeError::sanitize_message(message, "");
        assert_eq!(sanitized, message);
    }

    #[test]
    fn test_sanitize_message_no_match() {
        let message = "Some error message";
        let sanitized = RimeError::sanitize_message(message, "not_present");
        assert_eq!(sanitized, message);
    }
}
