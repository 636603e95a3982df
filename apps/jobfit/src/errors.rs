use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

/// Fallback shown for any connectivity failure.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// A single client-side validation failure, shown inline next to its field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Client-level error type.
/// Every network-facing operation returns `Result<T, ClientError>` or folds it
/// into an outcome object; nothing is allowed to escape as a panic.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("No active session")]
    NoSession,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

impl ClientError {
    /// Text suitable for showing to the user.
    ///
    /// Server messages are passed through verbatim; connectivity and storage
    /// problems collapse to generic retry prompts.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Please check the form and try again.".to_string()),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Network(detail) => {
                tracing::warn!("Network error: {detail}");
                NETWORK_ERROR_MESSAGE.to_string()
            }
            ClientError::Unauthorized => "Please sign in again.".to_string(),
            ClientError::NoSession => "You are not signed in.".to_string(),
            ClientError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                "Local data could not be saved. Please try again.".to_string()
            }
            ClientError::Parse(e) => {
                tracing::error!("Unexpected response body: {e}");
                "Unexpected response from server.".to_string()
            }
        }
    }

    /// Field-level errors, if this is a validation failure.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ClientError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_passed_through_verbatim() {
        let err = ClientError::Server {
            status: 409,
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[test]
    fn test_network_error_is_generic() {
        let err = ClientError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn test_validation_surfaces_first_field_message() {
        let err = ClientError::Validation(vec![
            FieldError::new("email", "Enter a valid email address"),
            FieldError::new("password", "Password is required"),
        ]);
        assert_eq!(err.user_message(), "Enter a valid email address");
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_non_validation_has_no_field_errors() {
        assert!(ClientError::Unauthorized.field_errors().is_empty());
    }
}
