//! Error handling for the Workboard client
//!
//! This module provides a unified error type for every call the client makes
//! to the backend. HTTP failures are classified by status so callers can
//! react per kind: a `401` expires the session, a `404` may degrade to an
//! empty result, field-level `4xx` messages are shown verbatim, and `5xx`
//! details are logged but replaced by a generic message for the user.
//!
//! # Taxonomy
//!
//! | Variant | Cause |
//! |---|---|
//! | `NetworkUnreachable` | connection refused, DNS failure, timeout |
//! | `Unauthorized` | 401 |
//! | `Forbidden` | 403, or a local permission pre-check |
//! | `NotFound` | 404 |
//! | `Validation` | other 4xx, with field-level messages |
//! | `Server` | 5xx |
//! | `Decode` | response body did not match the expected shape |
//! | `InvalidInput` | client-side validation rejected the input |
//!
//! # Example
//!
//! ```
//! use workboard_client::error::ClientError;
//!
//! let err = ClientError::from_status(404, r#"{"error": "Task not found"}"#, "/tasks/9/");
//! assert!(err.is_not_found());
//! assert_eq!(err.user_message(), "Task not found");
//! ```

use serde_json::Value as JsonValue;
use workboard_shared::auth::permissions::PermissionError;
use workboard_shared::validation::FieldErrors;

/// Client result type alias
pub type ApiResult<T> = Result<T, ClientError>;

/// Generic message shown for server-side failures
pub const SERVER_ERROR_MESSAGE: &str =
    "An unexpected server error occurred. Please try again later.";

/// Message shown when the backend cannot be reached
pub const UNREACHABLE_MESSAGE: &str =
    "Cannot connect to server. Please check your internet connection and make sure the backend is running.";

/// Maximum number of body bytes kept for server error diagnostics
const MAX_DETAIL_LEN: usize = 512;

/// Unified client error type
///
/// `Clone` so that one in-flight request result can be handed to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// No connection to the backend
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    /// Missing, invalid or expired session token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource absent (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend rejected the request (other 4xx)
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Backend failed (5xx); `detail` is for diagnostics only
    #[error("Server error ({status})")]
    Server { status: u16, detail: String },

    /// Response body could not be decoded
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Input rejected before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(FieldErrors),
}

impl ClientError {
    /// Classifies a non-success HTTP response
    ///
    /// # Arguments
    ///
    /// * `status` - HTTP status code
    /// * `body` - Raw response body
    /// * `url` - Request URL, used in default messages and logs
    pub fn from_status(status: u16, body: &str, url: &str) -> Self {
        let parsed: JsonValue = serde_json::from_str(body)
            .unwrap_or_else(|_| JsonValue::String(body.trim().to_string()));
        let errors = FieldErrors::from_body(&parsed);

        match status {
            401 => ClientError::Unauthorized(
                errors
                    .message
                    .unwrap_or_else(|| "Authentication credentials were not provided".to_string()),
            ),
            403 => ClientError::Forbidden(
                errors
                    .message
                    .unwrap_or_else(|| "Permission denied".to_string()),
            ),
            404 => ClientError::NotFound(
                errors
                    .message
                    .unwrap_or_else(|| format!("Resource not found: {}", url)),
            ),
            500..=599 => {
                // Log server details but don't surface them to the user
                let mut detail = errors.message.unwrap_or_else(|| body.to_string());
                if detail.len() > MAX_DETAIL_LEN {
                    let mut cut = MAX_DETAIL_LEN;
                    while !detail.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    detail.truncate(cut);
                }
                tracing::error!(status, url, detail = %detail, "Internal server error");
                ClientError::Server { status, detail }
            }
            _ => {
                if errors.is_empty() {
                    ClientError::Validation(FieldErrors::with_message(format!(
                        "Request failed with status {}",
                        status
                    )))
                } else {
                    ClientError::Validation(errors)
                }
            }
        }
    }

    /// Returns true for `NetworkUnreachable`
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::NetworkUnreachable(_))
    }

    /// Returns true for `Unauthorized`
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    /// Returns true for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Field-level messages, when the error carries any
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Validation(errors) | ClientError::InvalidInput(errors) => Some(errors),
            _ => None,
        }
    }

    /// Message suitable for a user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            ClientError::NetworkUnreachable(_) => UNREACHABLE_MESSAGE.to_string(),
            ClientError::Unauthorized(_) => "Your session has expired. Please log in again.".to_string(),
            ClientError::Forbidden(msg) | ClientError::NotFound(msg) => msg.clone(),
            ClientError::Validation(errors) => errors.summary(),
            // Local messages already name what is wrong
            ClientError::InvalidInput(errors) => errors
                .first_message()
                .map(str::to_string)
                .unwrap_or_else(|| errors.summary()),
            ClientError::Server { .. } => SERVER_ERROR_MESSAGE.to_string(),
            ClientError::Decode(_) => "Received an unexpected response from the server.".to_string(),
        }
    }
}

/// Convert transport errors to client errors
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ClientError::Decode(err.to_string());
        }

        if let Some(status) = err.status() {
            return ClientError::from_status(status.as_u16(), "", err.url().map(|u| u.as_str()).unwrap_or(""));
        }

        // Connect, timeout, request and body errors all mean the backend was not reached
        ClientError::NetworkUnreachable(err.to_string())
    }
}

/// Convert local permission failures to client errors
impl From<PermissionError> for ClientError {
    fn from(err: PermissionError) -> Self {
        ClientError::Forbidden(err.to_string())
    }
}

/// Convert client-side validation failures to client errors
impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::InvalidInput(err.into())
    }
}
