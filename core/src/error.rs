//! Error types for the Nexus API client.
//!
//! # Design
//! One enum covers every failure a caller can observe. `Validation` is raised
//! locally before any I/O. `Authentication` only ever comes out of the
//! connection verifier once all attempts are spent. `RequestFailed` means the
//! exchange itself worked but the server answered outside the 2xx range and
//! the caller asked for value-or-error semantics.

use thiserror::Error;

/// Boxed error produced by an [`Executor`](crate::http::Executor).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors returned by the Nexus client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Caller input was missing or malformed. No request was sent.
    #[error("{message}{}", field_suffix(.field, .value))]
    Validation {
        message: String,
        field: Option<&'static str>,
        value: Option<String>,
    },

    /// The verification loop ran out of attempts.
    #[error("Failed to verify connection after {attempts} attempt(s)")]
    Authentication { attempts: u32 },

    /// The HTTP exchange could not be completed.
    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    /// A body could not be encoded to or decoded from JSON.
    #[error("serialization failed for {target}: {source}")]
    Serialization {
        target: &'static str,
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("API request failed: {message} (Status: {status})")]
    RequestFailed {
        status: u16,
        message: String,
        body: String,
    },

    /// The wait between verification attempts was cancelled.
    #[error("connection verification interrupted")]
    Interrupted,

    /// The client was closed or dropped.
    #[error("client is closed")]
    Closed,
}

fn field_suffix(field: &Option<&'static str>, value: &Option<String>) -> String {
    match field {
        Some(field) => format!(
            " (Field: {field}, Value: {})",
            value.as_deref().unwrap_or("<none>")
        ),
        None => String::new(),
    }
}

impl ClientError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation {
            message: message.into(),
            field: None,
            value: None,
        }
    }

    pub(crate) fn invalid_field(
        message: impl Into<String>,
        field: &'static str,
        value: impl Into<String>,
    ) -> Self {
        ClientError::Validation {
            message: message.into(),
            field: Some(field),
            value: Some(value.into()),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation { .. })
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ClientError::Authentication { .. })
    }

    /// HTTP status carried by a `RequestFailed` error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Reject empty and whitespace-only identifiers.
pub(crate) fn require_id<'a>(id: &'a str, what: &'static str) -> Result<&'a str> {
    if id.trim().is_empty() {
        return Err(ClientError::validation(format!(
            "{what} ID cannot be null or empty"
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_includes_field() {
        let err = ClientError::invalid_field("token is required", "token", "");
        assert_eq!(err.to_string(), "token is required (Field: token, Value: )");
        assert!(err.is_validation());
    }

    #[test]
    fn validation_message_without_field() {
        let err = ClientError::validation("Email cannot be null");
        assert_eq!(err.to_string(), "Email cannot be null");
    }

    #[test]
    fn request_failed_exposes_status() {
        let err = ClientError::RequestFailed {
            status: 403,
            message: "Forbidden".to_string(),
            body: String::new(),
        };
        assert_eq!(err.status_code(), Some(403));
        assert!(err.to_string().contains("Status: 403"));
        assert_eq!(ClientError::Interrupted.status_code(), None);
    }

    #[test]
    fn require_id_rejects_blank_values() {
        assert!(require_id("", "User").is_err());
        assert!(require_id("  \t", "User").is_err());
        assert_eq!(require_id("u1", "User").unwrap(), "u1");
        assert_eq!(
            require_id(" ", "Service").unwrap_err().to_string(),
            "Service ID cannot be null or empty"
        );
    }
}
