// Core types and errors

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

/// The result type used throughout the crate
pub type ConsultResult<T> = Result<T, ConsultError>;

/// Convert reqwest::Error to our ConsultError
impl From<reqwest::Error> for ConsultError {
    fn from(err: reqwest::Error) -> Self {
        ConsultError::Request {
            message: err.without_url().to_string(),
            location: None,
            source: None,
        }
    }
}

/// A container for API keys that keeps them out of logs and debug output
#[derive(Clone)]
pub struct SecureApiKey {
    key: String,
}

impl SecureApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Get a reference to the underlying key
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl From<String> for SecureApiKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl Deref for SecureApiKey {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.key
    }
}

// Prevent accidental printing of API keys in logs/debug output
impl fmt::Debug for SecureApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureApiKey([REDACTED])")
    }
}

impl fmt::Display for SecureApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED API KEY]")
    }
}

#[derive(Debug, Error, Clone)]
pub enum ConsultError {
    #[error("No comments found for draft {draft_id}")]
    NotFound { draft_id: i64 },

    #[error("Gemini API error: {status} - {body}")]
    Gateway {
        status: u16,
        body: String,
        location: Option<String>,
    },

    #[error("API request failed: {message}")]
    Request {
        message: String,
        location: Option<String>,
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to parse model output: {message}")]
    Parse {
        message: String,
        source_text: Option<String>,
    },

    #[error("Store error: {0}")]
    Store(Arc<sqlx::Error>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for ConsultError {
    fn from(err: sqlx::Error) -> Self {
        ConsultError::Store(Arc::new(err))
    }
}

impl From<serde_json::Error> for ConsultError {
    fn from(err: serde_json::Error) -> Self {
        ConsultError::Parse {
            message: err.to_string(),
            source_text: None,
        }
    }
}

impl ConsultError {
    pub fn gateway_error(status: u16, body: impl Into<String>, location: Option<&str>) -> Self {
        let error = Self::Gateway {
            status,
            body: body.into(),
            location: location.map(String::from),
        };

        if let Some(loc) = error.location() {
            tracing::error!("{} at {}", error, loc);
        } else {
            tracing::error!("{}", error);
        }

        error
    }

    pub fn request_error<T: Into<String>>(
        message: T,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
        location: Option<&str>,
    ) -> Self {
        let error = Self::Request {
            message: message.into(),
            location: location.map(String::from),
            source: source.map(|e| Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>),
        };

        if let Some(loc) = error.location() {
            tracing::error!("{} at {}", error, loc);
        } else {
            tracing::error!("{}", error);
        }

        error
    }

    pub fn parse_error<T: Into<String>>(message: T, source_text: Option<String>) -> Self {
        Self::Parse {
            message: message.into(),
            source_text,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Gateway { location, .. } => location.as_deref(),
            Self::Request { location, .. } => location.as_deref(),
            _ => None,
        }
    }

    /// Whether this is the no-comments case
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Build a gateway error that records where it was raised
#[macro_export]
macro_rules! gateway_error {
    ($status:expr, $body:expr) => {
        $crate::types::ConsultError::gateway_error($status, $body, Some(concat!(file!(), ":", line!())))
    };
}

/// Build a request error that records where it was raised
#[macro_export]
macro_rules! request_error {
    ($message:expr) => {
        $crate::types::ConsultError::request_error($message, None::<::std::convert::Infallible>, Some(concat!(file!(), ":", line!())))
    };
    ($message:expr, $source:expr) => {
        $crate::types::ConsultError::request_error($message, Some($source), Some(concat!(file!(), ":", line!())))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_macro_records_location() {
        let err = gateway_error!(502, "upstream down");
        assert!(matches!(err, ConsultError::Gateway { status: 502, .. }));
        assert!(err.location().is_some_and(|loc| loc.starts_with("src/types.rs:")));
        assert_eq!(err.to_string(), "Gemini API error: 502 - upstream down");
    }

    #[test]
    fn request_macro_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
        match request_error!("Failed to connect", io) {
            ConsultError::Request { message, source, location } => {
                assert_eq!(message, "Failed to connect");
                assert_eq!(source.map(|s| s.to_string()).as_deref(), Some("socket closed"));
                assert!(location.is_some());
            }
            other => panic!("Expected Request error, got {:?}", other),
        }

        assert!(matches!(request_error!("no source"), ConsultError::Request { source: None, .. }));
    }

    #[test]
    fn api_key_is_redacted() {
        let key = SecureApiKey::new("secret-key");
        assert_eq!(format!("{:?}", key), "SecureApiKey([REDACTED])");
        assert_eq!(key.as_str(), "secret-key");
    }
}
