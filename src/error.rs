//! Error types
//!
//! Every library operation returns [`Error`]. The CLI layer wraps these in
//! `anyhow` with command context and maps them back to exit codes.

use reqwest::StatusCode;
use std::path::PathBuf;

/// Result alias used by the library modules
pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy for API operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad flags or malformed resource names, raised before any request is sent
    #[error("invalid input: {0}")]
    Validation(String),

    /// The API answered with a non-success status
    #[error("API request failed: {status}")]
    Http { status: StatusCode, body: String },

    /// The request never produced a response
    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON shape we expected
    #[error("failed to parse response JSON: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// A display-name search walked every page without a match
    #[error("{kind} with display name '{display_name}' not found")]
    NotFound { kind: String, display_name: String },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Token acquisition failed
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// A response that parsed but carries an unusable value
    pub fn malformed(message: impl std::fmt::Display) -> Self {
        Self::Deserialize(<serde_json::Error as serde::de::Error>::custom(message))
    }

    /// HTTP status of an API failure, if this is one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_kind() {
        let err = Error::NotFound {
            kind: "authConfig".to_string(),
            display_name: "prod-creds".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "authConfig with display name 'prod-creds' not found"
        );
    }

    #[test]
    fn test_status_only_for_http() {
        let err = Error::Http {
            status: StatusCode::FORBIDDEN,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert!(Error::validation("x").status().is_none());
        assert!(Error::validation("x").is_validation());
    }
}
