//! Error types for the updater.
//!
//! Errors fall into three groups: registration failures that keep a package
//! from being registered, fetch failures that the updater swallows and treats
//! as "no update", and install failures that the host has to surface.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the updater.
#[derive(Debug, Error)]
pub enum UpdaterError {
    // Registration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Source {url} is not properly formatted: {reason}")]
    MalformedSource { url: String, reason: String },

    #[error("Duplicate package slug: {slug}")]
    DuplicateSlug { slug: String },

    // Fetch errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request to {url} returned an empty body")]
    EmptyResponse { url: String },

    #[error("Malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    // Install errors
    #[error("Unable to rename downloaded theme or plugin from {from} to {to}: {message}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // Discovery errors
    #[error("Could not discover installed package at {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    // Storage errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for updater operations.
pub type Result<T> = std::result::Result<T, UpdaterError>;

impl From<std::io::Error> for UpdaterError {
    fn from(err: std::io::Error) -> Self {
        UpdaterError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for UpdaterError {
    fn from(err: serde_json::Error) -> Self {
        UpdaterError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for UpdaterError {
    fn from(err: rusqlite::Error) -> Self {
        UpdaterError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for UpdaterError {
    fn from(err: reqwest::Error) -> Self {
        UpdaterError::Network {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl UpdaterError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        UpdaterError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        UpdaterError::Config {
            message: message.into(),
        }
    }

    /// Whether this error came from polling a remote source.
    ///
    /// Fetch failures are recovered locally: the package is reported as up
    /// to date and the host's next periodic check acts as the retry.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            UpdaterError::Network { .. }
                | UpdaterError::HttpStatus { .. }
                | UpdaterError::EmptyResponse { .. }
                | UpdaterError::MalformedResponse { .. }
        )
    }

    /// Whether this error must stop registration of a package.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            UpdaterError::Config { .. }
                | UpdaterError::MalformedSource { .. }
                | UpdaterError::DuplicateSlug { .. }
                | UpdaterError::Discovery { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UpdaterError::MalformedSource {
            url: "https://github.com/onlyowner".into(),
            reason: "expected https://github.com/<owner>/<repo>".into(),
        };
        assert_eq!(
            err.to_string(),
            "Source https://github.com/onlyowner is not properly formatted: expected https://github.com/<owner>/<repo>"
        );
    }

    #[test]
    fn test_fetch_failures() {
        assert!(UpdaterError::HttpStatus {
            url: "https://example.com".into(),
            status: 404
        }
        .is_fetch_failure());
        assert!(UpdaterError::EmptyResponse {
            url: "https://example.com".into()
        }
        .is_fetch_failure());
        assert!(!UpdaterError::config("missing source").is_fetch_failure());
        assert!(!UpdaterError::Rename {
            from: "/tmp/x".into(),
            to: "/tmp/remote/x".into(),
            message: "exists".into(),
            source: None,
        }
        .is_fetch_failure());
    }

    #[test]
    fn test_registration_errors() {
        assert!(UpdaterError::config("bad type").is_registration_error());
        assert!(UpdaterError::DuplicateSlug { slug: "x".into() }.is_registration_error());
        assert!(!UpdaterError::Other("boom".into()).is_registration_error());
    }
}
