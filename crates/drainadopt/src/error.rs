//! Error types for drainadopt.
//!
//! Every fallible operation in the crate returns [`Error`]. Views never
//! propagate these to the caller; they turn them into a notification via
//! [`Error::user_message`] and keep their previous state.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for drainadopt operations.
#[derive(Error, Debug)]
pub enum Error {
    // === API Errors ===
    /// The drain API answered with a non-success status.
    #[error("drain API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by the server, or a fallback.
        message: String,
    },

    /// The HTTP request could not be completed.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured API base URL is unusable.
    #[error("invalid API base URL {url}: {message}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    // === Session Errors ===
    /// The action needs a signed-in user.
    #[error("you must be signed in to {action}")]
    NotAuthenticated {
        /// What the user tried to do.
        action: &'static str,
    },

    /// The action needs an administrator.
    #[error("only administrators can {action}")]
    Forbidden {
        /// What the user tried to do.
        action: &'static str,
    },

    // === Validation Errors ===
    /// A selected file failed local validation.
    #[error("{0}")]
    InvalidFile(String),

    // === Service Errors ===
    /// The maps service failed.
    #[error(transparent)]
    Maps(#[from] drainadopt_maps::MapsError),

    /// The image host failed.
    #[error(transparent)]
    Images(#[from] drainadopt_images::ImageError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path that couldn't be read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An operation timed out.
    #[error("operation timed out: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
    },
}

/// A specialized Result type for drainadopt operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an API error.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a file validation error.
    #[must_use]
    pub fn invalid_file(message: impl Into<String>) -> Self {
        Self::InvalidFile(message.into())
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// The text a notification should show for this error.
    ///
    /// API errors show the server's own message; everything else shows the
    /// display form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status of an API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the server reported the resource missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
