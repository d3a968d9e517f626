//! Error types for the Google Maps client.

use thiserror::Error;

/// Errors returned by the Google Maps web services.
#[derive(Debug, Error)]
pub enum MapsError {
    /// No API key was configured.
    #[error("Google Maps API key is not configured")]
    MissingApiKey,

    /// The HTTP request could not be completed.
    #[error("maps request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-OK status.
    #[error("maps service returned {status}: {message}")]
    Status {
        /// Service status code, e.g. `REQUEST_DENIED`.
        status: String,
        /// Human-readable detail from the service.
        message: String,
    },

    /// The geolocation API could not determine a position.
    #[error("geolocation failed: {0}")]
    Geolocation(String),

    /// A link to Google Maps could not be built.
    #[error("invalid maps URL: {0}")]
    InvalidUrl(String),
}

/// Result type for Google Maps operations.
pub type Result<T> = std::result::Result<T, MapsError>;

impl MapsError {
    /// Check if this error means the client was never configured.
    #[must_use]
    pub fn is_missing_api_key(&self) -> bool {
        matches!(self, Self::MissingApiKey)
    }
}

/// Interpret the `status` field shared by the geocoding and places APIs.
///
/// Returns `Ok(true)` when results are present and `Ok(false)` for
/// `ZERO_RESULTS`.
pub(crate) fn check_status(status: &str, error_message: Option<String>) -> Result<bool> {
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" => Ok(false),
        other => Err(MapsError::Status {
            status: other.to_string(),
            message: error_message.unwrap_or_else(|| "no details".to_string()),
        }),
    }
}
