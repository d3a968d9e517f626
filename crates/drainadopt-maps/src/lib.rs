//! Google Maps web-service client for drainadopt.
//!
//! This crate wraps the handful of Google Maps endpoints the drain views rely
//! on: reverse geocoding, places autocomplete and details, the geolocation
//! API, and the embed/search URLs used to link out to a map.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod embed;
pub mod error;
pub mod geocoding;
pub mod geolocation;
pub mod places;

use tracing::debug;

pub use embed::search_url;
pub use error::{MapsError, Result};
pub use geocoding::{GeocodeResult, Geometry, LatLng};
pub use geolocation::Position;
pub use places::{Place, Prediction};

/// Base URL of the Maps web services (geocoding, places).
pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com";

/// Base URL of the Geolocation API.
pub const DEFAULT_GEOLOCATION_BASE_URL: &str = "https://www.googleapis.com";

/// Client for the Google Maps web services.
///
/// Cheap to clone; the underlying HTTP connection pool is shared.
#[derive(Debug, Clone)]
pub struct GoogleMaps {
    api_key: String,
    http: reqwest::Client,
}

impl GoogleMaps {
    /// Create a client with a fresh HTTP connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::MissingApiKey`] if the key is blank, or an HTTP
    /// error if the client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Self::with_client(api_key, http)
    }

    /// Create a client that reuses an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::MissingApiKey`] if the key is blank.
    pub fn with_client(api_key: impl Into<String>, http: reqwest::Client) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(MapsError::MissingApiKey);
        }

        debug!("Google Maps client created");
        Ok(Self { api_key, http })
    }

    /// The API key this client signs requests with.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn maps_get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{DEFAULT_MAPS_BASE_URL}{path}"))
            .query(&[("key", self.api_key.as_str())])
    }
}
