//! Map SDK seam for the location views.
//!
//! The picker and viewer only ever need three things from a maps provider:
//! reverse geocoding, place search, and the device position. Those are the
//! [`MapSdk`] and [`Geolocator`] traits, implemented here for
//! [`GoogleMaps`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use drainadopt_maps::GoogleMaps;
use tracing::{debug, warn};

use crate::config::MapsConfig;
use crate::error::{Error, Result};

pub use drainadopt_maps::{LatLng, Place, Prediction};

/// Zoom level with a marker on the map.
pub const MARKER_ZOOM: u8 = 16;

/// Zoom level when nothing is selected yet.
pub const OVERVIEW_ZOOM: u8 = 12;

/// Zoom level of the embedded map on the drain detail screen.
pub const EMBED_ZOOM: u8 = 17;

/// Geocoding and place search.
#[async_trait]
pub trait MapSdk: Send + Sync + std::fmt::Debug {
    /// Resolve a coordinate to a formatted address.
    async fn reverse_geocode(&self, at: LatLng) -> Result<Option<String>>;

    /// Suggestions for partial search input.
    async fn autocomplete(&self, input: &str) -> Result<Vec<Prediction>>;

    /// Look up a suggestion picked from [`MapSdk::autocomplete`].
    async fn place_details(&self, place_id: &str) -> Result<Option<Place>>;
}

/// The device's current position.
#[async_trait]
pub trait Geolocator: Send + Sync + std::fmt::Debug {
    /// Locate the device.
    async fn current_position(&self) -> Result<LatLng>;
}

#[async_trait]
impl MapSdk for GoogleMaps {
    async fn reverse_geocode(&self, at: LatLng) -> Result<Option<String>> {
        Ok(GoogleMaps::reverse_geocode(self, at).await?)
    }

    async fn autocomplete(&self, input: &str) -> Result<Vec<Prediction>> {
        Ok(GoogleMaps::autocomplete(self, input).await?)
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<Place>> {
        Ok(GoogleMaps::place_details(self, place_id).await?)
    }
}

#[async_trait]
impl Geolocator for GoogleMaps {
    async fn current_position(&self) -> Result<LatLng> {
        let position = self.geolocate().await?;
        debug!(accuracy = position.accuracy, "Device located");
        Ok(position.location)
    }
}

/// Lifecycle of the map SDK inside a view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MapStatus {
    /// The SDK has not finished loading.
    #[default]
    Loading,
    /// The SDK is usable.
    Ready,
    /// The SDK failed to load. Terminal.
    LoadError(String),
}

impl MapStatus {
    /// Check if the SDK is usable.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Load the Google Maps client described by `config`.
///
/// # Errors
///
/// Returns an error if no API key is configured.
pub fn load_google_maps(config: &MapsConfig, http: reqwest::Client) -> Result<Arc<GoogleMaps>> {
    let key = config.api_key.clone().unwrap_or_default();
    let maps = GoogleMaps::with_client(key, http)?;
    Ok(Arc::new(maps))
}

/// Reverse geocode without letting a slow or failing lookup escape.
///
/// Returns `None` on failure, timeout, or when the point has no address.
pub async fn resolve_address(sdk: &dyn MapSdk, at: LatLng, timeout: Duration) -> Option<String> {
    match tokio::time::timeout(timeout, sdk.reverse_geocode(at)).await {
        Ok(Ok(address)) => address,
        Ok(Err(e)) => {
            warn!("Reverse geocoding {at} failed: {e}");
            None
        }
        Err(_) => {
            warn!("{}", Error::timeout(format!("reverse geocoding {at}")));
            None
        }
    }
}
