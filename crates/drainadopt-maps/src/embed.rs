//! Links out to Google Maps.

use reqwest::Url;

use crate::error::{MapsError, Result};
use crate::geocoding::LatLng;
use crate::GoogleMaps;

const EMBED_BASE: &str = "https://www.google.com/maps/embed/v1/place";
const SEARCH_BASE: &str = "https://www.google.com/maps/search/";

/// URL that opens Google Maps searching for a coordinate. Needs no API key.
///
/// # Errors
///
/// Returns [`MapsError::InvalidUrl`] if the URL cannot be built.
pub fn search_url(at: LatLng) -> Result<Url> {
    with_params(
        SEARCH_BASE,
        &[("api", "1".to_string()), ("query", coordinate_param(at))],
    )
}

impl GoogleMaps {
    /// Embeddable map URL centered on a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::InvalidUrl`] if the URL cannot be built.
    pub fn embed_url(&self, at: LatLng, zoom: u8) -> Result<Url> {
        with_params(
            EMBED_BASE,
            &[
                ("key", self.api_key.clone()),
                ("q", coordinate_param(at)),
                ("zoom", zoom.to_string()),
            ],
        )
    }
}

fn coordinate_param(at: LatLng) -> String {
    format!("{},{}", at.lat, at.lng)
}

fn with_params(base: &str, params: &[(&str, String)]) -> Result<Url> {
    Url::parse_with_params(base, params).map_err(|e| MapsError::InvalidUrl(e.to_string()))
}
