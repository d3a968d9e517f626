//! Reverse geocoding.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{check_status, Result};
use crate::GoogleMaps;

const GEOCODE_PATH: &str = "/maps/api/geocode/json";

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl LatLng {
    /// Create a new coordinate pair.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Geometry block of a geocoding or place result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Geometry {
    /// The representative point.
    pub location: LatLng,
}

/// One geocoding result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeResult {
    /// Human-readable address.
    pub formatted_address: String,
    /// Location of the result.
    pub geometry: Geometry,
    /// Stable place identifier.
    #[serde(default)]
    pub place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

impl GeocodeResponse {
    fn into_results(self) -> Result<Vec<GeocodeResult>> {
        if check_status(&self.status, self.error_message)? {
            Ok(self.results)
        } else {
            Ok(Vec::new())
        }
    }
}

impl GoogleMaps {
    /// Build the reverse geocoding request for a coordinate.
    #[must_use]
    pub fn reverse_geocode_request(&self, at: LatLng) -> reqwest::RequestBuilder {
        self.maps_get(GEOCODE_PATH)
            .query(&[("latlng", format!("{},{}", at.lat, at.lng))])
    }

    /// Resolve a coordinate to the formatted address of the best match.
    ///
    /// Returns `Ok(None)` when the service has no address for the point.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn reverse_geocode(&self, at: LatLng) -> Result<Option<String>> {
        debug!("Reverse geocoding {at}");
        let response: GeocodeResponse = self
            .reverse_geocode_request(at)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let address = response
            .into_results()?
            .into_iter()
            .next()
            .map(|r| r.formatted_address);
        trace!(?address, "Reverse geocode result");
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleMaps {
        GoogleMaps::new("test-key").unwrap()
    }

    #[test]
    fn test_latlng_display_six_decimals() {
        let at = LatLng::new(40.712_8, -74.006);
        assert_eq!(at.to_string(), "40.712800, -74.006000");
    }

    #[test]
    fn test_reverse_geocode_request_url() {
        let req = client()
            .reverse_geocode_request(LatLng::new(40.5, -74.25))
            .build()
            .unwrap();
        let url = req.url();
        assert_eq!(url.path(), "/maps/api/geocode/json");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("key".into(), "test-key".into())));
        assert!(pairs.contains(&("latlng".into(), "40.5,-74.25".into())));
    }

    #[test]
    fn test_parse_ok_response() {
        let json = r#"{
            "status": "OK",
            "results": [
                {
                    "formatted_address": "City Hall Park, New York, NY 10007, USA",
                    "geometry": { "location": { "lat": 40.7128, "lng": -74.006 } },
                    "place_id": "abc"
                }
            ]
        }"#;
        let response: GeocodeResponse = serde_json::from_str(json).unwrap();
        let results = response.into_results().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].formatted_address,
            "City Hall Park, New York, NY 10007, USA"
        );
        assert_eq!(results[0].geometry.location, LatLng::new(40.7128, -74.006));
    }

    #[test]
    fn test_parse_zero_results() {
        let json = r#"{ "status": "ZERO_RESULTS", "results": [] }"#;
        let response: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_results().unwrap().is_empty());
    }

    #[test]
    fn test_parse_denied() {
        let json = r#"{ "status": "REQUEST_DENIED", "error_message": "bad key" }"#;
        let response: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_results().is_err());
    }
}
