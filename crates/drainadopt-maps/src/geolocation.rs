//! Device position lookup through the Geolocation API.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{MapsError, Result};
use crate::geocoding::LatLng;
use crate::{GoogleMaps, DEFAULT_GEOLOCATION_BASE_URL};

const GEOLOCATE_PATH: &str = "/geolocation/v1/geolocate";

/// A located position.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Position {
    /// Estimated coordinates.
    pub location: LatLng,
    /// Accuracy radius in meters.
    pub accuracy: f64,
}

#[derive(Debug, Deserialize)]
struct GeolocationErrorBody {
    error: GeolocationErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeolocationErrorDetail {
    #[serde(default)]
    message: String,
}

impl GoogleMaps {
    /// Build the geolocation request.
    ///
    /// Without cell tower or Wi-Fi data the service falls back to the
    /// caller's IP address.
    #[must_use]
    pub fn geolocate_request(&self) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{DEFAULT_GEOLOCATION_BASE_URL}{GEOLOCATE_PATH}"))
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "considerIp": true }))
    }

    /// Determine the current device position.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Geolocation`] if the service cannot locate the
    /// device, or an HTTP error if the request fails.
    pub async fn geolocate(&self) -> Result<Position> {
        debug!("Requesting device geolocation");
        let response = self.geolocate_request().send().await?;

        if response.status().is_success() {
            return Ok(response.json().await?);
        }

        let status = response.status();
        let body = response.text().await?;
        Err(MapsError::Geolocation(parse_error(status.as_u16(), &body)))
    }
}

fn parse_error(status: u16, body: &str) -> String {
    serde_json::from_str::<GeolocationErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geolocate_request() {
        let maps = GoogleMaps::new("k").unwrap();
        let req = maps.geolocate_request().build().unwrap();
        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(
            req.url().as_str(),
            "https://www.googleapis.com/geolocation/v1/geolocate?key=k"
        );
        let body = req.body().and_then(reqwest::Body::as_bytes).unwrap();
        let value: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(value["considerIp"], true);
    }

    #[test]
    fn test_parse_position() {
        let json = r#"{ "location": { "lat": 51.5, "lng": -0.12 }, "accuracy": 1200.0 }"#;
        let position: Position = serde_json::from_str(json).unwrap();
        assert_eq!(position.location, LatLng::new(51.5, -0.12));
        assert!((position.accuracy - 1200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_error_message() {
        let body = r#"{ "error": { "code": 404, "message": "Not Found", "errors": [] } }"#;
        assert_eq!(parse_error(404, body), "Not Found");
    }

    #[test]
    fn test_parse_error_fallback() {
        assert_eq!(parse_error(503, "upstream down"), "HTTP 503");
    }
}
