//! Places autocomplete and place details.
//!
//! Together these stand in for the autocomplete search box: the user types,
//! picks one of the predictions, and the chosen place is looked up for its
//! address and location.

use serde::Deserialize;
use tracing::debug;

use crate::error::{check_status, Result};
use crate::geocoding::{Geometry, LatLng};
use crate::GoogleMaps;

const AUTOCOMPLETE_PATH: &str = "/maps/api/place/autocomplete/json";
const DETAILS_PATH: &str = "/maps/api/place/details/json";
const DETAILS_FIELDS: &str = "formatted_address,geometry,name,place_id";

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Prediction {
    /// Text shown to the user.
    pub description: String,
    /// Identifier to pass to [`GoogleMaps::place_details`].
    pub place_id: String,
}

/// A resolved place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    /// Identifier of the place.
    #[serde(default)]
    pub place_id: Option<String>,
    /// Short display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Full formatted address.
    #[serde(default)]
    pub formatted_address: Option<String>,
    /// Geometry, absent for places without a fixed location.
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl Place {
    /// The place's location, if it has one.
    #[must_use]
    pub fn location(&self) -> Option<LatLng> {
        self.geometry.as_ref().map(|g| g.location)
    }
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<Prediction>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    result: Option<Place>,
    #[serde(default)]
    error_message: Option<String>,
}

impl GoogleMaps {
    /// Build the autocomplete request for partial input.
    #[must_use]
    pub fn autocomplete_request(&self, input: &str) -> reqwest::RequestBuilder {
        self.maps_get(AUTOCOMPLETE_PATH).query(&[("input", input)])
    }

    /// Fetch autocomplete predictions for partial input.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn autocomplete(&self, input: &str) -> Result<Vec<Prediction>> {
        debug!("Autocomplete for {input:?}");
        let response: AutocompleteResponse = self
            .autocomplete_request(input)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if check_status(&response.status, response.error_message)? {
            Ok(response.predictions)
        } else {
            Ok(Vec::new())
        }
    }

    /// Build the place details request.
    #[must_use]
    pub fn place_details_request(&self, place_id: &str) -> reqwest::RequestBuilder {
        self.maps_get(DETAILS_PATH)
            .query(&[("place_id", place_id), ("fields", DETAILS_FIELDS)])
    }

    /// Look up a place chosen from the autocomplete predictions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn place_details(&self, place_id: &str) -> Result<Option<Place>> {
        debug!("Place details for {place_id}");
        let response: DetailsResponse = self
            .place_details_request(place_id)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if check_status(&response.status, response.error_message)? {
            Ok(response.result)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleMaps {
        GoogleMaps::new("test-key").unwrap()
    }

    #[test]
    fn test_autocomplete_request_url() {
        let req = client().autocomplete_request("city hall").build().unwrap();
        assert_eq!(req.url().path(), "/maps/api/place/autocomplete/json");
        let pairs: Vec<(String, String)> = req.url().query_pairs().into_owned().collect();
        assert!(pairs.contains(&("input".into(), "city hall".into())));
    }

    #[test]
    fn test_details_request_asks_for_geometry() {
        let req = client().place_details_request("ChIJ123").build().unwrap();
        let pairs: Vec<(String, String)> = req.url().query_pairs().into_owned().collect();
        assert!(pairs.contains(&("place_id".into(), "ChIJ123".into())));
        assert!(pairs
            .iter()
            .any(|(k, v)| k == "fields" && v.contains("geometry")));
    }

    #[test]
    fn test_parse_predictions() {
        let json = r#"{
            "status": "OK",
            "predictions": [
                { "description": "City Hall, New York, NY, USA", "place_id": "p1" },
                { "description": "City Hall Park, New York, NY, USA", "place_id": "p2" }
            ]
        }"#;
        let response: AutocompleteResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.predictions.len(), 2);
        assert_eq!(response.predictions[1].place_id, "p2");
    }

    #[test]
    fn test_place_with_geometry() {
        let json = r#"{
            "status": "OK",
            "result": {
                "place_id": "p1",
                "name": "City Hall",
                "formatted_address": "City Hall, New York, NY 10007, USA",
                "geometry": { "location": { "lat": 40.7127, "lng": -74.0059 } }
            }
        }"#;
        let response: DetailsResponse = serde_json::from_str(json).unwrap();
        let place = response.result.unwrap();
        assert_eq!(place.location(), Some(LatLng::new(40.7127, -74.0059)));
    }

    #[test]
    fn test_place_without_geometry() {
        let place: Place = serde_json::from_str(r#"{ "name": "Somewhere" }"#).unwrap();
        assert!(place.location().is_none());
        assert!(place.formatted_address.is_none());
    }
}
