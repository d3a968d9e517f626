//! Interactive map for choosing a drain's location.
//!
//! The user can click the map, search for a place, or ask for the device
//! position. Every choice moves the marker, reports the new coordinates to
//! the parent, and then resolves a human readable address. Address lookup is
//! best effort: a failure only leaves the address unset.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::maps::{
    resolve_address, Geolocator, LatLng, MapSdk, MapStatus, Prediction, MARKER_ZOOM, OVERVIEW_ZOOM,
};
use crate::ui::Notifier;

/// Map center when no coordinates are given.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 40.7128,
    lng: -74.0060,
};

/// How long an address lookup may take.
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);

/// Receives the coordinates the user picked.
pub type LocationChanged = Box<dyn FnMut(LatLng) + Send>;

/// The location picker view.
pub struct LocationPicker {
    status: MapStatus,
    sdk: Option<Arc<dyn MapSdk>>,
    geolocator: Option<Arc<dyn Geolocator>>,
    center: LatLng,
    marker: Option<LatLng>,
    address: Option<String>,
    predictions: Vec<Prediction>,
    disabled: bool,
    geocode_timeout: Duration,
    notifier: Arc<dyn Notifier>,
    on_change: LocationChanged,
}

impl std::fmt::Debug for LocationPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationPicker")
            .field("status", &self.status)
            .field("center", &self.center)
            .field("marker", &self.marker)
            .field("address", &self.address)
            .field("predictions", &self.predictions.len())
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl LocationPicker {
    /// Create a picker, optionally starting at known coordinates.
    pub fn new(
        initial: Option<LatLng>,
        notifier: Arc<dyn Notifier>,
        on_change: LocationChanged,
    ) -> Self {
        Self {
            status: MapStatus::Loading,
            sdk: None,
            geolocator: None,
            center: initial.unwrap_or(DEFAULT_CENTER),
            marker: initial,
            address: None,
            predictions: Vec::new(),
            disabled: false,
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
            notifier,
            on_change,
        }
    }

    /// Center to use when no coordinates were given.
    #[must_use]
    pub fn with_default_center(mut self, center: LatLng) -> Self {
        if self.marker.is_none() {
            self.center = center;
        }
        self
    }

    /// Provider for "use my current location".
    #[must_use]
    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator>) -> Self {
        self.geolocator = Some(geolocator);
        self
    }

    /// Set the disabled flag.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Limit for each address lookup.
    #[must_use]
    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout = timeout;
        self
    }

    /// Lifecycle of the map SDK.
    #[must_use]
    pub fn status(&self) -> &MapStatus {
        &self.status
    }

    /// Where the map is centered.
    #[must_use]
    pub fn center(&self) -> LatLng {
        self.center
    }

    /// The selected position.
    #[must_use]
    pub fn marker(&self) -> Option<LatLng> {
        self.marker
    }

    /// Address of the selected position, once resolved.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Suggestions from the last search.
    #[must_use]
    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// Zoom in when something is selected.
    #[must_use]
    pub fn zoom(&self) -> u8 {
        if self.marker.is_some() {
            MARKER_ZOOM
        } else {
            OVERVIEW_ZOOM
        }
    }

    /// The map SDK finished loading, or failed to.
    ///
    /// A failure is terminal. On success the address of any initial
    /// coordinates is resolved.
    pub async fn sdk_loaded(&mut self, sdk: Result<Arc<dyn MapSdk>>) {
        match sdk {
            Ok(sdk) => {
                debug!("Map SDK ready");
                self.sdk = Some(sdk);
                self.status = MapStatus::Ready;
                if let Some(at) = self.marker {
                    self.lookup_address(at).await;
                }
            }
            Err(e) => {
                warn!("Map SDK failed to load: {e}");
                self.status = MapStatus::LoadError(e.user_message());
            }
        }
    }

    /// The parent changed the coordinates. Does not call back.
    pub async fn set_coordinates(&mut self, lat: f64, lng: f64) {
        let at = LatLng::new(lat, lng);
        if self.marker == Some(at) {
            return;
        }
        self.center = at;
        self.marker = Some(at);
        self.address = None;
        if self.status.is_ready() {
            self.lookup_address(at).await;
        }
    }

    /// The user clicked the map.
    pub async fn click_map(&mut self, lat: f64, lng: f64) {
        if self.disabled || !self.status.is_ready() {
            return;
        }
        let at = LatLng::new(lat, lng);
        debug!(%at, "Map clicked");
        self.marker = Some(at);
        self.address = None;
        (self.on_change)(at);
        self.lookup_address(at).await;
    }

    /// Fetch place suggestions for the search box.
    pub async fn search(&mut self, query: &str) -> &[Prediction] {
        self.predictions.clear();
        let query = query.trim();
        if self.disabled || query.is_empty() {
            return &self.predictions;
        }
        let Some(sdk) = self.ready_sdk() else {
            return &self.predictions;
        };

        match sdk.autocomplete(query).await {
            Ok(predictions) => {
                debug!(query, count = predictions.len(), "Place suggestions");
                self.predictions = predictions;
            }
            Err(e) => {
                warn!("Place search for {query:?} failed: {e}");
                self.notifier.error("Unable to search for that address");
            }
        }
        &self.predictions
    }

    /// The user picked a suggestion.
    pub async fn select_place(&mut self, place_id: &str) {
        if self.disabled {
            return;
        }
        let Some(sdk) = self.ready_sdk() else {
            return;
        };

        let place = match sdk.place_details(place_id).await {
            Ok(Some(place)) => place,
            Ok(None) => {
                debug!(place_id, "Place not found");
                return;
            }
            Err(e) => {
                warn!("Place lookup for {place_id} failed: {e}");
                self.notifier.error("Unable to look up that place");
                return;
            }
        };

        // places without geometry cannot be shown on the map
        let Some(at) = place.location() else {
            debug!(place_id, "Selected place has no geometry");
            return;
        };

        info!(%at, "Place selected");
        self.center = at;
        self.marker = Some(at);
        self.address = place.formatted_address;
        self.predictions.clear();
        (self.on_change)(at);
        self.notifier.success("Location selected!");
    }

    /// Move to the device's position.
    pub async fn use_current_location(&mut self) {
        if self.disabled || !self.status.is_ready() {
            return;
        }
        let Some(geolocator) = self.geolocator.clone() else {
            self.notifier.error("Geolocation is not supported");
            return;
        };

        self.notifier.info("Getting your location...");
        match geolocator.current_position().await {
            Ok(at) => {
                info!(%at, "Using current location");
                self.center = at;
                self.marker = Some(at);
                self.address = None;
                (self.on_change)(at);
                self.lookup_address(at).await;
                self.notifier.success("Location detected!");
            }
            Err(e) => {
                warn!("Geolocation failed: {e}");
                self.notifier.error(
                    "Unable to get your location. Please click on the map or search for an address.",
                );
            }
        }
    }

    fn ready_sdk(&self) -> Option<Arc<dyn MapSdk>> {
        if self.status.is_ready() {
            self.sdk.clone()
        } else {
            None
        }
    }

    async fn lookup_address(&mut self, at: LatLng) {
        let Some(sdk) = self.sdk.clone() else {
            return;
        };
        let address = resolve_address(sdk.as_ref(), at, self.geocode_timeout).await;
        // a newer selection may have replaced the marker meanwhile
        if self.marker == Some(at) {
            self.address = address;
        }
    }

    /// Text rendering of the view.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.status {
            MapStatus::Loading => return "Loading map...".to_string(),
            MapStatus::LoadError(message) => {
                return format!(
                    "Error loading Google Maps: {message}\n\
                     Please check your API key and internet connection"
                );
            }
            MapStatus::Ready => {}
        }

        let mut out = String::new();
        let _ = writeln!(out, "Map centered on {} (zoom {})", self.center, self.zoom());
        match self.marker {
            Some(at) => {
                let _ = writeln!(out, "Coordinates: Lat: {:.6}, Lng: {:.6}", at.lat, at.lng);
                let _ = writeln!(
                    out,
                    "Address:     {}",
                    self.address.as_deref().unwrap_or("Fetching address...")
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "Click on the map, search for an address, or use your current location"
                );
            }
        }
        for (i, prediction) in self.predictions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, prediction.description);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::Error;
    use crate::testing::{place, FakeGeolocator, FakeMapSdk};
    use crate::ui::MemoryNotifier;

    struct Fixture {
        picker: LocationPicker,
        notifier: Arc<MemoryNotifier>,
        picked: Arc<Mutex<Vec<LatLng>>>,
    }

    fn fixture(initial: Option<LatLng>) -> Fixture {
        let notifier = Arc::new(MemoryNotifier::new());
        let picked = Arc::new(Mutex::new(Vec::new()));
        let sink = picked.clone();
        let picker = LocationPicker::new(
            initial,
            notifier.clone(),
            Box::new(move |at: LatLng| sink.lock().unwrap().push(at)),
        );
        Fixture {
            picker,
            notifier,
            picked,
        }
    }

    async fn ready(f: &mut Fixture, sdk: FakeMapSdk) {
        let sdk: Arc<dyn MapSdk> = Arc::new(sdk);
        f.picker.sdk_loaded(Ok(sdk)).await;
    }

    #[test]
    fn test_defaults_without_coordinates() {
        let f = fixture(None);
        assert_eq!(f.picker.center(), DEFAULT_CENTER);
        assert_eq!(f.picker.zoom(), 12);
        assert!(f.picker.marker().is_none());
        assert_eq!(f.picker.render(), "Loading map...");
    }

    #[test]
    fn test_initial_coordinates() {
        let at = LatLng::new(41.0, -73.0);
        let f = fixture(Some(at));
        assert_eq!(f.picker.center(), at);
        assert_eq!(f.picker.marker(), Some(at));
        assert_eq!(f.picker.zoom(), 16);
    }

    #[test]
    fn test_with_default_center_only_without_marker() {
        let other = LatLng::new(51.5, -0.12);
        let f = fixture(None);
        assert_eq!(f.picker.with_default_center(other).center(), other);

        let at = LatLng::new(41.0, -73.0);
        let f = fixture(Some(at));
        assert_eq!(f.picker.with_default_center(other).center(), at);
    }

    #[tokio::test]
    async fn test_load_error_is_terminal() {
        let mut f = fixture(None);
        f.picker
            .sdk_loaded(Err(Error::Maps(drainadopt_maps::MapsError::MissingApiKey)))
            .await;

        assert!(matches!(f.picker.status(), MapStatus::LoadError(_)));
        assert!(f.picker.render().starts_with("Error loading Google Maps"));

        f.picker.click_map(40.0, -74.0).await;
        assert!(f.picker.marker().is_none());
        assert!(f.picked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_interactions_ignored_until_ready() {
        let mut f = fixture(None);
        f.picker.click_map(40.0, -74.0).await;
        f.picker.use_current_location().await;

        assert!(f.picker.marker().is_none());
        assert!(f.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_ready_resolves_initial_address() {
        let mut f = fixture(Some(LatLng::new(40.7, -74.0)));
        ready(&mut f, FakeMapSdk::with_address("1 Centre St")).await;
        assert_eq!(f.picker.address(), Some("1 Centre St"));
    }

    #[tokio::test]
    async fn test_click_moves_marker_and_calls_back() {
        let mut f = fixture(None);
        ready(&mut f, FakeMapSdk::with_address("5 Main St")).await;

        f.picker.click_map(40.75, -73.99).await;

        let at = LatLng::new(40.75, -73.99);
        assert_eq!(f.picker.marker(), Some(at));
        assert_eq!(*f.picked.lock().unwrap(), vec![at]);
        assert_eq!(f.picker.address(), Some("5 Main St"));
        assert_eq!(f.picker.zoom(), 16);
        assert!(f
            .picker
            .render()
            .contains("Coordinates: Lat: 40.750000, Lng: -73.990000"));
    }

    #[tokio::test]
    async fn test_disabled_ignores_clicks_and_geolocation() {
        let mut f = fixture(None);
        f.picker = f
            .picker
            .with_disabled(true)
            .with_geolocator(Arc::new(FakeGeolocator(Some(LatLng::new(1.0, 2.0)))));
        ready(&mut f, FakeMapSdk::with_address("x")).await;

        f.picker.click_map(40.0, -74.0).await;
        f.picker.use_current_location().await;

        assert!(f.picker.marker().is_none());
        assert!(f.picked.lock().unwrap().is_empty());
        assert!(f.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_geocode_failure_leaves_address_unset() {
        let mut f = fixture(None);
        ready(&mut f, FakeMapSdk::failing()).await;
        f.picker.click_map(40.0, -74.0).await;

        assert!(f.picker.marker().is_some());
        assert!(f.picker.address().is_none());
        assert!(f.picker.render().contains("Fetching address..."));
        assert!(f.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_set_coordinates_does_not_call_back() {
        let mut f = fixture(None);
        ready(&mut f, FakeMapSdk::with_address("9 Elm St")).await;
        f.picker.set_coordinates(42.0, -71.0).await;

        let at = LatLng::new(42.0, -71.0);
        assert_eq!(f.picker.center(), at);
        assert_eq!(f.picker.marker(), Some(at));
        assert_eq!(f.picker.address(), Some("9 Elm St"));
        assert!(f.picked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_and_select_place() {
        let sdk = FakeMapSdk::default().with_place(
            "pl-1",
            "City Hall, New York",
            place(40.7127, -74.0059, "City Hall Park, New York, NY 10007"),
        );
        let mut f = fixture(None);
        ready(&mut f, sdk).await;

        let predictions = f.picker.search("city hall").await;
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].place_id, "pl-1");

        f.picker.select_place("pl-1").await;

        let at = LatLng::new(40.7127, -74.0059);
        assert_eq!(f.picker.center(), at);
        assert_eq!(f.picker.marker(), Some(at));
        assert_eq!(
            f.picker.address(),
            Some("City Hall Park, New York, NY 10007")
        );
        assert_eq!(*f.picked.lock().unwrap(), vec![at]);
        assert_eq!(f.notifier.messages(), vec!["Location selected!"]);
        assert!(f.picker.predictions().is_empty());
    }

    #[tokio::test]
    async fn test_place_without_geometry_ignored() {
        let no_geometry: crate::maps::Place =
            serde_json::from_value(serde_json::json!({ "name": "Somewhere" })).unwrap();
        let sdk = FakeMapSdk::default().with_place("pl-2", "Somewhere", no_geometry);
        let mut f = fixture(None);
        ready(&mut f, sdk).await;

        f.picker.select_place("pl-2").await;

        assert!(f.picker.marker().is_none());
        assert!(f.picked.lock().unwrap().is_empty());
        assert!(f.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_notifies() {
        let mut f = fixture(None);
        ready(&mut f, FakeMapSdk::failing()).await;
        assert!(f.picker.search("anything").await.is_empty());
        assert_eq!(
            f.notifier.messages(),
            vec!["Unable to search for that address"]
        );
    }

    #[tokio::test]
    async fn test_current_location_success() {
        let here = LatLng::new(40.73, -73.99);
        let mut f = fixture(None);
        f.picker = f
            .picker
            .with_geolocator(Arc::new(FakeGeolocator(Some(here))));
        ready(&mut f, FakeMapSdk::with_address("Union Sq")).await;

        f.picker.use_current_location().await;

        assert_eq!(f.picker.center(), here);
        assert_eq!(f.picker.marker(), Some(here));
        assert_eq!(f.picker.address(), Some("Union Sq"));
        assert_eq!(*f.picked.lock().unwrap(), vec![here]);
        assert_eq!(
            f.notifier.messages(),
            vec!["Getting your location...", "Location detected!"]
        );
    }

    #[tokio::test]
    async fn test_current_location_failure() {
        let mut f = fixture(None);
        f.picker = f.picker.with_geolocator(Arc::new(FakeGeolocator(None)));
        ready(&mut f, FakeMapSdk::with_address("x")).await;

        f.picker.use_current_location().await;

        assert!(f.picker.marker().is_none());
        assert_eq!(
            f.notifier.last().unwrap().message,
            "Unable to get your location. Please click on the map or search for an address."
        );
    }

    #[tokio::test]
    async fn test_no_geolocator() {
        let mut f = fixture(None);
        ready(&mut f, FakeMapSdk::with_address("x")).await;
        f.picker.use_current_location().await;
        assert_eq!(f.notifier.messages(), vec!["Geolocation is not supported"]);
    }
}
