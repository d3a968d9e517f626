//! Read-only map of one drain with its resolved address.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;
use crate::maps::{resolve_address, LatLng, MapSdk, MapStatus, MARKER_ZOOM};
use crate::views::location_picker::DEFAULT_GEOCODE_TIMEOUT;

/// Progress of the address lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressState {
    /// Lookup pending.
    Loading,
    /// Resolved address.
    Resolved(String),
    /// The lookup failed or found nothing.
    Unavailable,
}

impl AddressState {
    /// The text shown for this state.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Loading => "Loading address...",
            Self::Resolved(address) => address,
            Self::Unavailable => "Address not available",
        }
    }
}

/// The location viewer.
#[derive(Debug)]
pub struct LocationViewer {
    position: LatLng,
    title: String,
    status: MapStatus,
    sdk: Option<Arc<dyn MapSdk>>,
    address: AddressState,
    geocode_timeout: Duration,
}

impl LocationViewer {
    /// Create a viewer for a marker titled `title`.
    pub fn new(lat: f64, lng: f64, title: impl Into<String>) -> Self {
        Self {
            position: LatLng::new(lat, lng),
            title: title.into(),
            status: MapStatus::Loading,
            sdk: None,
            address: AddressState::Loading,
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
        }
    }

    /// Limit for the address lookup.
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

    /// The marker position.
    #[must_use]
    pub fn position(&self) -> LatLng {
        self.position
    }

    /// Address lookup progress.
    #[must_use]
    pub fn address(&self) -> &AddressState {
        &self.address
    }

    /// Always zoomed in on the marker.
    #[must_use]
    pub fn zoom(&self) -> u8 {
        MARKER_ZOOM
    }

    /// The map SDK finished loading, or failed to.
    pub async fn sdk_loaded(&mut self, sdk: Result<Arc<dyn MapSdk>>) {
        match sdk {
            Ok(sdk) => {
                self.sdk = Some(sdk);
                self.status = MapStatus::Ready;
                self.resolve().await;
            }
            Err(e) => {
                warn!("Map SDK failed to load: {e}");
                self.status = MapStatus::LoadError(e.user_message());
            }
        }
    }

    /// The parent changed the coordinates.
    pub async fn set_position(&mut self, lat: f64, lng: f64) {
        let at = LatLng::new(lat, lng);
        if at == self.position {
            return;
        }
        self.position = at;
        self.address = AddressState::Loading;
        if self.status.is_ready() {
            self.resolve().await;
        }
    }

    async fn resolve(&mut self) {
        let Some(sdk) = self.sdk.clone() else {
            return;
        };
        let at = self.position;
        let address = resolve_address(sdk.as_ref(), at, self.geocode_timeout).await;
        if at != self.position {
            return;
        }
        debug!(%at, found = address.is_some(), "Viewer address resolved");
        self.address = address.map_or(AddressState::Unavailable, AddressState::Resolved);
    }

    /// Text rendering of the view.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.status {
            MapStatus::Loading => return "Loading map...".to_string(),
            MapStatus::LoadError(_) => {
                return "Error loading map\nUnable to load Google Maps".to_string();
            }
            MapStatus::Ready => {}
        }

        let mut out = String::new();
        let _ = writeln!(out, "{} (zoom {})", self.title, self.zoom());
        let _ = writeln!(
            out,
            "Coordinates: Lat: {:.6}, Lng: {:.6}",
            self.position.lat, self.position.lng
        );
        let _ = writeln!(out, "Address:     {}", self.address.label());
        if let Ok(url) = drainadopt_maps::search_url(self.position) {
            let _ = writeln!(out, "Map:         {url}");
        }
        out
    }
}
