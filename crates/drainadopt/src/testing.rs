//! In-memory fakes for the service seams, shared by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::DrainApi;
use crate::error::{Error, Result};
use crate::maps::{Geolocator, LatLng, MapSdk, Place, Prediction};
use crate::model::{Drain, DrainUpdate, Role, Session, User};
use crate::ui::{FixedConfirm, HistoryNavigator, MemoryNotifier, ViewContext};
use crate::upload::{ImageHost, SelectedFile, UploadedImage};

/// A call the fake API received.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    List,
    Get(i64),
    Adopt {
        id: i64,
        user_id: i64,
        token: Option<String>,
    },
    Update {
        id: i64,
        user_id: i64,
        update: DrainUpdate,
    },
    Delete(i64),
}

/// Drain API backed by a map, with per-operation failure injection.
#[derive(Debug, Default)]
pub struct FakeDrainApi {
    drains: Mutex<BTreeMap<i64, Drain>>,
    calls: Mutex<Vec<ApiCall>>,
    failures: Mutex<HashMap<&'static str, (u16, String)>>,
}

impl FakeDrainApi {
    pub fn with_drains(drains: impl IntoIterator<Item = Drain>) -> Self {
        let api = Self::default();
        api.drains
            .lock()
            .unwrap()
            .extend(drains.into_iter().map(|d| (d.id, d)));
        api
    }

    /// Make every call to `op` fail with the given status and message.
    pub fn fail(&self, op: &'static str, status: u16, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(op, (status, message.to_string()));
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn adopt_calls(&self) -> usize {
        self.count(|c| matches!(c, ApiCall::Adopt { .. }))
    }

    pub fn drain(&self, id: i64) -> Option<Drain> {
        self.drains.lock().unwrap().get(&id).cloned()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: &'static str) -> Result<()> {
        match self.failures.lock().unwrap().get(op) {
            Some((status, message)) => Err(Error::api(*status, message.clone())),
            None => Ok(()),
        }
    }

    fn not_found(id: i64) -> Error {
        Error::api(404, format!("Drain not found with ID: {id}"))
    }
}

#[async_trait]
impl DrainApi for FakeDrainApi {
    async fn list_drains(&self) -> Result<Vec<Drain>> {
        self.record(ApiCall::List);
        self.check("list")?;
        Ok(self.drains.lock().unwrap().values().cloned().collect())
    }

    async fn get_drain(&self, id: i64) -> Result<Drain> {
        self.record(ApiCall::Get(id));
        self.check("get")?;
        self.drain(id).ok_or_else(|| Self::not_found(id))
    }

    async fn adopt_drain(&self, id: i64, user_id: i64, token: Option<&str>) -> Result<Drain> {
        self.record(ApiCall::Adopt {
            id,
            user_id,
            token: token.map(str::to_string),
        });
        self.check("adopt")?;
        let mut drains = self.drains.lock().unwrap();
        let drain = drains.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        if let Some(owner) = drain.adopted_by_user_id {
            return Err(Error::api(
                400,
                format!("Drain is already adopted by user with ID: {owner}"),
            ));
        }
        drain.adopted_by_user_id = Some(user_id);
        Ok(drain.clone())
    }

    async fn update_drain(
        &self,
        id: i64,
        user_id: i64,
        update: &DrainUpdate,
        _token: Option<&str>,
    ) -> Result<Drain> {
        self.record(ApiCall::Update {
            id,
            user_id,
            update: update.clone(),
        });
        self.check("update")?;
        let mut drains = self.drains.lock().unwrap();
        let drain = drains.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        if let Some(name) = &update.name {
            drain.name.clone_from(name);
        }
        if let Some(url) = &update.image_url {
            drain.image_url = Some(url.clone());
        }
        if let Some(lat) = update.latitude {
            drain.latitude = lat;
        }
        if let Some(lng) = update.longitude {
            drain.longitude = lng;
        }
        Ok(drain.clone())
    }

    async fn delete_drain(&self, id: i64, _token: Option<&str>) -> Result<()> {
        self.record(ApiCall::Delete(id));
        self.check("delete")?;
        self.drains
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }
}

/// Image host that returns a fixed URL or fails.
#[derive(Debug)]
pub struct FakeImageHost {
    url: Option<String>,
    calls: AtomicUsize,
}

impl FakeImageHost {
    pub fn hosting_at(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            url: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, _file: &SelectedFile) -> Result<UploadedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.url {
            Some(url) => Ok(UploadedImage {
                secure_url: url.clone(),
                public_id: None,
                width: None,
                height: None,
                format: None,
                bytes: None,
                created_at: None,
            }),
            None => Err(Error::Images(drainadopt_images::ImageError::Rejected {
                status: 500,
                message: "Upload failed".to_string(),
            })),
        }
    }
}

/// Map SDK with canned answers.
#[derive(Debug, Default)]
pub struct FakeMapSdk {
    address: Option<String>,
    fail: bool,
    delay: Option<Duration>,
    predictions: Vec<Prediction>,
    places: HashMap<String, Place>,
    geocode_calls: AtomicUsize,
}

impl FakeMapSdk {
    pub fn with_address(address: &str) -> Self {
        Self {
            address: Some(address.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_place(mut self, place_id: &str, description: &str, place: Place) -> Self {
        self.predictions.push(Prediction {
            description: description.to_string(),
            place_id: place_id.to_string(),
        });
        self.places.insert(place_id.to_string(), place);
        self
    }

    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    fn failure() -> Error {
        Error::Maps(drainadopt_maps::MapsError::Status {
            status: "REQUEST_DENIED".to_string(),
            message: "fake failure".to_string(),
        })
    }
}

#[async_trait]
impl MapSdk for FakeMapSdk {
    async fn reverse_geocode(&self, _at: LatLng) -> Result<Option<String>> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(Self::failure());
        }
        Ok(self.address.clone())
    }

    async fn autocomplete(&self, _input: &str) -> Result<Vec<Prediction>> {
        if self.fail {
            return Err(Self::failure());
        }
        Ok(self.predictions.clone())
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<Place>> {
        if self.fail {
            return Err(Self::failure());
        }
        Ok(self.places.get(place_id).cloned())
    }
}

/// Geolocator that knows a fixed position, or fails.
#[derive(Debug)]
pub struct FakeGeolocator(pub Option<LatLng>);

#[async_trait]
impl Geolocator for FakeGeolocator {
    async fn current_position(&self) -> Result<LatLng> {
        self.0.ok_or_else(|| {
            Error::Maps(drainadopt_maps::MapsError::Geolocation(
                "permission denied".to_string(),
            ))
        })
    }
}

pub fn place(lat: f64, lng: f64, address: &str) -> Place {
    serde_json::from_value(serde_json::json!({
        "formatted_address": address,
        "geometry": { "location": { "lat": lat, "lng": lng } }
    }))
    .unwrap()
}

pub fn sample_drain(id: i64) -> Drain {
    Drain {
        id,
        name: format!("Drain #{id}"),
        image_url: Some(format!("https://img.example/drains/{id}.jpg")),
        latitude: 40.712_776,
        longitude: -74.005_974,
        adopted_by_user_id: None,
    }
}

pub fn adopter_session() -> Session {
    Session::signed_in(
        User {
            id: 3,
            name: Some("Ada".to_string()),
            email: None,
            role: Role::Adopter,
        },
        Some("adopter-token".to_string()),
    )
}

pub fn admin_session() -> Session {
    Session::signed_in(
        User {
            id: 1,
            name: Some("Admin".to_string()),
            email: None,
            role: Role::Admin,
        },
        Some("admin-token".to_string()),
    )
}

pub struct Harness {
    pub ctx: ViewContext,
    pub api: Arc<FakeDrainApi>,
    pub notifier: Arc<MemoryNotifier>,
    pub navigator: Arc<HistoryNavigator>,
}

pub fn harness(api: FakeDrainApi, session: Session, confirm: bool) -> Harness {
    crate::logging::init_test_logging();
    let api = Arc::new(api);
    let notifier = Arc::new(MemoryNotifier::new());
    let navigator = Arc::new(HistoryNavigator::new());
    let ctx = ViewContext {
        api: api.clone(),
        session,
        notifier: notifier.clone(),
        navigator: navigator.clone(),
        confirm: Arc::new(FixedConfirm(confirm)),
    };
    Harness {
        ctx,
        api,
        notifier,
        navigator,
    }
}
