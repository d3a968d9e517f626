//! Detail screen for one drain: view, adopt, edit, delete.

use std::fmt::Write as _;

use tracing::{debug, info, warn};

use drainadopt_maps::GoogleMaps;

use crate::error::Error;
use crate::maps::EMBED_ZOOM;
use crate::model::{Drain, DrainUpdate};
use crate::ui::{Route, ViewContext};

/// What the detail screen is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// Waiting for the first response.
    Loading,
    /// The latest record from the server.
    Loaded(Drain),
    /// The server has no drain with this id.
    NotFound,
    /// The fetch failed.
    Failed(String),
}

/// Editable copy of a drain's fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EditForm {
    /// Display name.
    pub name: String,
    /// Photo URL; empty for none.
    pub image_url: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl EditForm {
    /// Start a form from the current record.
    #[must_use]
    pub fn from_drain(drain: &Drain) -> Self {
        Self {
            name: drain.name.clone(),
            image_url: drain.image_url.clone().unwrap_or_default(),
            latitude: drain.latitude,
            longitude: drain.longitude,
        }
    }

    /// The update this form submits.
    #[must_use]
    pub fn to_update(&self) -> DrainUpdate {
        DrainUpdate {
            name: Some(self.name.clone()),
            image_url: Some(self.image_url.clone()),
            latitude: Some(self.latitude),
            longitude: Some(self.longitude),
        }
    }
}

/// The drain detail view.
#[derive(Debug)]
pub struct DrainDetail {
    drain_id: i64,
    state: DetailState,
    edit: Option<EditForm>,
    ctx: ViewContext,
}

impl DrainDetail {
    /// Create the view for a drain id. Nothing is fetched until [`mount`](Self::mount).
    #[must_use]
    pub fn new(drain_id: i64, ctx: ViewContext) -> Self {
        Self {
            drain_id,
            state: DetailState::Loading,
            edit: None,
            ctx,
        }
    }

    /// The drain id from the route.
    #[must_use]
    pub fn drain_id(&self) -> i64 {
        self.drain_id
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &DetailState {
        &self.state
    }

    /// The loaded record, if any.
    #[must_use]
    pub fn drain(&self) -> Option<&Drain> {
        match &self.state {
            DetailState::Loaded(drain) => Some(drain),
            _ => None,
        }
    }

    /// The open edit form, if editing.
    #[must_use]
    pub fn edit_form(&self) -> Option<&EditForm> {
        self.edit.as_ref()
    }

    /// Mutable access to the open edit form.
    pub fn edit_form_mut(&mut self) -> Option<&mut EditForm> {
        self.edit.as_mut()
    }

    /// Check if the edit form is open.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// Initial fetch.
    pub async fn mount(&mut self) {
        self.refresh().await;
    }

    /// The route now points at a different drain.
    pub async fn set_drain_id(&mut self, drain_id: i64) {
        if drain_id == self.drain_id {
            return;
        }
        debug!(from = self.drain_id, to = drain_id, "Drain route changed");
        self.drain_id = drain_id;
        self.state = DetailState::Loading;
        self.edit = None;
        self.refresh().await;
    }

    /// Fetch the record again and mirror whatever comes back.
    pub async fn refresh(&mut self) {
        match self.ctx.api.get_drain(self.drain_id).await {
            Ok(drain) => {
                debug!(id = drain.id, status = %drain.status(), "Drain loaded");
                self.state = DetailState::Loaded(drain);
            }
            Err(e) if e.is_not_found() => {
                debug!(id = self.drain_id, "Drain not found");
                self.state = DetailState::NotFound;
            }
            Err(e) => {
                warn!("Failed to load drain {}: {e}", self.drain_id);
                self.state = DetailState::Failed(e.user_message());
            }
        }
    }

    /// Check if the adopt action should be offered.
    #[must_use]
    pub fn can_adopt(&self) -> bool {
        self.drain().is_some_and(|d| !d.is_adopted())
    }

    /// Check if the edit action should be offered.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.drain().is_some() && self.ctx.session.is_admin()
    }

    /// Check if the delete action should be offered.
    #[must_use]
    pub fn can_delete(&self) -> bool {
        self.can_edit()
    }

    /// Adopt the drain as the signed-in user.
    ///
    /// Without a signed-in user this sends the user to the login screen and
    /// makes no request.
    pub async fn adopt(&mut self) {
        let Some(user) = self.ctx.session.user() else {
            info!("Adopt requested without a session; redirecting to login");
            self.ctx.navigator.navigate(Route::Login);
            return;
        };
        let user_id = user.id;

        match self.drain() {
            None => {
                self.ctx.notifier.error("Drain details are not loaded yet");
                return;
            }
            Some(drain) if drain.is_adopted() => {
                self.ctx
                    .notifier
                    .error("This drain has already been adopted");
                return;
            }
            Some(_) => {}
        }

        let result = self
            .ctx
            .api
            .adopt_drain(self.drain_id, user_id, self.ctx.session.token())
            .await;
        match result {
            Ok(_) => {
                info!(drain = self.drain_id, user = user_id, "Drain adopted");
                self.ctx.notifier.success("Successfully adopted the drain!");
                self.refresh().await;
            }
            Err(e) => self.report("adopt", &e),
        }
    }

    /// Open the edit form. Administrators only.
    pub fn start_editing(&mut self) {
        if !self.ensure_admin("edit drains") {
            return;
        }
        if let Some(drain) = self.drain() {
            self.edit = Some(EditForm::from_drain(drain));
        }
    }

    /// Close the edit form without saving.
    pub fn cancel_editing(&mut self) {
        self.edit = None;
    }

    /// Submit the edit form.
    pub async fn save_edit(&mut self) {
        if !self.ensure_admin("edit drains") {
            return;
        }
        let Some(form) = &self.edit else {
            return;
        };
        let Some(user) = self.ctx.session.user() else {
            return;
        };

        let update = form.to_update();
        let result = self
            .ctx
            .api
            .update_drain(self.drain_id, user.id, &update, self.ctx.session.token())
            .await;
        match result {
            Ok(_) => {
                info!(drain = self.drain_id, "Drain updated");
                self.ctx.notifier.success("Successfully updated the drain!");
                self.edit = None;
                self.refresh().await;
            }
            Err(e) => self.report("update", &e),
        }
    }

    /// Delete the drain after confirmation, then go back to the listing.
    pub async fn delete(&mut self) {
        if !self.ensure_admin("delete drains") {
            return;
        }
        let name = self
            .drain()
            .map_or_else(|| format!("drain {}", self.drain_id), |d| d.name.clone());
        if !self
            .ctx
            .confirm
            .confirm(&format!("Are you sure you want to delete \"{name}\"?"))
        {
            debug!(drain = self.drain_id, "Delete cancelled");
            return;
        }

        match self
            .ctx
            .api
            .delete_drain(self.drain_id, self.ctx.session.token())
            .await
        {
            Ok(()) => {
                info!(drain = self.drain_id, "Drain deleted");
                self.ctx.notifier.success("Drain deleted successfully");
                self.ctx.navigator.navigate(Route::DrainList);
            }
            Err(e) => self.report("delete", &e),
        }
    }

    fn ensure_admin(&self, action: &'static str) -> bool {
        if self.ctx.session.is_admin() {
            true
        } else {
            self.ctx
                .notifier
                .error(&Error::Forbidden { action }.user_message());
            false
        }
    }

    fn report(&self, action: &str, err: &Error) {
        warn!(drain = self.drain_id, "Failed to {action} drain: {err}");
        self.ctx.notifier.error(&err.user_message());
    }

    /// URL of the embedded map centered on the drain.
    #[must_use]
    pub fn embed_url(&self, maps: &GoogleMaps) -> Option<String> {
        let drain = self.drain()?;
        match maps.embed_url(drain.location(), EMBED_ZOOM) {
            Ok(url) => Some(url.into()),
            Err(e) => {
                warn!(drain = drain.id, "Failed to build embed URL: {e}");
                None
            }
        }
    }

    /// Text rendering of the screen.
    #[must_use]
    pub fn render(&self) -> String {
        let drain = match &self.state {
            DetailState::Loading => return "Loading drain details...".to_string(),
            DetailState::NotFound => return "No drain found".to_string(),
            DetailState::Failed(message) => return format!("Error: {message}"),
            DetailState::Loaded(drain) => drain,
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", drain.name);
        let _ = writeln!(
            out,
            "  Image:       {}",
            drain.image_url.as_deref().unwrap_or("(none)")
        );
        let _ = writeln!(out, "  Status:      {}", drain.status());
        let _ = writeln!(out, "  Coordinates: {}", drain.coordinates_text());
        if let Ok(url) = drain.maps_url() {
            let _ = writeln!(out, "  Map:         {url}");
        }

        let mut actions = Vec::new();
        if self.can_adopt() {
            actions.push("adopt");
        }
        if self.can_edit() {
            actions.push("edit");
        }
        if self.can_delete() {
            actions.push("delete");
        }
        if !actions.is_empty() {
            let _ = writeln!(out, "  Actions:     {}", actions.join(", "));
        }
        out
    }
}
