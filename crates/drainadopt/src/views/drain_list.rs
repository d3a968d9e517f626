//! Listing of every drain.

use std::fmt::Write as _;

use tracing::{debug, warn};

use crate::model::Drain;
use crate::ui::ViewContext;

/// What the listing is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    /// Waiting for the response.
    Loading,
    /// Drains in server order.
    Loaded(Vec<Drain>),
    /// The fetch failed.
    Failed(String),
}

/// The drain listing view.
#[derive(Debug)]
pub struct DrainList {
    state: ListState,
    ctx: ViewContext,
}

impl DrainList {
    /// Create the view. Nothing is fetched until [`mount`](Self::mount).
    #[must_use]
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            state: ListState::Loading,
            ctx,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// Loaded drains; empty while loading or after a failure.
    #[must_use]
    pub fn drains(&self) -> &[Drain] {
        match &self.state {
            ListState::Loaded(drains) => drains,
            _ => &[],
        }
    }

    /// Fetch the listing.
    pub async fn mount(&mut self) {
        match self.ctx.api.list_drains().await {
            Ok(drains) => {
                debug!(count = drains.len(), "Drains loaded");
                self.state = ListState::Loaded(drains);
            }
            Err(e) => {
                warn!("Failed to load drains: {e}");
                self.state = ListState::Failed(e.user_message());
            }
        }
    }

    /// Number of drains nobody has adopted.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.drains().iter().filter(|d| !d.is_adopted()).count()
    }

    /// Number of adopted drains.
    #[must_use]
    pub fn adopted_count(&self) -> usize {
        self.drains().iter().filter(|d| d.is_adopted()).count()
    }

    /// Text rendering of the listing.
    #[must_use]
    pub fn render(&self) -> String {
        let drains = match &self.state {
            ListState::Loading => return "Loading drains...".to_string(),
            ListState::Failed(message) => return format!("Error: {message}"),
            ListState::Loaded(drains) => drains,
        };
        if drains.is_empty() {
            return "No drains found.".to_string();
        }

        let name_width = drains
            .iter()
            .map(|d| d.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(4);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>6}  {:<name_width$}  {:<9}  COORDINATES",
            "ID", "NAME", "STATUS"
        );
        for drain in drains {
            let _ = writeln!(
                out,
                "{:>6}  {:<name_width$}  {:<9}  {}",
                drain.id,
                drain.name,
                drain.status().to_string(),
                drain.coordinates_text()
            );
        }
        let _ = writeln!(
            out,
            "\n{} drains: {} available, {} adopted",
            drains.len(),
            self.available_count(),
            self.adopted_count()
        );
        out
    }
}
