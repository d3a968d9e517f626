//! `drainadopt` - Client for the storm drain adoption service
//!
//! This library provides the drain screens (detail, listing, image upload,
//! location picker and viewer) together with the clients they drive: the
//! drain REST API, Cloudinary for photos, and Google Maps for addresses.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod maps;
pub mod model;
pub mod ui;
pub mod upload;
pub mod views;

#[cfg(test)]
mod testing;

pub use api::{DrainApi, HttpDrainApi};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{AdoptionStatus, Drain, DrainUpdate, Role, Session, User};
pub use ui::{Notification, NotificationLevel, Notifier, Route, ViewContext};
