//! The drain screens.
//!
//! Each view owns its state and is driven through `&mut self` methods by its
//! host, which is the CLI in this crate. Failures never escape a view; they
//! become notifications and the view keeps its previous state.

pub mod drain_detail;
pub mod drain_list;
pub mod image_upload;
pub mod location_picker;
pub mod location_viewer;

pub use drain_detail::{DetailState, DrainDetail, EditForm};
pub use drain_list::{DrainList, ListState};
pub use image_upload::{ImageChanged, ImageUpload, SelectOutcome};
pub use location_picker::{LocationChanged, LocationPicker, DEFAULT_CENTER};
pub use location_viewer::{AddressState, LocationViewer};
