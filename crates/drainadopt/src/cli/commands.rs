//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Subcommand};

/// Drain commands.
#[derive(Debug, Subcommand)]
pub enum DrainCommand {
    /// List all drains
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show one drain
    Show {
        /// Drain ID
        id: i64,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Adopt a drain as the signed-in user
    Adopt {
        /// Drain ID
        id: i64,
    },

    /// Edit a drain (administrators only)
    Edit(EditCommand),

    /// Delete a drain (administrators only)
    Delete {
        /// Drain ID
        id: i64,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Edit command arguments. Omitted fields keep their current value.
#[derive(Debug, Args)]
#[command(allow_negative_numbers = true)]
pub struct EditCommand {
    /// Drain ID
    pub id: i64,

    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New image URL (empty string removes the image)
    #[arg(long, conflicts_with = "image_file")]
    pub image_url: Option<String>,

    /// Upload this file and use it as the new image
    #[arg(long, value_name = "FILE")]
    pub image_file: Option<PathBuf>,

    /// New latitude
    #[arg(long, requires = "lng")]
    pub lat: Option<f64>,

    /// New longitude
    #[arg(long, requires = "lat")]
    pub lng: Option<f64>,
}

impl EditCommand {
    /// Check if any field would change.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.image_url.is_some()
            || self.image_file.is_some()
            || self.lat.is_some()
    }
}

/// Image commands.
#[derive(Debug, Subcommand)]
pub enum ImageCommand {
    /// Validate and upload an image to the image host
    Upload {
        /// Image file to upload
        file: PathBuf,

        /// Image shown until the upload succeeds
        #[arg(long, value_name = "URL", default_value = "")]
        current_url: String,
    },
}

/// Location commands.
#[derive(Debug, Subcommand)]
pub enum LocationCommand {
    /// Show a position on the map with its address
    #[command(allow_negative_numbers = true)]
    View {
        /// Latitude
        lat: f64,

        /// Longitude
        lng: f64,

        /// Marker title
        #[arg(short, long, default_value = "Drain location")]
        name: String,
    },

    /// Choose a position by coordinates, search, or device location
    Pick(PickCommand),
}

/// Pick command arguments.
#[derive(Debug, Args)]
#[command(allow_negative_numbers = true)]
#[command(group(ArgGroup::new("action").required(true).args(["at", "search", "place_id", "current"])))]
pub struct PickCommand {
    /// Starting latitude
    #[arg(long, requires = "lng")]
    pub lat: Option<f64>,

    /// Starting longitude
    #[arg(long, requires = "lat")]
    pub lng: Option<f64>,

    /// Pick these coordinates, as if clicking the map
    #[arg(long, num_args = 2, value_names = ["LAT", "LNG"])]
    pub at: Option<Vec<f64>>,

    /// Search for an address or place
    #[arg(short, long)]
    pub search: Option<String>,

    /// Pick the Nth search suggestion (1-based)
    #[arg(long, requires = "search", value_name = "N")]
    pub choose: Option<usize>,

    /// Pick a place by its Google place ID
    #[arg(long)]
    pub place_id: Option<String>,

    /// Use the device's current location
    #[arg(long)]
    pub current: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
