//! Command-line interface for drainadopt.
//!
//! This module provides the CLI structure for the `drainadopt` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DrainCommand, EditCommand, ImageCommand, LocationCommand, PickCommand,
};

/// drainadopt - Adopt a storm drain
///
/// Browse drains, adopt one, and (as an administrator) edit or remove them.
/// Images go to Cloudinary; locations are resolved with Google Maps.
#[derive(Debug, Parser)]
#[command(name = "drainadopt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse, adopt, edit, and delete drains
    #[command(subcommand)]
    Drain(DrainCommand),

    /// Upload drain photos
    #[command(subcommand)]
    Image(ImageCommand),

    /// View or pick locations on the map
    #[command(subcommand)]
    Location(LocationCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
