//! Configuration management for Palimpsest.
//!
//! This module provides the command-line interface:
//! - Command-line arguments via clap
//! - Environment variables with `PALIMPSEST_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Environment Variables
//!
//! - `PALIMPSEST_FETCH_TIMEOUT_SECS` - Timeout for info document fetches (default: 10)
//! - `PALIMPSEST_DEFAULT_EXTENT` - Side of the square fallback extent (default: 1000)
//! - `PALIMPSEST_THUMBNAIL_SIZE` - Thumbnail width for region URLs (default: 200)

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::image::{ImageRequest, DEFAULT_EXTENT_SIDE, DEFAULT_THUMBNAIL_SIZE};

// =============================================================================
// Default Values
// =============================================================================

/// Default info document fetch timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Palimpsest - annotation geometry and IIIF image addressing.
///
/// Translates stored annotation polygons to fragment selectors and back, and
/// builds IIIF Image API URLs for annotated regions.
#[derive(Parser, Debug, Clone)]
#[command(name = "palimpsest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub address: AddressConfig,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings for image addressing.
#[derive(Args, Debug, Clone)]
pub struct AddressConfig {
    /// Timeout for fetching an image's info document, in seconds.
    ///
    /// On timeout the image falls back to the default extent.
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_FETCH_TIMEOUT_SECS,
        env = "PALIMPSEST_FETCH_TIMEOUT_SECS"
    )]
    pub fetch_timeout_secs: u64,

    /// Side length of the square extent used when metadata is unavailable.
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_EXTENT_SIDE,
        env = "PALIMPSEST_DEFAULT_EXTENT"
    )]
    pub default_extent: u32,

    /// Thumbnail width requested for annotated regions.
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_THUMBNAIL_SIZE,
        env = "PALIMPSEST_THUMBNAIL_SIZE"
    )]
    pub thumbnail_size: u32,
}

impl AddressConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than 0".to_string());
        }
        if self.default_extent == 0 {
            return Err("default_extent must be greater than 0".to_string());
        }
        if self.thumbnail_size == 0 {
            return Err("thumbnail_size must be greater than 0".to_string());
        }
        Ok(())
    }

    /// The fetch timeout as a duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            default_extent: DEFAULT_EXTENT_SIDE,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the thumbnail URL of an annotated region.
    RegionUrl(RegionUrlConfig),

    /// Print the URL of a whole image scaled by a factor.
    ScaledUrl(ScaledUrlConfig),

    /// Print a URL composed from explicit request parameters.
    FullUrl(FullUrlConfig),

    /// Translate stored annotation records into viewer annotations.
    ToViewer(ToViewerConfig),

    /// Translate viewer annotations into storage records.
    ToStored(ToStoredConfig),
}

/// Arguments for `region-url`.
#[derive(Args, Debug, Clone)]
pub struct RegionUrlConfig {
    /// Image base URI (an info.json URL is accepted too).
    #[arg(long)]
    pub base: String,

    /// Fragment selector value, e.g. `xywh=pixel:10,20,30,40`.
    #[arg(long)]
    pub selector: String,
}

/// Arguments for `scaled-url`.
#[derive(Args, Debug, Clone)]
pub struct ScaledUrlConfig {
    /// Image base URI.
    #[arg(long)]
    pub base: String,

    /// Scale factor; 1 or more requests the largest deliverable size.
    #[arg(long)]
    pub scale: f64,
}

/// Arguments for `full-url`.
#[derive(Args, Debug, Clone)]
pub struct FullUrlConfig {
    /// Image base URI.
    #[arg(long)]
    pub base: String,

    #[arg(long, default_value = "full")]
    pub region: String,

    #[arg(long, default_value = "max")]
    pub size: String,

    #[arg(long, default_value = "0")]
    pub rotation: String,

    #[arg(long, default_value = "default")]
    pub quality: String,

    #[arg(long, default_value = "jpg")]
    pub format: String,
}

impl FullUrlConfig {
    pub fn request(&self) -> ImageRequest {
        ImageRequest {
            region: self.region.clone(),
            size: self.size.clone(),
            rotation: self.rotation.clone(),
            quality: self.quality.clone(),
            format: self.format.clone(),
        }
    }
}

/// Arguments for `to-viewer`.
#[derive(Args, Debug, Clone)]
pub struct ToViewerConfig {
    /// JSON array of stored records; `-` reads stdin.
    #[arg(long, default_value = "-")]
    pub input: PathBuf,

    /// Height of the image in pixels, used to flip into pixel space.
    #[arg(long)]
    pub image_height: u32,

    /// JSON object mapping allograph ids to labels.
    #[arg(long)]
    pub labels: Option<PathBuf>,
}

/// Arguments for `to-stored`.
#[derive(Args, Debug, Clone)]
pub struct ToStoredConfig {
    /// JSON array of viewer annotations; `-` reads stdin.
    #[arg(long, default_value = "-")]
    pub input: PathBuf,

    /// Flip back into storage space using this image height.
    ///
    /// Without it, pixel coordinates are written unchanged.
    #[arg(long)]
    pub image_height: Option<u32>,
}

// =============================================================================
// Tests
// =============================================================================
