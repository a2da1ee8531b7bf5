//! Palimpsest - annotation geometry and IIIF addressing from the command line.
//!
//! This binary wires the library to stdin/stdout: JSON and URLs go to stdout,
//! logs go to stderr.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use palimpsest::{
    annotation::{to_stored_record, translate_batch, FlipPolicy, ViewerAnnotation},
    config::{
        AddressConfig, Cli, Command, FullUrlConfig, RegionUrlConfig, ScaledUrlConfig,
        ToStoredConfig, ToViewerConfig,
    },
    image::{ExtentCache, HttpExtentSource, ImageAddressBuilder, ImageExtent},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = cli.address.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::RegionUrl(config) => run_region_url(&cli.address, config).await,
        Command::ScaledUrl(config) => run_scaled_url(&cli.address, config).await,
        Command::FullUrl(config) => run_full_url(config),
        Command::ToViewer(config) => run_to_viewer(config),
        Command::ToStored(config) => run_to_stored(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "palimpsest=debug"
    } else {
        "palimpsest=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Image URLs
// =============================================================================

fn build_address_builder(
    config: &AddressConfig,
) -> Result<ImageAddressBuilder<HttpExtentSource>, String> {
    let source = HttpExtentSource::new().map_err(|e| e.to_string())?;
    let cache = ExtentCache::with_fallback(source, ImageExtent::square(config.default_extent))
        .with_fetch_timeout(config.fetch_timeout());
    Ok(ImageAddressBuilder::with_shared_cache(Arc::new(cache)))
}

async fn run_region_url(address: &AddressConfig, config: RegionUrlConfig) -> ExitCode {
    let builder = match build_address_builder(address) {
        Ok(builder) => builder,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match builder
        .build_region_url(&config.base, &config.selector, address.thumbnail_size)
        .await
    {
        Ok(url) => {
            println!("{}", url);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_scaled_url(address: &AddressConfig, config: ScaledUrlConfig) -> ExitCode {
    let builder = match build_address_builder(address) {
        Ok(builder) => builder,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("{}", builder.build_scaled_url(&config.base, config.scale).await);
    ExitCode::SUCCESS
}

fn run_full_url(config: FullUrlConfig) -> ExitCode {
    println!(
        "{}",
        palimpsest::image::full_url(&config.base, &config.request())
    );
    ExitCode::SUCCESS
}

// =============================================================================
// Annotation Translation
// =============================================================================

fn run_to_viewer(config: ToViewerConfig) -> ExitCode {
    let records: Vec<serde_json::Value> = match read_json(&config.input) {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to read stored records: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let labels: HashMap<i64, String> = match config.labels.as_deref() {
        Some(path) => match read_json(path) {
            Ok(labels) => labels,
            Err(e) => {
                error!("Failed to read labels: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => HashMap::new(),
    };

    let outcome = translate_batch(&records, f64::from(config.image_height), &labels);
    if !outcome.skipped.is_empty() {
        warn!(
            "Skipped {} of {} record(s) with malformed geometry",
            outcome.skipped.len(),
            records.len()
        );
    }
    info!("Translated {} annotation(s)", outcome.annotations.len());

    print_json(&outcome.annotations)
}

fn run_to_stored(config: ToStoredConfig) -> ExitCode {
    let annotations: Vec<ViewerAnnotation> = match read_json(&config.input) {
        Ok(annotations) => annotations,
        Err(e) => {
            error!("Failed to read viewer annotations: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let policy = match config.image_height {
        Some(height) => FlipPolicy::Symmetric {
            image_height: f64::from(height),
        },
        None => FlipPolicy::AsPixels,
    };

    // Invalid selectors abort: writing a guessed rectangle would corrupt geometry
    let mut drafts = Vec::with_capacity(annotations.len());
    for annotation in &annotations {
        match to_stored_record(annotation, policy) {
            Ok(draft) => drafts.push(draft),
            Err(e) => {
                error!("Annotation {}: {}", annotation.id, e);
                return ExitCode::FAILURE;
            }
        }
    }

    print_json(&drafts)
}

// =============================================================================
// JSON I/O
// =============================================================================

/// Read JSON from a file, or from stdin when the path is `-`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let mut text = String::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("stdin: {}", e))?;
    } else {
        text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    }
    serde_json::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e))
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            ExitCode::FAILURE
        }
    }
}
