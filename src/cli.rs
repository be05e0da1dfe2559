// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Running a timed burst against a still image
//! - Composing photos into a collage
//! - Listing filter presets
//!
//! Everything that touches the filesystem lives here; the library hands back
//! encoded bytes only.

use chrono::Local;
use photobooth::backends::file_source::StillImageSource;
use photobooth::config::Config;
use photobooth::constants::file_formats;
use photobooth::pipelines::mosaic::{MosaicCompositor, MosaicOutput, RngJitter};
use photobooth::pipelines::photo::{
    BurstRequest, CaptureSequencer, EncodedImage, EncodingFormat, SequenceEvent,
};
use photobooth::{FilterPreset, FilterSpec, TimerSetting};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default folder name for saving photos and collages
const DEFAULT_SAVE_FOLDER: &str = "Photobooth";

/// How long a finished command waits for stray blocking tasks
///
/// A decode that hit its timeout keeps running on the blocking pool; the
/// command exits without waiting for it past this grace period.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Arguments of the `burst` command
pub struct BurstArgs {
    pub source: PathBuf,
    pub count: u32,
    pub timer: u32,
    pub filter: String,
    pub output: Option<PathBuf>,
    pub mosaic: bool,
}

/// Load the configuration file, or defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

/// Run a burst and save the photos
pub fn run_burst(config: Config, args: BurstArgs) -> Result<(), Box<dyn std::error::Error>> {
    let timer = TimerSetting::from_seconds(args.timer).ok_or_else(|| {
        format!(
            "Unsupported timer {}s (choose from {})",
            args.timer,
            TimerSetting::ALL
                .iter()
                .map(|t| t.seconds().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;
    let filter = parse_filter(&args.filter)?;
    let source = StillImageSource::open(&args.source)?;

    let output_dir = args.output.unwrap_or_else(get_default_photo_dir);
    std::fs::create_dir_all(&output_dir)?;

    println!("Source: {}", args.source.display());
    println!("Shots: {}, timer: {}, filter: {}", args.count, timer.display_name(), filter);
    println!("Output directory: {}", output_dir.display());
    println!();

    let cancel = CancellationToken::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || {
        cancel_handler.cancel();
    })?;

    let rt = Runtime::new()?;
    let outcome = rt.block_on(async {
        let (tx, rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(print_events(rx));

        let sequencer = CaptureSequencer::new(config.capture.clone()).with_events(tx);
        let outcome = sequencer
            .run_sequence(BurstRequest::new(args.count, timer), &filter, &source, cancel)
            .await;

        // Closes the event channel so the printer finishes
        drop(sequencer);
        if let Err(e) = printer.await {
            warn!(error = %e, "Event printer failed");
        }
        outcome
    })?;

    if outcome.cancelled {
        println!("Burst cancelled");
    }
    if outcome.photos.is_empty() {
        println!("No photos captured");
        shutdown_runtime(rt);
        return Ok(());
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    for photo in &outcome.photos {
        let path = output_dir.join(format!("{}_{}", timestamp, photo.file_name()));
        std::fs::write(&path, &photo.image.data[..])?;
        println!("Photo saved: {}", path.display());
    }

    if args.mosaic && !outcome.cancelled {
        let path = output_dir.join(format!(
            "collage_{}.{}",
            timestamp,
            collage_extension(&config)
        ));
        let images: Vec<EncodedImage> = outcome.photos.iter().map(|p| p.image.clone()).collect();
        let collage = rt.block_on(compose(config, &images, None));
        shutdown_runtime(rt);
        save_collage(collage?, &path)?;
    } else {
        shutdown_runtime(rt);
    }

    Ok(())
}

/// Compose image files into a collage
pub fn compose_mosaic(
    config: Config,
    input: Vec<PathBuf>,
    output: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = collect_image_paths(&input)?;
    if paths.is_empty() {
        return Err("No images found in input".into());
    }

    println!("Found {} images", paths.len());

    let mut photos = Vec::with_capacity(paths.len());
    for path in &paths {
        match std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(EncodedImage::from_bytes)
        {
            Ok(photo) => photos.push(photo),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unrecognised image");
                println!("Warning: {} is not a supported image", path.display());
            }
        }
    }

    let output_path = match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            path
        }
        None => {
            let dir = get_default_photo_dir();
            std::fs::create_dir_all(&dir)?;
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            dir.join(format!("collage_{}.{}", timestamp, collage_extension(&config)))
        }
    };

    let rt = Runtime::new()?;
    let collage = rt.block_on(compose(config, &photos, seed));
    shutdown_runtime(rt);

    save_collage(collage?, &output_path)
}

/// Print filter presets with their filter text
pub fn list_filters() -> Result<(), Box<dyn std::error::Error>> {
    println!("Filter presets:");
    println!();
    for preset in FilterPreset::ALL {
        println!("  {:<12} {}", preset.display_name(), preset.spec());
    }
    println!();
    println!("Any CSS filter text is accepted too, e.g. \"grayscale(50%) blur(2px)\"");
    Ok(())
}

async fn compose(
    config: Config,
    photos: &[EncodedImage],
    seed: Option<u64>,
) -> Result<Option<MosaicOutput>, Box<dyn std::error::Error>> {
    let compositor = MosaicCompositor::new(config.mosaic)?;
    let mut jitter = match seed {
        Some(seed) => RngJitter::seeded(seed),
        None => RngJitter::from_entropy(),
    };
    Ok(compositor.compose(photos, &mut jitter).await?)
}

/// Drop the runtime without waiting on timed-out blocking tasks
fn shutdown_runtime(rt: Runtime) {
    rt.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
}

fn collage_extension(config: &Config) -> &'static str {
    EncodingFormat::from(config.mosaic.output_format).extension()
}

fn save_collage(
    collage: Option<MosaicOutput>,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(collage) = collage else {
        println!("Nothing to compose");
        return Ok(());
    };

    for skipped in &collage.skipped {
        println!("Skipped photo {}: {}", skipped.index + 1, skipped.reason);
    }

    std::fs::write(path, &collage.image.data[..])?;
    info!(path = %path.display(), tiles = collage.tiles.len(), "Collage saved");
    println!("Collage saved: {}", path.display());
    Ok(())
}

/// Print sequencer progress as it happens
async fn print_events(mut rx: mpsc::UnboundedReceiver<SequenceEvent>) {
    use std::io::Write;

    while let Some(event) = rx.recv().await {
        match event {
            SequenceEvent::Countdown(t) => print!("{}... ", t),
            SequenceEvent::Ready => print!("{} ", photobooth::constants::capture::READY_PROMPT),
            SequenceEvent::CountdownCleared => println!(),
            SequenceEvent::PhotoCaptured(photo) => {
                println!("Shot {} captured ({})", photo.index + 1, photo.filter)
            }
            SequenceEvent::ShotSkipped { index } => {
                println!("Shot {} skipped, no frame available", index + 1)
            }
            SequenceEvent::Completed(photos) => println!("Burst complete: {} photos", photos.len()),
            SequenceEvent::StateChanged(_) => {}
        }
        let _ = std::io::stdout().flush();
    }
}

/// Preset name or CSS filter text
fn parse_filter(text: &str) -> Result<FilterSpec, Box<dyn std::error::Error>> {
    if let Some(preset) = FilterPreset::from_name(text) {
        return Ok(preset.spec());
    }
    Ok(text.parse::<FilterSpec>()?)
}

/// Collect all image paths from input (files or directories)
fn collect_image_paths(input: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();

    for path in input {
        if path.is_dir() {
            let mut entries = Vec::new();
            for entry in std::fs::read_dir(path)? {
                let file_path = entry?.path();
                if is_supported_image(&file_path) {
                    entries.push(file_path);
                }
            }
            // Sort by filename for consistent ordering within a directory
            entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            paths.extend(entries);
        } else if is_supported_image(path) {
            paths.push(path.clone());
        } else {
            println!("Skipping {}: not a supported image", path.display());
        }
    }

    Ok(paths)
}

/// Check if a path is a supported image file
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| file_formats::is_image_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

/// Get default photo directory
fn get_default_photo_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(DEFAULT_SAVE_FOLDER)
}
