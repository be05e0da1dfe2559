// SPDX-License-Identifier: GPL-3.0-only

//! Photobooth - timed burst capture and photo collages
//!
//! This library turns a live frame source into filter-stamped stills and
//! composes collections of stills into a single collage.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Frame sources (live feed, still image files)
//! - [`filters`]: Filter chains, presets and the live filter accessor
//! - [`pipelines`]: Capture sequencing and mosaic composition
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! let sequencer = CaptureSequencer::new(config.capture.clone());
//! let outcome = sequencer
//!     .run_sequence(BurstRequest::new(3, TimerSetting::Three), &filter, &source, cancel)
//!     .await?;
//! let collage = MosaicCompositor::new(config.mosaic)?
//!     .compose_photos(&outcome.photos, &mut RngJitter::from_entropy())
//!     .await?;
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filters;
pub mod pipelines;

// Re-export commonly used types
pub use backends::camera::{CameraFrame, FrameSource, PixelFormat, SharedFrameSource};
pub use config::Config;
pub use constants::{BurstPreset, TimerSetting};
pub use errors::{AppError, AppResult};
pub use filters::{FilterPreset, FilterProvider, FilterSpec};
pub use pipelines::mosaic::{MosaicCompositor, MosaicOutput, RngJitter};
pub use pipelines::photo::{
    BurstRequest, CaptureSequencer, CapturedPhoto, SequenceEvent, SequenceOutcome,
};
