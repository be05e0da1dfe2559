// SPDX-License-Identifier: GPL-3.0-only

//! Photo capture pipeline
//!
//! ```text
//! Frame Source → Capture (+ filter) → Encoding → CapturedPhoto
//!                    ↑
//!          Capture Sequencer (timer, burst)
//! ```
//!
//! The live frame source keeps running during capture; the pixel work happens
//! on the blocking pool.

pub mod capture;
pub mod encoding;
pub mod sequencer;

pub use capture::{CaptureResult, FrameCapturer};
pub use encoding::{EncodedImage, EncodingFormat, EncodingQuality, PhotoEncoder};
pub use sequencer::{
    BurstRequest, CaptureSequencer, SequenceEvent, SequenceOutcome, SequencerState,
};

use crate::filters::FilterSpec;
use chrono::{DateTime, Local};

/// A still produced by a burst
///
/// Immutable once returned; the caller owns it.
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    /// Encoded raster with the filter baked in
    pub image: EncodedImage,
    /// Filter that was active when the frame was drawn
    pub filter: FilterSpec,
    /// Shot index within its burst (skipped shots leave gaps)
    pub index: u32,
    /// Wall-clock capture time
    pub captured_at: DateTime<Local>,
}

impl CapturedPhoto {
    /// Suggested file name, e.g. `photo_1.jpg`
    pub fn file_name(&self) -> String {
        format!("photo_{}.{}", self.index + 1, self.image.format.extension())
    }
}
