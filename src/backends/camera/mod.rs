// SPDX-License-Identifier: GPL-3.0-only

//! Frame source abstraction
//!
//! The capture pipeline never opens a device itself. Whatever owns the live
//! video (a PipeWire stream, a webcam widget, a test fixture) implements
//! [`FrameSource`] and is handed to the capturer by reference.
//!
//! ```text
//! ┌──────────────────────┐      push_frame()     ┌───────────────────┐
//! │ external video feed  │ ────────────────────▶ │ SharedFrameSource │
//! └──────────────────────┘                       └─────────┬─────────┘
//!                                                          │ current_frame()
//!                                                          ▼
//!                                                 ┌────────────────┐
//!                                                 │ FrameCapturer  │
//!                                                 └────────────────┘
//! ```

pub mod types;

pub use types::*;

use std::sync::{Arc, RwLock};
use tracing::debug;

/// Provider of the most recent video frame
///
/// Sources are shared and externally owned: implementations must not block
/// for long and the pipeline never closes or reconfigures them.
pub trait FrameSource: Send + Sync {
    /// Whether a decodable frame is available right now
    ///
    /// `false` is the normal state while a camera starts up or switches.
    fn has_frame(&self) -> bool;

    /// The current frame, if any
    fn current_frame(&self) -> Option<CameraFrame>;

    /// Native output resolution, if the source knows it
    ///
    /// Captures are rasterized at this size. Sources that cannot tell
    /// return `None` and the frame's own size (or a default) is used.
    fn native_resolution(&self) -> Option<(u32, u32)> {
        None
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Arc<T> {
    fn has_frame(&self) -> bool {
        (**self).has_frame()
    }

    fn current_frame(&self) -> Option<CameraFrame> {
        (**self).current_frame()
    }

    fn native_resolution(&self) -> Option<(u32, u32)> {
        (**self).native_resolution()
    }
}

/// Frame source fed by an external pipeline
///
/// The feed calls [`push_frame`](Self::push_frame) for every new frame;
/// captures read whatever frame is latest at the moment of the shot.
#[derive(Debug, Clone, Default)]
pub struct SharedFrameSource {
    latest: Arc<RwLock<Option<CameraFrame>>>,
    resolution: Arc<RwLock<Option<(u32, u32)>>>,
}

impl SharedFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame
    pub fn push_frame(&self, frame: CameraFrame) {
        let mut latest = self.latest.write().unwrap_or_else(|e| e.into_inner());
        *latest = Some(frame);
    }

    /// Drop the current frame, e.g. while switching cameras
    pub fn clear(&self) {
        debug!("Frame source cleared");
        let mut latest = self.latest.write().unwrap_or_else(|e| e.into_inner());
        *latest = None;
    }

    /// Report the stream's negotiated resolution
    pub fn set_native_resolution(&self, resolution: Option<(u32, u32)>) {
        let mut current = self.resolution.write().unwrap_or_else(|e| e.into_inner());
        *current = resolution;
    }
}

impl FrameSource for SharedFrameSource {
    fn has_frame(&self) -> bool {
        let latest = self.latest.read().unwrap_or_else(|e| e.into_inner());
        latest.as_ref().is_some_and(CameraFrame::is_decodable)
    }

    fn current_frame(&self) -> Option<CameraFrame> {
        let latest = self.latest.read().unwrap_or_else(|e| e.into_inner());
        latest.clone()
    }

    fn native_resolution(&self) -> Option<(u32, u32)> {
        *self.resolution.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_source_starts_empty() {
        let source = SharedFrameSource::new();
        assert!(!source.has_frame());
        assert!(source.current_frame().is_none());
    }

    #[test]
    fn test_shared_source_push_and_clear() {
        let source = SharedFrameSource::new();
        source.push_frame(CameraFrame::new(2, 2, PixelFormat::RGB24, vec![0u8; 12]));
        assert!(source.has_frame());

        source.clear();
        assert!(!source.has_frame());
    }

    #[test]
    fn test_undecodable_frame_is_not_ready() {
        let source = SharedFrameSource::new();
        source.push_frame(CameraFrame::new(2, 2, PixelFormat::RGB24, vec![0u8; 3]));
        assert!(!source.has_frame());
    }
}
