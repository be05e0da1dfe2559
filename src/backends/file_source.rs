// SPDX-License-Identifier: GPL-3.0-only

//! Still image frame source
//!
//! Serves a single image file as an always-ready frame source. Used by the
//! command line front end and handy for demos without a camera.

use crate::backends::camera::{CameraFrame, FrameSource};
use crate::constants::file_formats;
use crate::errors::BackendError;
use std::path::Path;
use tracing::info;

/// Frame source that always returns the same decoded image
#[derive(Debug, Clone)]
pub struct StillImageSource {
    frame: CameraFrame,
}

impl StillImageSource {
    /// Load an image file as a frame source
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !file_formats::is_image_extension(&extension) {
            return Err(BackendError::UnsupportedFormat(extension));
        }

        info!(path = %path.display(), "Loading image file");

        let img = image::open(path).map_err(|e| {
            BackendError::LoadFailed(format!("'{}': {}", path.display(), e))
        })?;

        let source = Self::from_image(img);
        info!(
            width = source.frame.width,
            height = source.frame.height,
            "Image loaded successfully"
        );
        Ok(source)
    }

    /// Serve an already decoded image
    pub fn from_image(img: image::DynamicImage) -> Self {
        Self {
            frame: CameraFrame::from_rgba(img.to_rgba8()),
        }
    }
}

impl FrameSource for StillImageSource {
    fn has_frame(&self) -> bool {
        self.frame.is_decodable()
    }

    fn current_frame(&self) -> Option<CameraFrame> {
        Some(self.frame.clone())
    }

    fn native_resolution(&self) -> Option<(u32, u32)> {
        Some((self.frame.width, self.frame.height))
    }
}
