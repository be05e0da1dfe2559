// SPDX-License-Identifier: GPL-3.0-only

//! Single still capture from a frame source
//!
//! Grabs the current frame, draws it onto a canvas at the source's native
//! resolution, bakes the filter in, and encodes the result. The frame source
//! is only read, never touched otherwise.

use super::encoding::{EncodedImage, PhotoEncoder};
use crate::backends::camera::{CameraFrame, FrameSource};
use crate::config::CaptureConfig;
use crate::errors::CaptureError;
use crate::filters::{FilterSpec, apply_filter};
use image::RgbImage;
use tracing::{debug, info};

/// Outcome of a capture attempt
#[derive(Debug, Clone)]
pub enum CaptureResult {
    /// Encoded still with the filter applied
    Captured(EncodedImage),
    /// The source has no decodable frame yet (startup, camera switch)
    NotReady,
}

impl CaptureResult {
    pub fn into_image(self) -> Option<EncodedImage> {
        match self {
            CaptureResult::Captured(image) => Some(image),
            CaptureResult::NotReady => None,
        }
    }
}

/// Rasterizes frames into encoded stills
#[derive(Debug, Clone)]
pub struct FrameCapturer {
    encoder: PhotoEncoder,
    fallback_resolution: (u32, u32),
}

impl FrameCapturer {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            encoder: PhotoEncoder::with_format(config.output_format.into(), config.quality),
            fallback_resolution: config.fallback_resolution,
        }
    }

    /// Capture one still with `filter` baked in
    ///
    /// `NotReady` is a normal outcome, not an error. Pixel work and encoding
    /// run on the blocking pool.
    pub async fn capture(
        &self,
        source: &dyn FrameSource,
        filter: &FilterSpec,
    ) -> Result<CaptureResult, CaptureError> {
        let Some(frame) = Self::ready_frame(source) else {
            debug!("Frame source not ready, nothing captured");
            return Ok(CaptureResult::NotReady);
        };

        let canvas = self.canvas_size(source);
        info!(
            frame_width = frame.width,
            frame_height = frame.height,
            canvas_width = canvas.0,
            canvas_height = canvas.1,
            %filter,
            "Capturing still"
        );

        let filter = filter.clone();
        let encoder = self.encoder;
        let encoded = tokio::task::spawn_blocking(move || {
            let image = Self::rasterize(&frame, canvas, &filter)?;
            encoder
                .encode_blocking(&image)
                .map_err(CaptureError::EncodingFailed)
        })
        .await
        .map_err(|e| CaptureError::TaskFailed(e.to_string()))??;

        Ok(CaptureResult::Captured(encoded))
    }

    /// Draw `frame` onto a `canvas`-sized raster and apply `filter`
    pub fn rasterize(
        frame: &CameraFrame,
        canvas: (u32, u32),
        filter: &FilterSpec,
    ) -> Result<RgbImage, CaptureError> {
        let image = frame.to_rgb_image().map_err(CaptureError::InvalidFrame)?;

        let image = if image.dimensions() == canvas {
            image
        } else {
            debug!(
                from = ?image.dimensions(),
                to = ?canvas,
                "Scaling frame to canvas"
            );
            image::imageops::resize(
                &image,
                canvas.0,
                canvas.1,
                image::imageops::FilterType::Triangle,
            )
        };

        Ok(apply_filter(image, filter))
    }

    /// Canvas size: the source's native resolution, or the fallback
    pub fn canvas_size(&self, source: &dyn FrameSource) -> (u32, u32) {
        source
            .native_resolution()
            .filter(|&(w, h)| w > 0 && h > 0)
            .unwrap_or(self.fallback_resolution)
    }

    fn ready_frame(source: &dyn FrameSource) -> Option<CameraFrame> {
        if !source.has_frame() {
            return None;
        }
        source.current_frame().filter(CameraFrame::is_decodable)
    }
}

impl Default for FrameCapturer {
    fn default() -> Self {
        Self::new(&CaptureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::{PixelFormat, SharedFrameSource};
    use crate::filters::FilterPreset;
    use crate::pipelines::photo::EncodingFormat;

    fn red_frame(width: u32, height: u32) -> CameraFrame {
        let data: Vec<u8> = [255u8, 0, 0]
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        CameraFrame::new(width, height, PixelFormat::RGB24, data)
    }

    #[tokio::test]
    async fn test_empty_source_not_ready() {
        let source = SharedFrameSource::new();
        let result = FrameCapturer::default()
            .capture(&source, &FilterSpec::none())
            .await
            .unwrap();
        assert!(matches!(result, CaptureResult::NotReady));
    }

    #[tokio::test]
    async fn test_fallback_resolution_when_unknown() {
        let source = SharedFrameSource::new();
        source.push_frame(red_frame(32, 18));

        let image = FrameCapturer::default()
            .capture(&source, &FilterSpec::none())
            .await
            .unwrap()
            .into_image()
            .unwrap();

        assert_eq!(image.format, EncodingFormat::Jpeg);
        assert_eq!((image.width, image.height), (1280, 720));
    }

    #[tokio::test]
    async fn test_native_resolution_used() {
        let source = SharedFrameSource::new();
        source.push_frame(red_frame(32, 18));
        source.set_native_resolution(Some((64, 36)));

        let image = FrameCapturer::default()
            .capture(&source, &FilterSpec::none())
            .await
            .unwrap()
            .into_image()
            .unwrap();

        assert_eq!((image.width, image.height), (64, 36));
    }

    #[test]
    fn test_rasterize_applies_filter() {
        let frame = red_frame(4, 4);
        let image = FrameCapturer::rasterize(&frame, (4, 4), &FilterPreset::Invert.spec()).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0, 255, 255]);
    }
}
