// SPDX-License-Identifier: GPL-3.0-only

//! Mosaic collage composition
//!
//! ```text
//! EncodedImage* → decode (2 ahead, with timeout) → place (shortest column)
//!              → draw tile → ... → title → encode → MosaicOutput
//! ```
//!
//! Decoding and drawing run on the blocking pool; photos are placed strictly
//! in input order.

pub mod layout;
pub mod render;

pub use layout::{ColumnState, FixedJitter, JitterSource, MosaicLayout, RngJitter, Tile};
pub use render::MosaicCanvas;

use super::photo::{CapturedPhoto, EncodedImage, PhotoEncoder};
use crate::config::{DecodeFailurePolicy, MosaicConfig};
use crate::constants::mosaic::DECODE_AHEAD;
use crate::errors::MosaicError;
use futures::StreamExt;
use futures::future::BoxFuture;
use image::RgbaImage;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A photo left out of the collage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPhoto {
    /// Position in the compositor input
    pub index: usize,
    pub reason: String,
}

/// A finished collage
#[derive(Debug, Clone)]
pub struct MosaicOutput {
    pub image: EncodedImage,
    /// Placed tiles in input order
    pub tiles: Vec<Tile>,
    pub skipped: Vec<SkippedPhoto>,
}

/// Turns encoded photo bytes into pixels
///
/// The compositor bounds every call with the configured decode timeout.
pub trait PhotoDecoder: Send + Sync {
    fn decode(&self, photo: EncodedImage) -> BoxFuture<'static, Result<RgbaImage, String>>;
}

/// Decoder backed by the `image` crate, run on the blocking pool
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl PhotoDecoder for ImageDecoder {
    fn decode(&self, photo: EncodedImage) -> BoxFuture<'static, Result<RgbaImage, String>> {
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                image::load_from_memory(&photo.data)
                    .map(|image| image.to_rgba8())
                    .map_err(|e| e.to_string())
            })
            .await
            .map_err(|e| format!("decode task failed: {}", e))?
        })
    }
}

/// Composes photo collections into a single collage
#[derive(Clone)]
pub struct MosaicCompositor {
    config: MosaicConfig,
    encoder: PhotoEncoder,
    decoder: Arc<dyn PhotoDecoder>,
}

impl std::fmt::Debug for MosaicCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MosaicCompositor")
            .field("config", &self.config)
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}

impl MosaicCompositor {
    pub fn new(config: MosaicConfig) -> Result<Self, MosaicError> {
        config.validate().map_err(MosaicError::InvalidParameters)?;
        Ok(Self {
            encoder: PhotoEncoder::with_format(config.output_format.into(), config.quality),
            config,
            decoder: Arc::new(ImageDecoder),
        })
    }

    /// Replace the photo decoder
    pub fn with_decoder(mut self, decoder: impl PhotoDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Compose captured photos
    pub async fn compose_photos(
        &self,
        photos: &[CapturedPhoto],
        jitter: &mut dyn JitterSource,
    ) -> Result<Option<MosaicOutput>, MosaicError> {
        let images: Vec<EncodedImage> = photos.iter().map(|p| p.image.clone()).collect();
        self.compose(&images, jitter).await
    }

    /// Compose encoded photos into one collage
    ///
    /// Returns `Ok(None)` for an empty input. Photos that fail to decode are
    /// skipped or abort the composition depending on the configured policy.
    pub async fn compose(
        &self,
        photos: &[EncodedImage],
        jitter: &mut dyn JitterSource,
    ) -> Result<Option<MosaicOutput>, MosaicError> {
        if photos.is_empty() {
            debug!("No photos to compose");
            return Ok(None);
        }

        info!(
            photos = photos.len(),
            width = self.config.width,
            height = self.config.height,
            columns = self.config.columns,
            "Composing mosaic"
        );

        let (width, height) = (self.config.width, self.config.height);
        let mut canvas = tokio::task::spawn_blocking(move || MosaicCanvas::new(width, height))
            .await
            .map_err(|e| MosaicError::Render(format!("canvas task failed: {}", e)))??;

        let mut layout = MosaicLayout::new(&self.config);
        let mut skipped = Vec::new();

        let timeout = self.config.decode_timeout();
        let decodes = futures::stream::iter(photos.iter().cloned().enumerate())
            .map(|(index, photo)| decode_photo(self.decoder.decode(photo), index, timeout))
            .buffered(DECODE_AHEAD);
        let mut decodes = std::pin::pin!(decodes);

        while let Some((index, decoded)) = decodes.next().await {
            let photo = match decoded {
                Ok(photo) => photo,
                Err(e) => match self.config.decode_failure_policy {
                    DecodeFailurePolicy::Abort => {
                        warn!(index, error = %e, "Photo failed to decode, aborting mosaic");
                        return Err(e);
                    }
                    DecodeFailurePolicy::Skip => {
                        warn!(index, error = %e, "Photo failed to decode, skipping");
                        skipped.push(SkippedPhoto {
                            index,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                },
            };

            let Some(tile) = layout.place(index, photo.dimensions(), jitter) else {
                continue;
            };
            debug!(
                index,
                column = tile.column,
                y = tile.y,
                height = tile.height,
                "Tile placed"
            );

            canvas = tokio::task::spawn_blocking(move || {
                canvas.draw_tile(&tile, &photo).map(|()| canvas)
            })
            .await
            .map_err(|e| MosaicError::Render(format!("draw task failed: {}", e)))??;
        }

        let title = self.config.title.clone();
        let encoder = self.encoder;
        let image = tokio::task::spawn_blocking(move || {
            if let Some(title) = title {
                canvas.draw_title(&title, render::system_fonts());
            }
            let raster = canvas.into_rgb_image()?;
            encoder
                .encode_blocking(&raster)
                .map_err(MosaicError::EncodingFailed)
        })
        .await
        .map_err(|e| MosaicError::Render(format!("finish task failed: {}", e)))??;

        let tiles = layout.into_tiles();
        info!(
            tiles = tiles.len(),
            skipped = skipped.len(),
            size = image.len(),
            "Mosaic composed"
        );

        Ok(Some(MosaicOutput {
            image,
            tiles,
            skipped,
        }))
    }
}

impl Default for MosaicCompositor {
    fn default() -> Self {
        Self {
            encoder: PhotoEncoder::new(),
            config: MosaicConfig::default(),
            decoder: Arc::new(ImageDecoder),
        }
    }
}

/// Await one decode, bounded by `timeout`
async fn decode_photo(
    decode: BoxFuture<'static, Result<RgbaImage, String>>,
    index: usize,
    timeout: Duration,
) -> (usize, Result<RgbaImage, MosaicError>) {
    let result = match tokio::time::timeout(timeout, decode).await {
        Err(_) => Err(MosaicError::DecodeTimeout { index }),
        Ok(Err(reason)) => Err(MosaicError::Decode { index, reason }),
        Ok(Ok(image)) => {
            if image.width() == 0 || image.height() == 0 {
                Err(MosaicError::Decode {
                    index,
                    reason: "image has no pixels".to_string(),
                })
            } else {
                Ok(image)
            }
        }
    };

    (index, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_input_is_none() {
        let output = MosaicCompositor::default()
            .compose(&[], &mut FixedJitter::default())
            .await
            .unwrap();
        assert!(output.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MosaicConfig {
            columns: 0,
            ..Default::default()
        };
        assert!(matches!(
            MosaicCompositor::new(config),
            Err(MosaicError::InvalidParameters(_))
        ));
    }
}
