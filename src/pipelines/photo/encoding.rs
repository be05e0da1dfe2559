// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! Encodes stills and collages to:
//! - JPEG (with quality control)
//! - PNG (lossless)
//!
//! Encoding is CPU-bound; the capture and mosaic pipelines call
//! [`PhotoEncoder::encode_blocking`] from the blocking pool.

use crate::config::PhotoOutputFormat;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    Jpeg,
    /// PNG format (lossless compression)
    Png,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
        }
    }
}

impl From<PhotoOutputFormat> for EncodingFormat {
    fn from(format: PhotoOutputFormat) -> Self {
        match format {
            PhotoOutputFormat::Jpeg => EncodingFormat::Jpeg,
            PhotoOutputFormat::Png => EncodingFormat::Png,
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

/// Encoded image data
///
/// The bytes are shared, so cloning a photo to hand it to the compositor
/// does not copy the image.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub data: Arc<[u8]>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Wrap bytes that are already encoded, e.g. read back from disk
    ///
    /// Dimensions are read from the header; the pixel data is not decoded.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, String> {
        let format = match image::guess_format(&data) {
            Ok(ImageFormat::Png) => EncodingFormat::Png,
            Ok(ImageFormat::Jpeg) => EncodingFormat::Jpeg,
            Ok(other) => return Err(format!("unsupported image format {:?}", other)),
            Err(e) => return Err(format!("unrecognised image data: {}", e)),
        };
        let (width, height) = image::ImageReader::new(std::io::Cursor::new(&data))
            .with_guessed_format()
            .map_err(|e| e.to_string())?
            .into_dimensions()
            .map_err(|e| e.to_string())?;

        Ok(Self {
            data: Arc::from(data),
            format,
            width,
            height,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Photo encoder
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: EncodingQuality,
}

impl PhotoEncoder {
    /// Create a new encoder with JPEG format and high quality
    pub fn new() -> Self {
        Self {
            format: EncodingFormat::Jpeg,
            quality: EncodingQuality::High,
        }
    }

    pub fn with_format(format: EncodingFormat, quality: EncodingQuality) -> Self {
        Self { format, quality }
    }

    /// Encode an RGB image on the current thread
    ///
    /// CPU-bound; async callers run it on the blocking pool.
    pub fn encode_blocking(&self, image: &RgbImage) -> Result<EncodedImage, String> {
        debug!(
            width = image.width(),
            height = image.height(),
            format = ?self.format,
            "Starting encoding"
        );

        let data = match self.format {
            EncodingFormat::Jpeg => Self::encode_jpeg(image, self.quality)?,
            EncodingFormat::Png => Self::encode_png(image)?,
        };

        debug!(size = data.len(), "Encoding complete");

        Ok(EncodedImage {
            data: Arc::from(data),
            format: self.format,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Encode image as JPEG
    fn encode_jpeg(image: &RgbImage, quality: EncodingQuality) -> Result<Vec<u8>, String> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);

        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.jpeg_quality());

        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| format!("JPEG encoding failed: {}", e))?;

        Ok(buffer)
    }

    /// Encode image as PNG
    fn encode_png(image: &RgbImage) -> Result<Vec<u8>, String> {
        let mut buffer = Vec::new();

        image
            .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| format!("PNG encoding failed: {}", e))?;

        Ok(buffer)
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}
