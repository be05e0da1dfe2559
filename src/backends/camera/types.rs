// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for frame sources

use image::RgbImage;
use std::sync::Arc;
use std::time::Instant;

/// Frame data shared between the source and captures without copying
pub type FrameData = Arc<[u8]>;

/// Pixel format of frame data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
    /// NV12 - Semi-planar 4:2:0 (Y plane + interleaved UV plane)
    ///
    /// The UV plane starts at `stride * height` and uses the same stride.
    NV12,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    YUYV,
}

impl PixelFormat {
    /// Minimum bytes per row for a given width
    pub fn min_stride(&self, width: u32) -> u32 {
        match self {
            PixelFormat::RGBA => width * 4,
            PixelFormat::RGB24 => width * 3,
            PixelFormat::Gray8 | PixelFormat::NV12 => width,
            PixelFormat::YUYV => width.div_ceil(2) * 4,
        }
    }

    /// Total buffer size for a frame of the given geometry
    pub fn buffer_size(&self, stride: u32, height: u32) -> usize {
        let main = stride as usize * height as usize;
        match self {
            PixelFormat::NV12 => main + stride as usize * height.div_ceil(2) as usize,
            _ => main,
        }
    }
}

/// A single frame from a frame source
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Pixel data laid out per `format`
    pub data: FrameData,
    pub format: PixelFormat,
    /// Row stride for the main data (bytes per row, may include padding)
    pub stride: u32,
    /// When the source produced this frame
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed frame
    pub fn new(width: u32, height: u32, format: PixelFormat, data: impl Into<FrameData>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            format,
            stride: format.min_stride(width),
            captured_at: Instant::now(),
        }
    }

    /// Wrap an RGBA image buffer
    pub fn from_rgba(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, PixelFormat::RGBA, image.into_raw())
    }

    /// Whether the buffer covers the declared geometry
    pub fn is_decodable(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.stride >= self.format.min_stride(self.width)
            && self.data.len() >= self.format.buffer_size(self.stride, self.height)
    }

    /// Convert the frame to packed RGB
    pub fn to_rgb_image(&self) -> Result<RgbImage, String> {
        if !self.is_decodable() {
            return Err(format!(
                "{:?} frame {}x{} (stride {}) needs {} bytes, got {}",
                self.format,
                self.width,
                self.height,
                self.stride,
                self.format.buffer_size(self.stride, self.height),
                self.data.len()
            ));
        }

        let width = self.width as usize;
        let height = self.height as usize;
        let stride = self.stride as usize;
        let mut rgb = Vec::with_capacity(width * height * 3);

        match self.format {
            PixelFormat::RGBA => {
                for row in self.data.chunks(stride).take(height) {
                    for px in row[..width * 4].chunks_exact(4) {
                        rgb.extend_from_slice(&px[..3]);
                    }
                }
            }
            PixelFormat::RGB24 => {
                for row in self.data.chunks(stride).take(height) {
                    rgb.extend_from_slice(&row[..width * 3]);
                }
            }
            PixelFormat::Gray8 => {
                for row in self.data.chunks(stride).take(height) {
                    for &v in &row[..width] {
                        rgb.extend_from_slice(&[v, v, v]);
                    }
                }
            }
            PixelFormat::NV12 => {
                let (y_plane, uv_plane) = self.data.split_at(stride * height);
                for y in 0..height {
                    for x in 0..width {
                        let luma = y_plane[y * stride + x] as f32 / 255.0;
                        // UV subsampled 2x2
                        let uv_idx = (y / 2) * stride + (x / 2) * 2;
                        let u = chroma(uv_plane.get(uv_idx).copied().unwrap_or(128));
                        let v = chroma(uv_plane.get(uv_idx + 1).copied().unwrap_or(128));
                        push_rgb(&mut rgb, yuv_to_rgb(luma, u, v));
                    }
                }
            }
            PixelFormat::YUYV => {
                for row in self.data.chunks(stride).take(height) {
                    for x in 0..width {
                        // Each 4-byte macropixel covers two horizontal pixels
                        let base = (x / 2) * 4;
                        let luma = row[base + (x % 2) * 2] as f32 / 255.0;
                        let u = chroma(row[base + 1]);
                        let v = chroma(row[base + 3]);
                        push_rgb(&mut rgb, yuv_to_rgb(luma, u, v));
                    }
                }
            }
        }

        RgbImage::from_raw(self.width, self.height, rgb)
            .ok_or_else(|| "Failed to create RGB image from converted data".to_string())
    }
}

/// Centre a chroma sample on zero
#[inline]
fn chroma(sample: u8) -> f32 {
    (sample as f32 - 128.0) / 255.0
}

#[inline]
fn push_rgb(out: &mut Vec<u8>, (r, g, b): (f32, f32, f32)) {
    out.push((r * 255.0).round() as u8);
    out.push((g * 255.0).round() as u8);
    out.push((b * 255.0).round() as u8);
}

/// YUV to RGB conversion (BT.601)
#[inline]
fn yuv_to_rgb(y: f32, u: f32, v: f32) -> (f32, f32, f32) {
    let r = (y + 1.402 * v).clamp(0.0, 1.0);
    let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 1.0);
    let b = (y + 1.772 * u).clamp(0.0, 1.0);
    (r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_drops_alpha_and_padding() {
        // 2x1 frame with 4 bytes of row padding
        let data = vec![10, 20, 30, 255, 40, 50, 60, 255, 0, 0, 0, 0];
        let frame = CameraFrame {
            width: 2,
            height: 1,
            data: Arc::from(data),
            format: PixelFormat::RGBA,
            stride: 12,
            captured_at: Instant::now(),
        };

        let rgb = frame.to_rgb_image().unwrap();
        assert_eq!(rgb.as_raw(), &vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_nv12_neutral_chroma_is_gray() {
        let width = 4u32;
        let height = 4u32;
        let mut data = vec![128u8; (width * height) as usize];
        data.extend(vec![128u8; (width * height / 2) as usize]);
        let frame = CameraFrame::new(width, height, PixelFormat::NV12, data);

        let rgb = frame.to_rgb_image().unwrap();
        for px in rgb.pixels() {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn test_short_buffer_rejected() {
        let frame = CameraFrame::new(4, 4, PixelFormat::RGBA, vec![0u8; 10]);
        assert!(!frame.is_decodable());
        assert!(frame.to_rgb_image().is_err());
    }
}
