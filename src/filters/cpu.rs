// SPDX-License-Identifier: GPL-3.0-only

//! CPU filter implementations
//!
//! Colour operations use the W3C Filter Effects matrices so
//! stills match what a browser preview shows for the same filter string.
//! Each operation clamps to the 0-1 range before the next one runs.

use super::{FilterOp, FilterSpec};
use image::RgbImage;
use tracing::debug;

/// Luminance weights shared by grayscale, saturate and hue-rotate
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Apply every operation of `filter` to `image`, in order
pub fn apply_filter(image: RgbImage, filter: &FilterSpec) -> RgbImage {
    if filter.is_none() {
        return image;
    }

    debug!(%filter, "Applying filter");

    let mut image = image;
    for op in filter.ops() {
        match *op {
            FilterOp::Blur(sigma) => {
                if sigma > 0.0 {
                    image = image::imageops::blur(&image, sigma);
                }
            }
            op => apply_color_op(&mut image, op),
        }
    }
    image
}

/// Per-pixel colour operation
fn apply_color_op(image: &mut RgbImage, op: FilterOp) {
    for pixel in image.pixels_mut() {
        let mut r = pixel[0] as f32 / 255.0;
        let mut g = pixel[1] as f32 / 255.0;
        let mut b = pixel[2] as f32 / 255.0;

        apply_filter_rgb(&mut r, &mut g, &mut b, op);

        pixel[0] = (r.clamp(0.0, 1.0) * 255.0).round() as u8;
        pixel[1] = (g.clamp(0.0, 1.0) * 255.0).round() as u8;
        pixel[2] = (b.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

/// Apply a colour operation to normalized RGB values in place
#[inline]
fn apply_filter_rgb(r: &mut f32, g: &mut f32, b: &mut f32, op: FilterOp) {
    match op {
        FilterOp::Grayscale(amount) => {
            let a = 1.0 - amount.min(1.0);
            let m = [
                [LUMA[0] + (1.0 - LUMA[0]) * a, LUMA[1] - LUMA[1] * a, LUMA[2] - LUMA[2] * a],
                [LUMA[0] - LUMA[0] * a, LUMA[1] + (1.0 - LUMA[1]) * a, LUMA[2] - LUMA[2] * a],
                [LUMA[0] - LUMA[0] * a, LUMA[1] - LUMA[1] * a, LUMA[2] + (1.0 - LUMA[2]) * a],
            ];
            mix(m, r, g, b);
        }

        FilterOp::Sepia(amount) => {
            let a = 1.0 - amount.min(1.0);
            let m = [
                [0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a],
                [0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a],
                [0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a],
            ];
            mix(m, r, g, b);
        }

        FilterOp::Saturate(s) => {
            let m = [
                [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
            ];
            mix(m, r, g, b);
        }

        FilterOp::HueRotate(degrees) => {
            let (sin, cos) = degrees.to_radians().sin_cos();
            let m = [
                [
                    0.213 + cos * 0.787 - sin * 0.213,
                    0.715 - cos * 0.715 - sin * 0.715,
                    0.072 - cos * 0.072 + sin * 0.928,
                ],
                [
                    0.213 - cos * 0.213 + sin * 0.143,
                    0.715 + cos * 0.285 + sin * 0.140,
                    0.072 - cos * 0.072 - sin * 0.283,
                ],
                [
                    0.213 - cos * 0.213 - sin * 0.787,
                    0.715 - cos * 0.715 + sin * 0.715,
                    0.072 + cos * 0.928 + sin * 0.072,
                ],
            ];
            mix(m, r, g, b);
        }

        FilterOp::Brightness(factor) => {
            *r *= factor;
            *g *= factor;
            *b *= factor;
        }

        FilterOp::Contrast(factor) => {
            *r = (*r - 0.5) * factor + 0.5;
            *g = (*g - 0.5) * factor + 0.5;
            *b = (*b - 0.5) * factor + 0.5;
        }

        FilterOp::Invert(amount) => {
            let a = amount.min(1.0);
            *r = a * (1.0 - *r) + (1.0 - a) * *r;
            *g = a * (1.0 - *g) + (1.0 - a) * *g;
            *b = a * (1.0 - *b) + (1.0 - a) * *b;
        }

        // Spatial, handled on the whole image
        FilterOp::Blur(_) => {}
    }
}

#[inline]
fn mix(m: [[f32; 3]; 3], r: &mut f32, g: &mut f32, b: &mut f32) {
    let (ir, ig, ib) = (*r, *g, *b);
    *r = m[0][0] * ir + m[0][1] * ig + m[0][2] * ib;
    *g = m[1][0] * ir + m[1][1] * ig + m[1][2] * ib;
    *b = m[2][0] * ir + m[2][1] * ig + m[2][2] * ib;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterPreset;
    use image::Rgb;

    fn solid(color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb(color))
    }

    #[test]
    fn test_none_is_identity() {
        let out = apply_filter(solid([12, 200, 77]), &FilterSpec::none());
        assert_eq!(out.get_pixel(0, 0), &Rgb([12, 200, 77]));
    }

    #[test]
    fn test_grayscale_equalizes_channels() {
        let out = apply_filter(solid([200, 40, 90]), &FilterPreset::Grayscale.spec());
        let px = out.get_pixel(1, 1);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn test_invert() {
        let out = apply_filter(solid([0, 255, 100]), &FilterPreset::Invert.spec());
        assert_eq!(out.get_pixel(2, 2), &Rgb([255, 0, 155]));
    }

    #[test]
    fn test_sepia_warms_gray() {
        let out = apply_filter(solid([128, 128, 128]), &FilterPreset::Sepia.spec());
        let px = out.get_pixel(0, 0);
        assert!(px[0] > px[1] && px[1] > px[2]);
    }

    #[test]
    fn test_brightness_clamps() {
        let out = apply_filter(solid([200, 100, 0]), &FilterPreset::Bright.spec());
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 150, 0]));
    }

    #[test]
    fn test_blur_keeps_dimensions() {
        let out = apply_filter(solid([50, 50, 50]), &FilterPreset::Blur.spec());
        assert_eq!(out.dimensions(), (4, 4));
    }
}
