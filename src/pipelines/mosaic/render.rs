// SPDX-License-Identifier: GPL-3.0-only

//! Collage canvas drawing
//!
//! Drawing goes through tiny-skia (re-exported by resvg). The title is laid
//! out as a one-line SVG so usvg handles font selection and shaping.

use super::layout::Tile;
use crate::constants::mosaic;
use crate::errors::MosaicError;
use image::{RgbImage, RgbaImage};
use resvg::tiny_skia::{
    Color, FillRule, FilterQuality, GradientStop, IntSize, LinearGradient, Paint, Path,
    PathBuilder, Pattern, Pixmap, Point, Rect, SpreadMode, Stroke, Transform,
};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// System font database, loaded on first use
pub fn system_fonts() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            debug!(faces = db.len(), "System fonts loaded");
            Arc::new(db)
        })
        .clone()
}

/// The collage raster being drawn
pub struct MosaicCanvas {
    pixmap: Pixmap,
}

impl MosaicCanvas {
    /// A canvas filled with the background gradient
    pub fn new(width: u32, height: u32) -> Result<Self, MosaicError> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            MosaicError::Render(format!("failed to allocate {}x{} canvas", width, height))
        })?;

        let [r0, g0, b0] = mosaic::GRADIENT_START;
        let [r1, g1, b1] = mosaic::GRADIENT_END;
        let shader = LinearGradient::new(
            Point::from_xy(0.0, 0.0),
            Point::from_xy(width as f32, height as f32),
            vec![
                GradientStop::new(0.0, Color::from_rgba8(r0, g0, b0, 255)),
                GradientStop::new(1.0, Color::from_rgba8(r1, g1, b1, 255)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        )
        .ok_or_else(|| MosaicError::Render("invalid background gradient".to_string()))?;

        let rect = Rect::from_xywh(0.0, 0.0, width as f32, height as f32)
            .ok_or_else(|| MosaicError::Render("invalid canvas rectangle".to_string()))?;
        let paint = Paint {
            shader,
            anti_alias: false,
            ..Default::default()
        };
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);

        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Draw `photo` stretched over `tile`, clipped to its rounded corners,
    /// then stroke the tile border
    pub fn draw_tile(&mut self, tile: &Tile, photo: &RgbaImage) -> Result<(), MosaicError> {
        let path = rounded_rect(tile.x, tile.y, tile.width, tile.height, tile.corner_radius)
            .ok_or_else(|| {
                MosaicError::Render(format!("degenerate tile for photo {}", tile.source_index))
            })?;

        let source = photo_pixmap(photo)?;
        let transform = Transform::from_row(
            tile.width / photo.width() as f32,
            0.0,
            0.0,
            tile.height / photo.height() as f32,
            tile.x,
            tile.y,
        );
        let paint = Paint {
            shader: Pattern::new(
                source.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Bilinear,
                1.0,
                transform,
            ),
            anti_alias: true,
            ..Default::default()
        };
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

        let [r, g, b, a] = mosaic::BORDER_COLOR;
        let mut border = Paint::default();
        border.set_color_rgba8(r, g, b, a);
        border.anti_alias = true;
        let stroke = Stroke {
            width: mosaic::BORDER_WIDTH,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &border, &stroke, Transform::identity(), None);

        Ok(())
    }

    /// Draw `title` centred near the top
    ///
    /// Returns false when no font could render it; the canvas is left as is.
    pub fn draw_title(&mut self, title: &str, fonts: Arc<usvg::fontdb::Database>) -> bool {
        if title.is_empty() {
            return false;
        }
        if fonts.is_empty() {
            warn!("No system fonts available, collage title omitted");
            return false;
        }

        let [r, g, b] = mosaic::TITLE_COLOR;
        let svg = format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">"#,
                r##"<text x="{cx}" y="{y}" text-anchor="middle" font-family="Arial, sans-serif" "##,
                r##"font-weight="bold" font-size="{size}" fill="#{r:02x}{g:02x}{b:02x}">{text}</text>"##,
                "</svg>"
            ),
            w = self.width(),
            h = self.height(),
            cx = self.width() as f32 / 2.0,
            y = mosaic::TITLE_BASELINE,
            size = mosaic::TITLE_FONT_SIZE,
            r = r,
            g = g,
            b = b,
            text = escape_xml(title),
        );

        let options = usvg::Options {
            fontdb: fonts,
            ..Default::default()
        };
        let tree = match usvg::Tree::from_str(&svg, &options) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(error = %e, "Failed to lay out collage title");
                return false;
            }
        };
        if !tree.root().has_children() {
            warn!("Collage title produced no glyphs");
            return false;
        }

        resvg::render(&tree, Transform::identity(), &mut self.pixmap.as_mut());
        true
    }

    /// Flatten to RGB; the background is opaque so alpha is dropped
    pub fn into_rgb_image(self) -> Result<RgbImage, MosaicError> {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for pixel in self.pixmap.pixels() {
            let color = pixel.demultiply();
            data.extend_from_slice(&[color.red(), color.green(), color.blue()]);
        }
        RgbImage::from_raw(width, height, data)
            .ok_or_else(|| MosaicError::Render("canvas readback size mismatch".to_string()))
    }
}

/// Rounded rectangle with quadratic corners
///
/// The radius is clamped to half the shorter side.
pub fn rounded_rect(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Option<Path> {
    let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
    let (right, bottom) = (x + width, y + height);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.quad_to(right, y, right, y + r);
    pb.line_to(right, bottom - r);
    pb.quad_to(right, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.quad_to(x, bottom, x, bottom - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

/// Copy an RGBA image into a premultiplied pixmap
fn photo_pixmap(photo: &RgbaImage) -> Result<Pixmap, MosaicError> {
    let size = IntSize::from_wh(photo.width(), photo.height())
        .ok_or_else(|| MosaicError::Render("empty photo".to_string()))?;

    let mut data = photo.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a < 255 {
            px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
            px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
            px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
        }
    }

    Pixmap::from_vec(data, size)
        .ok_or_else(|| MosaicError::Render("photo pixmap size mismatch".to_string()))
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_background_gradient_corners() {
        let canvas = MosaicCanvas::new(100, 100).unwrap();
        let image = canvas.into_rgb_image().unwrap();

        let top_left = image.get_pixel(0, 0).0;
        let bottom_right = image.get_pixel(99, 99).0;
        assert!(top_left[0] > bottom_right[0]);
        assert!(top_left[0] >= 0xf0);
        assert!(bottom_right[0] <= 0xe8);
    }

    #[test]
    fn test_tile_covers_center_not_corner() {
        let mut canvas = MosaicCanvas::new(100, 100).unwrap();
        let tile = Tile {
            source_index: 0,
            column: 0,
            x: 10.0,
            y: 10.0,
            width: 80.0,
            height: 80.0,
            corner_radius: 20.0,
        };
        let photo = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        canvas.draw_tile(&tile, &photo).unwrap();
        let image = canvas.into_rgb_image().unwrap();

        let center = image.get_pixel(50, 50).0;
        assert!(center[0] > 240 && center[1] < 16 && center[2] < 16);
        // Outside the rounded corner the background shows through
        let corner = image.get_pixel(11, 11).0;
        assert!(corner[1] > 200);
    }

    #[test]
    fn test_rounded_rect_radius_clamped() {
        let path = rounded_rect(0.0, 0.0, 10.0, 10.0, 50.0).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.width(), 10.0);
        assert_eq!(bounds.height(), 10.0);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Tom & <Jerry>"), "Tom &amp; &lt;Jerry&gt;");
    }
}
