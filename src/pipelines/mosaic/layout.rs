// SPDX-License-Identifier: GPL-3.0-only

//! Greedy column packing
//!
//! Every tile goes into the column whose bottom edge is currently highest
//! (ties go to the leftmost column). Tiles share one width; the height
//! follows the photo's aspect ratio scaled by a jitter factor so the collage
//! does not look like a grid.

use crate::config::MosaicConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

/// Source of per-tile height jitter
pub trait JitterSource: Send {
    /// A factor in `min..=max`
    fn factor(&mut self, min: f32, max: f32) -> f32;
}

/// Uniform jitter from a random number generator
#[derive(Debug, Clone)]
pub struct RngJitter<R: Rng> {
    rng: R,
}

impl<R: Rng> RngJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngJitter<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible jitter
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> JitterSource for RngJitter<R> {
    fn factor(&mut self, min: f32, max: f32) -> f32 {
        if !min.is_finite() {
            return 1.0;
        }
        if !max.is_finite() || min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

/// Predetermined jitter factors, repeated in order
///
/// Factors are used as given, outside the configured range if need be.
/// The layout replaces a factor that is not finite and positive with 1.0.
#[derive(Debug, Clone)]
pub struct FixedJitter {
    factors: Vec<f32>,
    next: usize,
}

impl FixedJitter {
    pub fn new(factor: f32) -> Self {
        Self::sequence(vec![factor])
    }

    pub fn sequence(factors: Vec<f32>) -> Self {
        Self { factors, next: 0 }
    }
}

impl Default for FixedJitter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl JitterSource for FixedJitter {
    fn factor(&mut self, _min: f32, _max: f32) -> f32 {
        if self.factors.is_empty() {
            return 1.0;
        }
        let factor = self.factors[self.next % self.factors.len()];
        self.next += 1;
        factor
    }
}

/// Running bottom edge of every column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnState {
    offsets: Vec<f32>,
}

impl ColumnState {
    pub fn new(columns: usize, padding: f32) -> Self {
        Self {
            offsets: vec![padding; columns],
        }
    }

    /// Column with the smallest offset, lowest index on ties
    pub fn shortest(&self) -> usize {
        let mut best = 0;
        for (column, &offset) in self.offsets.iter().enumerate().skip(1) {
            if offset < self.offsets[best] {
                best = column;
            }
        }
        best
    }

    pub fn offset(&self, column: usize) -> f32 {
        self.offsets[column]
    }

    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    fn advance(&mut self, column: usize, by: f32) {
        self.offsets[column] += by;
    }
}

/// A placed photo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Position of the photo in the compositor input
    pub source_index: usize,
    pub column: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
}

impl Tile {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Whether the interiors of two tiles intersect
    pub fn overlaps(&self, other: &Tile) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Tile placement for one collage
#[derive(Debug, Clone)]
pub struct MosaicLayout {
    columns: ColumnState,
    column_width: f32,
    padding: f32,
    corner_radius: f32,
    jitter_range: (f32, f32),
    tiles: Vec<Tile>,
}

impl MosaicLayout {
    pub fn new(config: &MosaicConfig) -> Self {
        Self {
            columns: ColumnState::new(config.columns, config.padding),
            column_width: config.column_width(),
            padding: config.padding,
            corner_radius: config.corner_radius,
            jitter_range: (config.jitter_min, config.jitter_max),
            tiles: Vec::new(),
        }
    }

    /// Lay out photos of the given sizes without drawing anything
    pub fn plan(
        config: &MosaicConfig,
        sizes: &[(u32, u32)],
        jitter: &mut dyn JitterSource,
    ) -> Vec<Tile> {
        let mut layout = Self::new(config);
        for (index, &size) in sizes.iter().enumerate() {
            layout.place(index, size, jitter);
        }
        layout.into_tiles()
    }

    /// Place a photo of `size` in the shortest column
    ///
    /// Returns `None` for a zero-sized photo; no jitter is drawn and the
    /// columns are left untouched in that case.
    pub fn place(
        &mut self,
        source_index: usize,
        size: (u32, u32),
        jitter: &mut dyn JitterSource,
    ) -> Option<Tile> {
        let (width, height) = size;
        if width == 0 || height == 0 {
            return None;
        }

        let mut factor = jitter.factor(self.jitter_range.0, self.jitter_range.1);
        if !(factor.is_finite() && factor > 0.0) {
            warn!(source_index, factor, "Unusable jitter factor, using 1.0");
            factor = 1.0;
        }
        let tile_height = self.column_width * (height as f32 / width as f32) * factor;

        let column = self.columns.shortest();
        let tile = Tile {
            source_index,
            column,
            x: self.padding + column as f32 * (self.column_width + self.padding),
            y: self.columns.offset(column),
            width: self.column_width,
            height: tile_height,
            corner_radius: self.corner_radius,
        };

        self.columns.advance(column, tile_height + self.padding);
        self.tiles.push(tile);
        Some(tile)
    }

    pub fn column_width(&self) -> f32 {
        self.column_width
    }

    pub fn columns(&self) -> &ColumnState {
        &self.columns
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn into_tiles(self) -> Vec<Tile> {
        self.tiles
    }
}
