// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Every field has a default matching [`crate::constants`], so a partial JSON
//! file only needs to name the values it changes.

use crate::constants::{capture, mosaic, timing};
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::EncodingQuality;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Output file format for stills and collages
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum PhotoOutputFormat {
    /// JPEG (default, matches what browsers hand back for camera stills)
    #[default]
    Jpeg,
    /// Lossless PNG
    Png,
}

/// What the compositor does with a photo that fails to decode in time
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum DecodeFailurePolicy {
    /// Leave the photo out and keep composing
    #[default]
    Skip,
    /// Stop and report which photo failed
    Abort,
}

/// Burst capture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Countdown tick interval in milliseconds
    pub countdown_tick_ms: u64,
    /// "Ready" prompt duration in milliseconds
    pub ready_pause_ms: u64,
    /// Pause between shots in milliseconds
    pub inter_shot_pause_ms: u64,
    /// Canvas size when the frame source has no native resolution
    pub fallback_resolution: (u32, u32),
    /// Still image format
    pub output_format: PhotoOutputFormat,
    /// JPEG quality preset
    pub quality: EncodingQuality,
}

impl CaptureConfig {
    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms)
    }

    pub fn ready_pause(&self) -> Duration {
        Duration::from_millis(self.ready_pause_ms)
    }

    pub fn inter_shot_pause(&self) -> Duration {
        Duration::from_millis(self.inter_shot_pause_ms)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            countdown_tick_ms: timing::COUNTDOWN_TICK.as_millis() as u64,
            ready_pause_ms: timing::READY_PAUSE.as_millis() as u64,
            inter_shot_pause_ms: timing::INTER_SHOT_PAUSE.as_millis() as u64,
            fallback_resolution: capture::DEFAULT_RESOLUTION,
            output_format: PhotoOutputFormat::default(),
            quality: EncodingQuality::High,
        }
    }
}

/// Mosaic collage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    pub width: u32,
    pub height: u32,
    pub columns: usize,
    pub padding: f32,
    pub corner_radius: f32,
    /// Per-tile height jitter bounds (inclusive)
    pub jitter_min: f32,
    pub jitter_max: f32,
    /// Title drawn centred at the top, `None` to omit
    pub title: Option<String>,
    /// Per-photo decode timeout in milliseconds
    pub decode_timeout_ms: u64,
    pub decode_failure_policy: DecodeFailurePolicy,
    pub output_format: PhotoOutputFormat,
    pub quality: EncodingQuality,
}

impl MosaicConfig {
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }

    /// Width shared by every tile
    pub fn column_width(&self) -> f32 {
        let columns = self.columns as f32;
        (self.width as f32 - self.padding * (columns + 1.0)) / columns
    }

    /// Reject parameters that cannot produce a layout
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("canvas size {}x{} is empty", self.width, self.height));
        }
        if self.columns == 0 {
            return Err("column count must be at least 1".to_string());
        }
        if !(self.padding >= 0.0 && self.padding.is_finite())
            || !(self.corner_radius >= 0.0 && self.corner_radius.is_finite())
        {
            return Err("padding and corner radius must be finite and non-negative".to_string());
        }
        if self.column_width() <= 0.0 {
            return Err(format!(
                "{} columns with {} padding leave no room in {} px",
                self.columns, self.padding, self.width
            ));
        }
        if !(self.jitter_min > 0.0)
            || !self.jitter_max.is_finite()
            || self.jitter_min > self.jitter_max
        {
            return Err(format!(
                "jitter range {}..={} is invalid",
                self.jitter_min, self.jitter_max
            ));
        }
        if self.decode_timeout_ms == 0 {
            return Err("decode timeout must be at least 1 ms".to_string());
        }
        Ok(())
    }
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            width: mosaic::CANVAS_WIDTH,
            height: mosaic::CANVAS_HEIGHT,
            columns: mosaic::COLUMNS,
            padding: mosaic::PADDING,
            corner_radius: mosaic::CORNER_RADIUS,
            jitter_min: mosaic::JITTER_MIN,
            jitter_max: mosaic::JITTER_MAX,
            title: Some(mosaic::TITLE.to_string()),
            decode_timeout_ms: mosaic::DECODE_TIMEOUT.as_millis() as u64,
            decode_failure_policy: DecodeFailurePolicy::default(),
            output_format: PhotoOutputFormat::default(),
            quality: EncodingQuality::High,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub mosaic: MosaicConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("read '{}': {}", path.display(), e)))?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(text: &str) -> AppResult<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.mosaic.validate().map_err(AppError::Config)?;
        debug!(?config, "Configuration parsed");
        Ok(config)
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_column_width() {
        let config = MosaicConfig::default();
        assert_eq!(config.column_width(), 380.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_columns() {
        let config = MosaicConfig {
            columns: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "mosaic": { "columns": 4 } }"#).unwrap();
        assert_eq!(config.mosaic.columns, 4);
        assert_eq!(config.mosaic.padding, mosaic::PADDING);
        assert_eq!(config.capture, CaptureConfig::default());
    }
}
