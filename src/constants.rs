// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Self-timer delay before each shot of a burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimerSetting {
    /// Shoot immediately (default)
    #[default]
    Off,
    /// 3 second countdown
    Three,
    /// 5 second countdown
    Five,
    /// 10 second countdown
    Ten,
}

impl TimerSetting {
    /// All timer options in display order
    pub const ALL: [TimerSetting; 4] = [
        TimerSetting::Off,
        TimerSetting::Three,
        TimerSetting::Five,
        TimerSetting::Ten,
    ];

    /// Countdown length in seconds (0 = no delay)
    pub fn seconds(&self) -> u32 {
        match self {
            TimerSetting::Off => 0,
            TimerSetting::Three => 3,
            TimerSetting::Five => 5,
            TimerSetting::Ten => 10,
        }
    }

    /// Look up the setting for a number of seconds
    pub fn from_seconds(seconds: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.seconds() == seconds)
    }

    /// Get display name for the setting
    pub fn display_name(&self) -> &'static str {
        match self {
            TimerSetting::Off => "Off",
            TimerSetting::Three => "3s",
            TimerSetting::Five => "5s",
            TimerSetting::Ten => "10s",
        }
    }

    /// Next option, wrapping around to Off
    pub fn cycle(&self) -> Self {
        match self {
            TimerSetting::Off => TimerSetting::Three,
            TimerSetting::Three => TimerSetting::Five,
            TimerSetting::Five => TimerSetting::Ten,
            TimerSetting::Ten => TimerSetting::Off,
        }
    }
}

/// Burst sizes offered to the operator
///
/// The sequencer itself accepts any burst target of one or more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BurstPreset {
    /// Single shot (default)
    #[default]
    Single,
    /// Three shots
    Three,
    /// Five shots
    Five,
}

impl BurstPreset {
    /// All presets in display order
    pub const ALL: [BurstPreset; 3] = [BurstPreset::Single, BurstPreset::Three, BurstPreset::Five];

    /// Number of shots in the burst
    pub fn count(&self) -> u32 {
        match self {
            BurstPreset::Single => 1,
            BurstPreset::Three => 3,
            BurstPreset::Five => 5,
        }
    }

    /// Get display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            BurstPreset::Single => "1",
            BurstPreset::Three => "3",
            BurstPreset::Five => "5",
        }
    }
}

/// Capture timing constants
pub mod timing {
    use super::Duration;

    /// Interval between countdown values
    pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

    /// How long the "ready" prompt stays up before the shutter fires
    pub const READY_PAUSE: Duration = Duration::from_millis(800);

    /// Pause between shots so the operator can switch filters
    pub const INTER_SHOT_PAUSE: Duration = Duration::from_millis(1000);
}

/// Still capture constants
pub mod capture {
    /// Canvas size used when the frame source does not report one
    pub const DEFAULT_RESOLUTION: (u32, u32) = (1280, 720);

    /// Text shown between the last countdown value and the shot
    pub const READY_PROMPT: &str = "😊 Smile!";
}

/// Mosaic collage constants
pub mod mosaic {
    use super::Duration;

    /// Output canvas width
    pub const CANVAS_WIDTH: u32 = 1200;

    /// Output canvas height
    pub const CANVAS_HEIGHT: u32 = 1200;

    /// Number of layout columns
    pub const COLUMNS: usize = 3;

    /// Gap between tiles and around the edges
    pub const PADDING: f32 = 15.0;

    /// Tile corner radius
    pub const CORNER_RADIUS: f32 = 20.0;

    /// Lower bound of the per-tile height jitter
    pub const JITTER_MIN: f32 = 0.8;

    /// Upper bound of the per-tile height jitter
    pub const JITTER_MAX: f32 = 1.2;

    /// Title drawn centred at the top
    pub const TITLE: &str = "My Photo Collage";

    /// Title baseline
    pub const TITLE_BASELINE: f32 = 70.0;

    /// Title font size
    pub const TITLE_FONT_SIZE: f32 = 50.0;

    /// Tile border width
    pub const BORDER_WIDTH: f32 = 4.0;

    /// Upper bound on a single photo decode
    pub const DECODE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Photos decoded ahead of the one being placed
    pub const DECODE_AHEAD: usize = 2;

    /// Background gradient start (top-left)
    pub const GRADIENT_START: [u8; 3] = [0xf8, 0xf8, 0xf8];

    /// Background gradient end (bottom-right)
    pub const GRADIENT_END: [u8; 3] = [0xe0, 0xe0, 0xe0];

    /// Title colour
    pub const TITLE_COLOR: [u8; 3] = [0x33, 0x33, 0x33];

    /// Tile border colour (RGBA)
    pub const BORDER_COLOR: [u8; 4] = [255, 255, 255, 204];
}

/// Supported file formats for the still-image frame source
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}
