// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use photobooth::constants::{BurstPreset, TimerSetting, mosaic};

#[test]
fn test_timer_settings() {
    // Off, 3, 5 and 10 seconds, in that order
    let seconds: Vec<u32> = TimerSetting::ALL.iter().map(|t| t.seconds()).collect();
    assert_eq!(seconds, vec![0, 3, 5, 10]);
}

#[test]
fn test_timer_from_seconds() {
    for timer in TimerSetting::ALL {
        assert_eq!(TimerSetting::from_seconds(timer.seconds()), Some(timer));
    }
    assert_eq!(TimerSetting::from_seconds(4), None);
}

#[test]
fn test_burst_presets() {
    let counts: Vec<u32> = BurstPreset::ALL.iter().map(|b| b.count()).collect();
    assert_eq!(counts, vec![1, 3, 5]);
}

#[test]
fn test_display_names() {
    for timer in TimerSetting::ALL {
        assert!(!timer.display_name().is_empty());
    }
    for preset in BurstPreset::ALL {
        assert!(!preset.display_name().is_empty());
    }
}

#[test]
fn test_mosaic_geometry() {
    // Three 380 px columns with 15 px gutters fill the 1200 px canvas
    let columns = mosaic::COLUMNS as f32;
    let column_width = (mosaic::CANVAS_WIDTH as f32 - mosaic::PADDING * (columns + 1.0)) / columns;
    assert_eq!(column_width, 380.0);
    assert!(mosaic::JITTER_MIN < 1.0 && mosaic::JITTER_MAX > 1.0);
}
