// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use photobooth::Config;
use photobooth::config::{CaptureConfig, DecodeFailurePolicy, PhotoOutputFormat};
use photobooth::constants::{mosaic, timing};

#[test]
fn test_config_default() {
    // Defaults follow the constants
    let config = Config::default();

    assert_eq!(config.capture.countdown_tick(), timing::COUNTDOWN_TICK);
    assert_eq!(config.capture.ready_pause(), timing::READY_PAUSE);
    assert_eq!(config.capture.inter_shot_pause(), timing::INTER_SHOT_PAUSE);
    assert_eq!(config.mosaic.width, mosaic::CANVAS_WIDTH);
    assert_eq!(config.mosaic.columns, mosaic::COLUMNS);
    assert_eq!(config.mosaic.decode_timeout(), mosaic::DECODE_TIMEOUT);
    assert_eq!(
        config.mosaic.decode_failure_policy,
        DecodeFailurePolicy::Skip,
        "Undecodable photos should be skipped by default"
    );
}

#[test]
fn test_config_json_round_trip() {
    let mut config = Config::default();
    config.mosaic.title = None;
    config.mosaic.output_format = PhotoOutputFormat::Png;
    config.capture.inter_shot_pause_ms = 250;

    let json = config.to_json().unwrap();
    let parsed = Config::from_json(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_config_partial_json() {
    // Missing fields fall back to defaults
    let config = Config::from_json(r#"{ "mosaic": { "columns": 4 } }"#).unwrap();
    assert_eq!(config.mosaic.columns, 4);
    assert_eq!(config.mosaic.padding, mosaic::PADDING);
    assert_eq!(config.capture, CaptureConfig::default());
}

#[test]
fn test_config_rejects_invalid_mosaic() {
    assert!(Config::from_json(r#"{ "mosaic": { "columns": 0 } }"#).is_err());
    assert!(Config::from_json(r#"{ "mosaic": { "jitter_min": 1.5, "jitter_max": 1.0 } }"#).is_err());
    assert!(Config::from_json("not json").is_err());
}

#[test]
fn test_config_rejects_non_finite_mosaic() {
    // 1e39 overflows f32 to infinity
    assert!(Config::from_json(r#"{ "mosaic": { "jitter_max": 1e39 } }"#).is_err());
    assert!(Config::from_json(r#"{ "mosaic": { "padding": 1e39 } }"#).is_err());
    assert!(Config::from_json(r#"{ "mosaic": { "corner_radius": 1e39 } }"#).is_err());

    let mut config = Config::default();
    config.mosaic.jitter_min = f32::NAN;
    assert!(config.mosaic.validate().is_err());
}

#[test]
fn test_config_rejects_zero_decode_timeout() {
    assert!(Config::from_json(r#"{ "mosaic": { "decode_timeout_ms": 0 } }"#).is_err());
    let config = Config::from_json(r#"{ "mosaic": { "decode_timeout_ms": 1 } }"#).unwrap();
    assert_eq!(config.mosaic.decode_timeout_ms, 1);
}
