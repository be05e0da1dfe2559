// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for mosaic composition

use image::{Rgb, RgbImage};
use photobooth::backends::file_source::StillImageSource;
use photobooth::config::{DecodeFailurePolicy, MosaicConfig, PhotoOutputFormat};
use photobooth::errors::MosaicError;
use photobooth::filters::FilterSpec;
use futures::future::BoxFuture;
use photobooth::pipelines::mosaic::{
    FixedJitter, ImageDecoder, MosaicCompositor, MosaicLayout, PhotoDecoder, RngJitter, Tile,
};
use photobooth::pipelines::photo::{
    BurstRequest, CaptureSequencer, EncodedImage, EncodingFormat, EncodingQuality, PhotoEncoder,
};
use photobooth::TimerSetting;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn photo(width: u32, height: u32, color: [u8; 3]) -> EncodedImage {
    PhotoEncoder::with_format(EncodingFormat::Png, EncodingQuality::High)
        .encode_blocking(&RgbImage::from_pixel(width, height, Rgb(color)))
        .unwrap()
}

fn garbage() -> EncodedImage {
    EncodedImage {
        data: Arc::from(vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]),
        format: EncodingFormat::Jpeg,
        width: 10,
        height: 10,
    }
}

/// Decoder that never finishes photos starting with `STALL`
struct StallingDecoder;

impl PhotoDecoder for StallingDecoder {
    fn decode(&self, photo: EncodedImage) -> BoxFuture<'static, Result<image::RgbaImage, String>> {
        if photo.data.starts_with(b"STALL") {
            return Box::pin(futures::future::pending());
        }
        ImageDecoder.decode(photo)
    }
}

fn stalled() -> EncodedImage {
    EncodedImage {
        data: Arc::from(b"STALL".to_vec()),
        format: EncodingFormat::Png,
        width: 10,
        height: 10,
    }
}

fn png_config() -> MosaicConfig {
    MosaicConfig {
        output_format: PhotoOutputFormat::Png,
        title: None,
        ..Default::default()
    }
}

fn compositor(config: MosaicConfig) -> MosaicCompositor {
    MosaicCompositor::new(config).unwrap()
}

fn columns(tiles: &[Tile]) -> Vec<usize> {
    tiles.iter().map(|t| t.column).collect()
}

#[tokio::test]
async fn test_empty_input_returns_none() {
    let output = MosaicCompositor::default()
        .compose(&[], &mut FixedJitter::new(1.0))
        .await
        .unwrap();
    assert!(output.is_none());
}

#[tokio::test]
async fn test_single_photo_top_left() {
    let output = compositor(png_config())
        .compose(&[photo(40, 30, [200, 30, 30])], &mut FixedJitter::new(1.0))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(output.tiles.len(), 1);
    let tile = output.tiles[0];
    assert_eq!(tile.column, 0);
    assert_eq!((tile.x, tile.y), (15.0, 15.0));
    assert_eq!(tile.width, 380.0);
    assert_eq!(tile.height, 285.0);

    assert_eq!(output.image.format, EncodingFormat::Png);
    let raster = image::load_from_memory(&output.image.data).unwrap().to_rgb8();
    assert_eq!(raster.dimensions(), (1200, 1200));

    // Tile interior shows the photo, the far corner shows the background
    let inside = raster.get_pixel(200, 150).0;
    assert!(inside[0] > 190 && inside[1] < 45, "inside {:?}", inside);
    let outside = raster.get_pixel(1190, 1190).0;
    assert!(outside[0] > 200 && outside[0] == outside[1], "outside {:?}", outside);
}

#[tokio::test]
async fn test_default_output_is_jpeg_canvas() {
    let output = MosaicCompositor::default()
        .compose(&[photo(16, 16, [0, 0, 255])], &mut RngJitter::seeded(1))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(output.image.format, EncodingFormat::Jpeg);
    assert_eq!((output.image.width, output.image.height), (1200, 1200));
}

#[tokio::test]
async fn test_square_photos_round_robin() {
    let photos: Vec<EncodedImage> = (0..4).map(|_| photo(50, 50, [10, 120, 10])).collect();
    let output = compositor(png_config())
        .compose(&photos, &mut FixedJitter::new(1.0))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(columns(&output.tiles), vec![0, 1, 2, 0]);
    assert!(output.tiles.iter().all(|t| t.height == 380.0));
    assert_eq!(output.tiles[3].y, 410.0);
    assert!(output.skipped.is_empty());
}

#[test]
fn test_shortest_column_wins() {
    // Heights 760, 190, 380 leave column 1 shortest, then column 2
    let tiles = MosaicLayout::plan(
        &MosaicConfig::default(),
        &[(100, 200), (100, 50), (100, 100), (100, 100), (100, 100)],
        &mut FixedJitter::new(1.0),
    );

    assert_eq!(columns(&tiles), vec![0, 1, 2, 1, 2]);
    assert_eq!(tiles[3].y, 220.0);
    assert_eq!(tiles[4].y, 410.0);
}

#[test]
fn test_jitter_scales_height() {
    let tiles = MosaicLayout::plan(
        &MosaicConfig::default(),
        &[(100, 100), (100, 100)],
        &mut FixedJitter::sequence(vec![0.8, 1.2]),
    );
    assert!((tiles[0].height - 304.0).abs() < 1e-3);
    assert!((tiles[1].height - 456.0).abs() < 1e-3);
}

#[test]
fn test_random_layout_never_overlaps() {
    let sizes: Vec<(u32, u32)> = (0..12)
        .map(|i| (100 + i * 37 % 90, 60 + i * 53 % 140))
        .collect();
    let tiles = MosaicLayout::plan(&MosaicConfig::default(), &sizes, &mut RngJitter::seeded(42));

    assert_eq!(tiles.len(), sizes.len());
    for (i, a) in tiles.iter().enumerate() {
        assert!(a.height > 0.0);
        assert_eq!(a.width, 380.0);
        for b in &tiles[i + 1..] {
            assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            if a.column == b.column {
                assert!(b.y >= a.bottom() + 15.0 - 1e-3);
            }
        }
    }
}

#[tokio::test]
async fn test_undecodable_photo_skipped() {
    let photos = vec![photo(20, 20, [1, 2, 3]), garbage(), photo(20, 20, [4, 5, 6])];
    let output = compositor(png_config())
        .compose(&photos, &mut FixedJitter::new(1.0))
        .await
        .unwrap()
        .unwrap();

    let placed: Vec<usize> = output.tiles.iter().map(|t| t.source_index).collect();
    assert_eq!(placed, vec![0, 2]);
    assert_eq!(columns(&output.tiles), vec![0, 1]);
    assert_eq!(output.skipped.len(), 1);
    assert_eq!(output.skipped[0].index, 1);
}

#[tokio::test]
async fn test_undecodable_photo_aborts() {
    let config = MosaicConfig {
        decode_failure_policy: DecodeFailurePolicy::Abort,
        ..png_config()
    };
    let photos = vec![photo(20, 20, [1, 2, 3]), garbage(), photo(20, 20, [4, 5, 6])];
    let result = compositor(config)
        .compose(&photos, &mut FixedJitter::new(1.0))
        .await;

    match result {
        Err(MosaicError::Decode { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected decode error, got {:?}", other.map(|o| o.is_some())),
    }
}

#[tokio::test]
async fn test_stalled_decode_skipped() {
    let config = MosaicConfig {
        decode_timeout_ms: 50,
        ..png_config()
    };
    let photos = vec![photo(20, 20, [1, 2, 3]), stalled(), photo(20, 20, [4, 5, 6])];
    let output = compositor(config)
        .with_decoder(StallingDecoder)
        .compose(&photos, &mut FixedJitter::new(1.0))
        .await
        .unwrap()
        .unwrap();

    let placed: Vec<usize> = output.tiles.iter().map(|t| t.source_index).collect();
    assert_eq!(placed, vec![0, 2]);
    assert_eq!(columns(&output.tiles), vec![0, 1]);
    assert_eq!(output.skipped.len(), 1);
    assert_eq!(output.skipped[0].index, 1);
    assert_eq!(
        output.skipped[0].reason,
        MosaicError::DecodeTimeout { index: 1 }.to_string()
    );
}

#[tokio::test]
async fn test_stalled_decode_aborts() {
    let config = MosaicConfig {
        decode_timeout_ms: 50,
        decode_failure_policy: DecodeFailurePolicy::Abort,
        ..png_config()
    };
    let photos = vec![photo(20, 20, [1, 2, 3]), stalled(), photo(20, 20, [4, 5, 6])];
    let result = compositor(config)
        .with_decoder(StallingDecoder)
        .compose(&photos, &mut FixedJitter::new(1.0))
        .await;

    match result {
        Err(MosaicError::DecodeTimeout { index }) => assert_eq!(index, 1),
        other => panic!("expected decode timeout, got {:?}", other.map(|o| o.is_some())),
    }
}

#[tokio::test]
async fn test_title_does_not_break_composition() {
    // Renders with whatever fonts the system has, or none at all
    let config = MosaicConfig {
        title: Some("Party <2026> & friends".to_string()),
        ..png_config()
    };
    let output = compositor(config)
        .compose(&[photo(30, 30, [9, 9, 9])], &mut FixedJitter::new(1.0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(output.tiles.len(), 1);
}

#[tokio::test]
async fn test_burst_into_collage() {
    let source = StillImageSource::from_image(image::DynamicImage::ImageRgb8(
        RgbImage::from_pixel(32, 24, Rgb([90, 160, 220])),
    ));
    let sequencer = CaptureSequencer::default();
    let outcome = sequencer
        .run_sequence(
            BurstRequest::new(2, TimerSetting::Off),
            &FilterSpec::none(),
            &source,
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.photos.len(), 2);

    let output = compositor(png_config())
        .compose_photos(&outcome.photos, &mut FixedJitter::new(1.0))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(columns(&output.tiles), vec![0, 1]);
    assert_eq!(output.tiles[0].height, 285.0);
}
