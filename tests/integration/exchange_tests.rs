//! End-to-end exchange tests.
//!
//! Tests verify:
//! - Source type and thumbnail dimensions for each format
//! - EXIF orientation correction for JPEG sources
//! - Top-square cropping
//! - Undecodable input

use image::ImageFormat;

use thumq::{ConnectionHandler, CropMode, JpegThumbnailEncoder, Request, Response, ThumbnailService};

use super::test_utils::{
    encode_image, exchange, is_valid_jpeg, jpeg_dimensions, jpeg_with_orientation, TestServer,
};

// =============================================================================
// Format Coverage
// =============================================================================

#[tokio::test]
async fn test_png_top_square() {
    let server = TestServer::start();

    let source = encode_image(ImageFormat::Png, 300, 100);
    let (response, data) =
        exchange(server.path(), Request::new(50, CropMode::TopSquare), &source).await;

    assert_eq!(response.source_type, "image/png");
    assert_eq!((response.nail_width, response.nail_height), (50, 50));
    assert!(is_valid_jpeg(&data));
    assert_eq!(jpeg_dimensions(&data), (50, 50));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_each_format_is_detected() {
    let server = TestServer::start();

    let cases = [
        (ImageFormat::Jpeg, "image/jpeg"),
        (ImageFormat::Png, "image/png"),
        (ImageFormat::Gif, "image/gif"),
        (ImageFormat::Bmp, "image/bmp"),
    ];

    for (format, mime) in cases {
        let source = encode_image(format, 120, 80);
        let (response, data) =
            exchange(server.path(), Request::new(60, CropMode::None), &source).await;

        assert_eq!(response.source_type, mime);
        assert_eq!((response.nail_width, response.nail_height), (60, 40));
        assert_eq!(jpeg_dimensions(&data), (60, 40));
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_small_source_keeps_size() {
    let server = TestServer::start();

    let source = encode_image(ImageFormat::Png, 32, 24);
    let (response, data) =
        exchange(server.path(), Request::new(1000, CropMode::None), &source).await;

    assert_eq!((response.nail_width, response.nail_height), (32, 24));
    assert_eq!(jpeg_dimensions(&data), (32, 24));

    server.stop().await.unwrap();
}

// =============================================================================
// Orientation
// =============================================================================

#[tokio::test]
async fn test_jpeg_right_top_is_rotated() {
    let server = TestServer::start();

    // Stored 200 wide, 400 tall; upright it is 400x200
    let source = jpeg_with_orientation(200, 400, 6);
    let (response, data) =
        exchange(server.path(), Request::new(100, CropMode::None), &source).await;

    assert_eq!(response.source_type, "image/jpeg");
    assert_eq!((response.nail_width, response.nail_height), (100, 50));
    assert_eq!(jpeg_dimensions(&data), (100, 50));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_jpeg_non_swapping_orientation_keeps_shape() {
    let server = TestServer::start();

    let source = jpeg_with_orientation(200, 400, 3);
    let (response, _) = exchange(server.path(), Request::new(100, CropMode::None), &source).await;

    assert_eq!((response.nail_width, response.nail_height), (50, 100));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_jpeg_orientation_applies_before_crop() {
    let server = TestServer::start();

    let source = jpeg_with_orientation(80, 160, 8);
    let (response, _) =
        exchange(server.path(), Request::new(500, CropMode::TopSquare), &source).await;

    assert_eq!((response.nail_width, response.nail_height), (80, 80));

    server.stop().await.unwrap();
}

// =============================================================================
// Undecodable Input
// =============================================================================

#[tokio::test]
async fn test_random_bytes_yield_empty_thumbnail() {
    let server = TestServer::start();

    let source: Vec<u8> = (0..512u32).map(|i| (i * 7 + 3) as u8).collect();
    let (response, data) =
        exchange(server.path(), Request::new(100, CropMode::None), &source).await;

    assert_eq!(response, Response::default());
    assert!(data.is_empty());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_empty_source_yields_empty_thumbnail() {
    let server = TestServer::start();

    let (response, data) = exchange(server.path(), Request::new(100, CropMode::None), &[]).await;

    assert_eq!((response.nail_width, response.nail_height), (0, 0));
    assert!(data.is_empty());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_truncated_png_reports_sniffed_type() {
    let server = TestServer::start();

    let mut source = encode_image(ImageFormat::Png, 64, 64);
    source.truncate(40);
    let (response, data) =
        exchange(server.path(), Request::new(100, CropMode::None), &source).await;

    assert_eq!(response.source_type, "image/png");
    assert_eq!((response.nail_width, response.nail_height), (0, 0));
    assert!(data.is_empty());

    server.stop().await.unwrap();
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_custom_quality_changes_output() {
    let low = TestServer::start_with(ConnectionHandler::new(ThumbnailService::with_encoder(
        JpegThumbnailEncoder::with_quality(10),
    )));
    let high = TestServer::start_with(ConnectionHandler::new(ThumbnailService::with_encoder(
        JpegThumbnailEncoder::with_quality(95),
    )));

    let source = encode_image(ImageFormat::Png, 256, 256);
    let request = Request::new(256, CropMode::None);

    let (_, small) = exchange(low.path(), request, &source).await;
    let (_, large) = exchange(high.path(), request, &source).await;
    assert!(small.len() < large.len());

    low.stop().await.unwrap();
    high.stop().await.unwrap();
}
