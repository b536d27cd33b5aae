//! Connection isolation tests.
//!
//! Tests verify:
//! - Malformed or truncated exchanges only affect their own connection
//! - Concurrent exchanges all complete
//! - A running server's socket path cannot be bound twice

use image::ImageFormat;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;

use thumq::{
    write_frame, ConnectionHandler, CropMode, Request, Server, ServerError, ThumbnailService,
};

use super::test_utils::{encode_image, exchange, TestServer};

#[tokio::test]
async fn test_short_frame_does_not_affect_others() {
    let server = TestServer::start();

    // Declares 100 bytes, sends 3, then hangs up
    let mut broken = UnixStream::connect(server.path()).await.unwrap();
    broken.write_all(&[100, 0, 0, 0, 1, 2, 3]).await.unwrap();
    drop(broken);

    let source = encode_image(ImageFormat::Png, 40, 40);
    let (response, data) =
        exchange(server.path(), Request::new(20, CropMode::None), &source).await;

    assert_eq!((response.nail_width, response.nail_height), (20, 20));
    assert!(!data.is_empty());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_invalid_request_closes_without_response() {
    let server = TestServer::start();

    let mut client = server.connect().await;
    // Field 1 with the reserved wire type 7
    client.send(&[0x0F]).await.unwrap();
    assert!(client.receive().await.is_err());

    // Server keeps serving
    let source = encode_image(ImageFormat::Bmp, 10, 10);
    let (response, _) = exchange(server.path(), Request::new(10, CropMode::None), &source).await;
    assert_eq!(response.source_type, "image/bmp");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_abandoned_before_image_frame() {
    let server = TestServer::start();

    let mut raw = UnixStream::connect(server.path()).await.unwrap();
    write_frame(&mut raw, &Request::new(10, CropMode::None).encode())
        .await
        .unwrap();
    drop(raw);

    let source = encode_image(ImageFormat::Gif, 30, 30);
    let (response, _) = exchange(server.path(), Request::new(10, CropMode::None), &source).await;
    assert_eq!(response.source_type, "image/gif");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_oversized_frame_rejected() {
    let handler = ConnectionHandler::with_max_frame_size(ThumbnailService::new(), 1024);
    let server = TestServer::start_with(handler);

    let mut client = server.connect().await;
    client.send(&Request::new(10, CropMode::None).encode()).await.unwrap();
    // The server stops reading after the prefix, so the write may or may
    // not fail depending on socket buffering.
    let _ = client.send(&vec![0u8; 4096]).await;
    assert!(client.receive().await.is_err());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_exchanges() {
    let server = TestServer::start();
    let path = server.path().to_path_buf();

    let mut tasks = Vec::new();
    for i in 0..8u32 {
        let path = path.clone();
        tasks.push(tokio::spawn(async move {
            let side = 40 + i * 10;
            let source = encode_image(ImageFormat::Png, side, side);
            let (response, _) = exchange(&path, Request::new(20, CropMode::None), &source).await;
            (response.nail_width, response.nail_height)
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), (20, 20));
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_second_bind_on_same_path_fails() {
    let server = TestServer::start();

    let result = Server::bind(
        server.path(),
        ConnectionHandler::new(ThumbnailService::new()),
    );
    assert!(matches!(result, Err(ServerError::Bind { .. })));

    server.stop().await.unwrap();
}
