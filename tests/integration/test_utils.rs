//! Test utilities for integration tests.
//!
//! Provides a server running on a temporary socket and helpers for building
//! source images, including JPEGs with an embedded EXIF orientation.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;
use tokio::net::UnixStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use thumq::{ConnectionHandler, FramedStream, Request, Response, Server, ServerError, ThumbnailService};

// =============================================================================
// Test Server
// =============================================================================

/// A server bound to a socket inside its own temporary directory.
pub struct TestServer {
    _dir: TempDir,
    path: PathBuf,
    shutdown: CancellationToken,
    task: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    /// Start a server with default settings.
    pub fn start() -> Self {
        Self::start_with(ConnectionHandler::new(ThumbnailService::new()))
    }

    /// Start a server with a custom handler.
    pub fn start_with(handler: ConnectionHandler) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumq.sock");

        let server = Server::bind(&path, handler).unwrap();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(server.run(shutdown.clone()));

        Self {
            _dir: dir,
            path,
            shutdown,
            task,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a framed client connection.
    pub async fn connect(&self) -> FramedStream<UnixStream> {
        FramedStream::new(UnixStream::connect(&self.path).await.unwrap())
    }

    /// Request shutdown without waiting for it.
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the server task to return.
    pub async fn join(self) -> Result<(), ServerError> {
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("server did not stop in time")
            .unwrap()
    }

    /// Request shutdown and wait for the drain to complete.
    pub async fn stop(self) -> Result<(), ServerError> {
        self.cancel();
        self.join().await
    }
}

/// Run one full exchange against the server at `path`.
pub async fn exchange(path: &Path, request: Request, source: &[u8]) -> (Response, Bytes) {
    let mut client = FramedStream::new(UnixStream::connect(path).await.unwrap());
    client.send(&request.encode()).await.unwrap();
    client.send(source).await.unwrap();

    let response = Response::decode(&client.receive().await.unwrap()).unwrap();
    let data = client.receive().await.unwrap();
    (response, data)
}

/// Poll until connecting to `path` fails.
pub async fn wait_until_refused(path: &Path) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while UnixStream::connect(path).await.is_ok() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("server kept accepting connections");
}

// =============================================================================
// Image Builders
// =============================================================================

/// Encode a gradient image in the given format.
pub fn encode_image(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 96])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Encode a JPEG and splice in an APP1 EXIF segment carrying `orientation`.
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let jpeg = encode_image(ImageFormat::Jpeg, width, height);
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    // Little-endian TIFF with a single IFD holding the orientation tag
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut segment = b"Exif\0\0".to_vec();
    segment.extend_from_slice(&tiff);

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&((segment.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Dimensions of a JPEG payload.
pub fn jpeg_dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg).unwrap();
    (img.width(), img.height())
}

/// Check if data is a valid JPEG (starts with SOI, ends with EOI).
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4
        && data[0] == 0xFF
        && data[1] == 0xD8
        && data[data.len() - 2] == 0xFF
        && data[data.len() - 1] == 0xD9
}
