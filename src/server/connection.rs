//! Per-connection worker.
//!
//! A connection carries exactly one exchange. The worker reads the request
//! and image frames, runs the thumbnail pipeline on the blocking pool, and
//! writes the response and thumbnail frames. Any failure ends the exchange
//! early and is reported to the supervising task, which logs it; the client
//! sees the connection close without a response.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::error::ConnectionError;
use crate::protocol::{FramedStream, Request, Response, DEFAULT_MAX_FRAME_SIZE};
use crate::thumbnail::ThumbnailService;

/// Runs the request/response exchange for single connections.
#[derive(Debug, Clone)]
pub struct ConnectionHandler {
    service: Arc<ThumbnailService>,
    max_frame_size: usize,
    #[cfg(test)]
    gate: Option<Arc<PipelineGate>>,
}

impl ConnectionHandler {
    /// Create a handler with the default frame limit.
    pub fn new(service: ThumbnailService) -> Self {
        Self::with_max_frame_size(service, DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create a handler with a custom limit on received frames.
    pub fn with_max_frame_size(service: ThumbnailService, max_frame_size: usize) -> Self {
        Self {
            service: Arc::new(service),
            max_frame_size,
            #[cfg(test)]
            gate: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_gate(mut self, gate: Arc<PipelineGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Perform one exchange on `stream`.
    ///
    /// Returns the response that was sent. The stream is dropped (closed) on
    /// return, whether or not the exchange completed.
    pub async fn handle<S>(&self, stream: S) -> Result<Response, ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut framed = FramedStream::with_max_frame_size(stream, self.max_frame_size);

        let request = Request::decode(&framed.receive().await?)?;
        let source = framed.receive().await?;
        debug!(
            "Request scale={} crop={:?}, {} source bytes",
            request.scale,
            request.crop,
            source.len()
        );

        let service = Arc::clone(&self.service);
        #[cfg(test)]
        let gate = self.gate.clone();
        let thumbnail = tokio::task::spawn_blocking(move || {
            #[cfg(test)]
            if let Some(gate) = gate {
                gate.pass();
            }
            service.process(&request, &source)
        })
        .await??;

        framed.send(&thumbnail.response.encode()).await?;
        framed.send(&thumbnail.data).await?;

        Ok(thumbnail.response)
    }

    /// Supervise one connection: run the exchange and log its outcome.
    ///
    /// Failures stay here; nothing is returned to the acceptor.
    pub async fn serve<S>(&self, stream: S, id: u64)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match self.handle(stream).await {
            Ok(response) => debug!(
                "Connection {} done: type={:?} {}x{}",
                id, response.source_type, response.nail_width, response.nail_height
            ),
            Err(e) => warn!("Connection {} aborted: {}", id, e),
        }
    }
}

/// Holds a worker inside the blocking pipeline until the test releases it.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct PipelineGate {
    entered: tokio::sync::mpsc::UnboundedSender<()>,
    release: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
}

#[cfg(test)]
impl PipelineGate {
    /// Returns the gate, a receiver signalled on entry, and the release sender.
    pub(crate) fn new() -> (
        Arc<Self>,
        tokio::sync::mpsc::UnboundedReceiver<()>,
        std::sync::mpsc::Sender<()>,
    ) {
        let (entered, entered_rx) = tokio::sync::mpsc::unbounded_channel();
        let (release_tx, release) = std::sync::mpsc::channel();
        let gate = Arc::new(Self {
            entered,
            release: std::sync::Mutex::new(release),
        });
        (gate, entered_rx, release_tx)
    }

    fn pass(&self) {
        let _ = self.entered.send(());
        if let Ok(release) = self.release.lock() {
            let _ = release.recv();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
