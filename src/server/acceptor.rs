//! Connection acceptor.
//!
//! Owns the listening socket and spawns one task per accepted connection.
//!
//! ```text
//!   Running ──(shutdown token cancelled)──▶ ShuttingDown ──(all tasks done)──▶ Stopped
//!      │                                         ▲
//!      └──────(accept error: fatal)──────────────┘
//! ```
//!
//! Shutdown only stops new connections. Connections that were already
//! accepted run to completion, and [`Server::run`] returns after the last one
//! finishes. There is no drain timeout.

use std::path::{Path, PathBuf};

use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::error::ServerError;

use super::connection::ConnectionHandler;

/// A bound thumbnail server.
#[derive(Debug)]
pub struct Server {
    listener: UnixListener,
    path: PathBuf,
    handler: ConnectionHandler,
}

impl Server {
    /// Bind a Unix domain socket at `path`.
    ///
    /// Fails if the path already exists. Must be called from within a tokio
    /// runtime.
    pub fn bind(path: impl AsRef<Path>, handler: ConnectionHandler) -> Result<Self, ServerError> {
        let path = path.as_ref().to_path_buf();
        let listener = UnixListener::bind(&path).map_err(|source| ServerError::Bind {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            listener,
            path,
            handler,
        })
    }

    /// Path of the listening socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept connections until `shutdown` is cancelled, then drain.
    ///
    /// Cancellation is the normal way to stop and yields `Ok(())`. Any accept
    /// failure is fatal and is returned after in-flight connections finish.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let Server {
            listener,
            path,
            handler,
        } = self;

        let tracker = TaskTracker::new();
        let mut next_id: u64 = 0;

        info!("Listening on {}", path.display());

        let result = loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, no longer accepting connections");
                    break Ok(());
                }

                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => {
                        next_id += 1;
                        let id = next_id;
                        let handler = handler.clone();
                        debug!("Accepted connection {}", id);
                        tracker.spawn(async move { handler.serve(stream, id).await });
                    }
                    Err(e) => {
                        error!("Accept failed: {}", e);
                        break Err(ServerError::Accept(e));
                    }
                },
            }
        };

        // Close the socket before draining so new clients are refused.
        drop(listener);
        remove_socket_file(&path).await;

        tracker.close();
        if !tracker.is_empty() {
            info!("Waiting for {} connection(s) to finish", tracker.len());
        }
        tracker.wait().await;

        info!("Stopped");
        result
    }
}

async fn remove_socket_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove socket {}: {}", path.display(), e),
    }
}

// =============================================================================
// Tests
// =============================================================================
