//! thumq - A thumbnailing service on a Unix domain socket.
//!
//! This binary parses configuration, binds the socket and runs the server
//! until SIGINT or SIGTERM.

use clap::Parser;
use std::process::ExitCode;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thumq::{
    config::Config,
    server::{ConnectionHandler, Server},
    thumbnail::{JpegThumbnailEncoder, ThumbnailService},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let service =
        ThumbnailService::with_encoder(JpegThumbnailEncoder::with_quality(config.jpeg_quality));

    info!("thumq v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Socket: {}", config.socket.display());
    info!("  JPEG quality: {}", service.encoder().quality());
    info!("  Max frame size: {} bytes", config.max_frame_size);

    let handler = ConnectionHandler::with_max_frame_size(service, config.max_frame_size);

    let server = match Server::bind(&config.socket, handler) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    match server.run(shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Cancel `shutdown` on the first SIGINT or SIGTERM.
async fn shutdown_on_signal(shutdown: CancellationToken) {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            None
        }
    };

    let sigterm = async {
        match terminate.as_mut() {
            Some(stream) => {
                stream.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = interrupt => info!("Received SIGINT"),
        _ = sigterm => info!("Received SIGTERM"),
    }

    shutdown.cancel();
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose { "thumq=debug" } else { "thumq=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
