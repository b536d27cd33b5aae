//! Configuration management for thumq.
//!
//! Settings come from command-line arguments via clap, with environment
//! variable fallbacks under the `THUMQ_` prefix:
//!
//! - `THUMQ_JPEG_QUALITY` - Thumbnail JPEG quality (default: 75)
//! - `THUMQ_MAX_FRAME_SIZE` - Largest accepted frame in bytes (default: 128 MiB)
//!
//! # Example
//!
//! ```ignore
//! use thumq::config::Config;
//!
//! let config = Config::parse();
//! println!("Listening on {}", config.socket.display());
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::protocol::DEFAULT_MAX_FRAME_SIZE;
use crate::thumbnail::{
    is_valid_quality, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// thumq - A thumbnailing service on a Unix domain socket.
///
/// Each connection sends a request and an image; the server answers with the
/// detected type, the thumbnail dimensions and a JPEG thumbnail.
#[derive(Parser, Debug, Clone)]
#[command(name = "thumq")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Filesystem path of the Unix socket to create.
    ///
    /// The path must not exist yet. It is removed again on shutdown.
    #[arg(value_name = "SOCKET")]
    pub socket: PathBuf,

    /// JPEG quality for thumbnails (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "THUMQ_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// Largest frame accepted from a client, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_SIZE, env = "THUMQ_MAX_FRAME_SIZE")]
    pub max_frame_size: usize,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_quality(self.jpeg_quality) {
            return Err(format!(
                "jpeg_quality must be between {} and {}, got {}",
                MIN_JPEG_QUALITY, MAX_JPEG_QUALITY, self.jpeg_quality
            ));
        }

        if self.max_frame_size == 0 {
            return Err("max_frame_size must be greater than 0".to_string());
        }

        if self.socket.as_os_str().is_empty() {
            return Err("Socket path must not be empty".to_string());
        }

        Ok(())
    }
}
