//! Unix socket server for thumq.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Server (acceptor)                           │
//! │        UnixListener ── accept ──▶ TaskTracker::spawn            │
//! │                                                                 │
//! │  ┌──────────────────────┐        ┌──────────────────────────┐   │
//! │  │  ConnectionHandler   │  ...   │   ConnectionHandler      │   │
//! │  │  (one per conn)      │        │   (one per conn)         │   │
//! │  └──────────────────────┘        └──────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The acceptor is stopped with a [`CancellationToken`](tokio_util::sync::CancellationToken).
//! Connection failures are logged by their own task and never reach the
//! acceptor.

pub mod acceptor;
pub mod connection;

pub use acceptor::Server;
pub use connection::ConnectionHandler;
