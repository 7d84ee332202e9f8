//! IPC (Inter-Process Communication) Module
//!
//! Unix socket-based communication between the page host and the generator
//! daemon. Protocol: JSON over newline-delimited messages, one request per
//! connection.

pub mod client;
pub mod messages;
pub mod server;

pub use client::IpcClient;
pub use messages::*;
pub use server::IpcServer;

use std::path::PathBuf;

/// Largest request accepted by the server
pub const MAX_REQUEST_BYTES: u64 = 64 * 1024;

/// Get the default Unix socket path for IPC
pub fn socket_path() -> PathBuf {
    let user = std::env::var("USER").unwrap_or_else(|_| "flashgen".to_string());
    PathBuf::from(format!("/tmp/flashgen-{}.sock", user))
}
