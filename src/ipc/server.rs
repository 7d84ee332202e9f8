//! IPC Server
//!
//! Unix socket server for handling daemon-side IPC.

use anyhow::Result;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{socket_path, IpcRequest, IpcResponse, MAX_REQUEST_BYTES};

/// IPC Server for daemon
pub struct IpcServer {
    path: PathBuf,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl IpcServer {
    /// Create new IPC server on the default socket
    pub fn new() -> Self {
        Self::with_path(socket_path())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start the server with a request handler
    pub fn start<F>(&mut self, handler: F) -> Result<()>
    where
        F: Fn(IpcRequest) -> IpcResponse + Send + Sync + 'static,
    {
        let path = self.path.clone();

        // Clean up stale socket
        if path.exists() {
            let _ = fs::remove_file(&path);
        }

        let listener = UnixListener::bind(&path)?;

        // User only: rw-------
        if let Ok(metadata) = fs::metadata(&path) {
            let mut perms = metadata.permissions();
            perms.set_mode(0o600);
            if let Err(e) = fs::set_permissions(&path, perms) {
                warn!("⚠️ Failed to set strict IPC socket permissions: {}", e);
            } else {
                debug!("🔒 IPC socket permissions set to 0600");
            }
        }

        listener.set_nonblocking(true)?;

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let handler = Arc::new(handler);

        info!("🔌 IPC server listening on {:?}", path);

        let handle = thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let handler = handler.clone();
                        thread::spawn(move || {
                            if let Err(e) = handle_client(stream, handler) {
                                warn!("IPC client error: {}", e);
                            }
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(50));
                    }
                    Err(e) => {
                        warn!("IPC accept error: {}", e);
                    }
                }
            }

            let _ = fs::remove_file(&path);
            info!("🔌 IPC server stopped");
        });

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop the server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for IpcServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Handle a single client connection
fn handle_client<F>(mut stream: UnixStream, handler: Arc<F>) -> Result<()>
where
    F: Fn(IpcRequest) -> IpcResponse,
{
    // Accepted sockets may inherit non-blocking mode from the listener
    stream.set_nonblocking(false)?;

    let mut reader = BufReader::new(stream.try_clone()?).take(MAX_REQUEST_BYTES);
    let mut line = String::new();

    reader.read_line(&mut line)?;

    if line.trim().is_empty() {
        return Ok(());
    }

    let response = match serde_json::from_str::<IpcRequest>(line.trim()) {
        Ok(request) => {
            debug!("📨 IPC request: {:?}", request);
            handler(request)
        }
        Err(e) => {
            warn!("⚠️ Rejected IPC request: {}", e);
            IpcResponse::Ack {
                seq_id: 0,
                success: false,
                message: Some(format!("Invalid request: {}", e)),
            }
        }
    };

    let response_json = serde_json::to_string(&response)? + "\n";
    stream.write_all(response_json.as_bytes())?;

    Ok(())
}
