//! IPC Client
//!
//! Unix socket client for the page host side.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::{socket_path, IpcRequest, IpcResponse};
use crate::core::{FlashcardRecord, Mode};
use crate::error::{FlashError, FlashResult};
use crate::generator::{GenerationOutcome, GenerationRequest};

static NEXT_SEQ_ID: AtomicU64 = AtomicU64::new(1);

fn next_seq_id() -> u64 {
    NEXT_SEQ_ID.fetch_add(1, Ordering::SeqCst)
}

/// IPC Client for the page host
#[derive(Debug, Clone)]
pub struct IpcClient {
    path: PathBuf,
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new(socket_path())
    }
}

impl IpcClient {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Check if the daemon is running
    pub fn is_daemon_running(&self) -> bool {
        self.path.exists() && UnixStream::connect(&self.path).is_ok()
    }

    fn round_trip(&self, request: &IpcRequest, timeout: Duration) -> FlashResult<IpcResponse> {
        let mut stream = UnixStream::connect(&self.path)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(Duration::from_secs(5)))?;

        let request_json = serde_json::to_string(request)? + "\n";
        stream.write_all(request_json.as_bytes())?;

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader.read_line(&mut line)?;

        let response: IpcResponse = serde_json::from_str(line.trim())?;
        debug!("📨 IPC response: {:?}", response);

        if response.seq_id() != request.seq_id() {
            warn!(
                "⚠️ IPC sequence ID mismatch: expected {}, got {}",
                request.seq_id(),
                response.seq_id()
            );
            return Err(FlashError::Ipc(match response {
                IpcResponse::Ack {
                    message: Some(message),
                    ..
                } => message,
                _ => "sequence ID mismatch".to_string(),
            }));
        }
        Ok(response)
    }

    /// Ask the daemon to generate records
    pub fn generate(
        &self,
        request: GenerationRequest,
        timeout: Duration,
    ) -> FlashResult<GenerationOutcome> {
        let request = IpcRequest::generate(next_seq_id(), request);
        match self.round_trip(&request, timeout)? {
            IpcResponse::Flashcards {
                success,
                flashcards,
                error,
                ..
            } => Ok(GenerationOutcome {
                success,
                flashcards,
                error,
            }),
            other => Err(FlashError::Ipc(format!("unexpected response: {:?}", other))),
        }
    }

    /// Save records to the daemon's collection store
    pub fn save(&self, mode: Mode, flashcards: Vec<FlashcardRecord>) -> FlashResult<bool> {
        let request = IpcRequest::SaveFlashcards {
            seq_id: next_seq_id(),
            mode,
            flashcards,
        };
        match self.round_trip(&request, Duration::from_secs(5))? {
            IpcResponse::Ack { success, .. } => Ok(success),
            _ => Ok(false),
        }
    }

    /// Request daemon status: (ready, model)
    pub fn status(&self) -> FlashResult<(bool, String)> {
        let request = IpcRequest::StatusRequest {
            seq_id: next_seq_id(),
        };
        match self.round_trip(&request, Duration::from_secs(5))? {
            IpcResponse::StatusResponse { ready, model, .. } => Ok((ready, model)),
            other => Err(FlashError::Ipc(format!("unexpected response: {:?}", other))),
        }
    }
}
