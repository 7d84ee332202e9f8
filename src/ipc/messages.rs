//! IPC Message Types
//!
//! JSON-serializable messages between the page host and the generator daemon.

use serde::{Deserialize, Serialize};

use crate::core::{FlashcardRecord, Mode};
use crate::generator::{GenerationOutcome, GenerationRequest};

/// Request types sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IpcRequest {
    /// Generate records for a selection
    #[serde(rename = "generate_flashcards")]
    GenerateFlashcards {
        seq_id: u64,
        text: String,
        mode: Mode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        word: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },

    /// Append records to the saved collection for a mode
    #[serde(rename = "save_flashcards")]
    SaveFlashcards {
        seq_id: u64,
        mode: Mode,
        flashcards: Vec<FlashcardRecord>,
    },

    /// Request status of the daemon
    #[serde(rename = "status_request")]
    StatusRequest { seq_id: u64 },
}

impl IpcRequest {
    pub fn seq_id(&self) -> u64 {
        match self {
            IpcRequest::GenerateFlashcards { seq_id, .. }
            | IpcRequest::SaveFlashcards { seq_id, .. }
            | IpcRequest::StatusRequest { seq_id } => *seq_id,
        }
    }

    pub fn generate(seq_id: u64, request: GenerationRequest) -> Self {
        IpcRequest::GenerateFlashcards {
            seq_id,
            text: request.text,
            mode: request.mode,
            word: request.word,
            context: request.context,
        }
    }
}

/// Response types sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IpcResponse {
    /// Result of a generation request
    #[serde(rename = "flashcards")]
    Flashcards {
        seq_id: u64,
        success: bool,
        #[serde(default)]
        flashcards: Vec<FlashcardRecord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Status response
    #[serde(rename = "status_response")]
    StatusResponse {
        seq_id: u64,
        ready: bool,
        model: String,
    },

    /// Acknowledgment
    #[serde(rename = "ack")]
    Ack {
        seq_id: u64,
        success: bool,
        message: Option<String>,
    },
}

impl IpcResponse {
    pub fn seq_id(&self) -> u64 {
        match self {
            IpcResponse::Flashcards { seq_id, .. }
            | IpcResponse::StatusResponse { seq_id, .. }
            | IpcResponse::Ack { seq_id, .. } => *seq_id,
        }
    }

    pub fn flashcards(seq_id: u64, outcome: GenerationOutcome) -> Self {
        IpcResponse::Flashcards {
            seq_id,
            success: outcome.success,
            flashcards: outcome.flashcards,
            error: outcome.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_deserialize() {
        let req: IpcRequest = serde_json::from_str(
            r#"{"type":"generate_flashcards","seq_id":7,"text":"run","mode":"language"}"#,
        )
        .unwrap();
        match req {
            IpcRequest::GenerateFlashcards {
                seq_id,
                mode,
                word,
                ..
            } => {
                assert_eq!(seq_id, 7);
                assert_eq!(mode, Mode::Language);
                assert!(word.is_none());
            }
            other => panic!("Expected GenerateFlashcards, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result: Result<IpcRequest, _> = serde_json::from_str(
            r#"{"type":"generate_flashcards","seq_id":1,"text":"x","mode":"summary"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_flashcards_response_serialize() {
        let resp = IpcResponse::Flashcards {
            seq_id: 3,
            success: true,
            flashcards: vec![FlashcardRecord::Basic {
                question: "Q".to_string(),
                answer: "A".to_string(),
            }],
            error: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"type\":\"flashcards\""));
        assert!(json.contains("\"question\":\"Q\""));
        assert!(!json.contains("error"));
    }
}
