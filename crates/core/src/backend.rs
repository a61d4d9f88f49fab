//! GenerationBackend trait — the abstraction over the remote generation API.
//!
//! A backend knows how to send an assembled request to the model service and
//! return the response as an incremental stream, and additionally exposes the
//! two opaque media capabilities (audio transcription, speech synthesis) the
//! client consumes through simple request/response contracts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::BackendError;

/// The role tag on a content turn sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One part of a content turn: plain text or inline binary with a MIME type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentPart {
    Text(String),
    Inline {
        mime_type: String,
        /// Base64-encoded bytes.
        data: String,
    },
}

/// One role-tagged turn in the ordered content list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTurn {
    pub role: TurnRole,
    pub parts: Vec<ContentPart>,
}

impl ContentTurn {
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: TurnRole::User,
            parts,
        }
    }

    pub fn model(parts: Vec<ContentPart>) -> Self {
        Self {
            role: TurnRole::Model,
            parts,
        }
    }
}

/// A fully resolved generation request. Constructed fresh per exchange and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Concrete backend model name.
    pub model: String,

    /// Fully assembled system instruction.
    pub system_instruction: String,

    /// Temperature (0.0–1.0).
    pub temperature: f32,

    /// Deep-reasoning token budget, present only for reasoning-tier models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<u32>,

    /// The ordered conversation content.
    pub contents: Vec<ContentTurn>,
}

/// A single chunk in a streaming response.
///
/// `text` is the **cumulative** response so far, not a delta. Consumers
/// replace their buffer wholesale on every chunk; they never concatenate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// The entire response text accumulated so far.
    pub text: String,

    /// Whether this is the final chunk.
    #[serde(default)]
    pub done: bool,
}

/// Receiver half of a generation stream.
pub type GenerationStream =
    tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, BackendError>>;

/// The core backend trait.
///
/// The session manager calls `stream_generate()` without knowing which
/// concrete service is behind it — pure polymorphism, and the seam where
/// tests substitute a scripted backend.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a request and receive a stream of cumulative-text chunks.
    async fn stream_generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationStream, BackendError>;

    /// Transcribe raw audio bytes to plain text.
    ///
    /// Default implementation reports the capability as unavailable.
    async fn transcribe(
        &self,
        _audio: Vec<u8>,
        _mime_type: &str,
    ) -> std::result::Result<String, BackendError> {
        Err(BackendError::NotConfigured(format!(
            "Backend '{}' does not support transcription",
            self.name()
        )))
    }

    /// Synthesize speech audio for the given text.
    ///
    /// Default implementation reports the capability as unavailable.
    async fn synthesize(&self, _text: &str) -> std::result::Result<Vec<u8>, BackendError> {
        Err(BackendError::NotConfigured(format!(
            "Backend '{}' does not support speech synthesis",
            self.name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Minimal;

    #[async_trait]
    impl GenerationBackend for Minimal {
        fn name(&self) -> &str {
            "minimal"
        }

        async fn stream_generate(
            &self,
            _request: GenerationRequest,
        ) -> std::result::Result<GenerationStream, BackendError> {
            let (tx, rx) = tokio::sync::mpsc::channel(1);
            let _ = tx
                .send(Ok(StreamChunk {
                    text: "done".into(),
                    done: true,
                }))
                .await;
            Ok(rx)
        }
    }

    #[tokio::test]
    async fn default_media_capabilities_are_unconfigured() {
        let backend = Minimal;
        let err = backend.transcribe(vec![0u8], "audio/mp3").await.unwrap_err();
        assert!(err.to_string().contains("transcription"));
        let err = backend.synthesize("hello").await.unwrap_err();
        assert!(err.to_string().contains("speech synthesis"));
    }

    #[test]
    fn chunk_is_cumulative_by_contract() {
        let chunk = StreamChunk {
            text: "Hi there".into(),
            done: false,
        };
        let json = serde_json::to_string(&chunk).unwrap();
        let back: StreamChunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chunk);
    }

    #[test]
    fn request_serialization_skips_absent_budget() {
        let req = GenerationRequest {
            model: "gemini-2.5-flash".into(),
            system_instruction: "You are helpful.".into(),
            temperature: 0.5,
            thinking_budget: None,
            contents: vec![ContentTurn::user(vec![ContentPart::Text("hi".into())])],
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("thinking_budget"));
    }
}
