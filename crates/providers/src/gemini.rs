//! Gemini generation backend.
//!
//! Talks to the Generative Language REST API directly:
//! - `x-goog-api-key` header authentication
//! - streaming via `streamGenerateContent?alt=sse`
//! - system prompt as the top-level `systemInstruction` field
//! - thinking budget via `generationConfig.thinkingConfig`
//! - audio transcription and speech synthesis through `generateContent`
//!
//! The service streams text deltas; this adapter accumulates them and emits
//! cumulative snapshots, which is the contract `StreamChunk` promises.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use cortex_config::AppConfig;
use cortex_core::backend::{
    ContentPart, ContentTurn, GenerationBackend, GenerationRequest, GenerationStream, StreamChunk,
    TurnRole,
};
use cortex_core::error::BackendError;
use futures::StreamExt;
use tracing::{debug, trace, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";
const TTS_VOICE: &str = "Kore";
const TRANSCRIPTION_PROMPT: &str =
    "Transcribe this audio exactly as spoken. Do not add any commentary.";

/// Gemini REST API backend.
pub struct GeminiBackend {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    /// Model used for audio transcription (the fast tier).
    model_transcribe: String,
    /// Model used for speech synthesis.
    model_tts: String,
}

impl GeminiBackend {
    /// Create a new backend with default models and base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300)) // reasoning models can be slow
            .build()
            .expect("Failed to create HTTP client");

        let defaults = AppConfig::default();
        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
            model_transcribe: defaults.model_fast,
            model_tts: defaults.model_tts,
        }
    }

    /// Build from configuration. Fails when no API key is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, BackendError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            BackendError::NotConfigured(
                "No API key set (config api_key, CORTEX_API_KEY, or GEMINI_API_KEY)".into(),
            )
        })?;
        let mut backend = Self::new(api_key);
        backend.model_transcribe = config.model_fast.clone();
        backend.model_tts = config.model_tts.clone();
        Ok(backend)
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/{}/models/{}:{}",
            self.base_url, API_VERSION, model, method
        )
    }

    /// Convert one part to the wire representation.
    fn to_api_part(part: &ContentPart) -> serde_json::Value {
        match part {
            ContentPart::Text(text) => serde_json::json!({ "text": text }),
            ContentPart::Inline { mime_type, data } => serde_json::json!({
                "inlineData": { "mimeType": mime_type, "data": data }
            }),
        }
    }

    /// Convert the ordered turn list to the wire representation.
    fn to_api_contents(contents: &[ContentTurn]) -> Vec<serde_json::Value> {
        contents
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "model",
                };
                serde_json::json!({
                    "role": role,
                    "parts": turn.parts.iter().map(Self::to_api_part).collect::<Vec<_>>(),
                })
            })
            .collect()
    }

    /// Build the request body for a generation exchange.
    fn request_body(request: &GenerationRequest) -> serde_json::Value {
        let mut generation_config = serde_json::json!({
            "temperature": request.temperature,
        });
        if let Some(budget) = request.thinking_budget {
            generation_config["thinkingConfig"] = serde_json::json!({ "thinkingBudget": budget });
        }

        serde_json::json!({
            "contents": Self::to_api_contents(&request.contents),
            "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
            "generationConfig": generation_config,
        })
    }

    /// Map an error status to a backend error, passing success through.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status().as_u16();
        if status == 429 {
            return Err(BackendError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(BackendError::AuthenticationFailed(
                "Invalid Gemini API key".into(),
            ));
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Gemini API error");
            return Err(BackendError::ApiError {
                status_code: status,
                message: body,
            });
        }
        Ok(response)
    }

    /// Non-streaming generateContent call, used by the media capabilities.
    async fn generate_once(
        &self,
        model: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, BackendError> {
        let url = self.endpoint(model, "generateContent");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;
        response.json().await.map_err(|e| {
            BackendError::Decode(format!("Failed to parse Gemini response: {e}"))
        })
    }
}

/// Pull the concatenated part text out of one response payload.
///
/// Both streaming chunks and unary responses carry text under
/// `candidates[0].content.parts[*].text`.
fn extract_text(payload: &serde_json::Value) -> Option<String> {
    let parts = payload["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

/// Pull the base64 audio data out of a synthesis response.
fn extract_inline_data(payload: &serde_json::Value) -> Option<&str> {
    payload["candidates"][0]["content"]["parts"][0]["inlineData"]["data"].as_str()
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream_generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationStream, BackendError> {
        let url = format!(
            "{}?alt=sse",
            self.endpoint(&request.model, "streamGenerateContent")
        );
        let body = Self::request_body(&request);

        debug!(backend = "gemini", model = %request.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();
            let mut full_text = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(BackendError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim_end_matches('\r').to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    let data = data.trim();
                    if data.is_empty() {
                        continue;
                    }

                    let payload: serde_json::Value = match serde_json::from_str(data) {
                        Ok(v) => v,
                        Err(e) => {
                            trace!(error = %e, data = %data, "Ignoring unparseable Gemini SSE");
                            continue;
                        }
                    };

                    if let Some(delta) = extract_text(&payload) {
                        full_text.push_str(&delta);
                        let chunk = StreamChunk {
                            text: full_text.clone(),
                            done: false,
                        };
                        if tx.send(Ok(chunk)).await.is_err() {
                            return;
                        }
                    }
                }
            }

            if full_text.is_empty() {
                let _ = tx.send(Err(BackendError::EmptyStream)).await;
                return;
            }

            let _ = tx
                .send(Ok(StreamChunk {
                    text: full_text,
                    done: true,
                }))
                .await;
        });

        Ok(rx)
    }

    async fn transcribe(&self, audio: Vec<u8>, mime_type: &str) -> Result<String, BackendError> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": mime_type, "data": BASE64.encode(&audio) } },
                    { "text": TRANSCRIPTION_PROMPT },
                ]
            }]
        });

        debug!(backend = "gemini", model = %self.model_transcribe, "Transcribing audio");
        let payload = self.generate_once(&self.model_transcribe, body).await?;
        extract_text(&payload).ok_or(BackendError::EmptyStream)
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, BackendError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": TTS_VOICE } }
                }
            }
        });

        debug!(backend = "gemini", model = %self.model_tts, "Synthesizing speech");
        let payload = self.generate_once(&self.model_tts, body).await?;
        let data = extract_inline_data(&payload).ok_or(BackendError::EmptyStream)?;
        BASE64
            .decode(data)
            .map_err(|e| BackendError::Decode(format!("Invalid base64 audio payload: {e}")))
    }
}
