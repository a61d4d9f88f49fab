//! The streaming chat session manager.
//!
//! Owns the conversation transcript, the active persona, the user settings,
//! and the single in-flight exchange. One exchange at a time: a placeholder
//! model message is appended before the network call, its text is replaced
//! wholesale on every cumulative chunk, and on failure it becomes the error
//! message instead. State mutations persist fire-and-forget.

use crate::assembler;
use cortex_config::AppConfig;
use cortex_core::backend::{GenerationBackend, GenerationRequest};
use cortex_core::error::{BackendError, Error, Result, SessionError};
use cortex_core::knowledge::KnowledgeDocument;
use cortex_core::message::{Attachment, AttachmentKind, Message};
use cortex_core::persona::{ModelPreference, Persona, PersonaKey};
use cortex_core::storage::{KeyValueStore, keys};
use cortex_knowledge::{KnowledgeBase, Scope};
use cortex_personas::PersonaStore;
use cortex_providers::ModelRouter;
use std::sync::Arc;
use tracing::{debug, info, warn};

const WELCOME_MESSAGE_ID: &str = "welcome";

const WELCOME_TEXT: &str = "**Cortex Orchestrator Online.**\n\nI am your **Technical Project Manager**. \n\n**Workflow Overview:**\n1. **Project Files (Settings)**: Upload data/specs specific to *this* project.\n2. **Knowledge Base (Settings)**: Access global reference materials (Standard ML definitions, etc.).\n\nI will use both sources to orchestrate the workflow.\n\n*How can I help scope your project today?*";

const CONNECTION_ERROR_TEXT: &str = "Connection Error: Unable to reach the Cortex Neural Network.";

/// Where the session currently is in its exchange lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No exchange in flight.
    Idle,
    /// Request sent, no chunk received yet.
    Sending,
    /// Chunks arriving.
    Streaming,
}

/// A live conversation: transcript, persona, knowledge, settings, and the
/// backend connection.
pub struct ChatSession {
    backend: Arc<dyn GenerationBackend>,
    router: ModelRouter,
    store: Arc<dyn KeyValueStore>,
    personas: PersonaStore,
    knowledge: KnowledgeBase,
    messages: Vec<Message>,
    active_persona: PersonaKey,
    custom_model_id: String,
    temperature: f32,
    state: SessionState,
}

impl ChatSession {
    /// Open a session, hydrating all durable state from the store.
    ///
    /// A missing or malformed transcript falls back to the welcome message.
    /// The role specification digest is synced immediately so the project
    /// files always reflect the effective persona set.
    pub fn open(
        backend: Arc<dyn GenerationBackend>,
        store: Arc<dyn KeyValueStore>,
        config: &AppConfig,
    ) -> Self {
        let personas = PersonaStore::open(store.clone());
        let mut knowledge = KnowledgeBase::open(store.clone());
        knowledge.sync_role_spec(personas.set());

        let messages = load_messages(&*store);
        let custom_model_id = store
            .get(keys::CUSTOM_MODEL_ID)
            .ok()
            .flatten()
            .unwrap_or_default();
        let temperature = load_temperature(&*store, config.default_temperature);

        let mut session = Self {
            backend,
            router: ModelRouter::from_config(config),
            store,
            personas,
            knowledge,
            messages,
            active_persona: PersonaKey::Orchestrator,
            custom_model_id,
            temperature,
            state: SessionState::Idle,
        };

        if session.messages.is_empty() {
            session.reset_to_welcome();
        }
        session
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn active_persona_key(&self) -> PersonaKey {
        self.active_persona
    }

    /// The effective persona currently driving generation.
    pub fn active_persona(&self) -> &Persona {
        self.personas.get(self.active_persona)
    }

    pub fn personas(&self) -> &PersonaStore {
        &self.personas
    }

    pub fn project_docs(&self) -> &[KnowledgeDocument] {
        self.knowledge.project_docs()
    }

    pub fn global_docs(&self) -> &[KnowledgeDocument] {
        self.knowledge.global_docs()
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn custom_model_id(&self) -> &str {
        &self.custom_model_id
    }

    /// Set the generation temperature, clamped to the valid range.
    pub fn set_temperature(&mut self, temperature: f32) {
        self.temperature = temperature.clamp(0.0, 1.0);
        if let Err(e) = self
            .store
            .set(keys::TEMPERATURE, &self.temperature.to_string())
        {
            warn!(error = %e, "Failed to persist temperature");
        }
    }

    /// Set the custom tuned-model id used by the custom model tier.
    pub fn set_custom_model_id(&mut self, id: impl Into<String>) {
        self.custom_model_id = id.into();
        if let Err(e) = self.store.set(keys::CUSTOM_MODEL_ID, &self.custom_model_id) {
            warn!(error = %e, "Failed to persist custom model id");
        }
    }

    /// Clear the transcript and start over with the welcome message.
    pub fn new_conversation(&mut self) {
        info!("Starting new conversation");
        self.reset_to_welcome();
    }

    /// Switch the active persona.
    ///
    /// A no-op when the key is already active; otherwise a context-switch
    /// notice is appended to the transcript.
    pub fn switch_persona(&mut self, key: PersonaKey) {
        if key == self.active_persona {
            return;
        }
        self.active_persona = key;

        let persona = self.personas.get(key);
        let model_info = match persona.model_preference {
            ModelPreference::Reasoning => "Gemini 3 Pro (Deep Thinking)".to_string(),
            ModelPreference::Custom => {
                if self.custom_model_id.trim().is_empty() {
                    "Gemini 2.5 Flash (Cost Optimized)".to_string()
                } else {
                    format!("Custom Tuned Model ({})", self.custom_model_id)
                }
            }
            ModelPreference::Fast => "Gemini 2.5 Flash (High Speed)".to_string(),
        };

        let notice = format!(
            "***Context Switched: {} Active.***\n\nModel: {}\nContext: {} Project Files, {} Global Docs.",
            persona.name,
            model_info,
            self.knowledge.project_docs().len(),
            self.knowledge.global_docs().len(),
        );
        self.messages.push(Message::model(notice));
        self.persist_messages();
    }

    /// Replace a persona definition, persist it, and re-sync the digest.
    pub fn update_persona(&mut self, key: PersonaKey, definition: Persona) {
        self.personas.update(key, definition);
        self.knowledge.sync_role_spec(self.personas.set());
    }

    /// Restore a persona to its default, persist it, and re-sync the digest.
    pub fn reset_persona(&mut self, key: PersonaKey) {
        self.personas.reset_to_default(key);
        self.knowledge.sync_role_spec(self.personas.set());
    }

    /// Add a document to a knowledge collection.
    ///
    /// Project uploads announce themselves in the transcript; global uploads
    /// are silent.
    pub fn upload_document(
        &mut self,
        scope: Scope,
        name: &str,
        doc_type: Option<&str>,
        content: &str,
    ) -> String {
        let id = self
            .knowledge
            .add_document(scope, name, doc_type, content)
            .id
            .clone();
        if scope == Scope::Project {
            self.messages.push(Message::model(format!(
                "*System Update: Added \"{name}\" to Project Files (Settings).*"
            )));
            self.persist_messages();
        }
        id
    }

    /// Remove a document from a knowledge collection. Idempotent.
    pub fn remove_document(&mut self, scope: Scope, id: &str) {
        self.knowledge.remove_document(scope, id);
    }

    /// Submit a user message and stream the model's reply, returning the
    /// final response text.
    ///
    /// The user message and an empty placeholder model message are appended
    /// before the network call. `on_chunk` receives the cumulative response
    /// text on every chunk; the placeholder's text is replaced wholesale at
    /// the same time. On failure, including a stream that ends with zero
    /// chunks, the placeholder becomes the connection error message, flagged
    /// so later assemblies exclude it, and the error is returned. No
    /// automatic retry.
    pub async fn submit(
        &mut self,
        text: &str,
        attachment: Option<Attachment>,
        mut on_chunk: impl FnMut(&str),
    ) -> Result<String> {
        if self.state != SessionState::Idle {
            return Err(Error::Session(SessionError::Busy));
        }

        // Attachment-only submissions get a generic analysis prompt.
        let prompt_text = if !text.trim().is_empty() {
            text.to_string()
        } else {
            match &attachment {
                Some(att) if att.kind == AttachmentKind::Image => "Analyze this image".to_string(),
                Some(_) => "Analyze this file".to_string(),
                None => String::new(),
            }
        };

        let persona = self.personas.get(self.active_persona).clone();
        let prompt = assembler::assemble(
            &self.messages,
            &prompt_text,
            attachment.as_ref(),
            &persona,
            self.knowledge.project_docs(),
            self.knowledge.global_docs(),
        )?;

        let resolved = self
            .router
            .resolve(persona.model_preference, &self.custom_model_id);
        let request = GenerationRequest {
            model: resolved.model,
            system_instruction: prompt.system_instruction,
            temperature: self.temperature,
            thinking_budget: resolved.thinking_budget,
            contents: prompt.contents,
        };

        let mut user_msg = Message::user(text);
        user_msg.attachment = attachment;
        self.messages.push(user_msg);

        let placeholder = Message::model("");
        let placeholder_id = placeholder.id.clone();
        self.messages.push(placeholder);
        self.persist_messages();

        self.state = SessionState::Sending;
        debug!(model = %request.model, persona = %persona.key, "Starting generation exchange");

        let mut stream = match self.backend.stream_generate(request).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail_placeholder(&placeholder_id);
                self.state = SessionState::Idle;
                return Err(Error::Backend(e));
            }
        };

        self.state = SessionState::Streaming;
        let mut full_text = String::new();
        while let Some(item) = stream.recv().await {
            match item {
                Ok(chunk) => {
                    full_text = chunk.text;
                    // Cumulative contract: replace, never append.
                    if let Some(msg) = self.find_message_mut(&placeholder_id) {
                        msg.text = full_text.clone();
                    }
                    on_chunk(&full_text);
                    if chunk.done {
                        break;
                    }
                }
                Err(e) => {
                    self.fail_placeholder(&placeholder_id);
                    self.state = SessionState::Idle;
                    return Err(Error::Backend(e));
                }
            }
        }

        // A stream that closed without producing anything is a failure, not
        // an empty reply.
        if full_text.is_empty() {
            self.fail_placeholder(&placeholder_id);
            self.state = SessionState::Idle;
            return Err(Error::Backend(BackendError::EmptyStream));
        }

        self.persist_messages();
        self.state = SessionState::Idle;
        Ok(full_text)
    }

    /// Transcribe recorded audio to text via the backend.
    pub async fn transcribe(&self, audio: Vec<u8>, mime_type: &str) -> Result<String> {
        Ok(self.backend.transcribe(audio, mime_type).await?)
    }

    /// Synthesize speech audio for a piece of transcript text.
    pub async fn speak(&self, text: &str) -> Result<Vec<u8>> {
        Ok(self.backend.synthesize(text).await?)
    }

    fn reset_to_welcome(&mut self) {
        let mut welcome = Message::model(WELCOME_TEXT);
        welcome.id = WELCOME_MESSAGE_ID.into();
        self.messages = vec![welcome];
        self.persist_messages();
    }

    fn find_message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    fn fail_placeholder(&mut self, id: &str) {
        if let Some(msg) = self.find_message_mut(id) {
            msg.text = CONNECTION_ERROR_TEXT.into();
            msg.is_error = true;
        }
        self.persist_messages();
    }

    fn persist_messages(&self) {
        let json = match serde_json::to_string(&self.messages) {
            Ok(j) => j,
            Err(e) => {
                warn!(error = %e, "Failed to serialize transcript, skipping persist");
                return;
            }
        };
        if let Err(e) = self.store.set(keys::MESSAGES, &json) {
            warn!(error = %e, "Failed to persist transcript");
        }
    }
}

fn load_messages(store: &dyn KeyValueStore) -> Vec<Message> {
    let raw = match store.get(keys::MESSAGES) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read transcript");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(messages) => messages,
        Err(e) => {
            warn!(error = %e, "Malformed transcript, starting fresh");
            Vec::new()
        }
    }
}

fn load_temperature(store: &dyn KeyValueStore, default: f32) -> f32 {
    match store.get(keys::TEMPERATURE) {
        Ok(Some(raw)) => match raw.parse::<f32>() {
            Ok(t) if (0.0..=1.0).contains(&t) => t,
            _ => {
                warn!(raw = %raw, "Invalid stored temperature, using default");
                default
            }
        },
        _ => default,
    }
}
