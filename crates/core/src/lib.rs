//! # Cortex Core
//!
//! Domain types, traits, and error definitions for the Cortex conversation
//! context orchestrator. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod error;
pub mod knowledge;
pub mod message;
pub mod persona;
pub mod storage;

// Re-export key types at crate root for ergonomics
pub use backend::{
    ContentPart, ContentTurn, GenerationBackend, GenerationRequest, GenerationStream,
    StreamChunk, TurnRole,
};
pub use error::{Error, Result};
pub use knowledge::KnowledgeDocument;
pub use message::{Attachment, AttachmentKind, Message, Role};
pub use persona::{IconId, ModelPreference, Persona, PersonaKey, PersonaOverlay, PersonaSet};
pub use storage::KeyValueStore;
