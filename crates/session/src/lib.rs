//! The Cortex session layer: context assembly and the streaming chat
//! session manager.
//!
//! `ChatSession` is the single entry point an interface layer drives. It
//! wires together the persona store, the knowledge aggregator, the model
//! router, and a `GenerationBackend`, and owns the conversation transcript.

pub mod assembler;
pub mod session;

pub use assembler::{AssembledPrompt, assemble};
pub use session::{ChatSession, SessionState};
