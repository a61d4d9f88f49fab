//! Generation backend implementations for Cortex.
//!
//! All backends implement the `cortex_core::GenerationBackend` trait. The
//! router maps persona model preferences to concrete model names.

pub mod gemini;
pub mod router;

pub use gemini::GeminiBackend;
pub use router::{ModelRouter, ResolvedModel};
