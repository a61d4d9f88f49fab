//! Knowledge aggregation for Cortex: project files, the global knowledge
//! base, and the auto-generated role specification digest.

pub mod aggregator;
pub mod role_spec;

pub use aggregator::{KnowledgeBase, Scope};
