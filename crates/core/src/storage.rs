//! KeyValueStore trait — the durable local storage seam.
//!
//! A flat key → string mapping. All values are serialized JSON; callers own
//! their serialization. Writes are fire-and-forget side effects of state
//! mutation: callers log failures and keep the in-memory state.

use crate::error::StorageError;

/// Well-known storage keys. Kept byte-compatible with the persisted state
/// of earlier client versions.
pub mod keys {
    /// Persisted conversation messages.
    pub const MESSAGES: &str = "cortex_messages";
    /// Project-scoped documents (legacy key name).
    pub const PROJECT_DOCS: &str = "cortex_kb";
    /// Global knowledge base documents.
    pub const GLOBAL_DOCS: &str = "cortex_global_kb";
    /// Persona overrides.
    pub const PERSONAS: &str = "cortex_personas";
    /// User-supplied custom model id.
    pub const CUSTOM_MODEL_ID: &str = "cortex_custom_model_id";
    /// Generation temperature.
    pub const TEMPERATURE: &str = "cortex_temperature";
}

/// A durable key → string mapping.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
