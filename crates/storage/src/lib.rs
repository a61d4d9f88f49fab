//! Durable local storage backends for Cortex.
//!
//! Implements the `KeyValueStore` trait from `cortex-core` with a file-backed
//! store for real sessions and an in-memory store for tests.

pub mod file_store;
pub mod in_memory;

pub use file_store::FileStore;
pub use in_memory::MemoryStore;
