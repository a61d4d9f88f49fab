//! Personas for Cortex: baked-in defaults, stored overrides, hydration.
//!
//! The default table in [`defaults`] is the single source of truth for what
//! each role looks like out of the box. [`store::PersonaStore`] layers user
//! overrides on top and keeps them durable.

pub mod defaults;
pub mod store;

pub use defaults::{default_for, defaults};
pub use store::{PersonaStore, hydrate};
