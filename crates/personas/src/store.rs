//! The persona store — effective personas, overrides, and persistence.
//!
//! Hydration iterates the fixed key enumeration (never the stored payload's
//! keys, to tolerate schema drift): each stored override is overlaid on the
//! baked-in default with the icon capability re-attached from the default.
//! Mutations persist the serializable projection of the whole set; the write
//! is fire-and-forget and never fails the mutation.

use crate::defaults;
use cortex_core::persona::{Persona, PersonaKey, PersonaOverlay, PersonaSet};
use cortex_core::storage::{KeyValueStore, keys};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Holds the canonical effective persona set for a session.
pub struct PersonaStore {
    store: Arc<dyn KeyValueStore>,
    set: PersonaSet,
}

impl PersonaStore {
    /// Open the store, hydrating from durable storage.
    ///
    /// A missing or malformed persisted payload falls back to all defaults;
    /// startup never fails because of bad stored state.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let stored = match store.get(keys::PERSONAS) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted personas, using defaults");
                None
            }
        };
        let set = hydrate(stored.as_deref());
        Self { store, set }
    }

    /// The current effective persona set.
    pub fn set(&self) -> &PersonaSet {
        &self.set
    }

    /// The effective persona for one key.
    pub fn get(&self, key: PersonaKey) -> &Persona {
        self.set.get(key)
    }

    /// Replace one key's effective persona wholesale and persist.
    pub fn update(&mut self, key: PersonaKey, mut definition: Persona) -> &PersonaSet {
        definition.key = key;
        // Overrides can never carry a renderable capability; pin the default's.
        definition.icon = defaults::default_for(key).icon;
        self.set.replace(definition);
        self.persist();
        &self.set
    }

    /// Restore exactly the baked-in default for one key and persist.
    pub fn reset_to_default(&mut self, key: PersonaKey) -> &PersonaSet {
        self.set.replace(defaults::default_for(key));
        self.persist();
        &self.set
    }

    fn persist(&self) {
        let json = match self.set.to_stored_json() {
            Ok(j) => j,
            Err(e) => {
                warn!(error = %e, "Failed to serialize personas, skipping persist");
                return;
            }
        };
        if let Err(e) = self.store.set(keys::PERSONAS, &json) {
            warn!(error = %e, "Failed to persist personas");
        }
    }
}

/// Merge stored overrides onto the default table.
///
/// Pure: iterates `PersonaKey::ALL`, overlays any stored entry for that key
/// on the default, and always re-attaches the default icon. Garbage input
/// yields the all-defaults set.
pub fn hydrate(stored: Option<&str>) -> PersonaSet {
    let overlays: HashMap<String, PersonaOverlay> = match stored {
        None => HashMap::new(),
        Some(raw) => match serde_json::from_str(raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "Malformed persisted personas, falling back to defaults");
                HashMap::new()
            }
        },
    };

    let entries = PersonaKey::ALL
        .iter()
        .map(|key| {
            let default = defaults::default_for(*key);
            match overlays.get(&key.to_string()) {
                Some(overlay) => {
                    debug!(key = %key, "Applying stored persona override");
                    default.with_overlay(overlay)
                }
                None => default,
            }
        })
        .collect();

    PersonaSet::from_entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::persona::ModelPreference;
    use cortex_storage::MemoryStore;

    #[test]
    fn hydrate_is_total_over_empty_input() {
        let set = hydrate(None);
        for key in PersonaKey::ALL {
            assert_eq!(set.get(key).key, key);
        }
    }

    #[test]
    fn hydrate_is_total_over_garbage_input() {
        let set = hydrate(Some("{{{ not json"));
        for key in PersonaKey::ALL {
            assert_eq!(set.get(key), &defaults::default_for(key));
        }
    }

    #[test]
    fn hydrate_preserves_overrides_and_defaults_the_rest() {
        let stored = r#"{"ENGINEER":{"name":"X"}}"#;
        let set = hydrate(Some(stored));
        let engineer = set.get(PersonaKey::Engineer);
        let default = defaults::default_for(PersonaKey::Engineer);
        assert_eq!(engineer.name, "X");
        assert_eq!(engineer.title, default.title);
        assert_eq!(engineer.system_instruction, default.system_instruction);
        assert_eq!(engineer.icon, default.icon);
        // Untouched keys are exactly the defaults.
        assert_eq!(
            set.get(PersonaKey::Scientist),
            &defaults::default_for(PersonaKey::Scientist)
        );
    }

    #[test]
    fn hydrate_ignores_unknown_stored_keys() {
        let stored = r#"{"RESEARCHER":{"name":"Ghost"},"OPS":{"title":"SRE"}}"#;
        let set = hydrate(Some(stored));
        assert_eq!(set.get(PersonaKey::Ops).title, "SRE");
        for key in PersonaKey::ALL {
            assert_eq!(set.get(key).key, key);
        }
    }

    #[test]
    fn update_persists_and_survives_reopen() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut personas = PersonaStore::open(store.clone());

        let mut def = personas.get(PersonaKey::Architect).clone();
        def.name = "Platform Architect".into();
        def.model_preference = ModelPreference::Fast;
        personas.update(PersonaKey::Architect, def);

        let reopened = PersonaStore::open(store);
        let arch = reopened.get(PersonaKey::Architect);
        assert_eq!(arch.name, "Platform Architect");
        assert_eq!(arch.model_preference, ModelPreference::Fast);
        // Icon came back from the default table, not from storage.
        assert_eq!(arch.icon, defaults::default_for(PersonaKey::Architect).icon);
    }

    #[test]
    fn reset_restores_the_exact_default() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut personas = PersonaStore::open(store.clone());

        let mut def = personas.get(PersonaKey::Scientist).clone();
        def.system_instruction = "Changed.".into();
        personas.update(PersonaKey::Scientist, def);
        personas.reset_to_default(PersonaKey::Scientist);

        assert_eq!(
            personas.get(PersonaKey::Scientist),
            &defaults::default_for(PersonaKey::Scientist)
        );

        let reopened = PersonaStore::open(store);
        assert_eq!(
            reopened.get(PersonaKey::Scientist),
            &defaults::default_for(PersonaKey::Scientist)
        );
    }
}
