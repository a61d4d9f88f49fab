//! Persona domain types.
//!
//! A persona is a named behavioral profile: a system instruction, a model
//! tier preference, and presentation attributes. The set of persona keys is
//! a fixed enumeration; every key always has exactly one effective persona.

use serde::{Deserialize, Serialize};

/// The fixed set of persona identities.
///
/// Declaration order is the canonical iteration order everywhere (menus,
/// the role-spec digest, persisted projections).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonaKey {
    /// The unified project-manager persona.
    Orchestrator,
    /// Custom tuned-model (SLM) persona.
    Bibliotheca,
    /// Platform and infrastructure architect.
    Architect,
    /// Multi-agent systems architect.
    Agentic,
    /// Data engineer.
    Engineer,
    /// Analytics engineer.
    AnalyticsEng,
    /// Data scientist.
    Scientist,
    /// LLM engineer.
    LlmEngineer,
    /// MLOps engineer.
    Ops,
}

impl PersonaKey {
    /// All keys, in canonical order.
    pub const ALL: [PersonaKey; 9] = [
        PersonaKey::Orchestrator,
        PersonaKey::Bibliotheca,
        PersonaKey::Architect,
        PersonaKey::Agentic,
        PersonaKey::Engineer,
        PersonaKey::AnalyticsEng,
        PersonaKey::Scientist,
        PersonaKey::LlmEngineer,
        PersonaKey::Ops,
    ];

    /// Position in the canonical order.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }
}

impl std::fmt::Display for PersonaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Orchestrator => "ORCHESTRATOR",
            Self::Bibliotheca => "BIBLIOTHECA",
            Self::Architect => "ARCHITECT",
            Self::Agentic => "AGENTIC",
            Self::Engineer => "ENGINEER",
            Self::AnalyticsEng => "ANALYTICS_ENG",
            Self::Scientist => "SCIENTIST",
            Self::LlmEngineer => "LLM_ENGINEER",
            Self::Ops => "OPS",
        };
        write!(f, "{s}")
    }
}

/// Which model tier a persona targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelPreference {
    /// Low-latency, low-cost model.
    Fast,
    /// High-capability model with a deep-reasoning budget.
    Reasoning,
    /// A user-supplied tuned model id; falls back to Fast when unset.
    Custom,
}

/// A renderable icon capability, keyed into the in-process icon registry.
///
/// Never persisted — `Persona` skips it during serialization and the
/// hydration path always re-resolves it from the default table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconId {
    #[default]
    Layers,
    Library,
    Database,
    Network,
    Cpu,
    Terminal,
    Beaker,
    Bot,
    ServerCog,
}

impl IconId {
    /// The registry glyph name the UI layer resolves to a renderable asset.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Layers => "layers",
            Self::Library => "library",
            Self::Database => "database",
            Self::Network => "network",
            Self::Cpu => "cpu",
            Self::Terminal => "terminal",
            Self::Beaker => "beaker",
            Self::Bot => "bot",
            Self::ServerCog => "server-cog",
        }
    }
}

/// A named behavioral profile selectable for a conversation.
///
/// Serializes with the persisted camelCase field names; the `icon`
/// capability is excluded from the persisted projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub key: PersonaKey,
    pub name: String,
    pub title: String,
    pub description: String,
    pub system_instruction: String,
    pub model_preference: ModelPreference,
    /// Hex color for UI accenting.
    pub color: String,
    #[serde(skip)]
    pub icon: IconId,
}

/// A partial persona as read back from durable storage.
///
/// Every field optional so hydration tolerates schema drift: missing fields
/// fall through to the baked-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaOverlay {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub system_instruction: Option<String>,
    pub model_preference: Option<ModelPreference>,
    pub color: Option<String>,
}

impl Persona {
    /// Overlay stored fields on this default, re-attaching the default icon.
    pub fn with_overlay(&self, overlay: &PersonaOverlay) -> Persona {
        Persona {
            key: self.key,
            name: overlay.name.clone().unwrap_or_else(|| self.name.clone()),
            title: overlay.title.clone().unwrap_or_else(|| self.title.clone()),
            description: overlay
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            system_instruction: overlay
                .system_instruction
                .clone()
                .unwrap_or_else(|| self.system_instruction.clone()),
            model_preference: overlay.model_preference.unwrap_or(self.model_preference),
            color: overlay.color.clone().unwrap_or_else(|| self.color.clone()),
            icon: self.icon,
        }
    }
}

/// The total mapping from every `PersonaKey` to its effective persona.
///
/// Never partial: constructed from the full default table and mutated only
/// by whole-persona replacement per key.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaSet {
    entries: Vec<Persona>,
}

impl PersonaSet {
    /// Build a set from exactly one persona per key, in canonical order.
    ///
    /// Callers supply one entry per `PersonaKey::ALL` slot; the constructor
    /// reorders defensively by key index.
    pub fn from_entries(mut entries: Vec<Persona>) -> Self {
        entries.sort_by_key(|p| p.key.index());
        debug_assert_eq!(entries.len(), PersonaKey::ALL.len());
        Self { entries }
    }

    /// The effective persona for a key. Total — always present.
    pub fn get(&self, key: PersonaKey) -> &Persona {
        &self.entries[key.index()]
    }

    /// Replace one key's persona wholesale.
    pub fn replace(&mut self, persona: Persona) {
        let idx = persona.key.index();
        self.entries[idx] = persona;
    }

    /// Iterate personas in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.entries.iter()
    }

    /// The persisted projection: key → persona, icon stripped by serde.
    pub fn to_stored_json(&self) -> serde_json::Result<String> {
        let map: std::collections::BTreeMap<PersonaKey, &Persona> =
            self.iter().map(|p| (p.key, p)).collect();
        serde_json::to_string(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(key: PersonaKey) -> Persona {
        Persona {
            key,
            name: format!("{key}"),
            title: "Title".into(),
            description: "Desc".into(),
            system_instruction: "Do things.".into(),
            model_preference: ModelPreference::Fast,
            color: "#ffffff".into(),
            icon: IconId::Cpu,
        }
    }

    fn full_set() -> PersonaSet {
        PersonaSet::from_entries(PersonaKey::ALL.iter().map(|k| sample(*k)).collect())
    }

    #[test]
    fn key_serializes_as_screaming_snake() {
        let json = serde_json::to_string(&PersonaKey::AnalyticsEng).unwrap();
        assert_eq!(json, r#""ANALYTICS_ENG""#);
        let back: PersonaKey = serde_json::from_str(r#""LLM_ENGINEER""#).unwrap();
        assert_eq!(back, PersonaKey::LlmEngineer);
    }

    #[test]
    fn canonical_order_is_stable() {
        for (i, key) in PersonaKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }

    #[test]
    fn icon_is_not_serialized() {
        let p = sample(PersonaKey::Architect);
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("icon"));
        assert!(json.contains("systemInstruction"));
        assert!(json.contains("modelPreference"));
    }

    #[test]
    fn overlay_replaces_only_present_fields() {
        let def = sample(PersonaKey::Engineer);
        let overlay = PersonaOverlay {
            name: Some("Custom Engineer".into()),
            ..Default::default()
        };
        let effective = def.with_overlay(&overlay);
        assert_eq!(effective.name, "Custom Engineer");
        assert_eq!(effective.title, def.title);
        assert_eq!(effective.system_instruction, def.system_instruction);
        assert_eq!(effective.icon, def.icon);
    }

    #[test]
    fn overlay_parses_camel_case_storage_fields() {
        let overlay: PersonaOverlay =
            serde_json::from_str(r#"{"systemInstruction":"Be terse.","modelPreference":"reasoning"}"#)
                .unwrap();
        assert_eq!(overlay.system_instruction.as_deref(), Some("Be terse."));
        assert_eq!(overlay.model_preference, Some(ModelPreference::Reasoning));
    }

    #[test]
    fn set_replace_is_per_key() {
        let mut set = full_set();
        let mut p = sample(PersonaKey::Scientist);
        p.name = "Renamed".into();
        set.replace(p);
        assert_eq!(set.get(PersonaKey::Scientist).name, "Renamed");
        assert_eq!(set.get(PersonaKey::Engineer).name, "ENGINEER");
    }

    #[test]
    fn stored_json_covers_every_key() {
        let set = full_set();
        let json = set.to_stored_json().unwrap();
        let map: std::collections::BTreeMap<String, serde_json::Value> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(map.len(), PersonaKey::ALL.len());
        assert!(map.contains_key("ORCHESTRATOR"));
        assert!(map.contains_key("OPS"));
    }
}
