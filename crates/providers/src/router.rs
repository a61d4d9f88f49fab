//! Model router — maps a persona's model preference to a concrete model.
//!
//! Pure and total: every preference resolves to a model name, and the
//! reasoning token budget is attached exactly when the resolved model is the
//! reasoning tier. The custom tier falls back to the fast tier when no usable
//! custom model id is configured.

use cortex_config::AppConfig;
use cortex_core::persona::ModelPreference;

/// The outcome of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    /// Concrete backend model name, passed verbatim to the API.
    pub model: String,

    /// Deep-reasoning token budget, present only for the reasoning tier.
    pub thinking_budget: Option<u32>,
}

/// Routes model preferences to configured model names.
#[derive(Debug, Clone)]
pub struct ModelRouter {
    model_fast: String,
    model_reasoning: String,
    thinking_budget: u32,
}

impl ModelRouter {
    pub fn new(
        model_fast: impl Into<String>,
        model_reasoning: impl Into<String>,
        thinking_budget: u32,
    ) -> Self {
        Self {
            model_fast: model_fast.into(),
            model_reasoning: model_reasoning.into(),
            thinking_budget,
        }
    }

    /// Build a router from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.model_fast,
            &config.model_reasoning,
            config.thinking_budget,
        )
    }

    /// Resolve a preference to a concrete model.
    ///
    /// `custom_model_id` is the user-supplied tuned-model id; it is consulted
    /// only for the custom tier and used verbatim (trimmed) when non-empty.
    pub fn resolve(&self, preference: ModelPreference, custom_model_id: &str) -> ResolvedModel {
        let model = match preference {
            ModelPreference::Fast => self.model_fast.clone(),
            ModelPreference::Reasoning => self.model_reasoning.clone(),
            ModelPreference::Custom => {
                let trimmed = custom_model_id.trim();
                if trimmed.is_empty() {
                    self.model_fast.clone()
                } else {
                    trimmed.to_string()
                }
            }
        };

        // The budget follows the resolved model, not the preference: a custom
        // id naming the reasoning model still gets the budget.
        let thinking_budget = (model == self.model_reasoning).then_some(self.thinking_budget);

        ResolvedModel {
            model,
            thinking_budget,
        }
    }
}
