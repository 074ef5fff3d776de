//! Static table of supported AI models and their limits.
//!
//! Consulted for request parameters (max_tokens, temperature) and for cost
//! estimation. Lookup of an unknown id is a hard error, never a silent
//! default — wrong pricing or limits would corrupt every downstream cost
//! record without anyone noticing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default model when the caller doesn't pick one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Request limits and pricing for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Blended USD rate per 1000 tokens (prompt + completion).
    pub cost_per_1k_tokens: f64,
    pub context_window: u32,
}

/// The built-in model table. Maintained in code, not fetched from anywhere.
const SUPPORTED_MODELS: &[(&str, ModelConfig)] = &[
    (
        "gpt-4o",
        ModelConfig {
            max_tokens: 4096,
            temperature: 0.7,
            cost_per_1k_tokens: 0.0075,
            context_window: 128_000,
        },
    ),
    (
        "gpt-4o-mini",
        ModelConfig {
            max_tokens: 4096,
            temperature: 0.7,
            cost_per_1k_tokens: 0.000_45,
            context_window: 128_000,
        },
    ),
    (
        "gpt-4-turbo",
        ModelConfig {
            max_tokens: 4096,
            temperature: 0.7,
            cost_per_1k_tokens: 0.02,
            context_window: 128_000,
        },
    ),
    (
        "gpt-3.5-turbo",
        ModelConfig {
            max_tokens: 4096,
            temperature: 0.7,
            cost_per_1k_tokens: 0.0015,
            context_window: 16_385,
        },
    ),
];

#[derive(Debug, Error)]
#[error("Unsupported model '{0}' — not in the model registry")]
pub struct UnknownModelError(pub String);

/// Injectable model table. `Default` carries the built-in models; tests can
/// extend it with `with_model`.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    entries: Vec<(String, ModelConfig)>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self {
            entries: SUPPORTED_MODELS
                .iter()
                .map(|(name, config)| (name.to_string(), *config))
                .collect(),
        }
    }
}

impl ModelRegistry {
    /// Register (or override) a model entry.
    pub fn with_model(mut self, name: impl Into<String>, config: ModelConfig) -> Self {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = config;
        } else {
            self.entries.push((name, config));
        }
        self
    }

    pub fn list_models(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get_config(&self, id: &str) -> Result<&ModelConfig, UnknownModelError> {
        self.entries
            .iter()
            .find(|(name, _)| name == id)
            .map(|(_, config)| config)
            .ok_or_else(|| UnknownModelError(id.to_string()))
    }
}
