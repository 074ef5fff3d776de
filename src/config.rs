use std::time::Duration;

use crate::registry;

/// Application-level constants
pub const APP_NAME: &str = "Sympta";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "sympta=info"
}

/// How many follow-up rounds a single check may run.
/// Round 1 asks broad triage questions; the last round asks narrowing ones.
pub const DEFAULT_ROUND_BUDGET: u32 = 3;

/// How many autocomplete suggestions a fetch returns.
pub const DEFAULT_SUGGESTION_COUNT: usize = 5;

/// Queries shorter than this never reach the network.
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Quiescence window before a keystroke-driven fetch is dispatched.
pub const DEFAULT_DEBOUNCE_MS: u64 = 350;

/// Request timeout for the AI backend.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Engine configuration, passed explicitly into the clients.
///
/// There is no ambient global configuration: everything the engine needs
/// to talk to the AI backend travels in this struct.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// AI model identifier — must exist in the model registry.
    pub model: String,
    /// Chat-completions endpoint base, without the trailing path.
    pub base_url: String,
    /// Bearer token for the AI backend.
    pub api_key: String,
    pub round_budget: u32,
    pub suggestion_count: usize,
    pub min_query_len: usize,
    pub debounce: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: registry::DEFAULT_MODEL.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            round_budget: DEFAULT_ROUND_BUDGET,
            suggestion_count: DEFAULT_SUGGESTION_COUNT,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl EngineConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Recognized: `SYMPTA_API_KEY`, `SYMPTA_BASE_URL`, `SYMPTA_MODEL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("SYMPTA_API_KEY") {
            config.api_key = key;
        }
        if let Ok(url) = std::env::var("SYMPTA_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var("SYMPTA_MODEL") {
            config.model = model;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_registry_default_model() {
        let config = EngineConfig::default();
        assert_eq!(config.model, registry::DEFAULT_MODEL);
        assert_eq!(config.round_budget, 3);
        assert_eq!(config.suggestion_count, 5);
        assert_eq!(config.min_query_len, 2);
    }

    #[test]
    fn debounce_window_is_sub_second() {
        let config = EngineConfig::default();
        assert!(config.debounce >= Duration::from_millis(300));
        assert!(config.debounce <= Duration::from_millis(500));
    }

    #[test]
    fn app_name_is_sympta() {
        assert_eq!(APP_NAME, "Sympta");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.4.0");
    }
}
