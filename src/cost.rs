//! Per-request cost estimation from AI backend usage metadata.
//!
//! Pure arithmetic keyed by the model registry's pricing. Computed once per
//! completed request and attached to the transcript for observability —
//! never consulted for control flow.

use serde::{Deserialize, Serialize};

use crate::registry::ModelConfig;

/// Token usage reported by the AI backend for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Usage plus the estimated USD cost for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub usage: Usage,
    pub cost_usd: f64,
}

/// Estimate the USD cost of a request from its token usage.
pub fn estimate_cost(usage: &Usage, config: &ModelConfig) -> f64 {
    (usage.total_tokens() as f64 / 1000.0) * config.cost_per_1k_tokens
}

/// Build the observability record for a completed request.
pub fn cost_record(usage: Usage, config: &ModelConfig) -> CostRecord {
    CostRecord {
        cost_usd: estimate_cost(&usage, config),
        usage,
    }
}
