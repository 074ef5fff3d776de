//! Analysis round-trips with the AI backend.
//!
//! Sends the consolidated symptom summary (or a round's serialized answers)
//! and defensively parses the response into assistant text plus an optional
//! follow-up round. Request parameters come from the model registry, with
//! per-call overrides.

use std::sync::Arc;

use thiserror::Error;

use crate::cost::{cost_record, CostRecord};
use crate::llm::{ChatApi, ChatError, SamplingParams};
use crate::llm::parse::{parse_analysis_content, parse_string_list};
use crate::models::{FollowUpRound, SuggestionKind};
use crate::prompts;
use crate::registry::{ModelConfig, ModelRegistry, UnknownModelError};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis request failed: {0}")]
    Backend(#[from] ChatError),

    #[error(transparent)]
    UnknownModel(#[from] UnknownModelError),
}

/// Per-call overrides for the registry's default request parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SamplingOverrides {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// One completed analysis: assistant text, the next round if the backend
/// issued one, and the cost record for observability.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub messages: Vec<String>,
    pub follow_up: Option<FollowUpRound>,
    pub cost: Option<CostRecord>,
}

pub struct AnalysisClient {
    api: Arc<dyn ChatApi>,
    model: String,
    config: ModelConfig,
}

impl AnalysisClient {
    /// Create a client for `model`. An unknown model id fails here, at
    /// configuration time — never mid-session.
    pub fn new(
        api: Arc<dyn ChatApi>,
        registry: &ModelRegistry,
        model: impl Into<String>,
    ) -> Result<Self, UnknownModelError> {
        let model = model.into();
        let config = *registry.get_config(&model)?;
        Ok(Self { api, model, config })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn params(&self, overrides: SamplingOverrides, json_response: bool) -> SamplingParams {
        SamplingParams {
            temperature: overrides.temperature.unwrap_or(self.config.temperature),
            max_tokens: overrides.max_tokens.unwrap_or(self.config.max_tokens),
            json_response,
        }
    }

    /// Analyze the consolidated symptom summary (or a round's answers) and
    /// return assistant text plus the next follow-up round, if any.
    pub async fn analyze(
        &self,
        summary: &str,
        round: u32,
        round_budget: u32,
        overrides: SamplingOverrides,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let prompt = prompts::build_analysis_prompt(summary, round, round_budget);
        let completion = self
            .api
            .complete(
                &self.model,
                &prompt,
                prompts::ANALYSIS_SYSTEM_PROMPT,
                self.params(overrides, true),
            )
            .await?;

        let (messages, follow_up) = parse_analysis_content(&completion.content);
        let cost = completion.usage.map(|u| cost_record(u, &self.config));

        tracing::debug!(
            model = %self.model,
            round,
            messages = messages.len(),
            has_follow_up = follow_up.is_some(),
            cost_usd = cost.as_ref().map(|c| c.cost_usd),
            "Analysis round complete"
        );

        Ok(AnalysisOutcome {
            messages,
            follow_up,
            cost,
        })
    }

    /// Lighter-weight variant: fetch exactly `count` plain follow-up
    /// question strings about a prior analysis.
    pub async fn follow_up_questions(
        &self,
        prior_analysis: &str,
        count: usize,
    ) -> Result<Vec<String>, AnalysisError> {
        let prompt = prompts::build_follow_up_prompt(prior_analysis, count);
        let completion = self
            .api
            .complete(
                &self.model,
                &prompt,
                prompts::SUGGESTION_SYSTEM_PROMPT,
                self.params(SamplingOverrides::default(), false),
            )
            .await?;

        Ok(parse_string_list(&completion.content, count))
    }

    /// Raw autocomplete candidates for `partial`. Debounce and supersede
    /// logic live in the suggestion client, not here.
    pub async fn suggestion_candidates(
        &self,
        kind: SuggestionKind,
        partial: &str,
        count: usize,
    ) -> Result<Vec<String>, AnalysisError> {
        let prompt = prompts::build_suggestion_prompt(kind, partial, count);
        let completion = self
            .api
            .complete(
                &self.model,
                &prompt,
                prompts::SUGGESTION_SYSTEM_PROMPT,
                self.params(SamplingOverrides::default(), false),
            )
            .await?;

        Ok(parse_string_list(&completion.content, count))
    }
}
