//! The conversation state machine that owns one symptom check.
//!
//! A session moves `Idle → Analyzing → AwaitingRound → Analyzing → … →
//! Completed`, with at most one analysis request in flight and at most one
//! follow-up round active at a time. This is the only surface the host
//! application calls.
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! await. Every asynchronous completion captures the session generation
//! before suspending and re-validates it before applying, so a response
//! that resolves after `reset()` is discarded instead of leaking into the
//! new session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::{AnalysisClient, AnalysisError, AnalysisOutcome, SamplingOverrides};
use crate::answers::{self, AnswerSet};
use crate::config::{self, EngineConfig};
use crate::llm::{ChatApi, HttpChatClient};
use crate::models::{
    FollowUpRound, Frequency, Message, SuggestionKind, Symptom, MAX_SEVERITY,
};
use crate::registry::{ModelRegistry, UnknownModelError};
use crate::suggestions::SuggestionClient;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("An analysis request is already in flight")]
    AnalysisInFlight,

    #[error("Symptoms were already submitted for this session — reset to start a new check")]
    AlreadySubmitted,

    #[error("No follow-up round is awaiting answers")]
    NoActiveRound,

    #[error("Round {round} is incomplete: {missing} unanswered question(s)")]
    IncompleteRound { round: u32, missing: usize },

    #[error("Nothing to submit — commit a symptom or enter a description first")]
    EmptySubmission,

    #[error("Unknown symptom id '{0}'")]
    UnknownSymptom(String),

    #[error("Could not read a symptom from '{0}'")]
    UnparsableSymptom(String),

    #[error("Discarded stale follow-up round {received} (last accepted round {last})")]
    StaleRound { received: u32, last: u32 },

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Analyzing,
    AwaitingRound,
    Completed,
}

/// Serializable view of the session for the host UI.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub suggestions: Vec<String>,
    pub messages: Vec<Message>,
    pub is_analyzing: bool,
    pub current_round: u32,
    pub active_round: Option<FollowUpRound>,
    pub show_ctas: bool,
}

struct SessionState {
    phase: Phase,
    symptoms: Vec<Symptom>,
    messages: Vec<Message>,
    /// Highest round number accepted so far; 0 before the first round.
    current_round: u32,
    active_round: Option<FollowUpRound>,
}

impl SessionState {
    fn fresh() -> Self {
        Self {
            phase: Phase::Idle,
            symptoms: Vec::new(),
            messages: Vec::new(),
            current_round: 0,
            active_round: None,
        }
    }
}

pub struct IntakeSession {
    state: Mutex<SessionState>,
    /// Bumped on every reset; stale async completions compare against it.
    generation: AtomicU64,
    analysis: Arc<AnalysisClient>,
    suggestions: SuggestionClient,
    round_budget: u32,
}

impl IntakeSession {
    pub fn new(
        analysis: Arc<AnalysisClient>,
        suggestions: SuggestionClient,
        config: &EngineConfig,
    ) -> Self {
        Self {
            state: Mutex::new(SessionState::fresh()),
            generation: AtomicU64::new(0),
            analysis,
            suggestions,
            round_budget: config.round_budget,
        }
    }

    /// Wire up a session against the real HTTP backend.
    pub fn from_config(config: EngineConfig) -> Result<Self, UnknownModelError> {
        let api: Arc<dyn ChatApi> = Arc::new(HttpChatClient::new(
            &config.base_url,
            &config.api_key,
            config::DEFAULT_HTTP_TIMEOUT_SECS,
        ));
        let registry = ModelRegistry::default();
        let analysis = Arc::new(AnalysisClient::new(api, &registry, config.model.clone())?);
        let suggestions = SuggestionClient::new(analysis.clone(), &config);
        Ok(Self::new(analysis, suggestions, &config))
    }

    // ──────────────────────────────────────────────
    // Symptom list
    // ──────────────────────────────────────────────

    /// Commit a free-text entry (or a tapped suggestion chip) as a symptom.
    /// Picks up optional "severity N" / "frequency F" hints from the text.
    pub fn commit_symptom(&self, raw: &str) -> Result<String, SessionError> {
        let mut state = self.lock_state();
        match state.phase {
            Phase::Analyzing => return Err(SessionError::AnalysisInFlight),
            Phase::AwaitingRound | Phase::Completed => {
                return Err(SessionError::AlreadySubmitted)
            }
            Phase::Idle => {}
        }

        let id = Uuid::new_v4().to_string();
        let symptom = Symptom::from_free_text(&id, raw)
            .ok_or_else(|| SessionError::UnparsableSymptom(raw.to_string()))?;
        tracing::debug!(name = %symptom.name, "Symptom committed");
        state.symptoms.push(symptom);
        Ok(id)
    }

    pub fn set_symptom_severity(&self, id: &str, severity: u8) -> Result<(), SessionError> {
        let mut state = self.lock_state();
        let symptom = find_symptom(&mut state, id)?;
        symptom.severity = severity.min(MAX_SEVERITY);
        Ok(())
    }

    pub fn set_symptom_frequency(&self, id: &str, frequency: Frequency) -> Result<(), SessionError> {
        let mut state = self.lock_state();
        find_symptom(&mut state, id)?.frequency = frequency;
        Ok(())
    }

    pub fn set_symptom_body_part(&self, id: &str, body_part: &str) -> Result<(), SessionError> {
        let mut state = self.lock_state();
        let part = body_part.trim();
        find_symptom(&mut state, id)?.body_part =
            (!part.is_empty()).then(|| part.to_string());
        Ok(())
    }

    /// Render the committed symptom list (plus any trailing uncommitted
    /// free text) for the input field.
    pub fn symptoms_input(&self, free_text: &str) -> String {
        let state = self.lock_state();
        let mut parts: Vec<String> = state.symptoms.iter().map(Symptom::describe).collect();
        let trailing = free_text.trim();
        if !trailing.is_empty() {
            parts.push(trailing.to_string());
        }
        parts.join(", ")
    }

    // ──────────────────────────────────────────────
    // Suggestions
    // ──────────────────────────────────────────────

    pub async fn fetch_suggestions(&self, partial: &str, kind: SuggestionKind) -> Vec<String> {
        self.suggestions.fetch(partial, kind).await
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.suggestions.current()
    }

    // ──────────────────────────────────────────────
    // State machine
    // ──────────────────────────────────────────────

    /// Submit the symptom list (or, when nothing was committed, the raw
    /// free text) for analysis and ingest the first follow-up round.
    pub async fn submit_symptoms(&self, raw_text: &str) -> Result<(), SessionError> {
        let (summary, user_message, ticket, next_round) = {
            let mut state = self.lock_state();
            match state.phase {
                Phase::Analyzing => return Err(SessionError::AnalysisInFlight),
                Phase::AwaitingRound | Phase::Completed => {
                    return Err(SessionError::AlreadySubmitted)
                }
                Phase::Idle => {}
            }

            let summary = if state.symptoms.is_empty() {
                raw_text.trim().to_string()
            } else {
                state
                    .symptoms
                    .iter()
                    .map(Symptom::describe)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            if summary.is_empty() {
                return Err(SessionError::EmptySubmission);
            }

            state.phase = Phase::Analyzing;
            (
                summary.clone(),
                Message::user(summary),
                self.generation.load(Ordering::SeqCst),
                state.current_round + 1,
            )
        };

        tracing::info!(round = next_round, "Submitting symptoms for analysis");
        let result = self
            .analysis
            .analyze(&summary, next_round, self.round_budget, SamplingOverrides::default())
            .await;
        self.apply_analysis(result, user_message, ticket, Phase::Idle)
    }

    /// Submit a completed round of answers and request the next round.
    ///
    /// Guard-rejected (state untouched) unless a round is awaiting answers
    /// and every question has a valid answer.
    pub async fn submit_round_answers(&self, answers: &AnswerSet) -> Result<(), SessionError> {
        let (payload, user_message, ticket, next_round) = {
            let mut state = self.lock_state();
            if state.phase == Phase::Analyzing {
                return Err(SessionError::AnalysisInFlight);
            }
            let Some(round) = state.active_round.as_ref() else {
                return Err(SessionError::NoActiveRound);
            };
            if !answers::is_complete(round, answers) {
                return Err(SessionError::IncompleteRound {
                    round: round.round,
                    missing: answers::missing_count(round, answers),
                });
            }

            let payload = answers::render_answers(round, answers);
            state.phase = Phase::Analyzing;
            (
                payload.clone(),
                Message::user(payload),
                self.generation.load(Ordering::SeqCst),
                state.current_round + 1,
            )
        };

        tracing::info!(round = next_round, "Submitting round answers");
        let result = self
            .analysis
            .analyze(&payload, next_round, self.round_budget, SamplingOverrides::default())
            .await;
        self.apply_analysis(result, user_message, ticket, Phase::AwaitingRound)
    }

    /// Clear everything and return to `Idle`. Always legal; any in-flight
    /// analysis or suggestion fetch is invalidated, not awaited.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.lock_state() = SessionState::fresh();
        self.suggestions.clear();
        tracing::info!("Session reset");
    }

    /// Apply one resolved analysis to the session.
    ///
    /// The transcript is only touched here, after every guard has passed:
    /// a failed or stale response leaves the pre-call state intact so the
    /// user can retry the same submission.
    fn apply_analysis(
        &self,
        result: Result<AnalysisOutcome, AnalysisError>,
        user_message: Message,
        ticket: u64,
        prior: Phase,
    ) -> Result<(), SessionError> {
        let mut state = self.lock_state();

        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::warn!("Discarding analysis that resolved after a session reset");
            return Ok(());
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                state.phase = prior;
                tracing::warn!(error = %e, "Analysis failed — session awaits retry");
                return Err(SessionError::Analysis(e));
            }
        };

        // Round numbering is monotonic: a round we already accepted (or
        // passed) can only be a duplicate from an upstream retry.
        if let Some(round) = &outcome.follow_up {
            if round.round <= state.current_round {
                let (received, last) = (round.round, state.current_round);
                state.phase = prior;
                tracing::warn!(received, last, "Discarding stale follow-up round");
                return Err(SessionError::StaleRound { received, last });
            }
        }

        state.messages.push(user_message);
        let question_texts = outcome
            .follow_up
            .as_ref()
            .map(|r| r.questions.iter().map(|q| q.question.clone()).collect::<Vec<_>>());

        let mut cost = outcome.cost;
        let last_index = outcome.messages.len().saturating_sub(1);
        for (i, content) in outcome.messages.into_iter().enumerate() {
            let mut message = Message::assistant(content).with_cost(cost.take());
            if i == last_index {
                if let Some(texts) = question_texts.clone() {
                    message = message.with_follow_up_options(texts);
                }
            }
            state.messages.push(message);
        }

        match outcome.follow_up {
            Some(round) if round.round <= self.round_budget => {
                tracing::info!(round = round.round, questions = round.questions.len(), "Follow-up round accepted");
                state.current_round = round.round;
                state.active_round = Some(round);
                state.phase = Phase::AwaitingRound;
            }
            // No round, or a round past the budget — both end the check.
            _ => {
                tracing::info!("Symptom check completed");
                state.active_round = None;
                state.phase = Phase::Completed;
            }
        }
        Ok(())
    }

    // ──────────────────────────────────────────────
    // Views
    // ──────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.lock_state().phase
    }

    pub fn is_analyzing(&self) -> bool {
        self.phase() == Phase::Analyzing
    }

    /// True once the check has finished and terminal call-to-actions
    /// should be shown.
    pub fn show_ctas(&self) -> bool {
        self.phase() == Phase::Completed
    }

    pub fn current_round(&self) -> u32 {
        self.lock_state().current_round
    }

    pub fn active_round(&self) -> Option<FollowUpRound> {
        self.lock_state().active_round.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock_state().messages.clone()
    }

    pub fn symptoms(&self) -> Vec<Symptom> {
        self.lock_state().symptoms.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock_state();
        SessionSnapshot {
            suggestions: self.suggestions.current(),
            messages: state.messages.clone(),
            is_analyzing: state.phase == Phase::Analyzing,
            current_round: state.current_round,
            active_round: state.active_round.clone(),
            show_ctas: state.phase == Phase::Completed,
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock")
    }
}

fn find_symptom<'a>(
    state: &'a mut SessionState,
    id: &str,
) -> Result<&'a mut Symptom, SessionError> {
    state
        .symptoms
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| SessionError::UnknownSymptom(id.to_string()))
}
