use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ChatError;
use crate::cost::Usage;

/// Resolved request parameters for one completion call. The analysis layer
/// fills these from the model registry, with per-call overrides applied.
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the backend for a JSON object response. Advisory — the response
    /// is defensively parsed regardless.
    pub json_response: bool,
}

/// A completed exchange: the untrusted response text plus usage metadata
/// when the backend reports it.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

/// Chat-completion boundary to the AI backend. The engine only ever talks
/// to this trait; production uses `HttpChatClient`, tests inject
/// `MockChatApi`.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
        params: SamplingParams,
    ) -> Result<Completion, ChatError>;
}

// ──────────────────────────────────────────────
// Wire types
// ──────────────────────────────────────────────

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

// ──────────────────────────────────────────────
// HTTP client
// ──────────────────────────────────────────────

/// HTTP client for an OpenAI-style chat-completions backend.
pub struct HttpChatClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpChatClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatApi for HttpChatClient {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
        params: SamplingParams,
    ) -> Result<Completion, ChatError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: system,
                },
                WireMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            response_format: params
                .json_response
                .then_some(ResponseFormat { format: "json_object" }),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ChatError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    ChatError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    ChatError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Decoding(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ChatError::EmptyResponse)?
            .message
            .content;

        Ok(Completion {
            content,
            usage: parsed.usage,
        })
    }
}

// ──────────────────────────────────────────────
// Mock client
// ──────────────────────────────────────────────

type QueuedReply = (Result<Completion, ChatError>, Duration);

/// Mock chat backend for tests — returns queued responses in order, with an
/// optional per-response delay to simulate slow or out-of-order resolution.
/// When the queue is empty the last configured response repeats.
#[derive(Default)]
pub struct MockChatApi {
    queue: Mutex<VecDeque<QueuedReply>>,
    fallback: Mutex<Option<String>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockChatApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand: a mock that always answers with `content`.
    pub fn always(content: &str) -> Self {
        let mock = Self::new();
        *mock.fallback.lock().unwrap() = Some(content.to_string());
        mock
    }

    pub fn push_response(&self, content: &str) {
        self.push_response_delayed(content, Duration::ZERO);
    }

    pub fn push_response_delayed(&self, content: &str, delay: Duration) {
        self.queue.lock().unwrap().push_back((
            Ok(Completion {
                content: content.to_string(),
                usage: Some(Usage {
                    prompt_tokens: 100,
                    completion_tokens: 50,
                }),
            }),
            delay,
        ));
    }

    pub fn push_error(&self, error: ChatError) {
        self.queue.lock().unwrap().push_back((Err(error), Duration::ZERO));
    }

    /// How many completion calls actually reached this backend.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn complete(
        &self,
        _model: &str,
        prompt: &str,
        _system: &str,
        _params: SamplingParams,
    ) -> Result<Completion, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let queued = self.queue.lock().unwrap().pop_front();
        let (result, delay) = match queued {
            Some(entry) => entry,
            None => {
                let fallback = self.fallback.lock().unwrap().clone();
                match fallback {
                    Some(content) => (
                        Ok(Completion {
                            content,
                            usage: None,
                        }),
                        Duration::ZERO,
                    ),
                    None => (Err(ChatError::EmptyResponse), Duration::ZERO),
                }
            }
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}
