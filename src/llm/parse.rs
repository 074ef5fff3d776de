//! Defensive parsing of AI backend responses.
//!
//! The backend is contractually asked to return machine-parseable JSON but
//! is a best-effort text generator. Every parser here degrades gracefully:
//! strict JSON first, known envelope keys second, line-oriented salvage
//! last. Nothing in this module returns an error to the caller.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{FollowUpRound, Question};

/// Leading bullet / numbering markers stripped in the line-oriented fallback:
/// `- item`, `• item`, `* item`, `1. item`, `2) item`.
fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-•*]+|\d+[.)])\s*").expect("valid marker regex"))
}

/// Strip a ```json fenced block down to its content, if present.
/// Models often wrap "JSON only" answers in Markdown fences anyway.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[start + 3..];
    let body = after_fence
        .strip_prefix("json")
        .unwrap_or(after_fence)
        .trim_start_matches(['\r', '\n']);
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Envelope keys accepted when the backend wraps a string list in an object.
const LIST_KEYS: &[&str] = &["suggestions", "questions", "items"];

/// Parse a response that should be a list of short strings, normalizing to
/// exactly `count` entries (padded with empty strings, never fewer) so
/// callers can rely on fixed-arity indexing.
///
/// Ladder: strict JSON array → object with a known list key → line-oriented
/// salvage (newline/comma split, markers stripped).
pub fn parse_string_list(raw: &str, count: usize) -> Vec<String> {
    let content = strip_code_fence(raw);

    let mut items = match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(values)) => collect_strings(&values),
        Ok(Value::Object(map)) => LIST_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array).map(|v| collect_strings(v)))
            .unwrap_or_else(|| split_lines(content)),
        _ => split_lines(content),
    };

    items.truncate(count);
    while items.len() < count {
        items.push(String::new());
    }
    items
}

fn collect_strings(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Line-oriented salvage: split on newlines (falling back to commas for a
/// single-line response), strip list markers and quotes, drop empties.
fn split_lines(raw: &str) -> Vec<String> {
    let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
    let parts: Vec<&str> = if lines.len() > 1 {
        lines
    } else {
        raw.split(',').collect()
    };

    parts
        .into_iter()
        .map(|part| {
            marker_re()
                .replace(part, "")
                .trim()
                .trim_matches(['"', '\''])
                .trim()
                .to_string()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// An analysis response: assistant text plus an optional follow-up round.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default, alias = "messages")]
    message: Option<Value>,
    #[serde(default, alias = "followUp")]
    follow_up: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawRound {
    round: u32,
    #[serde(default)]
    questions: Vec<Value>,
}

/// Parse an analyze response.
///
/// On a well-formed JSON object the `message`(s) field becomes the assistant
/// text and `follow_up` the next round (malformed questions skipped). On any
/// parse failure the whole raw text becomes the single assistant message and
/// no round is produced — a bad response must never break the session.
pub fn parse_analysis_content(raw: &str) -> (Vec<String>, Option<FollowUpRound>) {
    let content = strip_code_fence(raw);

    let Ok(parsed) = serde_json::from_str::<RawAnalysis>(content) else {
        let fallback = raw.trim();
        let messages = if fallback.is_empty() {
            Vec::new()
        } else {
            vec![fallback.to_string()]
        };
        return (messages, None);
    };

    let messages = match parsed.message {
        Some(Value::String(text)) => {
            let text = text.trim().to_string();
            if text.is_empty() { Vec::new() } else { vec![text] }
        }
        Some(Value::Array(values)) => collect_strings(&values),
        _ => Vec::new(),
    };

    let follow_up = parsed.follow_up.and_then(parse_round);
    (messages, follow_up)
}

/// Lenient round parse: the round number is required (the orchestrator
/// needs it for staleness checks), malformed questions are dropped, and a
/// round with no usable questions is no round at all.
fn parse_round(value: Value) -> Option<FollowUpRound> {
    let raw: RawRound = serde_json::from_value(value).ok()?;
    let questions: Vec<Question> = raw
        .questions
        .into_iter()
        .filter_map(|q| serde_json::from_value::<Question>(q).ok())
        .filter(Question::is_well_formed)
        .collect();

    if questions.is_empty() {
        return None;
    }
    Some(FollowUpRound {
        round: raw.round,
        questions,
    })
}
