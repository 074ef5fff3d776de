//! Prompt templates for the AI backend.
//!
//! Every prompt demands strict JSON, but the parsers in `llm::parse` never
//! rely on getting it — the backend is a best-effort text generator.

use crate::models::SuggestionKind;

pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"
You are a symptom intake assistant. Your ONLY role is to collect structured
information about the symptoms the user reports, through short rounds of
follow-up questions.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. NEVER diagnose, interpret, or give medical advice.
2. Ask only about what the user already reported — no speculative topics.
3. Questions must be short, plain-language, and answerable with the given controls.
4. Question text must be unique within a round.
5. Output MUST be a single valid JSON object, nothing else.

OUTPUT FORMAT:
{
  "message": "one short acknowledgement for the user",
  "follow_up": {
    "round": <round number you were given>,
    "questions": [
      {"question": "...", "type": "toggle", "options": ["...", "..."]},
      {"question": "...", "type": "multi-toggle", "options": ["...", "..."]},
      {"question": "...", "type": "slider", "min": 1, "max": 10},
      {"question": "...", "type": "frequency",
       "frequency": {"duration": ["...", "..."], "frequency": ["...", "..."]}}
    ]
  }
}

When you have nothing further to ask, omit "follow_up" entirely and make
"message" a structured summary of everything collected.
"#;

pub const SUGGESTION_SYSTEM_PROMPT: &str = r#"
You are an autocomplete source for a health intake form. You return short
candidate names only — never advice, never commentary.
Output MUST be a JSON array of strings, nothing else.
"#;

/// Build the user prompt for one analysis round.
///
/// Round 1 asks broad triage questions; the final round narrows down.
/// Past the last round the backend is told to stop asking.
pub fn build_analysis_prompt(summary: &str, round: u32, round_budget: u32) -> String {
    let guidance = if round > round_budget {
        "This was the final round. Do NOT ask further questions — omit \"follow_up\" \
         and summarize everything collected so far."
    } else if round <= 1 {
        "This is round 1: ask broad triage questions covering onset, severity and context."
    } else if round >= round_budget {
        "This is the final round: ask only narrowing questions that resolve what remains \
         ambiguous. If nothing remains, omit \"follow_up\"."
    } else {
        "Ask more specific questions that build on the answers so far."
    };

    format!(
        r#"<input>
{summary}
</input>

Round {round} of {round_budget}. {guidance}
Respond with the JSON object described in your instructions, with "round" set to {round}."#
    )
}

/// Build the prompt for an autocomplete fetch.
pub fn build_suggestion_prompt(kind: SuggestionKind, partial: &str, count: usize) -> String {
    let noun = match kind {
        SuggestionKind::Symptoms => "common symptom names",
        SuggestionKind::Conditions => "common medical condition names",
        SuggestionKind::Allergies => "common allergy names",
        SuggestionKind::Medications => "common medication names",
    };
    format!(
        "Return a JSON array of at most {count} {noun} beginning with or closely \
         matching \"{partial}\". Array of strings only."
    )
}

/// Build the prompt for the lighter-weight follow-up question fetch.
pub fn build_follow_up_prompt(prior_analysis: &str, count: usize) -> String {
    format!(
        r#"<analysis>
{prior_analysis}
</analysis>

Return a JSON array of exactly {count} short follow-up questions a clinician
would ask next about the analysis above. Array of strings only."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_contains_summary_and_round() {
        let prompt = build_analysis_prompt("Headache (Severity: 6/10)", 1, 3);
        assert!(prompt.contains("Headache (Severity: 6/10)"));
        assert!(prompt.contains("Round 1 of 3"));
        assert!(prompt.contains("broad triage"));
    }

    #[test]
    fn final_round_asks_narrowing_questions() {
        let prompt = build_analysis_prompt("x", 3, 3);
        assert!(prompt.contains("final round"));
        assert!(!prompt.contains("broad triage"));
    }

    #[test]
    fn over_budget_round_stops_asking() {
        let prompt = build_analysis_prompt("x", 4, 3);
        assert!(prompt.contains("Do NOT ask further questions"));
    }

    #[test]
    fn middle_round_builds_on_answers() {
        let prompt = build_analysis_prompt("x", 2, 3);
        assert!(prompt.contains("build on the answers"));
    }

    #[test]
    fn suggestion_prompt_names_kind_and_count() {
        let prompt = build_suggestion_prompt(SuggestionKind::Medications, "ibu", 5);
        assert!(prompt.contains("medication names"));
        assert!(prompt.contains("ibu"));
        assert!(prompt.contains("5"));
    }

    #[test]
    fn system_prompt_forbids_diagnosis() {
        assert!(ANALYSIS_SYSTEM_PROMPT.contains("NEVER diagnose"));
        assert!(ANALYSIS_SYSTEM_PROMPT.contains("valid JSON"));
    }

    #[test]
    fn follow_up_prompt_embeds_prior_analysis() {
        let prompt = build_follow_up_prompt("tension-type pattern", 5);
        assert!(prompt.contains("tension-type pattern"));
        assert!(prompt.contains("exactly 5"));
    }
}
