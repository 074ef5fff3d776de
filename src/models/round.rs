use serde::{Deserialize, Serialize};

/// Default slider bounds when the backend omits them.
pub const DEFAULT_SLIDER_MIN: i32 = 1;
pub const DEFAULT_SLIDER_MAX: i32 = 10;

/// What kind of control a follow-up question renders as, and what answer
/// shape it collects. Wire tags are exactly what the AI backend is asked
/// to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    /// Single-select from `options`.
    Toggle,
    /// Multi-select from `options`; answer is the comma-joined set.
    MultiToggle,
    /// Compound duration + frequency pick from the `frequency` lists.
    Frequency,
    /// Numeric scale between `min` and `max`.
    Slider,
}

/// Option lists for a frequency-type question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencySpec {
    #[serde(default)]
    pub duration: Vec<String>,
    #[serde(default)]
    pub frequency: Vec<String>,
}

/// One follow-up question. Question text is the join key between question
/// and answer, so it must be unique within a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default = "default_slider_min")]
    pub min: i32,
    #[serde(default = "default_slider_max")]
    pub max: i32,
    #[serde(default)]
    pub frequency: Option<FrequencySpec>,
}

fn default_slider_min() -> i32 {
    DEFAULT_SLIDER_MIN
}

fn default_slider_max() -> i32 {
    DEFAULT_SLIDER_MAX
}

impl Question {
    /// Whether this question carries everything its type requires.
    /// Malformed questions from the backend are dropped, not surfaced.
    pub fn is_well_formed(&self) -> bool {
        if self.question.trim().is_empty() {
            return false;
        }
        match self.question_type {
            QuestionType::Toggle | QuestionType::MultiToggle => !self.options.is_empty(),
            QuestionType::Frequency => self
                .frequency
                .as_ref()
                .is_some_and(|f| !f.duration.is_empty() && !f.frequency.is_empty()),
            QuestionType::Slider => self.min < self.max,
        }
    }
}

/// One batch of follow-up questions, answered together before the next
/// analyze call. Immutable once received; at most one round is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpRound {
    pub round: u32,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle_question(text: &str, options: &[&str]) -> Question {
        Question {
            question: text.into(),
            question_type: QuestionType::Toggle,
            options: options.iter().map(|s| s.to_string()).collect(),
            min: DEFAULT_SLIDER_MIN,
            max: DEFAULT_SLIDER_MAX,
            frequency: None,
        }
    }

    #[test]
    fn question_type_wire_tags() {
        assert_eq!(
            serde_json::to_string(&QuestionType::MultiToggle).unwrap(),
            "\"multi-toggle\""
        );
        assert_eq!(
            serde_json::to_string(&QuestionType::Toggle).unwrap(),
            "\"toggle\""
        );
        let parsed: QuestionType = serde_json::from_str("\"slider\"").unwrap();
        assert_eq!(parsed, QuestionType::Slider);
    }

    #[test]
    fn slider_defaults_applied_when_omitted() {
        let q: Question = serde_json::from_str(
            r#"{"question": "How bad is the pain?", "type": "slider"}"#,
        )
        .unwrap();
        assert_eq!(q.min, 1);
        assert_eq!(q.max, 10);
        assert!(q.is_well_formed());
    }

    #[test]
    fn toggle_without_options_is_malformed() {
        let q: Question =
            serde_json::from_str(r#"{"question": "Any fever?", "type": "toggle"}"#).unwrap();
        assert!(!q.is_well_formed());
    }

    #[test]
    fn frequency_requires_both_lists() {
        let q: Question = serde_json::from_str(
            r#"{"question": "How long?", "type": "frequency",
                "frequency": {"duration": ["1 day", "1 week"], "frequency": []}}"#,
        )
        .unwrap();
        assert!(!q.is_well_formed());

        let q: Question = serde_json::from_str(
            r#"{"question": "How long?", "type": "frequency",
                "frequency": {"duration": ["1 day"], "frequency": ["Daily"]}}"#,
        )
        .unwrap();
        assert!(q.is_well_formed());
    }

    #[test]
    fn blank_question_text_is_malformed() {
        let q = toggle_question("  ", &["Yes", "No"]);
        assert!(!q.is_well_formed());
    }

    #[test]
    fn round_parses_from_wire_json() {
        let round: FollowUpRound = serde_json::from_str(
            r#"{
                "round": 1,
                "questions": [
                    {"question": "Any fever?", "type": "toggle", "options": ["Yes", "No"]},
                    {"question": "Severity now?", "type": "slider", "min": 0, "max": 10}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(round.round, 1);
        assert_eq!(round.questions.len(), 2);
        assert!(round.questions.iter().all(Question::is_well_formed));
    }
}
