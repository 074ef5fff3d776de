//! Typed answers to follow-up questions, and the completeness rule that
//! gates round submission.
//!
//! Pure data manipulation, no side effects. Submittability is recomputed
//! from scratch on every mutation — there is no cached "complete" flag to
//! fall out of sync.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{FollowUpRound, Question, QuestionType};

/// Separator for the multi-toggle comma-joined set.
const SET_SEPARATOR: &str = ", ";

/// The heterogeneous answer a question can collect, tagged by shape so a
/// new question type can't slip through unhandled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnswerValue {
    /// Single selected option (toggle).
    Choice(String),
    /// Comma-joined selected set (multi-toggle). Never empty — an empty
    /// set removes the map entry instead.
    Choices(String),
    /// Slider position. Stored as given; the caller clamps to the
    /// question's [min, max] before calling in.
    Scale(i32),
    /// Compound duration + frequency pick.
    Compound {
        duration: Option<String>,
        frequency: Option<String>,
    },
}

/// Which half of a compound answer is being set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundPart {
    Duration,
    Frequency,
}

/// Answers keyed by question text — the join key between question and
/// answer, unique within a round.
pub type AnswerSet = HashMap<String, AnswerValue>;

/// True iff every question in the round has an answer, and compound
/// answers carry both sub-fields. This is the termination gate for round
/// submission.
pub fn is_complete(round: &FollowUpRound, answers: &AnswerSet) -> bool {
    round.questions.iter().all(|q| is_complete_for(q, answers))
}

/// How many questions in the round still lack a valid answer.
pub fn missing_count(round: &FollowUpRound, answers: &AnswerSet) -> usize {
    round
        .questions
        .iter()
        .filter(|q| !is_complete_for(q, answers))
        .count()
}

fn is_complete_for(question: &Question, answers: &AnswerSet) -> bool {
    match (question.question_type, answers.get(&question.question)) {
        (QuestionType::Frequency, Some(AnswerValue::Compound { duration, frequency })) => {
            duration.is_some() && frequency.is_some()
        }
        (QuestionType::Frequency, Some(_)) => false,
        (_, Some(_)) => true,
        (_, None) => false,
    }
}

/// Single-select semantics: picking the already-selected option clears the
/// answer; picking a different option replaces it.
pub fn toggle(answers: &mut AnswerSet, question: &str, option: &str) {
    match answers.get(question) {
        Some(AnswerValue::Choice(current)) if current == option => {
            answers.remove(question);
        }
        _ => {
            answers.insert(question.to_string(), AnswerValue::Choice(option.to_string()));
        }
    }
}

/// List semantics: toggle membership of `option` in the comma-joined set.
/// An emptied set removes the entry entirely — never an empty string.
pub fn multi_toggle(answers: &mut AnswerSet, question: &str, option: &str) {
    let mut selected: Vec<String> = match answers.get(question) {
        Some(AnswerValue::Choices(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    match selected.iter().position(|s| s == option) {
        Some(index) => {
            selected.remove(index);
        }
        None => selected.push(option.to_string()),
    }

    if selected.is_empty() {
        answers.remove(question);
    } else {
        answers.insert(
            question.to_string(),
            AnswerValue::Choices(selected.join(SET_SEPARATOR)),
        );
    }
}

/// Merge one half of a compound answer, preserving the other half if set.
pub fn set_frequency(answers: &mut AnswerSet, question: &str, part: CompoundPart, value: &str) {
    let (mut duration, mut frequency) = match answers.get(question) {
        Some(AnswerValue::Compound { duration, frequency }) => {
            (duration.clone(), frequency.clone())
        }
        _ => (None, None),
    };

    match part {
        CompoundPart::Duration => duration = Some(value.to_string()),
        CompoundPart::Frequency => frequency = Some(value.to_string()),
    }

    answers.insert(
        question.to_string(),
        AnswerValue::Compound { duration, frequency },
    );
}

/// Replace the slider value. No clamping here — the caller owns the
/// question's [min, max] bounds.
pub fn set_slider(answers: &mut AnswerSet, question: &str, value: i32) {
    answers.insert(question.to_string(), AnswerValue::Scale(value));
}

/// Serialize a completed round's answers into the next user message, in
/// question order.
pub fn render_answers(round: &FollowUpRound, answers: &AnswerSet) -> String {
    round
        .questions
        .iter()
        .filter_map(|q| {
            answers
                .get(&q.question)
                .map(|a| format!("{} {}", q.question, render_value(a)))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_value(value: &AnswerValue) -> String {
    match value {
        AnswerValue::Choice(s) | AnswerValue::Choices(s) => s.clone(),
        AnswerValue::Scale(n) => n.to_string(),
        AnswerValue::Compound { duration, frequency } => {
            let duration = duration.as_deref().unwrap_or("unspecified");
            let frequency = frequency.as_deref().unwrap_or("unspecified");
            format!("{frequency} for {duration}")
        }
    }
}
