use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::domain::models::AnswerKey;

const PREVIEW_LIMIT: usize = 10;
const VALID_ANSWERS: &[&str] = &["A", "B", "C", "D", "E"];

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum AnswerKeyError {
    #[error("no valid answers found in the answer key")]
    Empty,
    #[error("invalid answer '{answer}' for question {question}. Expected A, B, C, D, or E")]
    InvalidAnswer { question: String, answer: String },
    #[error("invalid question number '{0}'. Expected numeric value")]
    InvalidQuestionNumber(String),
}

/// Line shapes in priority order: `1. A`, `Question 1: A`, `1 A`. Digits and
/// whitespace are ASCII only.
fn line_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?i-u)^\s*(\d+)\s*[.)\-:]\s*([A-E])\s*$"),
            Regex::new(r"(?i-u)^\s*Q(?:uestion)?\s*(\d+)\s*[.)\-:]\s*([A-E])\s*$"),
            Regex::new(r"(?i-u)^\s*(\d+)\s+([A-E])\s*$"),
        ]
        .map(|pattern| pattern.expect("answer key pattern compiles"))
    })
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

fn match_line(line: &str) -> Option<(String, String)> {
    line_patterns().iter().find_map(|pattern| {
        let captures = pattern.captures(line)?;
        Some((captures[1].to_string(), captures[2].to_ascii_uppercase()))
    })
}

/// Parses a loosely formatted answer key. Unrecognised lines are skipped with a
/// warning; a later line for the same question number overwrites an earlier one.
pub(crate) fn parse(text: &str) -> Result<AnswerKey, AnswerKeyError> {
    let mut key = AnswerKey::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || is_comment(line) {
            continue;
        }

        match match_line(line) {
            Some((question, answer)) => {
                key.insert(question, answer);
            }
            None => {
                tracing::warn!(
                    line = index + 1,
                    content = %line,
                    "Skipping unrecognised answer key line"
                );
            }
        }
    }

    if key.is_empty() {
        return Err(AnswerKeyError::Empty);
    }

    Ok(key)
}

pub(crate) fn validate(text: &str) -> Result<(), AnswerKeyError> {
    let key = parse(text)?;

    for (question, answer) in &key {
        if !VALID_ANSWERS.contains(&answer.as_str()) {
            return Err(AnswerKeyError::InvalidAnswer {
                question: question.clone(),
                answer: answer.clone(),
            });
        }

        if question.parse::<u64>().is_err() {
            return Err(AnswerKeyError::InvalidQuestionNumber(question.clone()));
        }
    }

    Ok(())
}

/// Probes questions 1..=10 in order and returns the ones present in the key.
pub(crate) fn preview(text: &str) -> Result<BTreeMap<String, String>, AnswerKeyError> {
    let key = parse(text)?;
    Ok(preview_of(&key))
}

pub(crate) fn preview_of(key: &AnswerKey) -> BTreeMap<String, String> {
    let mut preview = BTreeMap::new();

    for number in 1..=PREVIEW_LIMIT {
        if preview.len() == key.len() {
            break;
        }
        let question = number.to_string();
        if let Some(answer) = key.get(&question) {
            preview.insert(question, answer.clone());
        }
    }

    preview
}
