use thiserror::Error;

use crate::domain::models::{AnswerKey, ExamResult, ExamSession, QuestionResult};
use crate::services::answer_key::AnswerKeyError;
use crate::services::documents::DocumentError;
use crate::services::session_timing;

#[derive(Debug, Error)]
pub(crate) enum GradingError {
    #[error("failed to read answer key: {0}")]
    Document(#[from] DocumentError),
    #[error("failed to parse answer key: {0}")]
    AnswerKey(#[from] AnswerKeyError),
}

/// Scores a finished session against its answer key.
///
/// Only questions present in the key are scored; an unanswered question counts as
/// wrong with an empty `user_answer`. Extra submitted answers stay in
/// `ExamResult::answers` but produce no detail record.
pub(crate) fn grade(session: &ExamSession, key: AnswerKey) -> ExamResult {
    let mut details: Vec<QuestionResult> = key
        .iter()
        .map(|(question, correct)| {
            let user_answer = session.answers.get(question).cloned().unwrap_or_default();
            let is_correct = answers_match(&user_answer, correct);
            QuestionResult {
                question_number: question.clone(),
                user_answer,
                correct_answer: correct.clone(),
                is_correct,
            }
        })
        .collect();
    details.sort_by(|a, b| question_order(&a.question_number, &b.question_number));

    let total_questions = key.len();
    let correct_answers = details.iter().filter(|detail| detail.is_correct).count();
    let wrong_answers = total_questions - correct_answers;
    let score = if total_questions == 0 {
        0.0
    } else {
        correct_answers as f64 / total_questions as f64 * 100.0
    };

    ExamResult {
        exam_id: session.id.clone(),
        total_questions,
        correct_answers,
        wrong_answers,
        score,
        time_taken: session_timing::time_taken(session),
        answers: session.answers.clone(),
        correct_key: key,
        details,
    }
}

fn answers_match(submitted: &str, correct: &str) -> bool {
    submitted.trim().eq_ignore_ascii_case(correct.trim())
}

fn question_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}
