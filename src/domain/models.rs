use std::collections::HashMap;

use time::{Duration, OffsetDateTime};

use crate::domain::types::{ExamMode, SessionStatus};

/// Question number to answer letter, as parsed from an answer key document.
pub(crate) type AnswerKey = HashMap<String, String>;

/// Question number to the answer a candidate submitted.
pub(crate) type SubmittedAnswers = HashMap<String, String>;

/// One exam attempt tracked by the session store.
///
/// `duration` is `Some` exactly when `mode` is [`ExamMode::Timer`]. `start_time` is
/// written once on Pending -> Active and `end_time` once on the move into a terminal
/// status.
#[derive(Debug, Clone)]
pub(crate) struct ExamSession {
    pub(crate) id: String,
    pub(crate) mode: ExamMode,
    pub(crate) status: SessionStatus,
    pub(crate) exam_pdf_path: String,
    pub(crate) answer_key_path: String,
    pub(crate) duration: Option<Duration>,
    pub(crate) start_time: Option<OffsetDateTime>,
    pub(crate) end_time: Option<OffsetDateTime>,
    pub(crate) answers: SubmittedAnswers,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QuestionResult {
    pub(crate) question_number: String,
    pub(crate) user_answer: String,
    pub(crate) correct_answer: String,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ExamResult {
    pub(crate) exam_id: String,
    pub(crate) total_questions: usize,
    pub(crate) correct_answers: usize,
    pub(crate) wrong_answers: usize,
    pub(crate) score: f64,
    pub(crate) time_taken: Duration,
    pub(crate) answers: SubmittedAnswers,
    pub(crate) correct_key: AnswerKey,
    pub(crate) details: Vec<QuestionResult>,
}

/// Timing view of a session, computed fresh for every request.
#[derive(Debug, Clone)]
pub(crate) struct SessionStatusInfo {
    pub(crate) id: String,
    pub(crate) mode: ExamMode,
    pub(crate) status: SessionStatus,
    pub(crate) start_time: Option<OffsetDateTime>,
    pub(crate) end_time: Option<OffsetDateTime>,
    pub(crate) elapsed: Option<Duration>,
    pub(crate) remaining: Option<Duration>,
    pub(crate) total: Option<Duration>,
}
