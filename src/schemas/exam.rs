use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::{duration_millis, format_offset};
use crate::domain::models::{
    AnswerKey, ExamResult, ExamSession, QuestionResult, SessionStatusInfo, SubmittedAnswers,
};
use crate::domain::types::{ExamMode, SessionStatus};

/// Text fields of the create-exam multipart form, validated before any upload is stored.
#[derive(Debug, Default, Validate)]
pub(crate) struct ExamCreateForm {
    pub(crate) mode: Option<String>,
    #[validate(range(min = 1, message = "Duration must be a positive number of minutes"))]
    pub(crate) duration_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitAnswersRequest {
    pub(crate) answers: SubmittedAnswers,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamSessionResponse {
    pub(crate) id: String,
    pub(crate) mode: ExamMode,
    pub(crate) status: SessionStatus,
    pub(crate) exam_pdf_path: String,
    pub(crate) answer_key_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) end_time: Option<String>,
    pub(crate) answers: SubmittedAnswers,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<ExamSession> for ExamSessionResponse {
    fn from(session: ExamSession) -> Self {
        Self {
            id: session.id,
            mode: session.mode,
            status: session.status,
            exam_pdf_path: session.exam_pdf_path,
            answer_key_path: session.answer_key_path,
            duration: session.duration.map(duration_millis),
            start_time: session.start_time.map(format_offset),
            end_time: session.end_time.map(format_offset),
            answers: session.answers,
            created_at: format_offset(session.created_at),
            updated_at: format_offset(session.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResultResponse {
    pub(crate) question_number: String,
    pub(crate) user_answer: String,
    pub(crate) correct_answer: String,
    pub(crate) is_correct: bool,
}

impl From<QuestionResult> for QuestionResultResponse {
    fn from(detail: QuestionResult) -> Self {
        Self {
            question_number: detail.question_number,
            user_answer: detail.user_answer,
            correct_answer: detail.correct_answer,
            is_correct: detail.is_correct,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResultResponse {
    pub(crate) exam_id: String,
    pub(crate) total_questions: usize,
    pub(crate) correct_answers: usize,
    pub(crate) wrong_answers: usize,
    pub(crate) score: f64,
    pub(crate) time_taken: i64,
    pub(crate) answers: SubmittedAnswers,
    pub(crate) correct_key: AnswerKey,
    pub(crate) details: Vec<QuestionResultResponse>,
}

impl From<ExamResult> for ExamResultResponse {
    fn from(result: ExamResult) -> Self {
        Self {
            exam_id: result.exam_id,
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            wrong_answers: result.wrong_answers,
            score: result.score,
            time_taken: duration_millis(result.time_taken),
            answers: result.answers,
            correct_key: result.correct_key,
            details: result.details.into_iter().map(QuestionResultResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamStatusResponse {
    pub(crate) id: String,
    pub(crate) mode: ExamMode,
    pub(crate) status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) elapsed_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) remaining_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) total_time: Option<i64>,
}

impl From<SessionStatusInfo> for ExamStatusResponse {
    fn from(info: SessionStatusInfo) -> Self {
        Self {
            id: info.id,
            mode: info.mode,
            status: info.status,
            start_time: info.start_time.map(format_offset),
            end_time: info.end_time.map(format_offset),
            elapsed_time: info.elapsed.map(duration_millis),
            remaining_time: info.remaining.map(duration_millis),
            total_time: info.total.map(duration_millis),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamEnvelope {
    pub(crate) exam: ExamSessionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultEnvelope {
    pub(crate) result: ExamResultResponse,
    pub(crate) message: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PreviewEnvelope {
    pub(crate) preview: BTreeMap<String, String>,
}
