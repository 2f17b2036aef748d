use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::validation::{
    validate_answer_key_upload, validate_exam_upload, validate_upload_size,
};
use crate::core::state::AppState;
use crate::core::time::minutes;
use crate::domain::types::ExamMode;
use crate::schemas::exam::{
    ExamCreateForm, ExamEnvelope, ExamSessionResponse, ExamStatusResponse, PreviewEnvelope,
    ResultEnvelope, SubmitAnswersRequest,
};
use crate::services::answer_key;
use crate::services::documents::{extract_text, DocumentRole};

/// A file part of the create form. `size` counts every received byte; bytes past the
/// upload limit are drained, not kept.
struct Upload {
    filename: String,
    bytes: Vec<u8>,
    size: u64,
}

async fn read_text_field(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map(|text| text.trim().to_string())
        .map_err(|_| ApiError::BadRequest("Failed to parse form data".to_string()))
}

async fn read_file_field(mut field: Field<'_>, max_bytes: u64) -> Result<Upload, ApiError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let mut bytes = Vec::new();
    let mut size = 0u64;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|_| ApiError::BadRequest("Failed to read uploaded file".to_string()))?
    {
        size += chunk.len() as u64;
        if size <= max_bytes {
            bytes.extend_from_slice(&chunk);
        }
    }

    Ok(Upload { filename, bytes, size })
}

pub(super) async fn create_exam(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ExamEnvelope>), ApiError> {
    let uploads = state.settings().uploads();
    let max_bytes = uploads.max_file_bytes();
    let max_mb = uploads.max_file_mb;

    let mut form = ExamCreateForm::default();
    let mut duration_text: Option<String> = None;
    let mut exam_upload: Option<Upload> = None;
    let mut key_upload: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Failed to parse form data".to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "mode" => form.mode = Some(read_text_field(field).await?),
            "duration" => duration_text = Some(read_text_field(field).await?),
            "exam_pdf" => exam_upload = Some(read_file_field(field, max_bytes).await?),
            "answer_key" => key_upload = Some(read_file_field(field, max_bytes).await?),
            _ => {}
        }
    }

    let mode = form
        .mode
        .as_deref()
        .unwrap_or_default()
        .parse::<ExamMode>()
        .map_err(ApiError::BadRequest)?;

    if let Some(text) = duration_text.filter(|text| !text.is_empty()) {
        let value = text.parse::<i64>().map_err(|_| {
            ApiError::BadRequest("Duration must be a positive number of minutes".to_string())
        })?;
        form.duration_minutes = Some(value);
    }
    if mode == ExamMode::Timer && form.duration_minutes.is_none() {
        return Err(ApiError::BadRequest("Duration is required for timer mode".to_string()));
    }
    form.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam_upload = exam_upload
        .ok_or_else(|| ApiError::BadRequest("Exam PDF file is required".to_string()))?;
    let key_upload = key_upload
        .ok_or_else(|| ApiError::BadRequest("Answer key file is required".to_string()))?;

    for upload in [&exam_upload, &key_upload] {
        validate_upload_size(upload.size, max_bytes, max_mb)?;
    }

    validate_exam_upload(&exam_upload.filename)?;
    validate_answer_key_upload(&key_upload.filename)?;

    answer_key::validate(&extract_text(&key_upload.bytes))?;

    let documents = state.documents();
    let exam_path = documents
        .save(DocumentRole::Exam, &exam_upload.filename, &exam_upload.bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save exam file"))?;
    let key_path = match documents
        .save(DocumentRole::AnswerKey, &key_upload.filename, &key_upload.bytes)
        .await
    {
        Ok(path) => path,
        Err(err) => {
            documents.discard(&exam_path).await;
            return Err(ApiError::internal(err, "Failed to save answer key file"));
        }
    };

    let duration = form.duration_minutes.map(|value| minutes(value.unsigned_abs()));
    let session =
        match state.sessions().create(mode, duration, exam_path.clone(), key_path.clone()).await {
            Ok(session) => session,
            Err(err) => {
                documents.discard(&exam_path).await;
                documents.discard(&key_path).await;
                return Err(err.into());
            }
        };

    Ok((
        StatusCode::CREATED,
        Json(ExamEnvelope {
            exam: ExamSessionResponse::from(session),
            message: Some("Exam created successfully"),
        }),
    ))
}

pub(super) async fn get_exam(
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ExamEnvelope>, ApiError> {
    let session = state.sessions().get(&exam_id).await?;
    Ok(Json(ExamEnvelope { exam: ExamSessionResponse::from(session), message: None }))
}

pub(super) async fn start_exam(
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ExamEnvelope>, ApiError> {
    let session = state.sessions().start(&exam_id).await?;
    Ok(Json(ExamEnvelope {
        exam: ExamSessionResponse::from(session),
        message: Some("Exam started successfully"),
    }))
}

pub(super) async fn submit_answers(
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<Json<ResultEnvelope>, ApiError> {
    let result = state.sessions().submit(&exam_id, payload.answers).await?;
    Ok(Json(ResultEnvelope {
        result: result.into(),
        message: "Answers submitted successfully",
    }))
}

pub(super) async fn get_exam_status(
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ExamStatusResponse>, ApiError> {
    let info = state.sessions().status(&exam_id).await?;
    Ok(Json(info.into()))
}

pub(super) async fn get_answer_key_preview(
    Path(exam_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PreviewEnvelope>, ApiError> {
    let session = state.sessions().get(&exam_id).await?;
    let text = state
        .documents()
        .read_text(&session.answer_key_path)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to get answer key preview"))?;
    let preview = answer_key::preview(&text)
        .map_err(|e| ApiError::internal(e, "Failed to get answer key preview"))?;

    Ok(Json(PreviewEnvelope { preview }))
}
