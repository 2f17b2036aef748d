use crate::api::errors::ApiError;
use crate::services::documents::file_extension;

pub(crate) const EXAM_EXTENSIONS: &[&str] = &["pdf"];
pub(crate) const ANSWER_KEY_EXTENSIONS: &[&str] = &["txt", "pdf"];

pub(crate) fn validate_exam_upload(filename: &str) -> Result<(), ApiError> {
    if has_extension(filename, EXAM_EXTENSIONS) {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Exam file must be a PDF".to_string()))
    }
}

pub(crate) fn validate_answer_key_upload(filename: &str) -> Result<(), ApiError> {
    if has_extension(filename, ANSWER_KEY_EXTENSIONS) {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Answer key file must be a TXT or PDF file".to_string()))
    }
}

pub(crate) fn validate_upload_size(
    size: u64,
    max_bytes: u64,
    max_mb: u64,
) -> Result<(), ApiError> {
    if size > max_bytes {
        return Err(ApiError::BadRequest(format!("File size exceeds {max_mb}MB limit")));
    }
    Ok(())
}

fn has_extension(filename: &str, allowed: &[&str]) -> bool {
    file_extension(filename).is_some_and(|ext| allowed.contains(&ext.as_str()))
}
