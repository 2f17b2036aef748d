mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

/// Both uploads plus form overhead; per-file limits are enforced by the handler.
fn create_body_limit(max_upload_bytes: u64) -> usize {
    let limit = max_upload_bytes.saturating_mul(2).saturating_add(1024 * 1024);
    usize::try_from(limit).unwrap_or(usize::MAX)
}

pub(crate) fn router(max_upload_bytes: u64) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::create_exam)
                .layer(DefaultBodyLimit::max(create_body_limit(max_upload_bytes))),
        )
        .route("/:exam_id", get(handlers::get_exam))
        .route("/:exam_id/start", post(handlers::start_exam))
        .route("/:exam_id/submit", post(handlers::submit_answers))
        .route("/:exam_id/status", get(handlers::get_exam_status))
        .route("/:exam_id/answer-key-preview", get(handlers::get_answer_key_preview))
}
