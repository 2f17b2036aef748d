use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::core::metrics;
use crate::core::state::AppState;
use crate::schemas::{HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let api = state.settings().api();
    let endpoints = BTreeMap::from([
        ("health", "/health".to_string()),
        ("api", format!("{}/", api.prefix)),
    ]);

    Json(RootResponse {
        message: format!("{} is running", api.project_name),
        version: api.version.clone(),
        endpoints,
    })
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut status = "healthy".to_string();
    let mut components = BTreeMap::new();

    match tokio::fs::metadata(state.documents().root()).await {
        Ok(meta) if meta.is_dir() => {
            components.insert("uploads".to_string(), "healthy".to_string());
        }
        Ok(_) => {
            components.insert("uploads".to_string(), "unhealthy: not a directory".to_string());
            status = "unhealthy".to_string();
        }
        Err(err) => {
            components.insert("uploads".to_string(), format!("unhealthy: {err}"));
            status = "unhealthy".to_string();
        }
    }

    Json(HealthResponse { service: "exam-helper".to_string(), status, components })
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
