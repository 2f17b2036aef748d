pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod domain;
pub(crate) mod schemas;
pub(crate) mod services;
pub(crate) mod tasks;

#[cfg(test)]
mod test_support;

use axum::{extract::Request, ServiceExt};

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::services::documents::DocumentStore;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let documents = DocumentStore::from_settings(&settings).await?;
    tracing::info!(upload_dir = %documents.root().display(), "Upload directory ready");

    let state = AppState::new(settings, documents);
    let app = api::router::router(state.clone());
    let http = state.settings().http();
    let listener = tokio::net::TcpListener::bind(http.addr()).await?;

    tracing::info!(
        host = %http.host,
        port = http.port,
        environment = state.settings().environment().as_str(),
        version = %state.settings().api().version,
        "Exam helper API listening"
    );

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(core::shutdown::shutdown_signal())
        .await?;

    Ok(())
}
