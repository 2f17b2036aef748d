use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;
use crate::domain::types::{ExamMode, SessionStatus};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_session_created(mode: ExamMode) {
    metrics::counter!("exam_sessions_created_total", "mode" => mode.as_str()).increment(1);
}

pub(crate) fn record_transition(status: SessionStatus) {
    metrics::counter!("exam_session_transitions_total", "status" => status.as_str())
        .increment(1);
}
