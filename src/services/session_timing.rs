use time::{Duration, OffsetDateTime};

use crate::domain::models::{ExamSession, SessionStatusInfo};
use crate::domain::types::ExamMode;

pub(crate) fn normalize_duration_for_mode(
    mode: ExamMode,
    duration: Option<Duration>,
) -> Result<Option<Duration>, String> {
    match mode {
        ExamMode::Timer => {
            let duration =
                duration.ok_or_else(|| "duration is required for timer mode".to_string())?;
            if duration.is_negative() {
                return Err("duration must not be negative for timer mode".to_string());
            }
            Ok(Some(duration))
        }
        ExamMode::Stopwatch => {
            if duration.is_some() {
                return Err("duration should not be provided for stopwatch mode".to_string());
            }
            Ok(None)
        }
    }
}

/// Wall time between start and end, or zero when the session never started.
pub(crate) fn time_taken(session: &ExamSession) -> Duration {
    match (session.start_time, session.end_time) {
        (Some(start), Some(end)) => end - start,
        _ => Duration::ZERO,
    }
}

pub(crate) fn status_info(session: &ExamSession, now: OffsetDateTime) -> SessionStatusInfo {
    let elapsed = session.start_time.map(|start| now - start);

    let remaining = match (session.mode, session.duration, elapsed) {
        (ExamMode::Timer, Some(duration), Some(elapsed)) if !session.status.is_terminal() => {
            Some((duration - elapsed).max(Duration::ZERO))
        }
        _ => None,
    };

    let total = match (session.start_time, session.end_time) {
        (Some(start), Some(end)) => Some(end - start),
        _ => None,
    };

    SessionStatusInfo {
        id: session.id.clone(),
        mode: session.mode,
        status: session.status,
        start_time: session.start_time,
        end_time: session.end_time,
        elapsed,
        remaining,
        total,
    }
}
