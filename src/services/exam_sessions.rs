use std::collections::HashMap;
use std::sync::{Arc, Weak};

use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::core::metrics;
use crate::domain::models::{ExamResult, ExamSession, SessionStatusInfo, SubmittedAnswers};
use crate::domain::types::{ExamMode, SessionStatus};
use crate::services::documents::DocumentStore;
use crate::services::grading::{self, GradingError};
use crate::services::{answer_key, session_timing};
use crate::tasks::expiry;

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("{0}")]
    Validation(String),
    #[error("exam session {0} not found")]
    NotFound(String),
    #[error("exam session is already {0}")]
    AlreadyStarted(SessionStatus),
    #[error("exam session is {0} and cannot accept answers")]
    NotAcceptingAnswers(SessionStatus),
    #[error("failed to grade exam: {0}")]
    Grading(#[from] GradingError),
}

/// In-memory registry of exam sessions and the only place their status changes.
///
/// Every mutation (create, start, submit, expiry) runs under the write half of one
/// lock, so for a given session exactly one of submit and expiry can move it out of
/// `Active`; the loser re-reads the status and leaves the session untouched.
/// Reads take the shared half and return clones.
#[derive(Clone)]
pub(crate) struct SessionStore {
    inner: Arc<StoreInner>,
}

/// Handle held by expiry tasks so a sleeping timer does not keep the store alive.
#[derive(Clone)]
pub(crate) struct WeakSessionStore(Weak<StoreInner>);

struct StoreInner {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    documents: DocumentStore,
}

struct SessionEntry {
    session: ExamSession,
    expiry: Option<AbortHandle>,
}

impl SessionStore {
    pub(crate) fn new(documents: DocumentStore) -> Self {
        Self {
            inner: Arc::new(StoreInner { sessions: RwLock::new(HashMap::new()), documents }),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakSessionStore {
        WeakSessionStore(Arc::downgrade(&self.inner))
    }

    pub(crate) async fn create(
        &self,
        mode: ExamMode,
        duration: Option<Duration>,
        exam_pdf_path: String,
        answer_key_path: String,
    ) -> Result<ExamSession, SessionError> {
        let duration = session_timing::normalize_duration_for_mode(mode, duration)
            .map_err(SessionError::Validation)?;

        let now = OffsetDateTime::now_utc();
        let session = ExamSession {
            id: Uuid::new_v4().to_string(),
            mode,
            status: SessionStatus::Pending,
            exam_pdf_path,
            answer_key_path,
            duration,
            start_time: None,
            end_time: None,
            answers: SubmittedAnswers::new(),
            created_at: now,
            updated_at: now,
        };

        let mut sessions = self.inner.sessions.write().await;
        sessions
            .insert(session.id.clone(), SessionEntry { session: session.clone(), expiry: None });
        drop(sessions);

        metrics::record_session_created(mode);
        tracing::info!(session_id = %session.id, mode = mode.as_str(), "Exam session created");

        Ok(session)
    }

    pub(crate) async fn start(&self, id: &str) -> Result<ExamSession, SessionError> {
        let mut sessions = self.inner.sessions.write().await;
        let entry = sessions.get_mut(id).ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        if entry.session.status != SessionStatus::Pending {
            return Err(SessionError::AlreadyStarted(entry.session.status));
        }

        let now = OffsetDateTime::now_utc();
        entry.session.start_time = Some(now);
        entry.session.status = SessionStatus::Active;
        entry.session.updated_at = now;

        if let (ExamMode::Timer, Some(duration)) = (entry.session.mode, entry.session.duration) {
            entry.expiry = Some(expiry::schedule(self.downgrade(), id.to_string(), duration));
        }

        metrics::record_transition(SessionStatus::Active);
        tracing::info!(
            session_id = %id,
            mode = entry.session.mode.as_str(),
            status = SessionStatus::Active.as_str(),
            "Exam session started"
        );

        Ok(entry.session.clone())
    }

    /// Records the answers, completes the session and grades it.
    ///
    /// The move to `Completed` is committed before grading starts; a grading failure
    /// is returned as [`SessionError::Grading`] and leaves the session completed.
    pub(crate) async fn submit(
        &self,
        id: &str,
        answers: SubmittedAnswers,
    ) -> Result<ExamResult, SessionError> {
        let (snapshot, pending_expiry) = {
            let mut sessions = self.inner.sessions.write().await;
            let entry =
                sessions.get_mut(id).ok_or_else(|| SessionError::NotFound(id.to_string()))?;

            if entry.session.status != SessionStatus::Active {
                return Err(SessionError::NotAcceptingAnswers(entry.session.status));
            }

            let now = OffsetDateTime::now_utc();
            entry.session.answers = answers;
            entry.session.end_time = Some(now);
            entry.session.status = SessionStatus::Completed;
            entry.session.updated_at = now;

            (entry.session.clone(), entry.expiry.take())
        };

        if let Some(handle) = pending_expiry {
            handle.abort();
        }

        metrics::record_transition(SessionStatus::Completed);
        tracing::info!(
            session_id = %id,
            mode = snapshot.mode.as_str(),
            status = SessionStatus::Completed.as_str(),
            answered = snapshot.answers.len(),
            "Exam session submitted"
        );

        self.grade(&snapshot).await
    }

    pub(crate) async fn get(&self, id: &str) -> Result<ExamSession, SessionError> {
        let sessions = self.inner.sessions.read().await;
        sessions
            .get(id)
            .map(|entry| entry.session.clone())
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub(crate) async fn status(&self, id: &str) -> Result<SessionStatusInfo, SessionError> {
        let sessions = self.inner.sessions.read().await;
        let entry = sessions.get(id).ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        Ok(session_timing::status_info(&entry.session, OffsetDateTime::now_utc()))
    }

    pub(crate) fn documents(&self) -> &DocumentStore {
        &self.inner.documents
    }

    /// Moves a still-active session to `Expired`. Returns false when the session is
    /// unknown or has already left `Active`.
    pub(crate) async fn expire(&self, id: &str) -> bool {
        let mut sessions = self.inner.sessions.write().await;
        let Some(entry) = sessions.get_mut(id) else {
            return false;
        };

        if entry.session.status != SessionStatus::Active {
            return false;
        }

        let now = OffsetDateTime::now_utc();
        entry.session.end_time = Some(now);
        entry.session.status = SessionStatus::Expired;
        entry.session.updated_at = now;
        entry.expiry = None;

        metrics::record_transition(SessionStatus::Expired);
        tracing::info!(
            session_id = %id,
            mode = entry.session.mode.as_str(),
            status = SessionStatus::Expired.as_str(),
            "Exam session expired"
        );

        true
    }

    async fn grade(&self, session: &ExamSession) -> Result<ExamResult, SessionError> {
        let text = self
            .inner
            .documents
            .read_text(&session.answer_key_path)
            .await
            .map_err(GradingError::from)?;
        let key = answer_key::parse(&text).map_err(GradingError::from)?;
        Ok(grading::grade(session, key))
    }
}

impl WeakSessionStore {
    pub(crate) fn upgrade(&self) -> Option<SessionStore> {
        self.0.upgrade().map(|inner| SessionStore { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        store: SessionStore,
        key_path: String,
        _dir: TempDir,
    }

    async fn fixture(key_text: &str) -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let documents = DocumentStore::open(dir.path().to_path_buf()).await.expect("documents");
        let key_path = dir.path().join("answer_key.txt");
        std::fs::write(&key_path, key_text).expect("write key");
        Fixture {
            store: SessionStore::new(documents),
            key_path: key_path.to_string_lossy().into_owned(),
            _dir: dir,
        }
    }

    fn answers(pairs: &[(&str, &str)]) -> SubmittedAnswers {
        pairs.iter().map(|(q, a)| (q.to_string(), a.to_string())).collect()
    }

    async fn stopwatch(fixture: &Fixture) -> ExamSession {
        fixture
            .store
            .create(
                ExamMode::Stopwatch,
                None,
                "uploads/exam.pdf".to_string(),
                fixture.key_path.clone(),
            )
            .await
            .expect("create")
    }

    async fn timer(fixture: &Fixture, duration: Duration) -> ExamSession {
        fixture
            .store
            .create(
                ExamMode::Timer,
                Some(duration),
                "uploads/exam.pdf".to_string(),
                fixture.key_path.clone(),
            )
            .await
            .expect("create")
    }

    #[tokio::test]
    async fn create_registers_pending_session() {
        let fixture = fixture("1. A").await;
        let session = timer(&fixture, Duration::minutes(30)).await;

        assert_eq!(session.status, SessionStatus::Pending);
        assert_eq!(session.duration, Some(Duration::minutes(30)));
        assert_eq!(session.answer_key_path, fixture.key_path);
        assert!(session.start_time.is_none());
        assert!(session.answers.is_empty());

        let stored = fixture.store.get(&session.id).await.expect("get");
        assert_eq!(stored.id, session.id);
    }

    #[tokio::test]
    async fn create_enforces_mode_duration_pairing() {
        let fixture = fixture("1. A").await;

        let err = fixture
            .store
            .create(ExamMode::Timer, None, "e.pdf".to_string(), fixture.key_path.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));

        let err = fixture
            .store
            .create(
                ExamMode::Stopwatch,
                Some(Duration::minutes(10)),
                "e.pdf".to_string(),
                fixture.key_path.clone(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let fixture = fixture("1. A").await;
        let store = &fixture.store;

        assert!(matches!(store.get("missing").await, Err(SessionError::NotFound(_))));
        assert!(matches!(store.status("missing").await, Err(SessionError::NotFound(_))));
        assert!(matches!(store.start("missing").await, Err(SessionError::NotFound(_))));
        assert!(matches!(
            store.submit("missing", SubmittedAnswers::new()).await,
            Err(SessionError::NotFound(_))
        ));
        assert!(!store.expire("missing").await);
    }

    #[tokio::test]
    async fn second_start_is_rejected_naming_active() {
        let fixture = fixture("1. A").await;
        let session = stopwatch(&fixture).await;

        let started = fixture.store.start(&session.id).await.expect("start");
        assert_eq!(started.status, SessionStatus::Active);
        assert!(started.start_time.is_some());

        let err = fixture.store.start(&session.id).await.unwrap_err();
        assert!(matches!(err, SessionError::AlreadyStarted(SessionStatus::Active)));
        assert!(err.to_string().contains("active"));
    }

    #[tokio::test]
    async fn submit_before_start_is_rejected_naming_pending() {
        let fixture = fixture("1. A").await;
        let session = stopwatch(&fixture).await;

        let err = fixture.store.submit(&session.id, answers(&[("1", "A")])).await.unwrap_err();
        assert!(err.to_string().contains("pending"));

        let stored = fixture.store.get(&session.id).await.expect("get");
        assert_eq!(stored.status, SessionStatus::Pending);
    }

    #[tokio::test]
    async fn submit_grades_and_completes() {
        let fixture = fixture("1. A\nQ2: b\n3 C\n").await;
        let session = stopwatch(&fixture).await;
        fixture.store.start(&session.id).await.expect("start");

        let result = fixture
            .store
            .submit(&session.id, answers(&[("1", "a"), ("2", "D")]))
            .await
            .expect("submit");
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.wrong_answers, 2);

        let stored = fixture.store.get(&session.id).await.expect("get");
        assert_eq!(stored.status, SessionStatus::Completed);
        assert!(stored.end_time.is_some());
        assert_eq!(stored.answers.len(), 2);

        let err = fixture.store.submit(&session.id, answers(&[])).await.unwrap_err();
        assert!(matches!(err, SessionError::NotAcceptingAnswers(SessionStatus::Completed)));
    }

    #[tokio::test]
    async fn grading_failure_keeps_session_completed() {
        let fixture = fixture("# no answers at all").await;
        let session = stopwatch(&fixture).await;
        fixture.store.start(&session.id).await.expect("start");

        let err = fixture.store.submit(&session.id, answers(&[("1", "A")])).await.unwrap_err();
        assert!(matches!(err, SessionError::Grading(GradingError::AnswerKey(_))));

        let stored = fixture.store.get(&session.id).await.expect("get");
        assert_eq!(stored.status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn missing_answer_key_surfaces_grading_error() {
        let fixture = fixture("1. A").await;
        std::fs::remove_file(Path::new(&fixture.key_path)).expect("remove key");
        let session = stopwatch(&fixture).await;
        fixture.store.start(&session.id).await.expect("start");

        let err = fixture.store.submit(&session.id, answers(&[])).await.unwrap_err();
        assert!(matches!(err, SessionError::Grading(GradingError::Document(_))));
    }

    #[tokio::test]
    async fn timer_expires_active_session() {
        let fixture = fixture("1. A").await;
        let session = timer(&fixture, Duration::milliseconds(20)).await;
        fixture.store.start(&session.id).await.expect("start");

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        let stored = fixture.store.get(&session.id).await.expect("get");
        assert_eq!(stored.status, SessionStatus::Expired);
        assert!(stored.end_time.is_some());

        let err = fixture.store.submit(&session.id, answers(&[("1", "A")])).await.unwrap_err();
        assert!(matches!(err, SessionError::NotAcceptingAnswers(SessionStatus::Expired)));
        assert!(err.to_string().contains("expired"));
    }

    #[tokio::test]
    async fn expire_is_a_no_op_after_submit() {
        let fixture = fixture("1. A").await;
        let session = timer(&fixture, Duration::minutes(30)).await;
        fixture.store.start(&session.id).await.expect("start");
        fixture.store.submit(&session.id, answers(&[("1", "A")])).await.expect("submit");

        assert!(!fixture.store.expire(&session.id).await);
        let stored = fixture.store.get(&session.id).await.expect("get");
        assert_eq!(stored.status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn stopwatch_never_expires() {
        let fixture = fixture("1. A").await;
        let session = stopwatch(&fixture).await;
        fixture.store.start(&session.id).await.expect("start");

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let info = fixture.store.status(&session.id).await.expect("status");
        assert_eq!(info.status, SessionStatus::Active);
        assert!(info.remaining.is_none());
        assert!(info.elapsed.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn submit_and_expiry_race_has_exactly_one_winner() {
        for _ in 0..50 {
            let fixture = fixture("1. A").await;
            let session = timer(&fixture, Duration::ZERO).await;
            fixture.store.start(&session.id).await.expect("start");

            let store = fixture.store.clone();
            let id = session.id.clone();
            let submitted =
                tokio::spawn(async move { store.submit(&id, answers(&[("1", "A")])).await })
                    .await
                    .expect("join");

            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            let stored = fixture.store.get(&session.id).await.expect("get");
            match submitted {
                Ok(_) => assert_eq!(stored.status, SessionStatus::Completed),
                Err(SessionError::NotAcceptingAnswers(SessionStatus::Expired)) => {
                    assert_eq!(stored.status, SessionStatus::Expired)
                }
                Err(other) => panic!("unexpected submit error: {other}"),
            }
            assert!(stored.end_time.is_some());
        }
    }
}
