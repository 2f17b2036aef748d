use std::sync::Arc;

use crate::core::config::Settings;
use crate::services::documents::DocumentStore;
use crate::services::exam_sessions::SessionStore;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    sessions: SessionStore,
}

impl AppState {
    pub(crate) fn new(settings: Settings, documents: DocumentStore) -> Self {
        let sessions = SessionStore::new(documents);
        Self { inner: Arc::new(InnerState { settings, sessions }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    pub(crate) fn documents(&self) -> &DocumentStore {
        self.inner.sessions.documents()
    }
}
