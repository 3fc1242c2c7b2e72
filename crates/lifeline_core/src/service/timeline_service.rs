//! Session lifecycle against a timeline repository.
//!
//! # Responsibility
//! - Open a session from the owner's stored document (or an empty one).
//! - Persist session documents, explicitly or when autosave is due.
//!
//! # Invariants
//! - Documents with no content are never written.
//! - A failed save leaves the session dirty so the next tick retries.

use crate::config::Settings;
use crate::model::document::TimelineData;
use crate::repo::{RepoError, TimelineRepository};
use crate::scene::SceneError;
use crate::service::session::TimelineSession;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    /// Stored document cannot be turned into a scene.
    Scene(SceneError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Scene(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Scene(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SceneError> for ServiceError {
    fn from(value: SceneError) -> Self {
        Self::Scene(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Nothing worth storing yet.
    SkippedEmpty,
}

/// Timeline service facade over a repository implementation.
pub struct TimelineService<R: TimelineRepository> {
    repo: R,
    settings: Settings,
}

impl<R: TimelineRepository> TimelineService<R> {
    pub fn new(repo: R, settings: Settings) -> Self {
        Self { repo, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Loads the owner's document into a fresh session.
    pub fn open_session(&self, owner_id: &str) -> ServiceResult<TimelineSession> {
        let started_at = Instant::now();
        let stored = self.repo.load(owner_id)?;
        let found = stored.is_some();
        let data = stored.unwrap_or_default();
        let session = TimelineSession::from_document(&data, &self.settings)?;
        info!(
            "event=session_load module=service status=ok found={} nodes={} edges={} duration_ms={}",
            found,
            data.nodes.len(),
            data.edges.len(),
            started_at.elapsed().as_millis()
        );
        Ok(session)
    }

    /// Writes a document unless it is empty.
    pub fn save_document(&self, owner_id: &str, data: &TimelineData) -> ServiceResult<SaveOutcome> {
        if !data.has_content() {
            info!("event=timeline_save module=service status=noop reason=empty");
            return Ok(SaveOutcome::SkippedEmpty);
        }
        let started_at = Instant::now();
        match self.repo.save(owner_id, data) {
            Ok(()) => {
                info!(
                    "event=timeline_save module=service status=ok nodes={} edges={} duration_ms={}",
                    data.nodes.len(),
                    data.edges.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(SaveOutcome::Saved)
            }
            Err(err) => {
                error!(
                    "event=timeline_save module=service status=error error={}",
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Saves the session now and clears its dirty flag on success.
    pub fn save(&self, owner_id: &str, session: &mut TimelineSession) -> ServiceResult<SaveOutcome> {
        let outcome = self.save_document(owner_id, &session.to_document())?;
        session.mark_saved();
        Ok(outcome)
    }

    /// Saves when the session's debounce has elapsed at `now`.
    pub fn autosave_tick(
        &self,
        owner_id: &str,
        session: &mut TimelineSession,
        now: Instant,
    ) -> ServiceResult<Option<SaveOutcome>> {
        if !session.autosave().poll(now) {
            return Ok(None);
        }
        self.save(owner_id, session).map(Some)
    }

    pub fn autosave_interval(&self) -> Duration {
        self.settings.timeline.save_debounce()
    }
}

#[cfg(test)]
mod tests {
    use super::{SaveOutcome, TimelineService};
    use crate::config::Settings;
    use crate::db::open_db_in_memory;
    use crate::model::node::NodeDraft;
    use crate::repo::{SqliteTimelineRepository, TimelineRepository};
    use std::time::{Duration, Instant};

    #[test]
    fn empty_session_is_not_written() {
        let conn = open_db_in_memory().unwrap();
        let service = TimelineService::new(SqliteTimelineRepository::new(&conn), Settings::default());
        let mut session = service.open_session("me").unwrap();
        assert_eq!(service.save("me", &mut session).unwrap(), SaveOutcome::SkippedEmpty);
        assert!(service.repository().load("me").unwrap().is_none());
    }

    #[test]
    fn autosave_waits_for_debounce_then_persists() {
        let conn = open_db_in_memory().unwrap();
        let service = TimelineService::new(SqliteTimelineRepository::new(&conn), Settings::default());
        let mut session = service.open_session("me").unwrap();
        session
            .create_node(&NodeDraft::new(25.0, "Graduated"), None)
            .unwrap();

        let now = Instant::now();
        assert_eq!(service.autosave_tick("me", &mut session, now).unwrap(), None);

        let later = now + service.autosave_interval() + Duration::from_millis(1);
        assert_eq!(
            service.autosave_tick("me", &mut session, later).unwrap(),
            Some(SaveOutcome::Saved)
        );
        assert!(!session.is_dirty());

        let reopened = service.open_session("me").unwrap();
        assert_eq!(reopened.scene().node_count(), 1);
    }
}
