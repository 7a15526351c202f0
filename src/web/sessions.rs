// src/web/sessions.rs
//! Live builder sessions, keyed by session id and owned by one account

use chrono::{Duration, Utc};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::BuilderSession;
use crate::types::ResumeDocument;

const DEFAULT_MAX_AGE_HOURS: i64 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("builder session not found: {0}")]
    NotFound(Uuid),

    #[error("builder session {0} belongs to another account")]
    Forbidden(Uuid),
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, BuilderSession>>,
    max_age: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_max_age(Duration::hours(DEFAULT_MAX_AGE_HOURS))
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions older than `max_age` are dropped the next time one is opened.
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_age,
        }
    }

    /// Register `session` and return its id with the document being edited.
    ///
    /// If a session with the same id is still live it is kept, unsaved edits included,
    /// and `session` is dropped.
    pub async fn open(
        &self,
        session: BuilderSession,
    ) -> Result<(Uuid, ResumeDocument), SessionError> {
        let mut sessions = self.sessions.lock().await;
        self.evict_expired(&mut sessions);

        let id = session.id();
        match sessions.entry(id) {
            Entry::Occupied(live) => {
                if live.get().owner() != session.owner() {
                    warn!("{} tried to reopen builder session {}", session.owner(), id);
                    return Err(SessionError::Forbidden(id));
                }
                info!("Builder session {} already open for {}", id, session.owner());
                Ok((id, live.get().document().clone()))
            }
            Entry::Vacant(slot) => {
                info!("Opening builder session {} for {}", id, session.owner());
                let document = session.document().clone();
                slot.insert(session);
                Ok((id, document))
            }
        }
    }

    fn evict_expired(&self, sessions: &mut HashMap<Uuid, BuilderSession>) {
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, session| now - session.created_at() < self.max_age);

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} expired builder sessions", evicted);
        }
    }

    /// Run `f` against the session if `owner` may touch it.
    pub async fn with_session<R>(
        &self,
        id: Uuid,
        owner: &str,
        f: impl FnOnce(&mut BuilderSession) -> R,
    ) -> Result<R, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;

        if session.owner() != owner {
            warn!("{} tried to access builder session {}", owner, id);
            return Err(SessionError::Forbidden(id));
        }

        Ok(f(session))
    }

    pub async fn remove(&self, id: Uuid, owner: &str) -> Result<BuilderSession, SessionError> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(&id) {
            None => Err(SessionError::NotFound(id)),
            Some(session) if session.owner() != owner => Err(SessionError::Forbidden(id)),
            Some(_) => sessions.remove(&id).ok_or(SessionError::NotFound(id)),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BuilderCommand;
    use crate::types::PersonalField;

    async fn open_new(registry: &SessionRegistry, owner: &str) -> Uuid {
        registry.open(BuilderSession::new(owner)).await.unwrap().0
    }

    #[tokio::test]
    async fn test_owner_can_edit_session() {
        let registry = SessionRegistry::new();
        let id = open_new(&registry, "ada@example.com").await;

        let count = registry
            .with_session(id, "ada@example.com", |session| {
                session.apply(BuilderCommand::AddExperience);
                session.document().experience.len()
            })
            .await
            .unwrap();

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_other_accounts_are_refused() {
        let registry = SessionRegistry::new();
        let id = open_new(&registry, "ada@example.com").await;

        let err = registry
            .with_session(id, "charles@example.com", |_| ())
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::Forbidden(id));

        let err = registry.remove(id, "charles@example.com").await.unwrap_err();
        assert_eq!(err, SessionError::Forbidden(id));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_discards_session() {
        let registry = SessionRegistry::new();
        let id = open_new(&registry, "ada@example.com").await;

        registry.remove(id, "ada@example.com").await.unwrap();

        assert_eq!(
            registry.with_session(id, "ada@example.com", |_| ()).await,
            Err(SessionError::NotFound(id))
        );
    }

    #[tokio::test]
    async fn test_reopening_live_session_keeps_unsaved_edits() {
        let registry = SessionRegistry::new();
        let id = open_new(&registry, "ada@example.com").await;
        registry
            .with_session(id, "ada@example.com", |session| {
                session.apply(BuilderCommand::UpdatePersonalInfo {
                    update: PersonalField::FullName("Unsaved edit".to_string()),
                });
            })
            .await
            .unwrap();

        let reopened =
            BuilderSession::with_document("ada@example.com", id, ResumeDocument::new());
        let (reopened_id, document) = registry.open(reopened).await.unwrap();

        assert_eq!(reopened_id, id);
        assert_eq!(document.personal_info.full_name, "Unsaved edit");
        assert_eq!(registry.len().await, 1);

        let stranger =
            BuilderSession::with_document("charles@example.com", id, ResumeDocument::new());
        assert_eq!(
            registry.open(stranger).await,
            Err(SessionError::Forbidden(id))
        );
    }

    #[tokio::test]
    async fn test_expired_sessions_are_evicted_on_open() {
        let registry = SessionRegistry::with_max_age(Duration::zero());
        let first = open_new(&registry, "ada@example.com").await;
        let second = open_new(&registry, "ada@example.com").await;

        assert_eq!(registry.len().await, 1);
        assert_eq!(
            registry.with_session(first, "ada@example.com", |_| ()).await,
            Err(SessionError::NotFound(first))
        );
        assert!(registry
            .with_session(second, "ada@example.com", |_| ())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_fresh_sessions_survive_open() {
        let registry = SessionRegistry::new();
        open_new(&registry, "ada@example.com").await;
        open_new(&registry, "charles@example.com").await;

        assert_eq!(registry.len().await, 2);
    }
}
