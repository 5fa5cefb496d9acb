// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory registry of open import sessions.
//!
//! A session is checked out of the registry for the duration of a commit
//! so the map lock is never held across store calls. While checked out the
//! slot keeps only the cancel handle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use booth_map::{CancelHandle, ImportSession};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Registry lookup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No session with this id.
    NotFound {
        /// The requested id.
        id: String,
    },
    /// The session is being committed.
    Committing {
        /// The requested id.
        id: String,
    },
    /// Cancellation was requested but no commit is running.
    NotCommitting {
        /// The requested id.
        id: String,
    },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "Import session '{id}' not found"),
            Self::Committing { id } => {
                write!(f, "Import session '{id}' is being committed")
            }
            Self::NotCommitting { id } => {
                write!(f, "Import session '{id}' has no commit in progress")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

#[derive(Debug)]
struct SessionSlot {
    /// `None` while a commit holds the session.
    session: Option<ImportSession>,
    cancel: CancelHandle,
}

/// Open sessions keyed by generated id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    slots: Mutex<HashMap<String, SessionSlot>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a session and returns its new id.
    pub async fn insert(&self, session: ImportSession) -> String {
        let id: String = format!("import-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.slots.lock().await.insert(
            id.clone(),
            SessionSlot {
                session: Some(session),
                cancel: CancelHandle::new(),
            },
        );
        info!(session = %id, "Import session opened");
        id
    }

    /// Runs `f` against an idle session.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or the session is being
    /// committed.
    pub async fn with_session<R, F>(&self, id: &str, f: F) -> Result<R, RegistryError>
    where
        F: FnOnce(&mut ImportSession) -> R,
    {
        let mut slots = self.slots.lock().await;
        let slot: &mut SessionSlot = slots.get_mut(id).ok_or_else(|| not_found(id))?;
        let session: &mut ImportSession =
            slot.session.as_mut().ok_or_else(|| RegistryError::Committing {
                id: id.to_string(),
            })?;
        Ok(f(session))
    }

    /// Takes a session out for committing, arming a fresh cancel handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or a commit is already running.
    pub async fn checkout(&self, id: &str) -> Result<(ImportSession, CancelHandle), RegistryError> {
        let mut slots = self.slots.lock().await;
        let slot: &mut SessionSlot = slots.get_mut(id).ok_or_else(|| not_found(id))?;
        let session: ImportSession = slot.session.take().ok_or_else(|| RegistryError::Committing {
            id: id.to_string(),
        })?;
        slot.cancel = CancelHandle::new();
        let cancel: CancelHandle = slot.cancel.clone();
        drop(slots);

        debug!(session = %id, "Import session checked out");
        Ok((session, cancel))
    }

    /// Returns a checked-out session.
    ///
    /// If the slot was removed meanwhile the session is dropped.
    pub async fn checkin(&self, id: &str, session: ImportSession) {
        let mut slots = self.slots.lock().await;
        if let Some(slot) = slots.get_mut(id) {
            slot.session = Some(session);
            debug!(session = %id, "Import session checked in");
        }
    }

    /// Requests cancellation of a running commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or no commit is running.
    pub async fn cancel(&self, id: &str) -> Result<(), RegistryError> {
        let cancel: CancelHandle = {
            let slots = self.slots.lock().await;
            let slot: &SessionSlot = slots.get(id).ok_or_else(|| not_found(id))?;
            if slot.session.is_some() {
                return Err(RegistryError::NotCommitting { id: id.to_string() });
            }
            slot.cancel.clone()
        };
        cancel.cancel();
        info!(session = %id, "Commit cancellation requested");
        Ok(())
    }

    /// Abandons an idle session.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or the session is being
    /// committed.
    pub async fn remove(&self, id: &str) -> Result<(), RegistryError> {
        let mut slots = self.slots.lock().await;
        let slot: &SessionSlot = slots.get(id).ok_or_else(|| not_found(id))?;
        if slot.session.is_none() {
            return Err(RegistryError::Committing { id: id.to_string() });
        }
        slots.remove(id);
        drop(slots);

        info!(session = %id, "Import session abandoned");
        Ok(())
    }
}

fn not_found(id: &str) -> RegistryError {
    RegistryError::NotFound { id: id.to_string() }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use booth_map::{ExistingIndex, ImportContext, SessionPhase};
    use booth_map_domain::RecordKind;

    fn empty_session() -> ImportSession {
        ImportSession::new(
            RecordKind::Company,
            ImportContext::default(),
            ExistingIndex::default(),
        )
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let registry: SessionRegistry = SessionRegistry::new();

        let first: String = registry.insert(empty_session()).await;
        let second: String = registry.insert(empty_session()).await;

        assert_eq!(first, "import-1");
        assert_eq!(second, "import-2");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let registry: SessionRegistry = SessionRegistry::new();

        let result: Result<SessionPhase, RegistryError> =
            registry.with_session("import-9", |s| s.phase()).await;

        assert_eq!(
            result,
            Err(RegistryError::NotFound {
                id: String::from("import-9")
            })
        );
    }

    #[tokio::test]
    async fn test_checked_out_session_is_busy() {
        let registry: SessionRegistry = SessionRegistry::new();
        let id: String = registry.insert(empty_session()).await;

        let (session, cancel) = registry.checkout(&id).await.unwrap();

        assert!(matches!(
            registry.with_session(&id, |s| s.phase()).await,
            Err(RegistryError::Committing { .. })
        ));
        assert!(matches!(
            registry.checkout(&id).await,
            Err(RegistryError::Committing { .. })
        ));
        assert!(matches!(
            registry.remove(&id).await,
            Err(RegistryError::Committing { .. })
        ));

        registry.cancel(&id).await.unwrap();
        assert!(cancel.is_cancelled());

        registry.checkin(&id, session).await;
        assert!(registry.with_session(&id, |s| s.phase()).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancel_without_commit_is_rejected() {
        let registry: SessionRegistry = SessionRegistry::new();
        let id: String = registry.insert(empty_session()).await;

        assert!(matches!(
            registry.cancel(&id).await,
            Err(RegistryError::NotCommitting { .. })
        ));
    }

    #[tokio::test]
    async fn test_checkout_arms_a_fresh_cancel_handle() {
        let registry: SessionRegistry = SessionRegistry::new();
        let id: String = registry.insert(empty_session()).await;

        let (session, first) = registry.checkout(&id).await.unwrap();
        registry.cancel(&id).await.unwrap();
        registry.checkin(&id, session).await;

        let (_session, second) = registry.checkout(&id).await.unwrap();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[tokio::test]
    async fn test_remove_then_lookup_fails() {
        let registry: SessionRegistry = SessionRegistry::new();
        let id: String = registry.insert(empty_session()).await;

        registry.remove(&id).await.unwrap();

        assert!(matches!(
            registry.with_session(&id, |s| s.phase()).await,
            Err(RegistryError::NotFound { .. })
        ));
    }
}
