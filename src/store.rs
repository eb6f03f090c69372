//! Persistence boundary.
//!
//! The engine never talks to storage directly. It goes through
//! [`MatchStore`], which a host application backs with whatever database
//! it has. [`InMemoryStore`] is the reference implementation used by tests
//! and single-process deployments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::state::live::{LiveMatchState, MatchConfig, Participant, ParticipantRole};

/// Storage and directory operations the engine consumes.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Persist a newly created match row.
    async fn insert_match(&self, config: MatchConfig) -> Result<(), StoreError>;

    /// Current match row, or `None` if the match does not exist.
    async fn load_match_config(&self, match_id: &str) -> Result<Option<MatchConfig>, StoreError>;

    /// Participants in join order. Used when live data is (re)built.
    async fn load_participants(&self, match_id: &str) -> Result<Vec<Participant>, StoreError>;

    /// Record a participant on the match row. Re-adding an identity is a no-op.
    async fn add_participant(
        &self,
        match_id: &str,
        participant: Participant,
    ) -> Result<(), StoreError>;

    async fn load_live_state(&self, match_id: &str) -> Result<Option<LiveMatchState>, StoreError>;

    /// Write the whole live document atomically.
    ///
    /// Implementations must reject a document whose version is not exactly
    /// one past the stored version (or 1 when nothing is stored yet).
    async fn persist_live_state(
        &self,
        match_id: &str,
        state: &LiveMatchState,
    ) -> Result<(), StoreError>;

    /// Best-effort name lookup.
    async fn lookup_display_name(&self, identity: &str) -> Option<String>;

    /// Whether `identity` may drive the match lifecycle.
    async fn is_controller(&self, match_id: &str, identity: &str) -> Result<bool, StoreError>;
}

#[derive(Debug)]
struct StoredMatch {
    config: MatchConfig,
    live: Option<LiveMatchState>,
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    matches: RwLock<HashMap<String, StoredMatch>>,
    display_names: RwLock<HashMap<String, String>>,
    fail_next_persist: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name for [`MatchStore::lookup_display_name`].
    pub async fn set_display_name(&self, identity: impl Into<String>, name: impl Into<String>) {
        self.display_names
            .write()
            .await
            .insert(identity.into(), name.into());
    }

    /// Make the next persist fail with `Unavailable`.
    pub fn fail_next_persist(&self) {
        self.fail_next_persist.store(true, Ordering::SeqCst);
    }

    pub async fn match_count(&self) -> usize {
        self.matches.read().await.len()
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn insert_match(&self, config: MatchConfig) -> Result<(), StoreError> {
        let mut matches = self.matches.write().await;
        matches.insert(
            config.match_id.clone(),
            StoredMatch { config, live: None },
        );
        Ok(())
    }

    async fn load_match_config(&self, match_id: &str) -> Result<Option<MatchConfig>, StoreError> {
        Ok(self
            .matches
            .read()
            .await
            .get(match_id)
            .map(|m| m.config.clone()))
    }

    async fn load_participants(&self, match_id: &str) -> Result<Vec<Participant>, StoreError> {
        self.matches
            .read()
            .await
            .get(match_id)
            .map(|m| m.config.participants.clone())
            .ok_or_else(|| StoreError::NotFound(match_id.to_string()))
    }

    async fn add_participant(
        &self,
        match_id: &str,
        participant: Participant,
    ) -> Result<(), StoreError> {
        let mut matches = self.matches.write().await;
        let stored = matches
            .get_mut(match_id)
            .ok_or_else(|| StoreError::NotFound(match_id.to_string()))?;
        if !stored
            .config
            .participants
            .iter()
            .any(|p| p.identity == participant.identity)
        {
            stored.config.participants.push(participant);
        }
        Ok(())
    }

    async fn load_live_state(&self, match_id: &str) -> Result<Option<LiveMatchState>, StoreError> {
        Ok(self
            .matches
            .read()
            .await
            .get(match_id)
            .and_then(|m| m.live.clone()))
    }

    async fn persist_live_state(
        &self,
        match_id: &str,
        state: &LiveMatchState,
    ) -> Result<(), StoreError> {
        if self.fail_next_persist.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }

        let mut matches = self.matches.write().await;
        let stored = matches
            .get_mut(match_id)
            .ok_or_else(|| StoreError::NotFound(match_id.to_string()))?;

        let expected = stored.live.as_ref().map_or(0, |l| l.version()) + 1;
        if state.version() != expected {
            return Err(StoreError::VersionConflict {
                expected,
                actual: state.version(),
            });
        }

        stored.config.status = state.status();
        stored.live = Some(state.clone());
        debug!(match_id, version = state.version(), "Live state stored");
        Ok(())
    }

    async fn lookup_display_name(&self, identity: &str) -> Option<String> {
        self.display_names.read().await.get(identity).cloned()
    }

    async fn is_controller(&self, match_id: &str, identity: &str) -> Result<bool, StoreError> {
        let matches = self.matches.read().await;
        let stored = matches
            .get(match_id)
            .ok_or_else(|| StoreError::NotFound(match_id.to_string()))?;
        Ok(stored
            .config
            .participants
            .iter()
            .any(|p| p.identity == identity && p.role == ParticipantRole::Host))
    }
}
