//! Error types for the engine and its store.

use std::fmt;

use thiserror::Error;

use crate::rules::PlayRejection;
use crate::state::lifecycle::{InvalidTransition, MatchStatus};

/// Engine operation, carried as context on every error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Join,
    Initialize,
    SubmitPlay,
    GetLiveState,
    Start,
    Pause,
    Resume,
    End,
    Abandon,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Join => "join",
            Self::Initialize => "initialize",
            Self::SubmitPlay => "submit_play",
            Self::GetLiveState => "get_live_state",
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::End => "end",
            Self::Abandon => "abandon",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures reported by a [`crate::store::MatchStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("version conflict: expected {expected}, got {actual}")]
    VersionConflict { expected: u64, actual: u64 },
    #[error("no match {0} in store")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{action}: match {match_id} not found")]
    MatchNotFound { match_id: String, action: Action },

    #[error("{action}: match {match_id} is {status}, not active")]
    InactiveMatch {
        match_id: String,
        action: Action,
        status: MatchStatus,
    },

    #[error("{action}: thrower {identity} is not seated in match {match_id}")]
    UnresolvedThrower {
        match_id: String,
        action: Action,
        identity: String,
    },

    #[error("{action}: slot identity {identity} in match {match_id} names no position")]
    MalformedSlotIdentity {
        match_id: String,
        action: Action,
        identity: String,
    },

    #[error("{action}: store failed for match {match_id}")]
    PersistenceFailure {
        match_id: String,
        action: Action,
        #[source]
        source: StoreError,
    },

    #[error("{action}: match {match_id}: {source}")]
    InvalidTransition {
        match_id: String,
        action: Action,
        #[source]
        source: InvalidTransition,
    },

    #[error("{action}: {identity} may not control match {match_id}")]
    NotAuthorized {
        match_id: String,
        action: Action,
        identity: String,
    },

    #[error("{action}: no match with room code {code}")]
    RoomCodeNotFound { code: String, action: Action },

    #[error("{action}: match {match_id} already has four players")]
    MatchFull { match_id: String, action: Action },

    #[error("{action}: no free room code after {attempts} attempts")]
    RoomCodesExhausted { attempts: u32, action: Action },
}

impl EngineError {
    /// Map a refused play into the error for a given match.
    pub fn from_rejection(match_id: &str, action: Action, rejection: PlayRejection) -> Self {
        let match_id = match_id.to_string();
        match rejection {
            PlayRejection::NotActive(status) => Self::InactiveMatch {
                match_id,
                action,
                status,
            },
            PlayRejection::UnresolvedThrower(identity) => Self::UnresolvedThrower {
                match_id,
                action,
                identity,
            },
            PlayRejection::MalformedSlotIdentity(identity) => Self::MalformedSlotIdentity {
                match_id,
                action,
                identity,
            },
        }
    }

    pub fn persistence(match_id: &str, action: Action, source: StoreError) -> Self {
        Self::PersistenceFailure {
            match_id: match_id.to_string(),
            action,
            source,
        }
    }

    pub fn not_found(match_id: &str, action: Action) -> Self {
        Self::MatchNotFound {
            match_id: match_id.to_string(),
            action,
        }
    }

    /// The operation that failed.
    pub fn action(&self) -> Action {
        match self {
            Self::MatchNotFound { action, .. }
            | Self::InactiveMatch { action, .. }
            | Self::UnresolvedThrower { action, .. }
            | Self::MalformedSlotIdentity { action, .. }
            | Self::PersistenceFailure { action, .. }
            | Self::InvalidTransition { action, .. }
            | Self::NotAuthorized { action, .. }
            | Self::RoomCodeNotFound { action, .. }
            | Self::MatchFull { action, .. }
            | Self::RoomCodesExhausted { action, .. } => *action,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_mapping() {
        let err = EngineError::from_rejection(
            "m-1",
            Action::SubmitPlay,
            PlayRejection::NotActive(MatchStatus::Paused),
        );
        assert!(matches!(
            err,
            EngineError::InactiveMatch {
                status: MatchStatus::Paused,
                ..
            }
        ));
        assert_eq!(err.action(), Action::SubmitPlay);
        assert_eq!(
            err.to_string(),
            "submit_play: match m-1 is paused, not active"
        );
    }

    #[test]
    fn test_persistence_keeps_source() {
        use std::error::Error as _;

        let err = EngineError::persistence(
            "m-1",
            Action::SubmitPlay,
            StoreError::VersionConflict {
                expected: 3,
                actual: 5,
            },
        );
        let source = err.source().map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("version conflict: expected 3, got 5")
        );
    }
}
