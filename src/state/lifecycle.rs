//! Match status state machine.
//!
//! # State Diagram
//!
//! ```text
//! ┌─────────┐  start   ┌────────┐  pause   ┌────────┐
//! │ Waiting │─────────▶│ Active │─────────▶│ Paused │
//! └────┬────┘          └───┬────┘◀─────────└───┬────┘
//!      │                   │        resume     │
//!      │                   │ end / self-sink   │ end
//!      │                   ▼                   │
//!      │              ┌────────┐               │
//!      │              │ Ended  │◀──────────────┘
//!      │              └────────┘
//!      │ abandon      ┌───────────┐
//!      └─────────────▶│ Abandoned │◀──── abandon (active, paused)
//!                     └───────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Match status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Created, waiting for players and a start
    #[default]
    Waiting,
    /// In play; the only status that accepts plays
    Active,
    /// Temporarily halted
    Paused,
    /// Finished, by an end request or a self-sink
    Ended,
    /// Aborted before completion
    Abandoned,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Ended => "ended",
            Self::Abandoned => "abandoned",
        }
    }

    /// Check if the match accepts play submissions.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Check if the match is over (cannot change).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended | Self::Abandoned)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchEvent {
    Start,
    Pause,
    Resume,
    End,
    /// A self-sink handed the win to the other team.
    SelfSink,
    Abandon,
}

/// Error when a status transition is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid transition from {from} via {event:?}: {reason}")]
pub struct InvalidTransition {
    pub from: MatchStatus,
    pub event: MatchEvent,
    pub reason: &'static str,
}

impl MatchStatus {
    /// Calculate the status an event leads to.
    pub fn transition(&self, event: MatchEvent) -> Result<MatchStatus, InvalidTransition> {
        use MatchEvent::*;
        use MatchStatus::*;

        let invalid = |reason: &'static str| InvalidTransition {
            from: *self,
            event,
            reason,
        };

        match (self, event) {
            (Ended | Abandoned, _) => Err(invalid("Match is over")),

            (Waiting, Start) => Ok(Active),
            (_, Start) => Err(invalid("Match already started")),

            (Active, Pause) => Ok(Paused),
            (Paused, Pause) => Err(invalid("Already paused")),
            (_, Pause) => Err(invalid("Match is not active")),

            (Paused, Resume) => Ok(Active),
            (_, Resume) => Err(invalid("Match is not paused")),

            (Active | Paused, End) => Ok(Ended),
            (_, End) => Err(invalid("Match has not started")),

            (Active, SelfSink) => Ok(Ended),
            (_, SelfSink) => Err(invalid("Plays require an active match")),

            (Waiting | Active | Paused, Abandon) => Ok(Abandoned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_flow() {
        let s = MatchStatus::default();
        assert_eq!(s, MatchStatus::Waiting);

        let s = s.transition(MatchEvent::Start).unwrap();
        assert!(s.is_active());

        let s = s.transition(MatchEvent::Pause).unwrap();
        assert_eq!(s, MatchStatus::Paused);
        assert!(!s.is_active());

        let s = s.transition(MatchEvent::Resume).unwrap();
        assert_eq!(s, MatchStatus::Active);

        let s = s.transition(MatchEvent::End).unwrap();
        assert!(s.is_terminal());
    }

    #[test]
    fn test_self_sink_only_from_active() {
        assert_eq!(
            MatchStatus::Active.transition(MatchEvent::SelfSink),
            Ok(MatchStatus::Ended)
        );
        assert!(MatchStatus::Paused.transition(MatchEvent::SelfSink).is_err());
        assert!(MatchStatus::Waiting.transition(MatchEvent::SelfSink).is_err());
    }

    #[test]
    fn test_abandon() {
        for s in [MatchStatus::Waiting, MatchStatus::Active, MatchStatus::Paused] {
            assert_eq!(s.transition(MatchEvent::Abandon), Ok(MatchStatus::Abandoned));
        }
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(MatchStatus::Waiting.transition(MatchEvent::Pause).is_err());
        assert!(MatchStatus::Waiting.transition(MatchEvent::End).is_err());
        assert!(MatchStatus::Active.transition(MatchEvent::Start).is_err());
        assert!(MatchStatus::Active.transition(MatchEvent::Resume).is_err());

        for terminal in [MatchStatus::Ended, MatchStatus::Abandoned] {
            for event in [
                MatchEvent::Start,
                MatchEvent::Pause,
                MatchEvent::Resume,
                MatchEvent::End,
                MatchEvent::SelfSink,
                MatchEvent::Abandon,
            ] {
                let err = terminal.transition(event).unwrap_err();
                assert_eq!(err.reason, "Match is over");
            }
        }
    }

    #[test]
    fn test_display() {
        let err = MatchStatus::Waiting.transition(MatchEvent::Pause).unwrap_err();
        assert_eq!(
            format!("{}", err),
            "Invalid transition from waiting via Pause: Match is not active"
        );
    }
}
