//! Scoring rules.
//!
//! - `resolver` - what a play is worth and which mechanics fire
//! - `accumulator` - counter, streak and score updates
//! - `scores` - team totals derived from player scores
//! - `lifecycle` - status changes a play can cause
//!
//! # Flow
//!
//! ```text
//! PlaySubmission ──▶ resolve_play ──▶ apply_resolution ──▶ settle ──▶ new LiveMatchState
//!                        │                                              │
//!                        └── rejected: nothing changes                  └── compute_team_scores
//! ```
//!
//! Everything here is synchronous and free of I/O; the engine owns
//! loading, locking and persistence.

pub mod accumulator;
pub mod lifecycle;
pub mod resolver;
pub mod scores;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

pub use accumulator::{apply_resolution, Accumulated};
pub use resolver::{base_points, resolve_play, Resolution};
pub use scores::{compute_team_scores, team_score, TeamScores};

use crate::state::lifecycle::{MatchEvent, MatchStatus};
use crate::state::live::LiveMatchState;
use crate::state::play::{PlaySubmission, RecordedPlay};
use crate::state::player::{Position, Team};

/// Why a play was refused. A refused play changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayRejection {
    #[error("Match is {0}, not active")]
    NotActive(MatchStatus),
    #[error("Unknown thrower {0}")]
    UnresolvedThrower(String),
    #[error("Malformed slot identity {0}")]
    MalformedSlotIdentity(String),
}

/// What a committed play did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayOutcome {
    pub thrower: Position,
    pub points: u32,
    pub scores: TeamScores,
    pub winner: Option<Team>,
    pub status: MatchStatus,
    pub version: u64,
    pub ignited: bool,
    pub ended_by: Option<MatchEvent>,
}

/// Options for [`apply_play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOptions {
    pub recent_plays_capacity: usize,
    pub auto_end_at_score_limit: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            recent_plays_capacity: crate::config::DEFAULT_RECENT_PLAYS_CAPACITY,
            auto_end_at_score_limit: false,
        }
    }
}

/// Apply one play to a state, producing the next state.
///
/// The input is left untouched; on rejection there is nothing to roll back.
pub fn apply_play(
    state: &LiveMatchState,
    play: &PlaySubmission,
    options: PlayOptions,
) -> Result<(LiveMatchState, PlayOutcome), PlayRejection> {
    if !state.status().is_active() {
        return Err(PlayRejection::NotActive(state.status()));
    }

    let resolution = resolve_play(play, state)?;

    let mut next = state.clone();
    let accumulated = apply_resolution(&mut next, &resolution);
    let ended_by = lifecycle::settle(&mut next, &resolution, options.auto_end_at_score_limit);

    if resolution.self_sink_winner.is_some() && resolution.redemption_penalty.is_some() {
        tracing::warn!(
            thrower = %play.thrower,
            "Self-sink and redemption on one play, both applied"
        );
    }

    let version = next.bump_version();
    next.record_play(
        RecordedPlay {
            submission: play.clone(),
            thrower_position: resolution.thrower,
            points: resolution.points,
            version,
            recorded_at: Utc::now(),
        },
        options.recent_plays_capacity,
    );

    let scores = next.team_scores();
    let outcome = PlayOutcome {
        thrower: resolution.thrower,
        points: resolution.points,
        scores,
        winner: next.winner(),
        status: next.status(),
        version,
        ignited: accumulated.ignited,
        ended_by,
    };

    Ok((next, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::live::{initialize_live_match_state, MatchConfig, MatchSetup};
    use crate::state::play::ThrowType;

    fn state() -> LiveMatchState {
        let config = MatchConfig::new("m".into(), "CODE".into(), MatchSetup::default());
        initialize_live_match_state(&config, &[])
    }

    #[test]
    fn test_rejects_unless_active() {
        let s = state();
        let play = PlaySubmission::new("slot-1", ThrowType::Hit, Team::One);
        assert_eq!(
            apply_play(&s, &play, PlayOptions::default()).unwrap_err(),
            PlayRejection::NotActive(MatchStatus::Waiting)
        );

        let mut paused = s.clone();
        paused.apply_event(MatchEvent::Start).unwrap();
        paused.apply_event(MatchEvent::Pause).unwrap();
        assert!(apply_play(&paused, &play, PlayOptions::default()).is_err());
    }

    #[test]
    fn test_input_state_untouched() {
        let mut s = state();
        s.apply_event(MatchEvent::Start).unwrap();
        let before = s.clone();

        let play = PlaySubmission::new("slot-1", ThrowType::Goal, Team::One);
        let (next, outcome) = apply_play(&s, &play, PlayOptions::default()).unwrap();

        assert_eq!(s, before);
        assert_eq!(next.stats(Position::One).score, 2);
        assert_eq!(outcome.points, 2);
        assert_eq!(outcome.version, 1);
        assert_eq!(next.version(), 1);
        assert_eq!(next.latest_play().map(|p| p.points), Some(2));
    }

    #[test]
    fn test_self_sink_outcome() {
        let mut s = state();
        s.apply_event(MatchEvent::Start).unwrap();
        let play = PlaySubmission::new("slot-1", ThrowType::SelfSink, Team::One);
        let (next, outcome) = apply_play(&s, &play, PlayOptions::default()).unwrap();

        assert_eq!(outcome.status, MatchStatus::Ended);
        assert_eq!(outcome.ended_by, Some(MatchEvent::SelfSink));
        assert_eq!(outcome.scores, TeamScores { team1: 0, team2: 22 });
        assert_eq!(outcome.winner, Some(Team::Two));
        assert!(next.ended_at().is_some());

        assert!(apply_play(&next, &play, PlayOptions::default()).is_err());
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            PlayRejection::NotActive(MatchStatus::Paused).to_string(),
            "Match is paused, not active"
        );
        assert_eq!(
            PlayRejection::UnresolvedThrower("ghost".into()).to_string(),
            "Unknown thrower ghost"
        );
        assert_eq!(
            PlayRejection::MalformedSlotIdentity("slot-9".into()).to_string(),
            "Malformed slot identity slot-9"
        );
    }
}
