//! Match state types.
//!
//! - `player` - positions, teams, slot identities and per-player counters
//! - `play` - play submissions and the record of applied plays
//! - `live` - match setup and the live match document
//! - `lifecycle` - match status state machine
//! - `room_code` - join code allocation
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        LiveMatchState                            │
//! │                                                                  │
//! │  playerStats [1..4]       playerMap             matchSetup       │
//! │  ┌──────┬──────┐          identity → position   scoreLimit       │
//! │  │  1   │  2   │ team1                          winByTwo         │
//! │  ├──────┼──────┤                                sinkPoints       │
//! │  │  3   │  4   │ team2    recentPlays (ring)    names, arena     │
//! │  └──────┴──────┘                                                 │
//! │                                                                  │
//! │  status: Waiting ──▶ Active ⇄ Paused ──▶ Ended / Abandoned       │
//! │  roomCode, version                                               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod lifecycle;
pub mod live;
pub mod play;
pub mod player;
pub mod room_code;

// Re-export commonly used types
pub use lifecycle::{InvalidTransition, MatchEvent, MatchStatus};
pub use live::{
    initialize_live_match_state, LiveMatchState, MatchConfig, MatchSetup, Participant,
    ParticipantRole, SinkPoints,
};
pub use play::{
    DefenseType, FifaAction, KickKind, PlaySubmission, RecordedPlay, Redemption, ThrowType,
};
pub use player::{PlayerRef, PlayerStats, Position, RefError, Team, SLOT_IDENTITY_PREFIX};
pub use room_code::{CodesExhausted, RoomCodeAllocator};
