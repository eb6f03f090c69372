//! Die Match State Library
//!
//! Live scoring for four-player lawn die matches.
//!
//! # Overview
//!
//! - **Match State** - Four fixed positions with per-player counters and
//!   streaks, the identity-to-position map, setup and status.
//!
//! - **Rules** - Resolves a single play (throw, defense, kick, redemption)
//!   into points and special mechanics, applies it to the counters, and
//!   derives team scores.
//!
//! - **Lifecycle** - Waiting, active, paused, ended and abandoned, with
//!   self-sinks ending a match on the spot.
//!
//! - **Engine** - Loads, mutates and stores live data through a
//!   [`store::MatchStore`], one mutation per match at a time.
//!
//! # Design Principles
//!
//! 1. **Team scores are derived** - Only player scores are stored; team
//!    totals are summed on demand.
//!
//! 2. **Plays are all or nothing** - A rejected play, or one the store
//!    refuses, leaves the match exactly as it was.
//!
//! 3. **Identities are parsed once** - Thrower and defender identities
//!    become a [`state::PlayerRef`] at the boundary.
//!
//! 4. **No transport** - This crate is state and rules; realtime fan-out
//!    and storage engines live elsewhere.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use die_match_state::{
//!     engine::MatchEngine,
//!     state::{MatchSetup, Participant, PlaySubmission, Team, ThrowType},
//!     store::InMemoryStore,
//! };
//!
//! # tokio_test_runtime(async {
//! let engine = MatchEngine::with_defaults(Arc::new(InMemoryStore::new()));
//!
//! let created = engine
//!     .create_match(MatchSetup::default(), Participant::player("host"))
//!     .await
//!     .unwrap();
//! engine
//!     .join_match(&created.room_code, Participant::player("guest"))
//!     .await
//!     .unwrap();
//! engine.start_match(&created.match_id, "host").await.unwrap();
//!
//! let outcome = engine
//!     .submit_play(&created.match_id, PlaySubmission::new("host", ThrowType::Goal, Team::One))
//!     .await
//!     .unwrap();
//! assert_eq!(outcome.scores.team1, 2);
//! # });
//! # fn tokio_test_runtime<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod rules;
pub mod state;
pub mod store;

pub use config::EngineConfig;
pub use engine::{MatchEngine, MatchSummary};
pub use error::{Action, EngineError, EngineResult, StoreError};
pub use rules::{compute_team_scores, PlayOutcome, TeamScores};
pub use state::*;
