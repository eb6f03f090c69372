//! Match engine.
//!
//! Owns the read-modify-write cycle for every match: load the live
//! document, run the rules, write the result back. Mutations of one match
//! are serialized through a per-match async mutex so two clients submitting
//! at once cannot both build on the same base state. The store's version
//! check backs this up for writers that bypass the engine.
//!
//! Reads do not take the lock and may trail an in-flight mutation.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{Action, EngineError, EngineResult, StoreError};
use crate::rules::{self, PlayOptions, PlayOutcome, TeamScores};
use crate::state::lifecycle::{MatchEvent, MatchStatus};
use crate::state::live::{LiveMatchState, MatchConfig, MatchSetup, Participant, ParticipantRole};
use crate::state::play::PlaySubmission;
use crate::state::player::{Position, Team};
use crate::state::room_code::RoomCodeAllocator;
use crate::store::MatchStore;

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub status: MatchStatus,
    pub scores: TeamScores,
    pub winner: Option<Team>,
}

impl MatchSummary {
    fn of(state: &LiveMatchState) -> Self {
        Self {
            status: state.status(),
            scores: state.team_scores(),
            winner: state.winner(),
        }
    }
}

pub struct MatchEngine<S> {
    store: Arc<S>,
    config: EngineConfig,
    /// Match ID to its mutation lock
    locks: DashMap<String, Arc<Mutex<()>>>,
    room_codes: Mutex<RoomCodeAllocator>,
}

impl<S: MatchStore> std::fmt::Debug for MatchEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("config", &self.config)
            .field("locked_matches", &self.locked_match_count())
            .finish_non_exhaustive()
    }
}

impl<S: MatchStore> MatchEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let config = config.normalized();
        let room_codes =
            RoomCodeAllocator::new(config.room_code_length, config.room_code_max_attempts);
        Self {
            store,
            config,
            locks: DashMap::new(),
            room_codes: Mutex::new(room_codes),
        }
    }

    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, EngineConfig::default())
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Matches with a mutation running or queued.
    pub fn locked_match_count(&self) -> usize {
        self.locks.len()
    }

    /// Run `op` holding the match's mutation lock.
    ///
    /// The lock entry is dropped from the map once nobody holds or waits on
    /// it, so unknown and finished matches do not accumulate entries.
    async fn serialized<T, F, Fut>(&self, match_id: &str, op: F) -> EngineResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EngineResult<T>>,
    {
        let lock = self
            .locks
            .entry(match_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().await;
            op().await
        };

        drop(lock);
        // Entry and clone happen under the same shard lock, so a count of one
        // means no other caller holds or awaits this mutex.
        self.locks.remove_if(match_id, |_, l| Arc::strong_count(l) == 1);
        result
    }

    fn play_options(&self) -> PlayOptions {
        PlayOptions {
            recent_plays_capacity: self.config.recent_plays_capacity,
            auto_end_at_score_limit: self.config.auto_end_at_score_limit,
        }
    }

    fn store_error(
        match_id: &str,
        action: Action,
    ) -> impl FnOnce(StoreError) -> EngineError + '_ {
        move |e| {
            warn!(match_id, action = %action, error = %e, "Store operation failed");
            EngineError::persistence(match_id, action, e)
        }
    }

    async fn require_config(&self, match_id: &str, action: Action) -> EngineResult<MatchConfig> {
        self.store
            .load_match_config(match_id)
            .await
            .map_err(Self::store_error(match_id, action))?
            .ok_or_else(|| EngineError::not_found(match_id, action))
    }

    async fn commit(
        &self,
        match_id: &str,
        action: Action,
        state: &LiveMatchState,
    ) -> EngineResult<()> {
        self.store
            .persist_live_state(match_id, state)
            .await
            .map_err(Self::store_error(match_id, action))?;

        if state.status().is_terminal() {
            self.room_codes.lock().await.release(state.room_code());
            info!(match_id, status = %state.status(), "Match retired");
        }
        Ok(())
    }

    /// Fill in missing display names from the directory.
    async fn named(&self, participants: Vec<Participant>) -> Vec<Participant> {
        let mut out = Vec::with_capacity(participants.len());
        for mut p in participants {
            if p.display_name.is_none() {
                p.display_name = self.store.lookup_display_name(&p.identity).await;
            }
            out.push(p);
        }
        out
    }

    /// Live data for a match, built or re-seated from its participants.
    ///
    /// The caller must hold the match lock. Existing counters survive.
    async fn build_live(
        &self,
        config: &MatchConfig,
        action: Action,
    ) -> EngineResult<LiveMatchState> {
        let match_id = config.match_id.as_str();
        let participants = self
            .store
            .load_participants(match_id)
            .await
            .map_err(Self::store_error(match_id, action))?;
        let participants = self.named(participants).await;

        let existing = self
            .store
            .load_live_state(match_id)
            .await
            .map_err(Self::store_error(match_id, action))?;

        Ok(match existing {
            Some(mut live) => {
                let seated = live.reseat(&participants);
                if !seated.is_empty() {
                    debug!(match_id, seated = ?seated, "Re-seated live match");
                }
                live
            }
            None => LiveMatchState::initialize(config, &participants),
        })
    }

    /// Create a match with a fresh room code. The host is its first participant.
    pub async fn create_match(
        &self,
        setup: MatchSetup,
        host: Participant,
    ) -> EngineResult<MatchConfig> {
        let match_id = Uuid::new_v4().to_string();
        let room_code = self
            .room_codes
            .lock()
            .await
            .allocate(&match_id)
            .map_err(|e| EngineError::RoomCodesExhausted {
                attempts: e.attempts,
                action: Action::Create,
            })?;

        let mut config = MatchConfig::new(match_id.clone(), room_code.clone(), setup);
        config.participants.push(Participant {
            role: ParticipantRole::Host,
            ..host
        });

        if let Err(e) = self.store.insert_match(config.clone()).await {
            self.room_codes.lock().await.release(&room_code);
            return Err(Self::store_error(&match_id, Action::Create)(e));
        }

        info!(match_id = %match_id, room_code = %room_code, "Match created");
        Ok(config)
    }

    /// Join a match by room code.
    ///
    /// Returns the position taken, or `None` for spectators. Joining twice
    /// returns the seat already held. Only [`Self::create_match`] makes a
    /// host; a joiner asking for the role joins as a player.
    pub async fn join_match(
        &self,
        room_code: &str,
        participant: Participant,
    ) -> EngineResult<Option<Position>> {
        let action = Action::Join;
        let match_id = self
            .room_codes
            .lock()
            .await
            .lookup(room_code)
            .map(str::to_string)
            .ok_or_else(|| EngineError::RoomCodeNotFound {
                code: room_code.to_string(),
                action,
            })?;

        let participant = match participant.role {
            ParticipantRole::Host => {
                warn!(
                    match_id = %match_id,
                    identity = %participant.identity,
                    "Host role requested on join, seating as player"
                );
                Participant {
                    role: ParticipantRole::Player,
                    ..participant
                }
            }
            _ => participant,
        };

        self.serialized(&match_id, || self.join_locked(&match_id, participant)).await
    }

    async fn join_locked(
        &self,
        match_id: &str,
        participant: Participant,
    ) -> EngineResult<Option<Position>> {
        let action = Action::Join;
        let config = self.require_config(match_id, action).await?;
        if config.status.is_terminal() {
            return Err(EngineError::InactiveMatch {
                match_id: match_id.to_string(),
                action,
                status: config.status,
            });
        }

        let current = self
            .store
            .load_live_state(match_id)
            .await
            .map_err(Self::store_error(match_id, action))?;
        let held = current
            .as_ref()
            .and_then(|l| l.position_of(&participant.identity));
        if let Some(position) = held {
            return Ok(Some(position));
        }

        let already_listed = config
            .participants
            .iter()
            .any(|p| p.identity == participant.identity);
        let seated = current
            .as_ref()
            .map_or_else(|| config.seatable().count(), |l| l.seated_count());
        if participant.is_seatable() && !already_listed && seated >= Position::ALL.len() {
            return Err(EngineError::MatchFull {
                match_id: match_id.to_string(),
                action,
            });
        }

        self.store
            .add_participant(match_id, participant.clone())
            .await
            .map_err(Self::store_error(match_id, action))?;

        let mut live = self.build_live(&config, action).await?;
        live.bump_version();
        self.commit(match_id, action, &live).await?;

        let position = live.position_of(&participant.identity);
        info!(
            match_id,
            identity = %participant.identity,
            position = ?position,
            "Participant joined"
        );
        Ok(position)
    }

    /// Build (or re-seat) the live data for a match from its participants.
    pub async fn initialize_live_match_state(
        &self,
        match_id: &str,
    ) -> EngineResult<LiveMatchState> {
        self.serialized(match_id, || self.initialize_locked(match_id)).await
    }

    async fn initialize_locked(&self, match_id: &str) -> EngineResult<LiveMatchState> {
        let action = Action::Initialize;
        let config = self.require_config(match_id, action).await?;
        let mut live = self.build_live(&config, action).await?;
        live.bump_version();
        self.commit(match_id, action, &live).await?;
        Ok(live)
    }

    /// Apply one play. A rejected or unpersisted play leaves the match as it was.
    pub async fn submit_play(
        &self,
        match_id: &str,
        play: PlaySubmission,
    ) -> EngineResult<PlayOutcome> {
        self.serialized(match_id, || self.submit_locked(match_id, &play)).await
    }

    async fn submit_locked(
        &self,
        match_id: &str,
        play: &PlaySubmission,
    ) -> EngineResult<PlayOutcome> {
        let action = Action::SubmitPlay;
        let current = self
            .store
            .load_live_state(match_id)
            .await
            .map_err(Self::store_error(match_id, action))?;

        let Some(current) = current else {
            let config = self.require_config(match_id, action).await?;
            return Err(EngineError::InactiveMatch {
                match_id: match_id.to_string(),
                action,
                status: config.status,
            });
        };

        let (next, outcome) = rules::apply_play(&current, play, self.play_options())
            .map_err(|r| EngineError::from_rejection(match_id, action, r))?;

        self.commit(match_id, action, &next).await?;

        debug!(
            match_id,
            thrower = %play.thrower,
            throw_type = play.throw_type.as_str(),
            points = outcome.points,
            version = outcome.version,
            team1 = outcome.scores.team1,
            team2 = outcome.scores.team2,
            "Play committed"
        );
        Ok(outcome)
    }

    /// Latest committed live data. `None` while the match has none yet.
    pub async fn get_live_match_state(
        &self,
        match_id: &str,
    ) -> EngineResult<Option<LiveMatchState>> {
        let action = Action::GetLiveState;
        let live = self
            .store
            .load_live_state(match_id)
            .await
            .map_err(Self::store_error(match_id, action))?;
        if live.is_some() {
            return Ok(live);
        }
        self.require_config(match_id, action).await?;
        Ok(None)
    }

    pub fn compute_team_scores(state: &LiveMatchState) -> TeamScores {
        rules::compute_team_scores(state)
    }

    async fn transition(
        &self,
        match_id: &str,
        actor: &str,
        action: Action,
        event: MatchEvent,
    ) -> EngineResult<LiveMatchState> {
        self.serialized(match_id, || {
            self.transition_locked(match_id, actor, action, event)
        })
        .await
    }

    async fn transition_locked(
        &self,
        match_id: &str,
        actor: &str,
        action: Action,
        event: MatchEvent,
    ) -> EngineResult<LiveMatchState> {
        let config = self.require_config(match_id, action).await?;
        let allowed = self
            .store
            .is_controller(match_id, actor)
            .await
            .map_err(Self::store_error(match_id, action))?;
        if !allowed {
            return Err(EngineError::NotAuthorized {
                match_id: match_id.to_string(),
                action,
                identity: actor.to_string(),
            });
        }

        let mut live = self.build_live(&config, action).await?;
        let from = live.status();
        live.apply_event(event)
            .map_err(|source| EngineError::InvalidTransition {
                match_id: match_id.to_string(),
                action,
                source,
            })?;
        live.bump_version();
        self.commit(match_id, action, &live).await?;

        info!(match_id, from = %from, to = %live.status(), actor, "Match status changed");
        Ok(live)
    }

    pub async fn start_match(&self, match_id: &str, actor: &str) -> EngineResult<LiveMatchState> {
        self.transition(match_id, actor, Action::Start, MatchEvent::Start)
            .await
    }

    pub async fn pause_match(&self, match_id: &str, actor: &str) -> EngineResult<LiveMatchState> {
        self.transition(match_id, actor, Action::Pause, MatchEvent::Pause)
            .await
    }

    pub async fn resume_match(&self, match_id: &str, actor: &str) -> EngineResult<LiveMatchState> {
        self.transition(match_id, actor, Action::Resume, MatchEvent::Resume)
            .await
    }

    pub async fn end_match(&self, match_id: &str, actor: &str) -> EngineResult<MatchSummary> {
        let live = self
            .transition(match_id, actor, Action::End, MatchEvent::End)
            .await?;
        Ok(MatchSummary::of(&live))
    }

    pub async fn abandon_match(&self, match_id: &str, actor: &str) -> EngineResult<MatchSummary> {
        let live = self
            .transition(match_id, actor, Action::Abandon, MatchEvent::Abandon)
            .await?;
        Ok(MatchSummary::of(&live))
    }
}
