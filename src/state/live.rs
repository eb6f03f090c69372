//! Live match data.
//!
//! One [`LiveMatchState`] exists per match once it has participants. It is
//! the only shared mutable thing in the engine and is rewritten as a whole
//! on every committed play or status change.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lifecycle::{InvalidTransition, MatchEvent, MatchStatus};
use super::play::RecordedPlay;
use super::player::{PlayerStats, Position, Team};
use crate::rules::scores::{compute_team_scores, TeamScores};

/// Points a sink is worth, fixed per match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SinkPoints {
    #[default]
    Three,
    Five,
}

impl SinkPoints {
    pub fn value(&self) -> u32 {
        match self {
            Self::Three => 3,
            Self::Five => 5,
        }
    }
}

impl TryFrom<u8> for SinkPoints {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            3 => Ok(Self::Three),
            5 => Ok(Self::Five),
            other => Err(format!("sink points must be 3 or 5, got {}", other)),
        }
    }
}

impl From<SinkPoints> for u8 {
    fn from(s: SinkPoints) -> Self {
        match s {
            SinkPoints::Three => 3,
            SinkPoints::Five => 5,
        }
    }
}

/// Per-match configuration, fixed once the match is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchSetup {
    pub score_limit: u32,
    pub win_by_two: bool,
    pub sink_points: SinkPoints,
    pub arena: String,
    pub team_names: [String; 2],
    pub player_names: [String; 4],
}

impl Default for MatchSetup {
    fn default() -> Self {
        Self {
            score_limit: 11,
            win_by_two: true,
            sink_points: SinkPoints::Three,
            arena: String::new(),
            team_names: ["Team 1".to_string(), "Team 2".to_string()],
            player_names: Position::ALL.map(|p| p.default_name()),
        }
    }
}

impl MatchSetup {
    pub fn team_name(&self, team: Team) -> &str {
        &self.team_names[team.index()]
    }

    /// The team that has won under these settings, if any.
    ///
    /// A team wins at or past the score limit; with win-by-two it must
    /// also lead by two.
    pub fn winner(&self, scores: TeamScores) -> Option<Team> {
        let leader = scores.leader()?;
        let lead_score = scores.get(leader);
        let trail_score = scores.get(leader.opponent());

        if lead_score < self.score_limit {
            return None;
        }
        if self.win_by_two && lead_score - trail_score < 2 {
            return None;
        }
        Some(leader)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    /// Created the match and controls its lifecycle
    Host,
    #[default]
    Player,
    /// Watches only, never seated
    Spectator,
}

/// Someone attached to a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: ParticipantRole,
}

impl Participant {
    pub fn new(identity: impl Into<String>, role: ParticipantRole) -> Self {
        Self {
            identity: identity.into(),
            display_name: None,
            role,
        }
    }

    pub fn player(identity: impl Into<String>) -> Self {
        Self::new(identity, ParticipantRole::Player)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn is_seatable(&self) -> bool {
        !matches!(self.role, ParticipantRole::Spectator)
    }
}

/// The persisted match row, as loaded from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    pub match_id: String,
    pub status: MatchStatus,
    pub setup: MatchSetup,
    pub room_code: String,
    pub participants: Vec<Participant>,
    pub created_at: DateTime<Utc>,
}

impl MatchConfig {
    pub fn new(match_id: String, room_code: String, setup: MatchSetup) -> Self {
        Self {
            match_id,
            status: MatchStatus::Waiting,
            setup,
            room_code,
            participants: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Participants that take a position, in join order.
    pub fn seatable(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_seatable())
    }
}

/// Canonical live data for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMatchState {
    /// Indexed by `Position::index`; always exactly four entries.
    player_stats: [PlayerStats; 4],
    player_map: BTreeMap<String, Position>,
    match_setup: MatchSetup,
    recent_plays: VecDeque<RecordedPlay>,
    status: MatchStatus,
    room_code: String,
    /// Bumped on every commit; the store rejects stale writes.
    version: u64,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    /// Team handed the match by a self-sink, whatever the scores say.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    forfeit_winner: Option<Team>,
}

impl LiveMatchState {
    /// Build fresh live data from a match row and its participants.
    ///
    /// The first seatable participant takes position 1, the next position 2,
    /// and so on. Positions nobody takes keep their slot identity and the
    /// name configured for them.
    pub fn initialize(config: &MatchConfig, participants: &[Participant]) -> Self {
        let mut state = Self {
            player_stats: Default::default(),
            player_map: BTreeMap::new(),
            match_setup: config.setup.clone(),
            recent_plays: VecDeque::new(),
            status: config.status,
            room_code: config.room_code.clone(),
            version: 0,
            started_at: None,
            ended_at: None,
            forfeit_winner: None,
        };
        state.reseat(participants);
        state
    }

    /// Seat participants that do not hold a position yet.
    ///
    /// Existing counters are never touched, so this is safe to call on a
    /// match already in play. Returns the newly assigned positions.
    pub fn reseat(&mut self, participants: &[Participant]) -> Vec<(String, Position)> {
        let mut seated = Vec::new();
        for participant in participants.iter().filter(|p| p.is_seatable()) {
            if let Some(position) = self.player_map.get(&participant.identity) {
                if let Some(name) = &participant.display_name {
                    self.match_setup.player_names[position.index()] = name.clone();
                }
                continue;
            }
            let Some(position) = self.first_open_position() else {
                break;
            };
            self.player_map.insert(participant.identity.clone(), position);
            if let Some(name) = &participant.display_name {
                self.match_setup.player_names[position.index()] = name.clone();
            }
            seated.push((participant.identity.clone(), position));
        }
        seated
    }

    fn first_open_position(&self) -> Option<Position> {
        Position::ALL
            .into_iter()
            .find(|p| !self.player_map.values().any(|taken| taken == p))
    }

    /// Identity seated at a position, or its slot identity when open.
    pub fn identity_at(&self, position: Position) -> String {
        self.player_map
            .iter()
            .find(|(_, p)| **p == position)
            .map(|(id, _)| id.clone())
            .unwrap_or_else(|| position.slot_identity())
    }

    pub fn position_of(&self, identity: &str) -> Option<Position> {
        self.player_map.get(identity).copied()
    }

    pub fn player_map(&self) -> &BTreeMap<String, Position> {
        &self.player_map
    }

    pub fn seated_count(&self) -> usize {
        self.player_map.len()
    }

    pub fn stats(&self, position: Position) -> &PlayerStats {
        &self.player_stats[position.index()]
    }

    pub(crate) fn stats_mut(&mut self, position: Position) -> &mut PlayerStats {
        &mut self.player_stats[position.index()]
    }

    /// All positions with their stats, in seating order.
    pub fn all_stats(&self) -> impl Iterator<Item = (Position, &PlayerStats)> {
        Position::ALL
            .into_iter()
            .map(move |p| (p, &self.player_stats[p.index()]))
    }

    pub fn player_name(&self, position: Position) -> &str {
        &self.match_setup.player_names[position.index()]
    }

    pub fn setup(&self) -> &MatchSetup {
        &self.match_setup
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn room_code(&self) -> &str {
        &self.room_code
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Move the status along, stamping start/end times.
    pub fn apply_event(&mut self, event: MatchEvent) -> Result<MatchStatus, InvalidTransition> {
        let next = self.status.transition(event)?;
        if next == MatchStatus::Active && self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        if next.is_terminal() {
            self.ended_at = Some(Utc::now());
        }
        self.status = next;
        Ok(next)
    }

    /// The winning team: a self-sink's beneficiary, else whoever the scores
    /// and setup say has won.
    pub fn winner(&self) -> Option<Team> {
        self.forfeit_winner.or_else(|| self.match_setup.winner(self.team_scores()))
    }

    pub fn forfeit_winner(&self) -> Option<Team> {
        self.forfeit_winner
    }

    pub(crate) fn record_forfeit(&mut self, winner: Team) {
        self.forfeit_winner = Some(winner);
    }

    /// Mark the next commit. Returns the version the store should see.
    pub(crate) fn bump_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    /// Append a play, dropping the oldest once `capacity` is exceeded.
    pub(crate) fn record_play(&mut self, play: RecordedPlay, capacity: usize) {
        self.recent_plays.push_back(play);
        while self.recent_plays.len() > capacity.max(1) {
            self.recent_plays.pop_front();
        }
    }

    /// Applied plays, oldest first.
    pub fn recent_plays(&self) -> impl Iterator<Item = &RecordedPlay> {
        self.recent_plays.iter()
    }

    pub fn latest_play(&self) -> Option<&RecordedPlay> {
        self.recent_plays.back()
    }

    /// Team totals, always derived from the player scores.
    pub fn team_scores(&self) -> TeamScores {
        compute_team_scores(self)
    }

    /// Convert to a JSON snapshot for clients.
    pub fn to_json(&self) -> serde_json::Value {
        let scores = self.team_scores();
        let players: Vec<serde_json::Value> = self
            .all_stats()
            .map(|(position, stats)| {
                serde_json::json!({
                    "position": position.number(),
                    "team": position.team().as_str(),
                    "identity": self.identity_at(position),
                    "name": self.player_name(position),
                    "score": stats.score,
                    "hitStreak": stats.hit_streak,
                    "currentlyOnFire": stats.currently_on_fire
                })
            })
            .collect();

        serde_json::json!({
            "status": self.status.as_str(),
            "roomCode": self.room_code,
            "version": self.version,
            "arena": self.match_setup.arena,
            "teamNames": self.match_setup.team_names,
            "teamScores": scores,
            "winner": self.winner().map(|t| t.as_str()),
            "players": players,
            "latestPlay": self.latest_play()
        })
    }
}

impl fmt::Display for LiveMatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scores = self.team_scores();
        write!(
            f,
            "{} {} - {} {} ({})",
            self.match_setup.team_name(Team::One),
            scores.team1,
            scores.team2,
            self.match_setup.team_name(Team::Two),
            self.status
        )
    }
}

/// Build fresh live data for a match.
pub fn initialize_live_match_state(
    config: &MatchConfig,
    participants: &[Participant],
) -> LiveMatchState {
    LiveMatchState::initialize(config, participants)
}
