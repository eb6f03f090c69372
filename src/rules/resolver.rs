//! Play resolution.
//!
//! Turns a submission into the points it is worth and the special
//! mechanics it triggers, without touching the state. All mechanics are
//! judged against the same submission and any number of them may fire.

use tracing::warn;

use super::PlayRejection;
use crate::state::live::LiveMatchState;
use crate::state::play::{DefenseType, FifaAction, PlaySubmission, ThrowType};
use crate::state::player::{PlayerRef, Position, RefError, Team};

/// What a play does, decided up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub thrower: Position,
    pub throw_type: ThrowType,
    /// Points the thrower earns from this play.
    pub points: u32,
    /// Defenders that resolved to a position, deduplicated, in submission order.
    pub defenders: Vec<Position>,
    pub defense: Option<DefenseType>,
    pub kick: Option<FifaAction>,
    /// Every defender earns a point and a FIFA success.
    pub fifa_save: bool,
    /// Team handed the win by a self-sink.
    pub self_sink_winner: Option<Team>,
    /// Team losing a point to a redemption.
    pub redemption_penalty: Option<Team>,
}

/// Points a throw is worth before any defense or special mechanic.
pub fn base_points(throw_type: ThrowType, sink_points: u32) -> u32 {
    match throw_type {
        ThrowType::Hit | ThrowType::Knicker => 1,
        ThrowType::Goal | ThrowType::Dink => 2,
        ThrowType::Sink => sink_points,
        ThrowType::FifaSave => 1,
        ThrowType::Table
        | ThrowType::Line
        | ThrowType::Short
        | ThrowType::Long
        | ThrowType::Side
        | ThrowType::Height
        | ThrowType::SelfSink => 0,
    }
}

/// Resolve the thrower's identity to a position.
pub fn resolve_thrower(
    play: &PlaySubmission,
    state: &LiveMatchState,
) -> Result<Position, PlayRejection> {
    match PlayerRef::resolve(&play.thrower, state.player_map()) {
        Ok(r) => Ok(r.position()),
        Err(RefError::Unknown) => Err(PlayRejection::UnresolvedThrower(play.thrower.clone())),
        Err(RefError::MalformedSlot) => {
            Err(PlayRejection::MalformedSlotIdentity(play.thrower.clone()))
        }
    }
}

fn resolve_defenders(play: &PlaySubmission, state: &LiveMatchState) -> Vec<Position> {
    let mut positions = Vec::with_capacity(play.defenders.len());
    for identity in &play.defenders {
        match PlayerRef::resolve(identity, state.player_map()) {
            Ok(r) if !positions.contains(&r.position()) => positions.push(r.position()),
            Ok(_) => {}
            Err(e) => warn!(defender = %identity, reason = ?e, "Skipping unresolvable defender"),
        }
    }
    positions
}

/// Decide points and mechanics for a play against the current state.
pub fn resolve_play(
    play: &PlaySubmission,
    state: &LiveMatchState,
) -> Result<Resolution, PlayRejection> {
    let thrower = resolve_thrower(play, state)?;
    let defenders = resolve_defenders(play, state);
    let thrower_team = thrower.team();

    if play.team != thrower_team {
        warn!(
            thrower = %play.thrower,
            reported = %play.team,
            seated = %thrower_team,
            "Submitted team disagrees with seat, scoring by seat"
        );
    }

    let defended = play.defense_type.is_some_and(|d| d.is_successful());

    let mut points = base_points(play.throw_type, state.setup().sink_points.value());
    if defended {
        points = 0;
    }

    let fifa_save =
        play.throw_type.is_bad() && play.fifa_action.is_some() && defended && !defenders.is_empty();

    let self_sink_winner =
        (play.throw_type == ThrowType::SelfSink).then(|| thrower_team.opponent());

    let redeemed = play.redemption.as_ref().is_some_and(|r| r.is_success());
    if redeemed {
        points = 0;
    }
    let redemption_penalty = redeemed.then(|| thrower_team.opponent());

    Ok(Resolution {
        thrower,
        throw_type: play.throw_type,
        points,
        defenders,
        defense: play.defense_type,
        kick: play.fifa_action,
        fifa_save,
        self_sink_winner,
        redemption_penalty,
    })
}
