//! Counter and streak updates for a resolved play.

use tracing::debug;

use super::resolver::Resolution;
use crate::state::live::LiveMatchState;
use crate::state::play::{DefenseType, KickKind, ThrowType};
use crate::state::player::PlayerStats;

/// Side facts the caller may want to log or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accumulated {
    /// The thrower reached a streak of three on this play.
    pub ignited: bool,
}

fn count_throw(stats: &mut PlayerStats, throw_type: ThrowType) {
    stats.throws += 1;
    match throw_type {
        ThrowType::Table => stats.table_die += 1,
        ThrowType::Line => {
            stats.line += 1;
            stats.line_throws += 1;
        }
        ThrowType::Hit => {
            stats.hit += 1;
            stats.hits += 1;
        }
        ThrowType::Knicker => {
            stats.knicker += 1;
            stats.hits += 1;
            stats.special_throws += 1;
        }
        ThrowType::Goal => {
            stats.goal += 1;
            stats.hits += 1;
        }
        ThrowType::Dink => {
            stats.dink += 1;
            stats.hits += 1;
            stats.special_throws += 1;
        }
        ThrowType::Sink => {
            stats.sink += 1;
            stats.hits += 1;
            stats.special_throws += 1;
        }
        ThrowType::Short => {
            stats.short += 1;
            stats.blunders += 1;
        }
        ThrowType::Long => {
            stats.long += 1;
            stats.blunders += 1;
        }
        ThrowType::Side => {
            stats.side += 1;
            stats.blunders += 1;
        }
        ThrowType::Height => {
            stats.height += 1;
            stats.blunders += 1;
        }
        ThrowType::SelfSink | ThrowType::FifaSave => {}
    }
}

fn count_defense(stats: &mut PlayerStats, defense: DefenseType) {
    match defense {
        DefenseType::Catch => stats.catches += 1,
        DefenseType::CatchPlusAura => {
            stats.catch_plus_aura += 1;
            stats.catches += 1;
            stats.aura += 1;
        }
        DefenseType::Drop => {
            stats.drop += 1;
            stats.blunders += 1;
        }
        DefenseType::Miss => {
            stats.miss += 1;
            stats.blunders += 1;
        }
        DefenseType::TwoHands => {
            stats.two_hands += 1;
            stats.blunders += 1;
        }
        DefenseType::Body => {
            stats.body += 1;
            stats.blunders += 1;
        }
    }
}

/// Apply a resolved play to the state.
///
/// Order: thrower counters and streak, thrower points, defenders, the
/// thrower's kick, FIFA save, self-sink, redemption. Self-sink before
/// redemption means a submission carrying both leaves the winners one
/// point short of the limit.
pub fn apply_resolution(state: &mut LiveMatchState, res: &Resolution) -> Accumulated {
    let mut out = Accumulated::default();

    {
        let thrower = state.stats_mut(res.thrower);
        count_throw(thrower, res.throw_type);

        if res.throw_type.is_good() {
            out.ignited = thrower.extend_streak();
        } else if res.throw_type.breaks_streak() {
            thrower.break_streak();
        }

        if res.points > 0 {
            thrower.award(res.points);
        }

        if let Some(kick) = res.kick {
            thrower.fifa_attempts += 1;
            match kick.kind {
                KickKind::GoodKick => thrower.good_kick += 1,
                KickKind::BadKick => thrower.bad_kick += 1,
            }
            if kick.success {
                thrower.fifa_success += 1;
            }
        }
    }

    if let Some(defense) = res.defense {
        for position in &res.defenders {
            count_defense(state.stats_mut(*position), defense);
        }
    }

    if res.fifa_save {
        for position in &res.defenders {
            let defender = state.stats_mut(*position);
            defender.award(1);
            defender.fifa_success += 1;
        }
        debug!(defenders = res.defenders.len(), "FIFA save awarded");
    }

    if let Some(winner) = res.self_sink_winner {
        let limit = state.setup().score_limit;
        for position in winner.positions() {
            state.stats_mut(position).score = limit;
        }
    }

    if let Some(team) = res.redemption_penalty {
        for position in team.positions() {
            state.stats_mut(position).penalize(1);
        }
        debug!(penalized = %team, "Redemption penalty applied");
    }

    out
}
