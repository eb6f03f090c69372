//! Team score aggregation.
//!
//! Team totals are never stored. They are summed from the player scores
//! every time they are asked for, so they cannot drift from the counters
//! a play actually touched.

use serde::{Deserialize, Serialize};

use crate::state::live::LiveMatchState;
use crate::state::player::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamScores {
    pub team1: u32,
    pub team2: u32,
}

impl TeamScores {
    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::One => self.team1,
            Team::Two => self.team2,
        }
    }

    /// The team ahead, or `None` on a tie.
    pub fn leader(&self) -> Option<Team> {
        match self.team1.cmp(&self.team2) {
            std::cmp::Ordering::Greater => Some(Team::One),
            std::cmp::Ordering::Less => Some(Team::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Sum of the scores of a team's two positions.
pub fn team_score(state: &LiveMatchState, team: Team) -> u32 {
    team.positions().iter().map(|p| state.stats(*p).score).sum()
}

pub fn compute_team_scores(state: &LiveMatchState) -> TeamScores {
    TeamScores {
        team1: team_score(state, Team::One),
        team2: team_score(state, Team::Two),
    }
}
