//! Status changes driven by plays rather than by explicit requests.

use tracing::info;

use super::resolver::Resolution;
use crate::state::lifecycle::MatchEvent;
use crate::state::live::LiveMatchState;

/// Look at the state a play produced and end the match if it should end.
///
/// A self-sink always ends the match. Reaching a winning score only ends
/// it when `auto_end` is set; otherwise the winner is reported and an
/// explicit end is expected.
pub fn settle(state: &mut LiveMatchState, res: &Resolution, auto_end: bool) -> Option<MatchEvent> {
    let event = if let Some(winner) = res.self_sink_winner {
        state.record_forfeit(winner);
        MatchEvent::SelfSink
    } else if auto_end && state.setup().winner(state.team_scores()).is_some() {
        MatchEvent::End
    } else {
        return None;
    };

    let next = state.apply_event(event).ok()?;
    info!(
        event = ?event,
        status = %next,
        winner = ?state.winner(),
        "Play ended the match"
    );
    Some(event)
}
