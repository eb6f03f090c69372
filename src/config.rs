//! Engine configuration.

use serde::Deserialize;

/// Default number of applied plays kept on the live document.
pub const DEFAULT_RECENT_PLAYS_CAPACITY: usize = 10;

/// Default room code length.
pub const DEFAULT_ROOM_CODE_LENGTH: usize = 6;

/// Default number of draws before the allocator gives up.
pub const DEFAULT_ROOM_CODE_MAX_ATTEMPTS: u32 = 32;

/// Tunables for [`crate::engine::MatchEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Bound of the `recentPlays` ring buffer. Values below 1 are raised to 1.
    pub recent_plays_capacity: usize,
    pub room_code_length: usize,
    pub room_code_max_attempts: u32,
    /// End the match as soon as a play leaves a team at a winning score.
    pub auto_end_at_score_limit: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recent_plays_capacity: DEFAULT_RECENT_PLAYS_CAPACITY,
            room_code_length: DEFAULT_ROOM_CODE_LENGTH,
            room_code_max_attempts: DEFAULT_ROOM_CODE_MAX_ATTEMPTS,
            auto_end_at_score_limit: false,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(raw)?;
        Ok(config.normalized())
    }

    /// Clamp values that would make the engine misbehave.
    pub fn normalized(mut self) -> Self {
        self.recent_plays_capacity = self.recent_plays_capacity.max(1);
        self.room_code_length = self.room_code_length.max(4);
        self.room_code_max_attempts = self.room_code_max_attempts.max(1);
        self
    }
}
