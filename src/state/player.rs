//! Positions, teams and per-player counters.
//!
//! A match always has four positions. Positions 1 and 2 play for team 1,
//! positions 3 and 4 for team 2. The mapping lives in [`Position::team`]
//! and nowhere else.
//!
//! ```text
//!        Team1                Team2
//!   ┌────────────┐      ┌────────────┐
//!   │  1  │  2   │  vs  │  3  │  4   │
//!   └────────────┘      └────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix of the synthetic identity held by an unfilled position.
pub const SLOT_IDENTITY_PREFIX: &str = "slot-";

/// One of the four fixed player slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Position {
    One,
    Two,
    Three,
    Four,
}

impl Position {
    /// All positions in seating order.
    pub const ALL: [Position; 4] = [Self::One, Self::Two, Self::Three, Self::Four];

    /// Build a position from its 1-based number.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    /// 1-based position number.
    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// 0-based index into per-position arrays.
    pub fn index(&self) -> usize {
        usize::from(self.number() - 1)
    }

    /// The team this position plays for.
    pub fn team(&self) -> Team {
        match self {
            Self::One | Self::Two => Team::One,
            Self::Three | Self::Four => Team::Two,
        }
    }

    /// Synthetic identity used while nobody occupies this position.
    pub fn slot_identity(&self) -> String {
        format!("{}{}", SLOT_IDENTITY_PREFIX, self.number())
    }

    /// Display name used until a participant supplies one.
    pub fn default_name(&self) -> String {
        format!("Player {}", self.number())
    }
}

impl TryFrom<u8> for Position {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_number(n).ok_or_else(|| format!("position must be 1..=4, got {}", n))
    }
}

impl From<Position> for u8 {
    fn from(p: Position) -> Self {
        p.number()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// One side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "team1")]
    One,
    #[serde(rename = "team2")]
    Two,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::One => "team1",
            Self::Two => "team2",
        }
    }

    pub fn opponent(&self) -> Team {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Positions belonging to this team.
    pub fn positions(&self) -> [Position; 2] {
        match self {
            Self::One => [Position::One, Position::Two],
            Self::Two => [Position::Three, Position::Four],
        }
    }

    /// 0-based index into per-team arrays.
    pub fn index(&self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player identity resolved at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerRef {
    /// A participant seated through the player map.
    Registered { identity: String, position: Position },
    /// A position nobody has claimed yet, addressed by its slot identity.
    UnregisteredSlot(Position),
}

/// Why an identity could not be turned into a [`PlayerRef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefError {
    /// Not in the player map and not a slot identity.
    Unknown,
    /// Looks like a slot identity but names no valid position.
    MalformedSlot,
}

impl PlayerRef {
    /// Resolve an identity against a player map.
    ///
    /// Registered identities win over the slot pattern, so a participant
    /// whose identity happens to start with the prefix still resolves to
    /// the seat they actually hold. A slot identity only addresses an open
    /// position; once someone holds it, the slot identity is `Unknown`.
    pub fn resolve(
        identity: &str,
        player_map: &BTreeMap<String, Position>,
    ) -> Result<Self, RefError> {
        if let Some(position) = player_map.get(identity) {
            return Ok(Self::Registered {
                identity: identity.to_string(),
                position: *position,
            });
        }

        let Some(rest) = identity.strip_prefix(SLOT_IDENTITY_PREFIX) else {
            return Err(RefError::Unknown);
        };

        let position = rest
            .parse::<u8>()
            .ok()
            .and_then(Position::from_number)
            .ok_or(RefError::MalformedSlot)?;

        if player_map.values().any(|taken| *taken == position) {
            return Err(RefError::Unknown);
        }
        Ok(Self::UnregisteredSlot(position))
    }

    pub fn position(&self) -> Position {
        match self {
            Self::Registered { position, .. } => *position,
            Self::UnregisteredSlot(position) => *position,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }
}

/// Counters and streak state for one position.
///
/// Every counter is unsigned, so non-negativity holds by construction;
/// the only decrementing path (`score`) goes through saturating math.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStats {
    // Throws
    pub throws: u32,
    pub hits: u32,
    pub table_die: u32,
    pub line: u32,
    pub hit: u32,
    pub knicker: u32,
    pub goal: u32,
    pub dink: u32,
    pub sink: u32,
    pub short: u32,
    pub long: u32,
    pub side: u32,
    pub height: u32,
    pub special_throws: u32,
    pub line_throws: u32,

    // Defense
    pub catches: u32,
    pub catch_plus_aura: u32,
    pub drop: u32,
    pub miss: u32,
    pub two_hands: u32,
    pub body: u32,

    // Kicks
    pub fifa_attempts: u32,
    pub fifa_success: u32,
    pub good_kick: u32,
    pub bad_kick: u32,

    pub blunders: u32,
    pub aura: u32,

    pub hit_streak: u32,
    pub currently_on_fire: bool,
    pub on_fire_count: u32,

    pub score: u32,
}

impl PlayerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add points to the score.
    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Remove points from the score, stopping at zero.
    pub fn penalize(&mut self, points: u32) {
        self.score = self.score.saturating_sub(points);
    }

    /// Extend the hit streak. Returns true when this throw lit the player up.
    pub fn extend_streak(&mut self) -> bool {
        self.hit_streak += 1;
        if self.hit_streak == 3 {
            self.currently_on_fire = true;
            self.on_fire_count += 1;
            return true;
        }
        false
    }

    pub fn break_streak(&mut self) {
        self.hit_streak = 0;
        self.currently_on_fire = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, Position)]) -> BTreeMap<String, Position> {
        entries.iter().map(|(id, p)| (id.to_string(), *p)).collect()
    }

    #[test]
    fn test_team_derivation() {
        assert_eq!(Position::One.team(), Team::One);
        assert_eq!(Position::Two.team(), Team::One);
        assert_eq!(Position::Three.team(), Team::Two);
        assert_eq!(Position::Four.team(), Team::Two);

        for team in [Team::One, Team::Two] {
            for p in team.positions() {
                assert_eq!(p.team(), team);
            }
            assert_eq!(team.opponent().opponent(), team);
        }
    }

    #[test]
    fn test_position_numbers() {
        for (i, p) in Position::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
            assert_eq!(Position::from_number(p.number()), Some(*p));
        }
        assert_eq!(Position::from_number(0), None);
        assert_eq!(Position::from_number(5), None);
        assert_eq!(Position::Three.slot_identity(), "slot-3");
    }

    #[test]
    fn test_position_serde_as_number() {
        let json = serde_json::to_string(&Position::Four).unwrap();
        assert_eq!(json, "4");
        let back: Position = serde_json::from_str("2").unwrap();
        assert_eq!(back, Position::Two);
        assert!(serde_json::from_str::<Position>("7").is_err());
    }

    #[test]
    fn test_resolve_registered() {
        let m = map(&[("alice", Position::Two)]);
        let r = PlayerRef::resolve("alice", &m).unwrap();
        assert!(r.is_registered());
        assert_eq!(r.position(), Position::Two);
    }

    #[test]
    fn test_resolve_slot() {
        let m = map(&[]);
        assert_eq!(
            PlayerRef::resolve("slot-4", &m),
            Ok(PlayerRef::UnregisteredSlot(Position::Four))
        );
        assert_eq!(PlayerRef::resolve("slot-9", &m), Err(RefError::MalformedSlot));
        assert_eq!(PlayerRef::resolve("slot-x", &m), Err(RefError::MalformedSlot));
        assert_eq!(PlayerRef::resolve("bob", &m), Err(RefError::Unknown));
    }

    #[test]
    fn test_slot_of_seated_position_is_unknown() {
        let m = map(&[("alice", Position::One)]);
        assert_eq!(PlayerRef::resolve("slot-1", &m), Err(RefError::Unknown));
        assert_eq!(
            PlayerRef::resolve("slot-2", &m),
            Ok(PlayerRef::UnregisteredSlot(Position::Two))
        );
    }

    #[test]
    fn test_streak_ignites_once() {
        let mut stats = PlayerStats::new();
        assert!(!stats.extend_streak());
        assert!(!stats.extend_streak());
        assert!(stats.extend_streak());
        assert!(stats.currently_on_fire);
        assert!(!stats.extend_streak());
        assert!(!stats.extend_streak());
        assert_eq!(stats.on_fire_count, 1);

        stats.break_streak();
        assert_eq!(stats.hit_streak, 0);
        assert!(!stats.currently_on_fire);
        assert_eq!(stats.on_fire_count, 1);
    }

    #[test]
    fn test_penalize_clamps() {
        let mut stats = PlayerStats::new();
        stats.award(1);
        stats.penalize(3);
        assert_eq!(stats.score, 0);
    }

    #[test]
    fn test_stats_camel_case() {
        let json = serde_json::to_value(PlayerStats::new()).unwrap();
        assert!(json.get("hitStreak").is_some());
        assert!(json.get("catchPlusAura").is_some());
        assert!(json.get("tableDie").is_some());
    }
}
