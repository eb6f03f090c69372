//! Play submissions and the record kept of applied plays.

use serde::{Deserialize, Serialize};

use super::player::{Position, Team};

/// What the thrower did with the die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrowType {
    Table,
    Line,
    Hit,
    Knicker,
    Goal,
    Dink,
    Sink,
    Short,
    Long,
    Side,
    Height,
    SelfSink,
    FifaSave,
}

impl ThrowType {
    pub const ALL: [ThrowType; 13] = [
        Self::Table,
        Self::Line,
        Self::Hit,
        Self::Knicker,
        Self::Goal,
        Self::Dink,
        Self::Sink,
        Self::Short,
        Self::Long,
        Self::Side,
        Self::Height,
        Self::SelfSink,
        Self::FifaSave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Line => "line",
            Self::Hit => "hit",
            Self::Knicker => "knicker",
            Self::Goal => "goal",
            Self::Dink => "dink",
            Self::Sink => "sink",
            Self::Short => "short",
            Self::Long => "long",
            Self::Side => "side",
            Self::Height => "height",
            Self::SelfSink => "self_sink",
            Self::FifaSave => "fifa_save",
        }
    }

    /// Throws that extend a hit streak.
    pub fn is_good(&self) -> bool {
        matches!(
            self,
            Self::Hit | Self::Knicker | Self::Goal | Self::Dink | Self::Sink
        )
    }

    /// Misses. These count as blunders and can open a FIFA save.
    pub fn is_bad(&self) -> bool {
        matches!(self, Self::Short | Self::Long | Self::Side | Self::Height)
    }

    /// Throws that reset a hit streak: every miss, plus landing on the line.
    pub fn breaks_streak(&self) -> bool {
        self.is_bad() || matches!(self, Self::Line)
    }
}

/// How a defender handled the throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseType {
    Catch,
    CatchPlusAura,
    Drop,
    Miss,
    TwoHands,
    Body,
}

impl DefenseType {
    pub const ALL: [DefenseType; 6] = [
        Self::Catch,
        Self::CatchPlusAura,
        Self::Drop,
        Self::Miss,
        Self::TwoHands,
        Self::Body,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catch => "catch",
            Self::CatchPlusAura => "catch_plus_aura",
            Self::Drop => "drop",
            Self::Miss => "miss",
            Self::TwoHands => "two_hands",
            Self::Body => "body",
        }
    }

    /// A defense that negates the throw.
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Catch | Self::CatchPlusAura)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KickKind {
    GoodKick,
    BadKick,
}

/// A kick attempted by the thrower after a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FifaAction {
    pub kind: KickKind,
    #[serde(default)]
    pub success: bool,
}

impl FifaAction {
    pub fn new(kind: KickKind) -> Self {
        Self {
            kind,
            success: false,
        }
    }

    pub fn successful(mut self) -> Self {
        self.success = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl Redemption {
    pub fn succeeded() -> Self {
        Self {
            target_identity: None,
            success: Some(true),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }
}

/// A single play as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaySubmission {
    pub thrower: String,
    pub throw_type: ThrowType,
    /// Team as reported by the client. Scoring uses the thrower's seat.
    pub team: Team,
    #[serde(default)]
    pub defenders: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense_type: Option<DefenseType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fifa_action: Option<FifaAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redemption: Option<Redemption>,
}

impl PlaySubmission {
    pub fn new(thrower: impl Into<String>, throw_type: ThrowType, team: Team) -> Self {
        Self {
            thrower: thrower.into(),
            throw_type,
            team,
            defenders: Vec::new(),
            defense_type: None,
            fifa_action: None,
            redemption: None,
        }
    }

    pub fn defended_by(mut self, defender: impl Into<String>, defense: DefenseType) -> Self {
        self.defenders.push(defender.into());
        self.defense_type = Some(defense);
        self
    }

    pub fn with_defense(mut self, defense: DefenseType) -> Self {
        self.defense_type = Some(defense);
        self
    }

    pub fn with_kick(mut self, action: FifaAction) -> Self {
        self.fifa_action = Some(action);
        self
    }

    pub fn with_redemption(mut self, redemption: Redemption) -> Self {
        self.redemption = Some(redemption);
        self
    }
}

/// An applied play as kept in `recentPlays`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedPlay {
    pub submission: PlaySubmission,
    pub thrower_position: Position,
    pub points: u32,
    pub version: u64,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}
