//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use die_match_state::{
    EngineConfig, MatchConfig, MatchEngine, MatchSetup, Participant, PlaySubmission, Team,
    ThrowType,
};
use die_match_state::store::InMemoryStore;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test subscriber once.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, then `warn`.
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

pub fn engine() -> MatchEngine<InMemoryStore> {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> MatchEngine<InMemoryStore> {
    init_logging();
    MatchEngine::new(Arc::new(InMemoryStore::new()), config)
}

/// Create a match, seat `p1`..`p4` (host is `p1`) and start it.
pub async fn started_match<S: die_match_state::store::MatchStore>(
    engine: &MatchEngine<S>,
    setup: MatchSetup,
) -> MatchConfig {
    let created = engine
        .create_match(setup, Participant::player("p1"))
        .await
        .unwrap();
    for id in ["p2", "p3", "p4"] {
        engine
            .join_match(&created.room_code, Participant::player(id))
            .await
            .unwrap();
    }
    engine.start_match(&created.match_id, "p1").await.unwrap();
    created
}

pub fn throw(thrower: &str, throw_type: ThrowType) -> PlaySubmission {
    let team = match thrower {
        "p1" | "p2" | "slot-1" | "slot-2" => Team::One,
        _ => Team::Two,
    };
    PlaySubmission::new(thrower, throw_type, team)
}
