mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{init_logging, started_match, throw};
use die_match_state::store::{InMemoryStore, MatchStore};
use die_match_state::{
    EngineConfig, LiveMatchState, MatchConfig, MatchEngine, MatchSetup, Participant, Position,
    StoreError, ThrowType,
};
use pretty_assertions::assert_eq;

/// Store that stalls between read and write, widening the race window.
struct SlowStore {
    inner: InMemoryStore,
    delay: Duration,
}

#[async_trait]
impl MatchStore for SlowStore {
    async fn insert_match(&self, config: MatchConfig) -> Result<(), StoreError> {
        self.inner.insert_match(config).await
    }

    async fn load_match_config(&self, match_id: &str) -> Result<Option<MatchConfig>, StoreError> {
        self.inner.load_match_config(match_id).await
    }

    async fn load_participants(&self, match_id: &str) -> Result<Vec<Participant>, StoreError> {
        self.inner.load_participants(match_id).await
    }

    async fn add_participant(
        &self,
        match_id: &str,
        participant: Participant,
    ) -> Result<(), StoreError> {
        self.inner.add_participant(match_id, participant).await
    }

    async fn load_live_state(&self, match_id: &str) -> Result<Option<LiveMatchState>, StoreError> {
        let live = self.inner.load_live_state(match_id).await;
        tokio::time::sleep(self.delay).await;
        live
    }

    async fn persist_live_state(
        &self,
        match_id: &str,
        state: &LiveMatchState,
    ) -> Result<(), StoreError> {
        self.inner.persist_live_state(match_id, state).await
    }

    async fn lookup_display_name(&self, identity: &str) -> Option<String> {
        self.inner.lookup_display_name(identity).await
    }

    async fn is_controller(&self, match_id: &str, identity: &str) -> Result<bool, StoreError> {
        self.inner.is_controller(match_id, identity).await
    }
}

fn slow_engine() -> Arc<MatchEngine<SlowStore>> {
    init_logging();
    let store = SlowStore {
        inner: InMemoryStore::new(),
        delay: Duration::from_millis(20),
    };
    Arc::new(MatchEngine::new(Arc::new(store), EngineConfig::default()))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_plays_both_commit() {
    let engine = slow_engine();
    let m = started_match(engine.as_ref(), MatchSetup::default()).await;
    let before = engine
        .get_live_match_state(&m.match_id)
        .await
        .unwrap()
        .unwrap()
        .version();

    let first = {
        let engine = Arc::clone(&engine);
        let id = m.match_id.clone();
        tokio::spawn(async move { engine.submit_play(&id, throw("p1", ThrowType::Hit)).await })
    };
    let second = {
        let engine = Arc::clone(&engine);
        let id = m.match_id.clone();
        tokio::spawn(async move { engine.submit_play(&id, throw("p1", ThrowType::Goal)).await })
    };

    let a = first.await.unwrap().unwrap();
    let b = second.await.unwrap().unwrap();

    let mut versions = vec![a.version, b.version];
    versions.sort_unstable();
    assert_eq!(versions, vec![before + 1, before + 2]);

    let live = engine
        .get_live_match_state(&m.match_id)
        .await
        .unwrap()
        .unwrap();
    let p1 = live.stats(Position::One);
    assert_eq!(p1.throws, 2);
    assert_eq!(p1.score, 3);
    assert_eq!(p1.hit_streak, 2);
    assert_eq!(live.version(), before + 2);
    assert_eq!(live.recent_plays().count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_writers_lose_nothing() {
    let engine = slow_engine();
    let m = started_match(engine.as_ref(), MatchSetup::default()).await;

    let mut handles = Vec::new();
    for thrower in ["p1", "p2", "p3", "p4", "p1", "p2", "p3", "p4"] {
        let engine = Arc::clone(&engine);
        let id = m.match_id.clone();
        handles.push(tokio::spawn(async move {
            engine.submit_play(&id, throw(thrower, ThrowType::Hit)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let live = engine
        .get_live_match_state(&m.match_id)
        .await
        .unwrap()
        .unwrap();
    let throws: u32 = live.all_stats().map(|(_, s)| s.throws).sum();
    assert_eq!(throws, 8);
    assert_eq!(live.team_scores().team1, 4);
    assert_eq!(live.team_scores().team2, 4);
    assert_eq!(engine.locked_match_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_matches_do_not_block_each_other() {
    let engine = slow_engine();
    let a = started_match(engine.as_ref(), MatchSetup::default()).await;
    let b = started_match(engine.as_ref(), MatchSetup::default()).await;
    assert_ne!(a.room_code, b.room_code);

    let ea = Arc::clone(&engine);
    let eb = Arc::clone(&engine);
    let ida = a.match_id.clone();
    let idb = b.match_id.clone();
    let (ra, rb) = tokio::join!(
        tokio::spawn(async move { ea.submit_play(&ida, throw("p1", ThrowType::Goal)).await }),
        tokio::spawn(async move { eb.submit_play(&idb, throw("p3", ThrowType::Goal)).await }),
    );

    assert_eq!(ra.unwrap().unwrap().scores.team1, 2);
    assert_eq!(rb.unwrap().unwrap().scores.team2, 2);
}
