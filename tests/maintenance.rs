use relaybot::conversation::{ConversationManager, ConversationStore, HistoryPolicy, JsonFileStore};
use relaybot::maintenance::{self, MaintenanceSchedule};
use relaybot::models::{now_millis, Snapshot};
use relaybot::rate_limit::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn schedule() -> MaintenanceSchedule {
    MaintenanceSchedule {
        flush_interval: Duration::from_secs(60),
        purge_interval: Duration::from_secs(3600),
        inactivity_limit_ms: 30 * DAY_MS,
        min_interval_ms: 3000,
    }
}

/// Step the paused clock until `done` holds for the saved snapshot.
async fn wait_for_snapshot<F>(store: &JsonFileStore, done: F) -> Snapshot
where
    F: Fn(&Snapshot) -> bool,
{
    for _ in 0..600 {
        if let Ok(snapshot) = store.load() {
            if done(&snapshot) {
                return snapshot;
            }
        }
        sleep(Duration::from_secs(1)).await;
    }
    panic!("snapshot never reached the expected state");
}

#[tokio::test(start_paused = true)]
async fn test_ticker_flushes_purges_and_stops() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("memory.json");
    let store: Arc<dyn ConversationStore> = Arc::new(JsonFileStore::new(&path));
    let reader = JsonFileStore::new(&path);

    let memory = Arc::new(ConversationManager::open(
        store,
        HistoryPolicy {
            persona_prompt: "persona".to_string(),
            message_limit: 20,
            trim_on_purge: false,
        },
    ));
    let now = now_millis();
    memory.record_exchange("stale", "hi", now - 31 * DAY_MS, "hello", now - 31 * DAY_MS);
    memory.record_exchange("fresh", "hi", now, "hello", now);

    let limiter = Arc::new(RateLimiter::new());
    limiter.allow("stale", now - 31 * DAY_MS, 3000);

    let cancel = CancellationToken::new();
    let ticker = maintenance::spawn(
        Arc::clone(&memory),
        Arc::clone(&limiter),
        schedule(),
        cancel.clone(),
    );

    // Nothing is written before the first flush interval.
    sleep(Duration::from_secs(30)).await;
    assert!(!path.exists());

    // Flush tick: both users reach disk, nobody purged yet.
    sleep(Duration::from_secs(31)).await;
    let flushed = wait_for_snapshot(&reader, |s| s.len() == 2).await;
    assert!(flushed.contains_key("stale"));
    assert_eq!(memory.len(), 2);

    // Purge tick: the stale user goes, from memory, disk, and rate state.
    sleep(Duration::from_secs(3600)).await;
    let purged = wait_for_snapshot(&reader, |s| !s.contains_key("stale")).await;
    assert!(purged.contains_key("fresh"));
    assert!(memory.history("stale").is_none());
    assert!(limiter.is_empty());

    cancel.cancel();
    timeout(Duration::from_secs(5), ticker)
        .await
        .expect("ticker should stop after cancellation")
        .unwrap();
}
