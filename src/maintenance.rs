//! Background ticker that keeps conversation memory tidy.

use crate::conversation::ConversationManager;
use crate::models::now_millis;
use crate::rate_limit::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MaintenanceSchedule {
    pub flush_interval: Duration,
    pub purge_interval: Duration,
    pub inactivity_limit_ms: i64,
    pub min_interval_ms: i64,
}

/// Purge and flush on their own intervals until `cancel` fires.
pub fn spawn(
    memory: Arc<ConversationManager>,
    limiter: Arc<RateLimiter>,
    schedule: MaintenanceSchedule,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut flush_tick = interval(schedule.flush_interval);
        let mut purge_tick = interval(schedule.purge_interval);
        flush_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        purge_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Both intervals fire immediately; startup already purged and flushed.
        flush_tick.tick().await;
        purge_tick.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = flush_tick.tick() => {
                    let _ = memory.flush().await;
                }
                _ = purge_tick.tick() => {
                    let now = now_millis();
                    memory.purge(now, schedule.inactivity_limit_ms);
                    let forgotten = limiter.forget_older_than(now, schedule.min_interval_ms.max(1));
                    debug!(forgotten, "pruned rate limiter");
                    let _ = memory.flush().await;
                }
            }
        }
        debug!("maintenance stopped");
    })
}
