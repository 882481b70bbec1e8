use super::chunk::{split_for_platform, DEFAULT_CHUNK_SIZE};
use super::event::{InboundEvent, ReplySink};
use super::filter::{EventFilter, FilterReason, PreFilter};
use crate::api::{Completion, CompletionGateway, ModelConfig};
use crate::config::defaults::{DEFAULT_EMPTY_TEXT, DEFAULT_FAILURE_TEXT, DEFAULT_MIN_INTERVAL_MS};
use crate::conversation::ConversationManager;
use crate::models::now_millis;
use crate::rate_limit::RateLimiter;
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

/// Fixed texts and sizing for what goes back to the user.
#[derive(Debug, Clone)]
pub struct ReplyPolicy {
    /// Sent when the completion call fails.
    pub failure_text: String,
    /// Sent when the call succeeds without usable text.
    pub empty_text: String,
    pub chunk_size: usize,
}

impl Default for ReplyPolicy {
    fn default() -> Self {
        Self {
            failure_text: DEFAULT_FAILURE_TEXT.to_string(),
            empty_text: DEFAULT_EMPTY_TEXT.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generated {
    Success,
    Empty,
    Failed,
}

/// Terminal state of one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    RejectedByFilter(FilterReason),
    RejectedByRate,
    RejectedByModeration,
    Emitted { generated: Generated, chunks: usize },
}

/// Runs one inbound event from filter to emitted reply.
pub struct Dispatcher {
    filter: EventFilter,
    limiter: Arc<RateLimiter>,
    min_interval_ms: i64,
    pre_filters: Vec<Arc<dyn PreFilter>>,
    memory: Arc<ConversationManager>,
    gateway: Arc<dyn CompletionGateway>,
    model: ModelConfig,
    replies: ReplyPolicy,
}

impl Dispatcher {
    pub fn new(
        memory: Arc<ConversationManager>,
        gateway: Arc<dyn CompletionGateway>,
        model: ModelConfig,
    ) -> Self {
        Self {
            filter: EventFilter::default(),
            limiter: Arc::new(RateLimiter::new()),
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            pre_filters: Vec::new(),
            memory,
            gateway,
            model,
            replies: ReplyPolicy::default(),
        }
    }

    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_rate_limit(mut self, limiter: Arc<RateLimiter>, min_interval_ms: i64) -> Self {
        self.limiter = limiter;
        self.min_interval_ms = min_interval_ms;
        self
    }

    pub fn with_pre_filter(mut self, pre_filter: Arc<dyn PreFilter>) -> Self {
        self.pre_filters.push(pre_filter);
        self
    }

    pub fn with_replies(mut self, replies: ReplyPolicy) -> Self {
        self.replies = replies;
        self
    }

    pub fn memory(&self) -> &Arc<ConversationManager> {
        &self.memory
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub async fn handle(&self, event: &InboundEvent, sink: &dyn ReplySink) -> Outcome {
        let span = info_span!(
            "event",
            event_id = %Uuid::new_v4(),
            user_id = %event.sender_id,
            channel_id = %event.channel_id,
        );
        self.process(event, sink).instrument(span).await
    }

    async fn process(&self, event: &InboundEvent, sink: &dyn ReplySink) -> Outcome {
        if let Err(reason) = self.filter.check(event) {
            debug!(?reason, "dropped by filter");
            return Outcome::RejectedByFilter(reason);
        }

        let user_id = event.sender_id.as_str();
        if !self.limiter.allow(user_id, now_millis(), self.min_interval_ms) {
            debug!("dropped by rate limit");
            return Outcome::RejectedByRate;
        }

        for pre_filter in &self.pre_filters {
            if !pre_filter.admit(event).await {
                debug!("dropped by moderation");
                return Outcome::RejectedByModeration;
            }
        }

        // Held until the reply is out so same-user events never interleave.
        let _guard = self.memory.lock_user(user_id).await;

        let asked_at = now_millis();
        let history = self.memory.history_with_user_turn(user_id, &event.content);

        if let Err(e) = sink.typing().await {
            debug!(error = %e, "typing hint failed");
        }

        let (reply, generated) = match self.gateway.generate(&history, &self.model).await {
            Ok(Completion::Reply(text)) => (text, Generated::Success),
            Ok(Completion::NoAnswer) => {
                warn!("completion returned no text");
                (self.replies.empty_text.clone(), Generated::Empty)
            }
            Err(e) => {
                warn!(error = %e, "completion failed");
                (self.replies.failure_text.clone(), Generated::Failed)
            }
        };

        self.memory
            .record_exchange(user_id, &event.content, asked_at, &reply, now_millis());

        // A failed write is logged by the manager and retried on the next flush.
        let _ = self.memory.flush().await;

        let chunks = self.emit(&reply, sink).await;
        debug!(chunks, ?generated, "reply emitted");
        Outcome::Emitted { generated, chunks }
    }

    /// Send the reply in order. Stops at the first failed send so the user
    /// never gets a reply with a hole in the middle.
    async fn emit(&self, reply: &str, sink: &dyn ReplySink) -> usize {
        let mut sent = 0;
        for chunk in split_for_platform(reply, self.replies.chunk_size) {
            // The platform rejects blank messages.
            if chunk.trim().is_empty() {
                continue;
            }
            if let Err(e) = sink.reply(&chunk).await {
                warn!(error = %e, sent, "failed to send reply chunk");
                break;
            }
            sent += 1;
        }
        sent
    }
}
