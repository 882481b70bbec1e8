use super::event::InboundEvent;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Why an event was dropped before reaching the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    FromBot,
    OriginNotAllowed,
    IgnoredPrefix,
    EmptyContent,
}

/// Decides which channels the bot answers in.
#[derive(Clone)]
pub enum OriginPolicy {
    /// Answer in the listed channels only. An empty list allows all.
    AllowList(Vec<String>),
    /// Answer only when the message mentions the bot.
    MentionRequired,
    /// Any predicate over `(channel_id, mentions_bot)`.
    Custom(Arc<dyn Fn(&str, bool) -> bool + Send + Sync>),
}

impl OriginPolicy {
    pub fn allows(&self, channel_id: &str, mentions_bot: bool) -> bool {
        match self {
            OriginPolicy::AllowList(channels) => {
                channels.is_empty() || channels.iter().any(|c| c == channel_id)
            }
            OriginPolicy::MentionRequired => mentions_bot,
            OriginPolicy::Custom(predicate) => predicate(channel_id, mentions_bot),
        }
    }
}

impl Default for OriginPolicy {
    fn default() -> Self {
        OriginPolicy::AllowList(Vec::new())
    }
}

impl fmt::Debug for OriginPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginPolicy::AllowList(channels) => f.debug_tuple("AllowList").field(channels).finish(),
            OriginPolicy::MentionRequired => write!(f, "MentionRequired"),
            OriginPolicy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Cheap synchronous checks run before anything touches shared state.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub bot_user_id: Option<String>,
    pub origin: OriginPolicy,
    pub ignore_prefixes: Vec<String>,
}

impl EventFilter {
    pub fn check(&self, event: &InboundEvent) -> Result<(), FilterReason> {
        if event.sender_is_bot || self.bot_user_id.as_deref() == Some(event.sender_id.as_str()) {
            return Err(FilterReason::FromBot);
        }

        if !self.origin.allows(&event.channel_id, event.mentions_bot) {
            return Err(FilterReason::OriginNotAllowed);
        }

        let content = event.content.trim_start();
        if self
            .ignore_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && content.starts_with(prefix.as_str()))
        {
            return Err(FilterReason::IgnoredPrefix);
        }

        if content.trim_end().is_empty() {
            return Err(FilterReason::EmptyContent);
        }

        Ok(())
    }
}

/// Optional moderation stage. Returning `false` drops the event silently.
pub trait PreFilter: Send + Sync {
    fn admit<'a>(&'a self, event: &'a InboundEvent) -> BoxFuture<'a, bool>;
}

/// Rejects messages containing any listed word, ignoring case.
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    words: Vec<String>,
}

impl Blocklist {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn matches(&self, content: &str) -> bool {
        let content = content.to_lowercase();
        self.words.iter().any(|word| content.contains(word.as_str()))
    }
}

impl PreFilter for Blocklist {
    fn admit<'a>(&'a self, event: &'a InboundEvent) -> BoxFuture<'a, bool> {
        let admitted = !self.matches(&event.content);
        Box::pin(async move { admitted })
    }
}
