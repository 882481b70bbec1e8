use crate::error::RelayError;
use futures::future::BoxFuture;

/// The fields the dispatcher reads from a platform message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender_id: String,
    pub sender_is_bot: bool,
    pub channel_id: String,
    pub content: String,
    /// Whether the message mentions the bot.
    pub mentions_bot: bool,
}

impl InboundEvent {
    pub fn new(
        sender_id: impl Into<String>,
        channel_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            sender_is_bot: false,
            channel_id: channel_id.into(),
            content: content.into(),
            mentions_bot: false,
        }
    }
}

/// Where replies to one inbound event go.
pub trait ReplySink: Send + Sync {
    /// Send `text` as a reply to the originating message without
    /// mentioning its sender.
    fn reply<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), RelayError>>;

    /// Show a "bot is typing" hint. Optional.
    fn typing(&self) -> BoxFuture<'_, Result<(), RelayError>> {
        Box::pin(async { Ok(()) })
    }
}
