//! Line-oriented stand-in for a messaging platform.
//!
//! Each stdin line is one inbound message: either a JSON object carrying the
//! event fields or plain text from the `console` user. Replies go to stdout.

use crate::dispatch::{Dispatcher, InboundEvent, ReplySink};
use crate::error::RelayError;
use crate::ui::{display_reply, display_typing};
use futures::future::BoxFuture;
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

pub const CONSOLE_USER: &str = "console";
pub const CONSOLE_CHANNEL: &str = "console";

#[derive(Deserialize)]
struct ConsoleLine {
    sender_id: String,
    #[serde(default = "default_channel")]
    channel_id: String,
    content: String,
    #[serde(default)]
    sender_is_bot: bool,
    #[serde(default)]
    mentions_bot: bool,
}

fn default_channel() -> String {
    CONSOLE_CHANNEL.to_string()
}

/// Turn one input line into an event. Blank lines yield nothing.
pub fn parse_line(line: &str) -> Option<InboundEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('{') {
        if let Ok(parsed) = serde_json::from_str::<ConsoleLine>(trimmed) {
            return Some(InboundEvent {
                sender_id: parsed.sender_id,
                sender_is_bot: parsed.sender_is_bot,
                channel_id: parsed.channel_id,
                content: parsed.content,
                mentions_bot: parsed.mentions_bot,
            });
        }
    }

    Some(InboundEvent::new(CONSOLE_USER, CONSOLE_CHANNEL, line.trim_end()))
}

pub struct ConsoleReply {
    channel_id: String,
}

impl ConsoleReply {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
        }
    }
}

impl ReplySink for ConsoleReply {
    fn reply<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), RelayError>> {
        Box::pin(async move { Ok(display_reply(&self.channel_id, text)?) })
    }

    fn typing(&self) -> BoxFuture<'_, Result<(), RelayError>> {
        Box::pin(async move { Ok(display_typing(&self.channel_id)?) })
    }
}

/// Read stdin until EOF or `cancel`, handing each event to its own task.
pub async fn run(
    dispatcher: Arc<Dispatcher>,
    tracker: &TaskTracker,
    cancel: CancellationToken,
) -> Result<(), RelayError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("reading messages from stdin");

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            debug!("stdin closed");
            break;
        };

        let Some(event) = parse_line(&line) else {
            continue;
        };

        let dispatcher = Arc::clone(&dispatcher);
        tracker.spawn(async move {
            let sink = ConsoleReply::new(event.channel_id.clone());
            let outcome = dispatcher.handle(&event, &sink).await;
            debug!(?outcome, "event finished");
        });
    }

    Ok(())
}
