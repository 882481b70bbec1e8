mod chunk;
mod dispatcher;
mod event;
mod filter;

pub use chunk::{split_for_platform, DEFAULT_CHUNK_SIZE, PLATFORM_MESSAGE_LIMIT};
pub use dispatcher::{Dispatcher, Generated, Outcome, ReplyPolicy};
pub use event::{InboundEvent, ReplySink};
pub use filter::{Blocklist, EventFilter, FilterReason, OriginPolicy, PreFilter};
