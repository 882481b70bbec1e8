pub mod output;

pub use output::{display_reply, display_typing};
