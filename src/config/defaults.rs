pub const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_PERSONA_PROMPT: &str = "BotGPT is a friendly and helpful chatbot.";
pub const DEFAULT_MEMORY_FILE: &str = "memory.json";
pub const DEFAULT_MESSAGE_LIMIT: usize = 20;
pub const DEFAULT_INACTIVITY_DAYS: u64 = 30;
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_PURGE_INTERVAL_SECS: u64 = 3600;

pub const DEFAULT_MIN_INTERVAL_MS: i64 = 3000;

pub const DEFAULT_FAILURE_TEXT: &str =
    "Oops, something went wrong on the AI side. Please try again a bit later.";
pub const DEFAULT_EMPTY_TEXT: &str = "Sorry, I don't have an answer right now.";

pub const MIN_MESSAGE_LIMIT: usize = 2;
