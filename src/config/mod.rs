pub mod defaults;
mod file;
mod validation;

use crate::api::ModelConfig;
use crate::cli::Args;
use crate::conversation::HistoryPolicy;
use crate::dispatch::{EventFilter, OriginPolicy, ReplyPolicy, PLATFORM_MESSAGE_LIMIT};
use crate::error::RelayError;
use defaults::*;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub use file::{ApiSection, FileConfig, FilterSection, MemorySection, ModelSection, RepliesSection};
pub use validation::{expand_env_refs, normalize_endpoint, parse_flag, split_list};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    /// Credential for the messaging platform. The console adapter needs none.
    pub platform_token: Option<String>,
    pub api_endpoint: String,
    pub request_timeout: Duration,
    pub model: ModelConfig,
    pub history: HistoryPolicy,
    pub inactivity_days: u64,
    pub min_interval_ms: i64,
    pub allowed_channels: Vec<String>,
    pub require_mention: bool,
    pub bot_user_id: Option<String>,
    pub ignore_prefixes: Vec<String>,
    pub blocked_words: Vec<String>,
    pub memory_file: PathBuf,
    pub flush_interval: Duration,
    pub purge_interval: Duration,
    pub replies: ReplyPolicy,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self, RelayError> {
        let file_config = FileConfig::load(args.config.as_deref())?;
        let mut config = Self::resolve(|key| env::var(key).ok(), &file_config)?;

        if let Some(path) = &args.memory_file {
            config.memory_file = path.clone();
        }

        Ok(config)
    }

    /// Build the configuration from a variable lookup layered over a config
    /// file: lookup > file > default.
    pub fn resolve<F>(lookup: F, file: &FileConfig) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let expand = |value: &str| expand_env_refs(value, &lookup);

        let api_key = get("OPENAI_KEY")
            .or_else(|| get("OPENAI_API_KEY"))
            .ok_or_else(|| {
                RelayError::Config("OPENAI_KEY environment variable not set".to_string())
            })?;

        let platform_token = get("TOKEN");

        let api_endpoint = get("AI_API_ENDPOINT")
            .or_else(|| file.api.endpoint.as_deref().map(expand))
            .map(|endpoint| normalize_endpoint(&endpoint))
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let request_timeout_secs = parse_or(&get, "REQUEST_TIMEOUT_SECS", file.api.request_timeout_secs)?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let model = ModelConfig {
            model: get("MODEL")
                .or_else(|| file.model.name.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_or(&get, "TEMPERATURE", file.model.temperature)?
                .unwrap_or(DEFAULT_TEMPERATURE),
            max_output_tokens: parse_or(&get, "MAX_TOKENS", file.model.max_tokens)?
                .unwrap_or(DEFAULT_MAX_TOKENS),
        };

        let history = HistoryPolicy {
            persona_prompt: get("PERSONA_PROMPT")
                .or_else(|| file.model.persona_prompt.as_deref().map(expand))
                .unwrap_or_else(|| DEFAULT_PERSONA_PROMPT.to_string()),
            message_limit: parse_or(&get, "MESSAGE_LIMIT", file.memory.message_limit)?
                .unwrap_or(DEFAULT_MESSAGE_LIMIT),
            trim_on_purge: get("TRIM_ON_PURGE")
                .map(|v| parse_flag(&v))
                .or(file.memory.trim_on_purge)
                .unwrap_or(false),
        };

        let inactivity_days = parse_or(&get, "INACTIVITY_DAYS", file.memory.inactivity_days)?
            .unwrap_or(DEFAULT_INACTIVITY_DAYS);

        let min_interval_ms = parse_or(&get, "ANTI_SPAM_MS", file.filter.anti_spam_ms)?
            .unwrap_or(DEFAULT_MIN_INTERVAL_MS);

        // CHANNEL_ID is the single-channel spelling of the same setting.
        let allowed_channels = get("ALLOW_CHANNELS")
            .or_else(|| get("CHANNEL_ID"))
            .map(|v| split_list(&v))
            .or_else(|| file.filter.allow_channels.clone())
            .unwrap_or_default();

        let require_mention = get("REQUIRE_MENTION")
            .map(|v| parse_flag(&v))
            .or(file.filter.require_mention)
            .unwrap_or(false);

        let bot_user_id = get("BOT_USER_ID").or_else(|| file.filter.bot_user_id.clone());

        let ignore_prefixes = get("IGNORE_PREFIXES")
            .map(|v| split_list(&v))
            .or_else(|| file.filter.ignore_prefixes.clone())
            .unwrap_or_default();

        let blocked_words = get("BLOCKED_WORDS")
            .map(|v| split_list(&v))
            .or_else(|| file.filter.blocked_words.clone())
            .unwrap_or_default();

        let memory_file = Self::memory_file(&lookup, file);

        let flush_interval_secs = parse_or(&get, "FLUSH_INTERVAL_SECS", file.memory.flush_interval_secs)?
            .unwrap_or(DEFAULT_FLUSH_INTERVAL_SECS);
        let purge_interval_secs = parse_or(&get, "PURGE_INTERVAL_SECS", file.memory.purge_interval_secs)?
            .unwrap_or(DEFAULT_PURGE_INTERVAL_SECS);

        let replies = ReplyPolicy {
            failure_text: get("FALLBACK_ERROR_TEXT")
                .or_else(|| file.replies.failure_text.clone())
                .unwrap_or_else(|| DEFAULT_FAILURE_TEXT.to_string()),
            empty_text: get("FALLBACK_EMPTY_TEXT")
                .or_else(|| file.replies.empty_text.clone())
                .unwrap_or_else(|| DEFAULT_EMPTY_TEXT.to_string()),
            chunk_size: parse_or(&get, "CHUNK_SIZE", file.replies.chunk_size)?
                .unwrap_or(crate::dispatch::DEFAULT_CHUNK_SIZE),
        };

        let config = Config {
            api_key,
            platform_token,
            api_endpoint,
            request_timeout: Duration::from_secs(request_timeout_secs),
            model,
            history,
            inactivity_days,
            min_interval_ms,
            allowed_channels,
            require_mention,
            bot_user_id,
            ignore_prefixes,
            blocked_words,
            memory_file,
            flush_interval: Duration::from_secs(flush_interval_secs),
            purge_interval: Duration::from_secs(purge_interval_secs),
            replies,
        };
        config.validate()?;
        Ok(config)
    }

    /// Snapshot path alone: lookup > file > default. Needs no credentials.
    pub fn memory_file<F>(lookup: F, file: &FileConfig) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("MEMORY_FILE")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                file.memory
                    .file
                    .as_deref()
                    .map(|value| expand_env_refs(value, &lookup))
            })
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEMORY_FILE))
    }

    /// Snapshot path for `args` without building the full configuration.
    /// Used by `--clear`, which must work without an API key.
    pub fn memory_file_from_env_and_args(args: &Args) -> Result<PathBuf, RelayError> {
        if let Some(path) = &args.memory_file {
            return Ok(path.clone());
        }
        let file_config = FileConfig::load(args.config.as_deref())?;
        Ok(Self::memory_file(|key| env::var(key).ok(), &file_config))
    }

    fn validate(&self) -> Result<(), RelayError> {
        if self.history.message_limit < MIN_MESSAGE_LIMIT {
            return Err(RelayError::Config(format!(
                "MESSAGE_LIMIT must be at least {}, got {}",
                MIN_MESSAGE_LIMIT, self.history.message_limit
            )));
        }
        if self.replies.chunk_size == 0 || self.replies.chunk_size > PLATFORM_MESSAGE_LIMIT {
            return Err(RelayError::Config(format!(
                "CHUNK_SIZE must be between 1 and {}, got {}",
                PLATFORM_MESSAGE_LIMIT, self.replies.chunk_size
            )));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(RelayError::Config(format!(
                "TEMPERATURE must be between 0 and 2, got {}",
                self.model.temperature
            )));
        }
        if i64::try_from(self.inactivity_days)
            .ok()
            .and_then(|days| days.checked_mul(MS_PER_DAY))
            .is_none()
        {
            return Err(RelayError::Config(format!(
                "INACTIVITY_DAYS is out of range, got {}",
                self.inactivity_days
            )));
        }
        if self.min_interval_ms < 0 {
            return Err(RelayError::Config("ANTI_SPAM_MS must not be negative".to_string()));
        }
        if self.flush_interval.is_zero() || self.purge_interval.is_zero() {
            return Err(RelayError::Config(
                "FLUSH_INTERVAL_SECS and PURGE_INTERVAL_SECS must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn inactivity_limit_ms(&self) -> i64 {
        i64::try_from(self.inactivity_days)
            .map_or(i64::MAX, |days| days.saturating_mul(MS_PER_DAY))
    }

    pub fn origin_policy(&self) -> OriginPolicy {
        if self.require_mention {
            OriginPolicy::MentionRequired
        } else {
            OriginPolicy::AllowList(self.allowed_channels.clone())
        }
    }

    pub fn event_filter(&self) -> EventFilter {
        EventFilter {
            bot_user_id: self.bot_user_id.clone(),
            origin: self.origin_policy(),
            ignore_prefixes: self.ignore_prefixes.clone(),
        }
    }
}

/// Parse `key` from the lookup if set, otherwise fall back to the file value.
fn parse_or<T, G>(get: &G, key: &str, fallback: Option<T>) -> Result<Option<T>, RelayError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            RelayError::Config(format!("{} must be a number, got '{}'", key, raw))
        }),
        None => Ok(fallback),
    }
}
