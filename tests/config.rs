use relaybot::cli::Args;
use relaybot::config::defaults::*;
use relaybot::config::{expand_env_refs, normalize_endpoint, split_list, Config, FileConfig};
use relaybot::dispatch::OriginPolicy;
use relaybot::error::RelayError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn resolve(vars: &[(&str, &str)]) -> Result<Config, RelayError> {
    Config::resolve(lookup(vars), &FileConfig::default())
}

#[test]
fn test_missing_api_key_is_an_error() {
    let result = resolve(&[("TOKEN", "platform-token")]);
    match result {
        Err(RelayError::Config(message)) => assert!(message.contains("OPENAI_KEY")),
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }

    // Blank counts as unset.
    assert!(resolve(&[("OPENAI_KEY", "   ")]).is_err());
}

#[test]
fn test_defaults() {
    let config = resolve(&[("OPENAI_KEY", "sk-test")]).unwrap();

    assert_eq!(config.api_key, "sk-test");
    assert_eq!(config.platform_token, None);
    assert_eq!(config.api_endpoint, DEFAULT_API_ENDPOINT);
    assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    assert_eq!(config.model.model, DEFAULT_MODEL);
    assert_eq!(config.model.max_output_tokens, DEFAULT_MAX_TOKENS);
    assert_eq!(config.history.persona_prompt, DEFAULT_PERSONA_PROMPT);
    assert_eq!(config.history.message_limit, DEFAULT_MESSAGE_LIMIT);
    assert!(!config.history.trim_on_purge);
    assert_eq!(config.min_interval_ms, DEFAULT_MIN_INTERVAL_MS);
    assert_eq!(config.memory_file, PathBuf::from(DEFAULT_MEMORY_FILE));
    assert_eq!(config.inactivity_limit_ms(), 30 * 24 * 60 * 60 * 1000);
    assert!(config.allowed_channels.is_empty());
    assert!(config.ignore_prefixes.is_empty());
    assert_eq!(config.replies.failure_text, DEFAULT_FAILURE_TEXT);
    assert_eq!(config.replies.empty_text, DEFAULT_EMPTY_TEXT);
}

#[test]
fn test_alternate_api_key_name() {
    let config = resolve(&[("OPENAI_API_KEY", "sk-alt")]).unwrap();
    assert_eq!(config.api_key, "sk-alt");
}

#[test]
fn test_environment_values() {
    let config = resolve(&[
        ("OPENAI_KEY", "sk-test"),
        ("TOKEN", "discord-token"),
        ("AI_API_ENDPOINT", "http://localhost:11434/v1"),
        ("MODEL", "llama3"),
        ("TEMPERATURE", "0.2"),
        ("MESSAGE_LIMIT", "8"),
        ("TRIM_ON_PURGE", "yes"),
        ("ANTI_SPAM_MS", "1500"),
        ("ALLOW_CHANNELS", "c1, c2,,"),
        ("IGNORE_PREFIXES", "!,/"),
        ("BLOCKED_WORDS", "spam"),
        ("MEMORY_FILE", "/tmp/bot-memory.json"),
        ("CHUNK_SIZE", "1000"),
    ])
    .unwrap();

    assert_eq!(config.platform_token.as_deref(), Some("discord-token"));
    assert_eq!(config.api_endpoint, "http://localhost:11434/v1/chat/completions");
    assert_eq!(config.model.model, "llama3");
    assert!((config.model.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.history.message_limit, 8);
    assert!(config.history.trim_on_purge);
    assert_eq!(config.min_interval_ms, 1500);
    assert_eq!(config.allowed_channels, vec!["c1", "c2"]);
    assert_eq!(config.ignore_prefixes, vec!["!", "/"]);
    assert_eq!(config.blocked_words, vec!["spam"]);
    assert_eq!(config.memory_file, PathBuf::from("/tmp/bot-memory.json"));
    assert_eq!(config.replies.chunk_size, 1000);
}

#[test]
fn test_channel_id_is_single_channel_allow_list() {
    let config = resolve(&[("OPENAI_KEY", "sk-test"), ("CHANNEL_ID", "123")]).unwrap();
    assert_eq!(config.allowed_channels, vec!["123"]);
    assert!(config.origin_policy().allows("123", false));
    assert!(!config.origin_policy().allows("456", false));
}

#[test]
fn test_require_mention_overrides_allow_list() {
    let config = resolve(&[
        ("OPENAI_KEY", "sk-test"),
        ("ALLOW_CHANNELS", "123"),
        ("REQUIRE_MENTION", "true"),
    ])
    .unwrap();
    assert!(matches!(config.origin_policy(), OriginPolicy::MentionRequired));
}

#[test]
fn test_invalid_numbers_are_rejected() {
    let result = resolve(&[("OPENAI_KEY", "sk-test"), ("MESSAGE_LIMIT", "twenty")]);
    match result {
        Err(RelayError::Config(message)) => assert!(message.contains("MESSAGE_LIMIT")),
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_validation() {
    let cases: &[(&str, &str)] = &[
        ("MESSAGE_LIMIT", "1"),
        ("CHUNK_SIZE", "0"),
        ("CHUNK_SIZE", "2001"),
        ("TEMPERATURE", "3.5"),
        ("ANTI_SPAM_MS", "-1"),
        ("FLUSH_INTERVAL_SECS", "0"),
        ("INACTIVITY_DAYS", "18446744073709551615"),
        ("INACTIVITY_DAYS", "200000000000000"),
    ];
    for (key, value) in cases {
        let result = resolve(&[("OPENAI_KEY", "sk-test"), (*key, *value)]);
        assert!(
            matches!(result, Err(RelayError::Config(_))),
            "{}={} should be rejected",
            key,
            value
        );
    }
}

#[test]
fn test_environment_overrides_file() {
    let file = FileConfig::parse(
        Path::new("relaybot.yaml"),
        r#"
model:
  name: file-model
  persona_prompt: "You are ${BOT_NAME}."
memory:
  message_limit: 10
  file: "${DATA_DIR}/memory.json"
filter:
  allow_channels: ["from-file"]
replies:
  failure_text: "file failure"
"#,
    )
    .unwrap();

    let config = Config::resolve(
        lookup(&[
            ("OPENAI_KEY", "sk-test"),
            ("MODEL", "env-model"),
            ("BOT_NAME", "Relay"),
            ("DATA_DIR", "/var/lib/relaybot"),
        ]),
        &file,
    )
    .unwrap();

    assert_eq!(config.model.model, "env-model");
    assert_eq!(config.history.persona_prompt, "You are Relay.");
    assert_eq!(config.history.message_limit, 10);
    assert_eq!(config.memory_file, PathBuf::from("/var/lib/relaybot/memory.json"));
    assert_eq!(config.allowed_channels, vec!["from-file"]);
    assert_eq!(config.replies.failure_text, "file failure");
}

#[test]
fn test_load_json_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("relaybot.json");
    std::fs::write(&path, r#"{ "memory": { "inactivity_days": 7 } }"#).unwrap();

    let file = FileConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(file.memory.inactivity_days, Some(7));

    let config = Config::resolve(lookup(&[("OPENAI_KEY", "sk-test")]), &file).unwrap();
    assert_eq!(config.inactivity_limit_ms(), 7 * 24 * 60 * 60 * 1000);
}

#[test]
fn test_explicit_config_file_must_exist() {
    let temp_dir = TempDir::new().unwrap();
    let result = FileConfig::load(Some(temp_dir.path().join("missing.yaml").as_path()));
    assert!(matches!(result, Err(RelayError::Config(_))));
}

#[test]
fn test_normalize_endpoint() {
    assert_eq!(
        normalize_endpoint("https://api.openai.com/v1/chat/completions"),
        "https://api.openai.com/v1/chat/completions"
    );
    assert_eq!(
        normalize_endpoint("https://openrouter.ai/api/v1"),
        "https://openrouter.ai/api/v1/chat/completions"
    );
    assert_eq!(
        normalize_endpoint("http://localhost:8080/v1/"),
        "http://localhost:8080/v1/chat/completions"
    );
    assert_eq!(
        normalize_endpoint("http://localhost:8080/"),
        "http://localhost:8080/v1/chat/completions"
    );
}

#[test]
fn test_expand_env_refs() {
    let vars = lookup(&[("HOME_DIR", "/home/bot")]);
    assert_eq!(expand_env_refs("${HOME_DIR}/memory.json", &vars), "/home/bot/memory.json");
    assert_eq!(expand_env_refs("${UNKNOWN}/x", &vars), "${UNKNOWN}/x");
    assert_eq!(expand_env_refs("plain", &vars), "plain");
}

#[test]
fn test_split_list() {
    assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
    assert!(split_list("").is_empty());
}

#[test]
fn test_memory_file_without_credentials() {
    let file = FileConfig::parse(
        Path::new("relaybot.yaml"),
        "memory:\n  file: \"${DATA_DIR}/mem.json\"\n",
    )
    .unwrap();

    // No OPENAI_KEY: the path still resolves.
    assert_eq!(
        Config::memory_file(lookup(&[("DATA_DIR", "data")]), &file),
        PathBuf::from("data/mem.json")
    );
    assert_eq!(
        Config::memory_file(lookup(&[("MEMORY_FILE", "/tmp/env.json")]), &file),
        PathBuf::from("/tmp/env.json")
    );
    assert_eq!(
        Config::memory_file(lookup(&[]), &FileConfig::default()),
        PathBuf::from(DEFAULT_MEMORY_FILE)
    );
}

#[test]
fn test_memory_file_matches_full_resolution() {
    let file = FileConfig::parse(Path::new("relaybot.yaml"), "memory:\n  file: data/mem.json\n").unwrap();
    let vars = [("OPENAI_KEY", "sk-test")];

    let config = Config::resolve(lookup(&vars), &file).unwrap();
    assert_eq!(config.memory_file, Config::memory_file(lookup(&vars), &file));
}

#[test]
fn test_memory_file_from_args() {
    let args = Args {
        memory_file: Some(PathBuf::from("cli.json")),
        ..Args::default()
    };
    assert_eq!(
        Config::memory_file_from_env_and_args(&args).unwrap(),
        PathBuf::from("cli.json")
    );

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("relaybot.yaml");
    std::fs::write(&config_path, "memory:\n  file: data/mem.json\n").unwrap();
    let args = Args {
        config: Some(config_path),
        ..Args::default()
    };
    let resolved = Config::memory_file_from_env_and_args(&args).unwrap();
    if std::env::var("MEMORY_FILE").is_err() {
        assert_eq!(resolved, PathBuf::from("data/mem.json"));
    }

    let args = Args {
        config: Some(temp_dir.path().join("missing.yaml")),
        ..Args::default()
    };
    assert!(Config::memory_file_from_env_and_args(&args).is_err());
}

#[test]
fn test_long_inactivity_window_stays_positive() {
    let config = resolve(&[("OPENAI_KEY", "sk-test"), ("INACTIVITY_DAYS", "36500")]).unwrap();
    assert_eq!(config.inactivity_limit_ms(), 36_500 * 24 * 60 * 60 * 1000);
}
