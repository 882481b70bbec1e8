use crate::error::RelayError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiSection {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelSection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub persona_prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MemorySection {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub message_limit: Option<usize>,
    #[serde(default)]
    pub inactivity_days: Option<u64>,
    #[serde(default)]
    pub trim_on_purge: Option<bool>,
    #[serde(default)]
    pub flush_interval_secs: Option<u64>,
    #[serde(default)]
    pub purge_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilterSection {
    #[serde(default)]
    pub allow_channels: Option<Vec<String>>,
    #[serde(default)]
    pub require_mention: Option<bool>,
    #[serde(default)]
    pub bot_user_id: Option<String>,
    #[serde(default)]
    pub ignore_prefixes: Option<Vec<String>>,
    #[serde(default)]
    pub blocked_words: Option<Vec<String>>,
    #[serde(default)]
    pub anti_spam_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RepliesSection {
    #[serde(default)]
    pub failure_text: Option<String>,
    #[serde(default)]
    pub empty_text: Option<String>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
}

/// Optional YAML (or JSON) config file. Credentials never live here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub memory: MemorySection,
    #[serde(default)]
    pub filter: FilterSection,
    #[serde(default)]
    pub replies: RepliesSection,
}

impl FileConfig {
    /// Load `explicit` if given (it must exist), otherwise the first config
    /// file found on the search path, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, RelayError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, RelayError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            RelayError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::parse(path, &contents)
    }

    pub fn parse(path: &Path, contents: &str) -> Result<Self, RelayError> {
        let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
        let parsed = if is_json {
            serde_json::from_str(contents).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(contents).map_err(|e| e.to_string())
        };
        parsed.map_err(|e| {
            RelayError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".relaybot.yaml"),
            PathBuf::from(".relaybot.yml"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("relaybot");
            paths.push(config_dir.join("relaybot.yaml"));
            paths.push(config_dir.join("relaybot.yml"));
        }

        paths
    }
}
