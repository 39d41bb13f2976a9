//! Probanana configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Chat transport settings
    pub telegram: TelegramConfig,

    /// Generation backend settings
    pub gemini: GeminiConfig,

    /// Outbound HTTP tuning
    pub http: HttpConfig,

    /// Runtime limits
    pub bot: BotConfig,
}

impl Config {
    /// Validate configuration before talking to any backend
    ///
    /// Fails fast when either credential is missing.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.token.trim().is_empty() {
            return Err(eyre::eyre!(
                "Telegram bot token not set. Set telegram.token or the TELEGRAM_BOT_TOKEN environment variable."
            ));
        }
        self.validate_gemini()
    }

    /// Validate only the generation backend credentials
    pub fn validate_gemini(&self) -> Result<()> {
        if self.gemini.api_key.trim().is_empty() {
            return Err(eyre::eyre!(
                "Gemini API key not set. Set gemini.api-key or the GEMINI_API_KEY environment variable."
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file_chain(config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.normalize();
        Ok(config)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .probanana.yml
        let local_config = PathBuf::from(".probanana.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/probanana/probanana.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("probanana").join("probanana.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply environment overrides through `lookup`
    ///
    /// Blank values are ignored and values that fail to parse keep the
    /// current setting.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.token = v;
        }
        if let Some(v) = get("GEMINI_API_KEY") {
            self.gemini.api_key = v;
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = Some(v.to_lowercase());
        }
        if let Some(v) = get("PREFER_IPV4").and_then(|v| parse_bool(&v)) {
            self.http.prefer_ipv4 = v;
        }
        if let Some(v) = get("MEDIA_GROUP_DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
            self.bot.media_group_debounce_ms = v;
        }
        if let Some(v) = get("MAX_CONCURRENT").and_then(|v| v.parse().ok()) {
            self.bot.max_concurrent = v;
        }
        if let Some(v) = get("MAX_HISTORY_MESSAGES").and_then(|v| v.parse().ok()) {
            self.bot.max_history_messages = v;
        }
        if let Some(v) = get("REQUEST_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
            self.bot.request_timeout_secs = v;
        }
        if let Some(v) = get("HTTP_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
            self.http.timeout_secs = v;
        }
        if let Some(v) = get("GEMINI_BASE_URL") {
            self.gemini.base_url = v;
        }
        if let Some(v) = get("GEMINI_API_VERSION") {
            self.gemini.api_version = v;
        }
    }

    /// Clamp limits and replace unusable values with defaults
    pub fn normalize(&mut self) {
        let bot = BotConfig::default();
        let http = HttpConfig::default();
        let gemini = GeminiConfig::default();

        self.bot.max_concurrent = self.bot.max_concurrent.max(1);
        self.bot.max_history_messages = self.bot.max_history_messages.max(1);
        if self.bot.request_timeout_secs == 0 {
            self.bot.request_timeout_secs = bot.request_timeout_secs;
        }
        if self.bot.media_group_debounce_ms == 0 {
            self.bot.media_group_debounce_ms = bot.media_group_debounce_ms;
        }
        if self.http.timeout_secs == 0 {
            self.http.timeout_secs = http.timeout_secs;
        }

        self.gemini.base_url = self.gemini.base_url.trim().trim_end_matches('/').to_string();
        if self.gemini.base_url.is_empty() {
            self.gemini.base_url = gemini.base_url;
        }
        self.gemini.api_version = self.gemini.api_version.trim().to_string();
        if self.gemini.api_version.is_empty() {
            self.gemini.api_version = gemini.api_version;
        }
        self.telegram.token = self.telegram.token.trim().to_string();
        self.gemini.api_key = self.gemini.api_key.trim().to_string();
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Chat transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token
    pub token: String,

    /// Bot API base URL
    #[serde(rename = "api-url")]
    pub api_url: String,

    /// Long-poll timeout in seconds
    #[serde(rename = "poll-timeout-secs")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
        }
    }
}

/// Generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    #[serde(rename = "api-key")]
    pub api_key: String,

    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "api-version")]
    pub api_version: String,

    /// Model used for text-only chat
    #[serde(rename = "text-model")]
    pub text_model: String,

    /// Model used whenever images are involved
    #[serde(rename = "image-model")]
    pub image_model: String,

    pub temperature: f32,

    /// Thinking budget sent with text-only chat
    #[serde(rename = "thinking-budget")]
    pub thinking_budget: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_version: "v1beta".to_string(),
            text_model: "gemini-3-pro-preview".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            temperature: 0.7,
            thinking_budget: 32768,
        }
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Resolve over IPv4 only
    #[serde(rename = "prefer-ipv4")]
    pub prefer_ipv4: bool,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            prefer_ipv4: true,
            timeout_secs: 180,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Runtime limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Quiet period before a media group is flushed
    #[serde(rename = "media-group-debounce-ms")]
    pub media_group_debounce_ms: u64,

    /// Maximum updates handled at once
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,

    /// Chat history kept per user
    #[serde(rename = "max-history-messages")]
    pub max_history_messages: usize,

    /// Budget for handling one update
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            media_group_debounce_ms: 1200,
            max_concurrent: 4,
            max_history_messages: 20,
            request_timeout_secs: 180,
        }
    }
}

impl BotConfig {
    pub fn media_group_debounce(&self) -> Duration {
        Duration::from_millis(self.media_group_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.bot.media_group_debounce_ms, 1200);
        assert_eq!(config.bot.max_concurrent, 4);
        assert_eq!(config.bot.max_history_messages, 20);
        assert_eq!(config.bot.request_timeout_secs, 180);
        assert!(config.http.prefer_ipv4);
        assert_eq!(config.gemini.api_version, "v1beta");
        assert_eq!(config.gemini.image_model, "gemini-2.5-flash-image");
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug

telegram:
  token: abc
  poll-timeout-secs: 10

gemini:
  api-key: key
  base-url: https://example.com/
  text-model: some-model

http:
  prefer-ipv4: false

bot:
  media-group-debounce-ms: 500
  max-concurrent: 8
"#;

        let mut config: Config = serde_yaml::from_str(yaml).unwrap();
        config.normalize();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.telegram.token, "abc");
        assert_eq!(config.telegram.poll_timeout_secs, 10);
        assert_eq!(config.gemini.base_url, "https://example.com");
        assert_eq!(config.gemini.text_model, "some-model");
        assert!(!config.http.prefer_ipv4);
        assert_eq!(config.bot.media_group_debounce(), Duration::from_millis(500));
        assert_eq!(config.bot.max_concurrent, 8);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
bot:
  max-concurrent: 2
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.bot.max_concurrent, 2);
        assert_eq!(config.bot.max_history_messages, 20);
        assert_eq!(config.gemini.base_url, "https://generativelanguage.googleapis.com");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::default();
        config.telegram.token = "from-file".to_string();
        config.apply_env(env(&[
            ("TELEGRAM_BOT_TOKEN", " from-env "),
            ("GEMINI_API_KEY", "g"),
            ("LOG_LEVEL", "WARN"),
            ("PREFER_IPV4", "false"),
            ("MEDIA_GROUP_DEBOUNCE_MS", "250"),
            ("MAX_CONCURRENT", "7"),
            ("MAX_HISTORY_MESSAGES", "5"),
            ("REQUEST_TIMEOUT_SECONDS", "30"),
            ("HTTP_TIMEOUT_SECONDS", "40"),
            ("GEMINI_BASE_URL", "http://localhost:9000"),
            ("GEMINI_API_VERSION", "v1"),
        ]));

        assert_eq!(config.telegram.token, "from-env");
        assert_eq!(config.gemini.api_key, "g");
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert!(!config.http.prefer_ipv4);
        assert_eq!(config.bot.media_group_debounce_ms, 250);
        assert_eq!(config.bot.max_concurrent, 7);
        assert_eq!(config.bot.max_history_messages, 5);
        assert_eq!(config.bot.request_timeout_secs, 30);
        assert_eq!(config.http.timeout_secs, 40);
        assert_eq!(config.gemini.base_url, "http://localhost:9000");
        assert_eq!(config.gemini.api_version, "v1");
    }

    #[test]
    fn test_unparseable_env_keeps_current() {
        let mut config = Config::default();
        config.apply_env(env(&[("MAX_CONCURRENT", "lots"), ("PREFER_IPV4", "maybe"), ("GEMINI_BASE_URL", "  ")]));
        assert_eq!(config.bot.max_concurrent, 4);
        assert!(config.http.prefer_ipv4);
        assert_eq!(config.gemini.base_url, "https://generativelanguage.googleapis.com");
    }

    #[test]
    fn test_normalize_clamps() {
        let mut config = Config::default();
        config.bot.max_concurrent = 0;
        config.bot.max_history_messages = 0;
        config.bot.request_timeout_secs = 0;
        config.bot.media_group_debounce_ms = 0;
        config.http.timeout_secs = 0;
        config.gemini.api_version = " ".to_string();
        config.normalize();

        assert_eq!(config.bot.max_concurrent, 1);
        assert_eq!(config.bot.max_history_messages, 1);
        assert_eq!(config.bot.request_timeout_secs, 180);
        assert_eq!(config.bot.media_group_debounce_ms, 1200);
        assert_eq!(config.http.timeout_secs, 180);
        assert_eq!(config.gemini.api_version, "v1beta");
    }

    #[test]
    fn test_validate_requires_credentials() {
        let mut config = Config::default();
        assert!(config.validate().is_err());
        config.telegram.token = "t".to_string();
        assert!(config.validate().is_err());
        config.gemini.api_key = "k".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bot:\n  max-history-messages: 3").unwrap();
        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.bot.max_history_messages, 3);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_project_local_file_is_discovered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".probanana.yml"), "bot:\n  max-concurrent: 9\n").unwrap();
        let previous = std::env::current_dir().unwrap();

        std::env::set_current_dir(dir.path()).unwrap();
        let loaded = Config::load_file_chain(None);
        std::env::set_current_dir(previous).unwrap();

        assert_eq!(loaded.unwrap().bot.max_concurrent, 9);
    }
}
