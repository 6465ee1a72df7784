use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1";
pub const DEFAULT_MAX_TOKENS: u32 = 1800;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PORT: u16 = 8080;

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` makes every generation fail with an auth error.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// Extra attempts after a transient failure. Zero disables retrying.
    pub max_retries: u32,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 0,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unparseable numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            api_key: get("OPENAI_API_KEY"),
            api_base: get("OPENAI_API_BASE").unwrap_or(defaults.api_base),
            model: get("OPENAI_MODEL").unwrap_or(defaults.model),
            max_tokens: get("OPENAI_MAX_TOKENS").and_then(|v| v.parse().ok()).unwrap_or(defaults.max_tokens),
            timeout: get("OPENAI_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: get("OPENAI_MAX_RETRIES").and_then(|v| v.parse().ok()).unwrap_or(defaults.max_retries),
            port: get("PORT").and_then(|v| v.parse().ok()).unwrap_or(defaults.port),
        }
    }
}
