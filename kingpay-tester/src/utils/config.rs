use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Pause between modules when nothing overrides it (ms)
pub const DEFAULT_MODULE_DELAY_MS: u64 = 200;

/// Per-call timeout when nothing overrides it (s)
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("cannot read env file {path}: {message}")]
    EnvFile { path: String, message: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (e.g. "https://xyz.supabase.co")
    pub backend_url: String,

    /// Anonymous API key sent as `apikey` on every request
    pub anon_key: String,

    /// Test account credentials
    pub email: Option<String>,
    pub password: Option<String>,

    /// Sub-account provider token; the sub-account module skips without it
    pub provider_token: Option<String>,

    /// Pause between modules (ms)
    pub module_delay_ms: u64,

    /// Timeout applied to every remote call
    pub call_timeout: Duration,
}

impl Config {
    /// Read configuration from the process environment, filling gaps from
    /// `.env` in the working directory when one exists
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(".env");
        if path.is_file() {
            Self::from_env_file(path)
        } else {
            Self::from_env()
        }
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Process environment first, then the entries of a dotenv file
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let env_file_error = |e: dotenvy::Error| ConfigError::EnvFile {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let mut file_vars = HashMap::new();
        for entry in dotenvy::from_path_iter(path).map_err(env_file_error)? {
            let (key, value) = entry.map_err(env_file_error)?;
            file_vars.insert(key, value);
        }

        Self::from_lookup(|name| {
            std::env::var(name)
                .ok()
                .or_else(|| file_vars.get(name).cloned())
        })
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend_url = get("EXPO_PUBLIC_SUPABASE_URL")
            .or_else(|| get("SUPABASE_URL"))
            .ok_or(ConfigError::Missing("EXPO_PUBLIC_SUPABASE_URL"))?;
        let anon_key = get("EXPO_PUBLIC_SUPABASE_ANON_KEY")
            .or_else(|| get("SUPABASE_ANON_KEY"))
            .ok_or(ConfigError::Missing("EXPO_PUBLIC_SUPABASE_ANON_KEY"))?;

        let module_delay_ms = parse_u64(
            "KINGPAY_MODULE_DELAY_MS",
            get("KINGPAY_MODULE_DELAY_MS"),
            DEFAULT_MODULE_DELAY_MS,
        )?;
        let timeout_secs = parse_u64(
            "KINGPAY_CALL_TIMEOUT_SECS",
            get("KINGPAY_CALL_TIMEOUT_SECS"),
            DEFAULT_CALL_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "KINGPAY_CALL_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            anon_key,
            email: get("TEST_REAL_EMAIL"),
            password: get("TEST_REAL_PASSWORD"),
            provider_token: get("IUGU_API_TOKEN"),
            module_delay_ms,
            call_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_u64(name: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
