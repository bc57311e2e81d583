//! Configuration for the engine.
//!
//! Settings are loaded with priority: env var > `.env` file > default.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default directory holding `catalog.toml` and `narratives.json`.
pub const DEFAULT_CONTENT_DIR: &str = "./data";

/// Default bound on the initial content load.
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 30;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory read by the file-backed content source.
    pub content_dir: PathBuf,
    /// Upper bound on one load attempt.
    pub load_timeout: Duration,
    /// Refuse to become ready unless every narrative key resolves.
    pub strict_corpus: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            load_timeout: Duration::from_secs(DEFAULT_LOAD_TIMEOUT_SECS),
            strict_corpus: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `HAQEI_CONTENT_DIR` | `./data` |
    /// | `HAQEI_LOAD_TIMEOUT_SECS` | `30` |
    /// | `HAQEI_STRICT_CORPUS` | `true` |
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();

        let content_dir = optional_env("HAQEI_CONTENT_DIR")?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR));

        let timeout_secs: u64 =
            parse_optional_env("HAQEI_LOAD_TIMEOUT_SECS", DEFAULT_LOAD_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "HAQEI_LOAD_TIMEOUT_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            content_dir,
            load_timeout: Duration::from_secs(timeout_secs),
            strict_corpus: parse_optional_env("HAQEI_STRICT_CORPUS", true)?,
        })
    }
}

pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::ParseError(format!(
            "failed to read {key}: {e}"
        ))),
    }
}

pub(crate) fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|s| {
            s.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{e}"),
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}
