//! # configs
//!
//! Layered application configuration: built-in defaults, an optional
//! `recipe-browser.toml`, `.env`, then `RECIPES__SECTION__KEY` environment
//! variables. Credentials only ever arrive through these sources.

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "RECIPES";
pub const CONFIG_FILE: &str = "recipe-browser";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
pub struct RemoteConfig {
    /// Project endpoint, e.g. `https://<project>.supabase.co`
    pub url: String,
    /// Public anonymous-role token. Redacted in `Debug`.
    pub anon_key: SecretString,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Directory for locally persisted keys (saved recipes).
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl AppConfig {
    /// Loads from every source. Missing `.env` or config file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let builder = Self::defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            );
        Self::from_builder(builder)
    }

    /// Builder pre-seeded with defaults for every optional key.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(config::Config::builder()
            .set_default("remote.timeout_secs", 30)?
            .set_default("storage.dir", "./data")?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let cfg: AppConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.remote.url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "remote.url '{url}' must start with http:// or https://"
            )));
        }
        if self.remote.anon_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid("remote.anon_key is empty".into()));
        }
        if self.remote.timeout_secs == 0 {
            return Err(ConfigError::Invalid("remote.timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_remote(url: &str, key: &str) -> ConfigBuilder<DefaultState> {
        AppConfig::defaults()
            .unwrap()
            .set_override("remote.url", url)
            .unwrap()
            .set_override("remote.anon_key", key)
            .unwrap()
    }

    #[test]
    fn defaults_fill_optional_keys() {
        let cfg = AppConfig::from_builder(with_remote("https://demo.supabase.co", "anon")).unwrap();
        assert_eq!(cfg.remote.timeout_secs, 30);
        assert_eq!(cfg.storage.dir, PathBuf::from("./data"));
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.log.format, LogFormat::Pretty);
        assert_eq!(cfg.remote.anon_key.expose_secret(), "anon");
    }

    #[test]
    fn missing_remote_url_fails_to_load() {
        let builder = AppConfig::defaults()
            .unwrap()
            .set_override("remote.anon_key", "anon")
            .unwrap();
        assert!(matches!(AppConfig::from_builder(builder), Err(ConfigError::Load(_))));
    }

    #[test]
    fn rejects_bad_values() {
        let err = AppConfig::from_builder(with_remote("demo.supabase.co", "anon")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err =
            AppConfig::from_builder(with_remote("https://demo.supabase.co", "  ")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let builder = with_remote("https://demo.supabase.co", "anon")
            .set_override("remote.timeout_secs", 0)
            .unwrap();
        assert!(matches!(AppConfig::from_builder(builder), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn json_log_format_and_overrides() {
        let builder = with_remote("http://localhost:54321", "anon")
            .set_override("log.format", "json")
            .unwrap()
            .set_override("storage.dir", "/tmp/recipes")
            .unwrap();
        let cfg = AppConfig::from_builder(builder).unwrap();
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.storage.dir, PathBuf::from("/tmp/recipes"));
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let cfg = AppConfig::from_builder(with_remote("https://demo.supabase.co", "super-secret"))
            .unwrap();
        assert!(!format!("{cfg:?}").contains("super-secret"));
    }
}
