//! Configuration types for exlog.
//!
//! [`Config::load`] layers, in order: the embedded defaults, the user file
//! (`~/.config/exlog/config.toml` or an explicit path) and `EXLOG_*`
//! environment overrides (`EXLOG_WATCH__POLL_INTERVAL_MS=100`).
//! [`Config::defaults`] returns the embedded defaults without touching the
//! filesystem (useful in tests).

use crate::{classify::RuleSpec, dedup::DEFAULT_KEY_CHARS, error::ConfigError};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[watch]
poll_interval_ms = 250
dedup_key_chars  = 50
skip_blank_lines = true
max_batch_bytes  = 1048576

[classifier]
builtin_rules = true
"#;

pub const MIN_POLL_INTERVAL_MS: u64 = 10;
pub const DEFAULT_MAX_BATCH_BYTES: u64 = 1024 * 1024;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchSettings,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// `[watch]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_dedup_key_chars")]
    pub dedup_key_chars: usize,
    /// Whitespace-only lines advance the cursor but produce no event.
    #[serde(default = "default_skip_blank_lines")]
    pub skip_blank_lines: bool,
    /// Upper bound on the bytes one poll reads. A large backlog is delivered
    /// over several consecutive polls.
    #[serde(default = "default_max_batch_bytes")]
    pub max_batch_bytes: u64,
}

fn default_poll_interval_ms() -> u64 { 250 }
fn default_dedup_key_chars() -> usize { DEFAULT_KEY_CHARS }
fn default_skip_blank_lines() -> bool { true }
fn default_max_batch_bytes() -> u64 { DEFAULT_MAX_BATCH_BYTES }

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            dedup_key_chars: default_dedup_key_chars(),
            skip_blank_lines: default_skip_blank_lines(),
            max_batch_bytes: default_max_batch_bytes(),
        }
    }
}

impl WatchSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(ConfigError::InvalidSetting {
                key: "watch.poll_interval_ms",
                reason: format!(
                    "{} is below the minimum of {MIN_POLL_INTERVAL_MS}",
                    self.poll_interval_ms
                ),
            });
        }
        if self.dedup_key_chars == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "watch.dedup_key_chars",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_batch_bytes == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "watch.max_batch_bytes",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// `[classifier]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassifierConfig {
    /// Load the built-in rule table before the user rules.
    #[serde(default = "default_builtin_rules")]
    pub builtin_rules: bool,
    /// Extra `[[classifier.rules]]` entries.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

fn default_builtin_rules() -> bool { true }

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            builtin_rules: default_builtin_rules(),
            rules: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load the layered configuration. With `path = None` the user file in the
    /// config directory is used if it exists; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(config_path().as_path()).required(false),
        };

        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("EXLOG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        cfg.watch.validate()?;
        Ok(cfg)
    }

    /// Parse configuration from a TOML string layered over the defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        cfg.watch.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `$XDG_CONFIG_HOME/exlog/config.toml`, falling back to `~/.config`.
pub fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("exlog")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
