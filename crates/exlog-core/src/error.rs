//! Errors raised while building the category engine or loading configuration.
//!
//! All of these are fatal at startup: nothing is watched until the rule table
//! and settings are valid.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rule {rule:?}: invalid pattern {pattern:?}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule {rule:?}: unknown category {name:?}")]
    UnknownCategory { rule: String, name: String },

    #[error("rule {rule:?} has no patterns and no validator, it would match every line")]
    EmptyRule { rule: String },

    #[error("rule name {name:?} is declared more than once")]
    DuplicateRule { name: String },

    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("failed to load configuration")]
    Load(#[from] config::ConfigError),
}
