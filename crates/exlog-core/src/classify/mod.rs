//! CategoryEngine — maps a [`ParsedLine`] to exactly one [`Category`].
//!
//! Rules are checked in ascending priority, ties broken by declaration order.
//! The first rule that matches wins; a line no rule accepts is `Unknown`.
//! After the winner is known, the fields that category carries (player name,
//! chat sender, …) are extracted from the message.
//!
//! The engine is immutable after construction and is shared between watch
//! sessions behind an `Arc`.

pub mod extract;
pub mod heuristics;
pub mod rules;

pub use heuristics::{looks_like_dialogue, parse_chat_prefix, ChatLine};
pub use rules::{builtin_rules, CategoryRule, MatchTarget, Pattern, RuleSpec, Validator};

use crate::{
    config::ClassifierConfig,
    error::ConfigError,
    types::{Category, CategoryKind, ChatChannel, Classification, ExtractedFields, ParsedLine},
};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct CategoryEngine {
    rules: Vec<CategoryRule>,
}

impl CategoryEngine {
    /// Compile `specs` into an engine. Fails on the first invalid rule.
    pub fn new(specs: impl IntoIterator<Item = RuleSpec>) -> Result<Self, ConfigError> {
        let mut names = HashSet::new();
        let mut rules = Vec::new();
        for spec in specs {
            if !names.insert(spec.name.clone()) {
                return Err(ConfigError::DuplicateRule { name: spec.name });
            }
            rules.push(spec.compile()?);
        }
        // Stable: equal priorities keep declaration order.
        rules.sort_by_key(CategoryRule::priority);
        Ok(Self { rules })
    }

    /// The built-in rule table.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(builtin_rules())
    }

    /// Built-in rules (unless disabled) followed by the user's extra rules.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        let builtin = if config.builtin_rules {
            builtin_rules()
        } else {
            Vec::new()
        };
        Self::new(builtin.into_iter().chain(config.rules.iter().cloned()))
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Classify one line.
    pub fn classify(&self, line: &ParsedLine) -> Classification {
        self.rules
            .iter()
            .find(|rule| rule.matches(line))
            .map(|rule| resolve(rule.kind(), line))
            .unwrap_or_else(Classification::unknown)
    }
}

/// Turn the winning rule's category into a final [`Category`] plus fields.
fn resolve(kind: CategoryKind, line: &ParsedLine) -> Classification {
    let mut fields = ExtractedFields::default();
    let category = match kind {
        CategoryKind::Chat | CategoryKind::GuildSystem => match parse_chat_prefix(&line.message) {
            Some(chat) => {
                fields.chat_channel = Some(chat.channel);
                fields.chat_sender = chat.sender.map(str::to_string);
                match chat.channel {
                    ChatChannel::GuildSystem => Category::GuildSystem,
                    channel => Category::Chat(channel),
                }
            }
            None => Category::from(kind),
        },
        CategoryKind::Death => {
            fields.player_name = extract::death(&line.message);
            Category::Death
        }
        CategoryKind::LevelUp => {
            if let Some(up) = extract::level_up(&line.message) {
                fields.player_name = Some(up.player_name);
                fields.character_class = Some(up.character_class);
                fields.level = Some(up.level);
            }
            Category::LevelUp
        }
        other => Category::from(other),
    };
    Classification { category, fields }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
