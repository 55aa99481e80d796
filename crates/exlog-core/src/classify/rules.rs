//! Rule definitions: the serializable [`RuleSpec`], the compiled
//! [`CategoryRule`] and the built-in rule table.

use super::{extract, heuristics};
use crate::{
    error::ConfigError,
    types::{CategoryKind, ParsedLine},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// ---------------------------------------------------------------------------
// Rule data
// ---------------------------------------------------------------------------

/// Which part of a parsed line a rule's patterns are tested against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTarget {
    /// Text after the header and the system tag.
    #[default]
    Message,
    /// The first bracketed tag, without brackets. Rules on this target never
    /// match lines that have no tag.
    SystemTag,
    /// Everything after the header: `[TAG] message`.
    Body,
}

/// Custom predicate attached to a rule, dispatched by `match`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    #[default]
    None,
    /// [`heuristics::parse_chat_prefix`] recognises the message.
    ChatPrefix,
    /// [`heuristics::looks_like_dialogue`] accepts the message.
    Dialogue,
    /// Header level is WARN/ERROR/CRIT, or the message opens with one of them.
    ElevatedSeverity,
}

impl Validator {
    pub fn accepts(self, line: &ParsedLine) -> bool {
        match self {
            Validator::None => true,
            Validator::ChatPrefix => heuristics::parse_chat_prefix(&line.message).is_some(),
            Validator::Dialogue => heuristics::looks_like_dialogue(&line.message),
            Validator::ElevatedSeverity => {
                line.level.is_elevated()
                    || ["WARN", "ERROR", "CRIT"]
                        .iter()
                        .any(|word| line.message.starts_with(word))
            }
        }
    }
}

/// One category rule as written in code or configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    /// A [`CategoryKind`] name, e.g. `"Network"`.
    pub category: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub target: MatchTarget,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub excluded: Vec<String>,
    #[serde(default)]
    pub any_of: Vec<String>,
    /// Treat every pattern of this rule as a regular expression.
    #[serde(default)]
    pub regex: bool,
    #[serde(default)]
    pub validator: Validator,
}

impl RuleSpec {
    pub fn new(name: impl Into<String>, category: CategoryKind, priority: i32) -> Self {
        Self {
            name: name.into(),
            category: category.as_str().to_string(),
            priority,
            target: MatchTarget::default(),
            required: Vec::new(),
            excluded: Vec::new(),
            any_of: Vec::new(),
            regex: false,
            validator: Validator::None,
        }
    }

    pub fn target(mut self, target: MatchTarget) -> Self {
        self.target = target;
        self
    }

    pub fn required(mut self, patterns: &[&str]) -> Self {
        self.required = owned(patterns);
        self
    }

    pub fn excluded(mut self, patterns: &[&str]) -> Self {
        self.excluded = owned(patterns);
        self
    }

    pub fn any_of(mut self, patterns: &[&str]) -> Self {
        self.any_of = owned(patterns);
        self
    }

    pub fn regex(mut self) -> Self {
        self.regex = true;
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Validate and compile into a [`CategoryRule`].
    pub fn compile(&self) -> Result<CategoryRule, ConfigError> {
        let kind =
            CategoryKind::from_name(&self.category).ok_or_else(|| ConfigError::UnknownCategory {
                rule: self.name.clone(),
                name: self.category.clone(),
            })?;

        if self.required.is_empty() && self.any_of.is_empty() && self.validator == Validator::None
        {
            return Err(ConfigError::EmptyRule {
                rule: self.name.clone(),
            });
        }
        if kind == CategoryKind::Chat && self.validator != Validator::ChatPrefix {
            return Err(ConfigError::InvalidSetting {
                key: "classifier.rules.validator",
                reason: format!(
                    "rule {:?}: Chat rules need the chat_prefix validator to resolve a channel",
                    self.name
                ),
            });
        }

        Ok(CategoryRule {
            kind,
            required: self.patterns(&self.required)?,
            excluded: self.patterns(&self.excluded)?,
            any_of: self.patterns(&self.any_of)?,
            spec: self.clone(),
        })
    }

    fn patterns(&self, sources: &[String]) -> Result<Vec<Pattern>, ConfigError> {
        sources
            .iter()
            .map(|source| {
                if !self.regex {
                    return Ok(Pattern::Literal(source.clone()));
                }
                Regex::new(source)
                    .map(Pattern::Regex)
                    .map_err(|source_err| ConfigError::InvalidPattern {
                        rule: self.name.clone(),
                        pattern: source.clone(),
                        source: source_err,
                    })
            })
            .collect()
    }
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Compiled rule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Pattern {
    /// Plain substring.
    Literal(String),
    Regex(Regex),
}

impl Pattern {
    pub fn is_match(&self, haystack: &str) -> bool {
        match self {
            Pattern::Literal(needle) => haystack.contains(needle.as_str()),
            Pattern::Regex(re) => re.is_match(haystack),
        }
    }
}

/// A validated rule. Immutable once built.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    kind: CategoryKind,
    required: Vec<Pattern>,
    excluded: Vec<Pattern>,
    any_of: Vec<Pattern>,
    spec: RuleSpec,
}

impl CategoryRule {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    pub fn priority(&self) -> i32 {
        self.spec.priority
    }

    /// The data this rule was compiled from.
    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    /// Whether `line` satisfies every clause of this rule.
    pub fn matches(&self, line: &ParsedLine) -> bool {
        let Some(haystack) = haystack(self.spec.target, line) else {
            return false;
        };
        if self.excluded.iter().any(|p| p.is_match(&haystack)) {
            return false;
        }
        if !self.required.iter().all(|p| p.is_match(&haystack)) {
            return false;
        }
        if !self.any_of.is_empty() && !self.any_of.iter().any(|p| p.is_match(&haystack)) {
            return false;
        }
        self.spec.validator.accepts(line)
    }
}

fn haystack(target: MatchTarget, line: &ParsedLine) -> Option<Cow<'_, str>> {
    match target {
        MatchTarget::Message => Some(Cow::Borrowed(line.message.as_str())),
        MatchTarget::SystemTag => line.system_tag.as_deref().map(Cow::Borrowed),
        MatchTarget::Body => Some(match &line.system_tag {
            Some(tag) if line.message.is_empty() => Cow::Owned(format!("[{tag}]")),
            Some(tag) => Cow::Owned(format!("[{tag}] {}", line.message)),
            None => Cow::Borrowed(line.message.as_str()),
        }),
    }
}

// ---------------------------------------------------------------------------
// Built-in table
// ---------------------------------------------------------------------------

/// The default rule table, in declaration order.
pub fn builtin_rules() -> Vec<RuleSpec> {
    use CategoryKind as K;

    // System phrases are anchored to the start of the message (after an
    // optional `: `) or to a preceding tag, so an NPC quoting one
    // ("Zana: Connecting to the Atlas…") still reaches the dialogue rule.
    vec![
        RuleSpec::new("warning", K::Warning, 0).validator(Validator::ElevatedSeverity),
        RuleSpec::new("chat", K::Chat, 10).validator(Validator::ChatPrefix),
        RuleSpec::new("trade", K::Trade, 15)
            .any_of(&[r"^(: )?Trade (accepted|cancelled)"])
            .regex(),
        RuleSpec::new("death", K::Death, 20)
            .required(&[extract::DEATH_PATTERN])
            .regex(),
        RuleSpec::new("level-up", K::LevelUp, 21)
            .required(&[extract::LEVEL_UP_PATTERN])
            .regex(),
        RuleSpec::new("skill", K::Skill, 22)
            .any_of(&[
                r"^(: )?[^:]*have received",
                r"^(: )?Successfully (un)?allocated passive skill",
            ])
            .regex(),
        RuleSpec::new("gameplay", K::Gameplay, 30)
            .any_of(&[
                r"^(: )?(Failed to apply item:|Item has no space for more Mods|Cannot use that item)",
                r"^(: )?(You cannot|Not enough) ",
            ])
            .regex(),
        RuleSpec::new("guild", K::Guild, 31)
            .any_of(&[r"^(: )?Joined guild", r"^(: )?[^:]*guild named", r"^(: )?GUILD UPDATE"])
            .regex(),
        RuleSpec::new("item-filter", K::ItemFilter, 40)
            .target(MatchTarget::SystemTag)
            .required(&["Item Filter"]),
        RuleSpec::new("graphics", K::Graphics, 41)
            .target(MatchTarget::Body)
            .any_of(&[
                "[SHADER]",
                "[TEXTURE]",
                "[RENDER]",
                "[VULKAN]",
                "[SCENE]",
                "[MESH]",
                "[MAT]",
                "[TRAILS]",
                "[GRAPH]",
                "[VIDEO]",
                "[PARTICLE]",
                "[STREAMLINE]",
                "Shader uses incorrect vertex layout",
                ".fxgraph",
                "EngineGraphs",
            ]),
        RuleSpec::new("engine", K::Engine, 42)
            .target(MatchTarget::Body)
            .any_of(&[
                r"\[(ENTITY|ENGINE|JOB|STORAGE|BUNDLE|WINDOW|RESOURCE)\]",
                r"^(\[[^\]]+\] )?(Client-Safe Instance ID|Generating level)",
            ])
            .regex(),
        RuleSpec::new("audio", K::Audio, 43)
            .target(MatchTarget::Body)
            .any_of(&["[SOUND]", "[AUDIO]"]),
        RuleSpec::new("network", K::Network, 44)
            .target(MatchTarget::Body)
            .any_of(&[
                r"^\[HTTP2\]",
                r"^(\[[^\]]+\] )?(Backup )?(User agent|Using backend|Web root):",
                r"^(\[[^\]]+\] )?(Async connecting|Connecting|Connected) to ",
                r"^(\[[^\]]+\] )?(Got Instance Details|Connect time to instance)",
                r"^(\[[^\]]+\] )?(Queue file to download|Requesting root contents|Requesting folder|Got file list|Send patching protocol)",
            ])
            .regex(),
        RuleSpec::new("dialogue", K::Dialogue, 50).validator(Validator::Dialogue),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
