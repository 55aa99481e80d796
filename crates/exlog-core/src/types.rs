//! Core types for exlog-core.
//!
//! This module defines the data that flows through the ingestion pipeline:
//! the structured [`ParsedLine`] produced by the parser, its [`LogLevel`], the
//! closed [`Category`] set assigned by the engine, and the [`Event`] that
//! crosses the boundary to the host.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// ParsedLine
// ---------------------------------------------------------------------------

/// One log line split into its structural fields.
///
/// Parsing is best-effort. When the fixed header shape is not recognised every
/// structured field keeps its zero value and `message` holds the whole line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    /// `YYYY/MM/DD HH:MM:SS`, empty when the header was not recognised.
    pub timestamp: String,
    pub monotonic_counter: i64,
    pub thread_id: String,
    pub level: LogLevel,
    /// Subsystem named inside the header bracket (`Client`, `Engine`, …).
    pub source_tag: String,
    pub process_id: u32,
    /// First bracketed tag after the header, without the brackets.
    pub system_tag: Option<String>,
    pub message: String,
}

impl ParsedLine {
    /// A degraded line: nothing recognised, the raw text kept as the message.
    pub fn unstructured(raw: &str) -> Self {
        Self {
            message: raw.to_string(),
            ..Self::default()
        }
    }

    /// Whether the fixed header was recognised.
    pub fn is_structured(&self) -> bool {
        !self.timestamp.is_empty()
    }

    /// The timestamp as a calendar value, if it was present and well formed.
    pub fn datetime(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDateTime::parse_from_str(&self.timestamp, crate::parser::TIMESTAMP_FORMAT)
            .ok()
    }
}

/// Severity carried in the line header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Crit,
    #[default]
    Unknown,
}

impl LogLevel {
    /// Map a header token to a level. Anything unrecognised is `Unknown`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "INFO" => LogLevel::Info,
            "WARN" | "WARNING" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            "CRIT" | "CRITICAL" => LogLevel::Crit,
            _ => LogLevel::Unknown,
        }
    }

    /// WARN, ERROR and CRIT.
    pub fn is_elevated(self) -> bool {
        matches!(self, LogLevel::Warn | LogLevel::Error | LogLevel::Crit)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Crit => write!(f, "CRIT"),
            LogLevel::Unknown => write!(f, "unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Channel of a chat line, decided by its leading symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatChannel {
    /// `$Name: text`
    Global,
    /// `#Name: text`
    Local,
    /// `&Name: text`
    Guild,
    /// `&: text`
    GuildSystem,
    /// `@From Name: text`
    Whisper,
}

impl ChatChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatChannel::Global => "Global",
            ChatChannel::Local => "Local",
            ChatChannel::Guild => "Guild",
            ChatChannel::GuildSystem => "GuildSystem",
            ChatChannel::Whisper => "Whisper",
        }
    }
}

impl fmt::Display for ChatChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fieldless category tag, as named in rule definitions and configuration.
///
/// `Chat` rules carry no channel here; the channel is resolved from the line
/// itself when the rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    Death,
    LevelUp,
    Skill,
    Dialogue,
    Chat,
    /// Trade window outcomes (`Trade accepted.`, `Trade cancelled.`).
    Trade,
    GuildSystem,
    Guild,
    Gameplay,
    ItemFilter,
    Network,
    Graphics,
    Engine,
    Audio,
    Warning,
    Unknown,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 16] = [
        CategoryKind::Death,
        CategoryKind::LevelUp,
        CategoryKind::Skill,
        CategoryKind::Dialogue,
        CategoryKind::Chat,
        CategoryKind::Trade,
        CategoryKind::GuildSystem,
        CategoryKind::Guild,
        CategoryKind::Gameplay,
        CategoryKind::ItemFilter,
        CategoryKind::Network,
        CategoryKind::Graphics,
        CategoryKind::Engine,
        CategoryKind::Audio,
        CategoryKind::Warning,
        CategoryKind::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Death => "Death",
            CategoryKind::LevelUp => "LevelUp",
            CategoryKind::Skill => "Skill",
            CategoryKind::Dialogue => "Dialogue",
            CategoryKind::Chat => "Chat",
            CategoryKind::Trade => "Trade",
            CategoryKind::GuildSystem => "GuildSystem",
            CategoryKind::Guild => "Guild",
            CategoryKind::Gameplay => "Gameplay",
            CategoryKind::ItemFilter => "ItemFilter",
            CategoryKind::Network => "Network",
            CategoryKind::Graphics => "Graphics",
            CategoryKind::Engine => "Engine",
            CategoryKind::Audio => "Audio",
            CategoryKind::Warning => "Warning",
            CategoryKind::Unknown => "Unknown",
        }
    }

    /// Case-sensitive lookup by tag name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The semantic category assigned to a line. Exactly one per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Death,
    LevelUp,
    Skill,
    Dialogue,
    Chat(ChatChannel),
    Trade,
    GuildSystem,
    Guild,
    Gameplay,
    ItemFilter,
    Network,
    Graphics,
    Engine,
    Audio,
    Warning,
    Unknown,
}

impl Category {
    pub fn kind(self) -> CategoryKind {
        match self {
            Category::Death => CategoryKind::Death,
            Category::LevelUp => CategoryKind::LevelUp,
            Category::Skill => CategoryKind::Skill,
            Category::Dialogue => CategoryKind::Dialogue,
            Category::Chat(_) => CategoryKind::Chat,
            Category::Trade => CategoryKind::Trade,
            Category::GuildSystem => CategoryKind::GuildSystem,
            Category::Guild => CategoryKind::Guild,
            Category::Gameplay => CategoryKind::Gameplay,
            Category::ItemFilter => CategoryKind::ItemFilter,
            Category::Network => CategoryKind::Network,
            Category::Graphics => CategoryKind::Graphics,
            Category::Engine => CategoryKind::Engine,
            Category::Audio => CategoryKind::Audio,
            Category::Warning => CategoryKind::Warning,
            Category::Unknown => CategoryKind::Unknown,
        }
    }

    /// Tag name as it appears on the wire. Chat channels share the `Chat` name.
    pub fn name(self) -> &'static str {
        self.kind().as_str()
    }
}

impl From<CategoryKind> for Category {
    /// `Chat` without a resolved channel maps to `Chat(Global)`; the engine
    /// always resolves the channel before building a `Category`.
    fn from(kind: CategoryKind) -> Self {
        match kind {
            CategoryKind::Death => Category::Death,
            CategoryKind::LevelUp => Category::LevelUp,
            CategoryKind::Skill => Category::Skill,
            CategoryKind::Dialogue => Category::Dialogue,
            CategoryKind::Chat => Category::Chat(ChatChannel::Global),
            CategoryKind::Trade => Category::Trade,
            CategoryKind::GuildSystem => Category::GuildSystem,
            CategoryKind::Guild => Category::Guild,
            CategoryKind::Gameplay => Category::Gameplay,
            CategoryKind::ItemFilter => Category::ItemFilter,
            CategoryKind::Network => Category::Network,
            CategoryKind::Graphics => Category::Graphics,
            CategoryKind::Engine => Category::Engine,
            CategoryKind::Audio => Category::Audio,
            CategoryKind::Warning => Category::Warning,
            CategoryKind::Unknown => Category::Unknown,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Chat(channel) => write!(f, "Chat({channel})"),
            other => f.write_str(other.name()),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Extraction + Event
// ---------------------------------------------------------------------------

/// Optional fields pulled out of a line by the rule that classified it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub player_name: Option<String>,
    pub character_class: Option<String>,
    pub level: Option<u32>,
    pub chat_channel: Option<ChatChannel>,
    pub chat_sender: Option<String>,
}

/// Result of running a [`ParsedLine`] through the category engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub fields: ExtractedFields,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            category: Category::Unknown,
            fields: ExtractedFields::default(),
        }
    }
}

/// A classified line, as delivered to the host.
///
/// Absent optional fields are omitted from the serialized form rather than
/// written as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub timestamp: String,
    pub category: Category,
    pub message: String,
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_channel: Option<ChatChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_sender: Option<String>,
}

impl Event {
    /// Assemble an event from a parsed line, its classification and the
    /// untouched raw text.
    pub fn new(parsed: ParsedLine, classification: Classification, raw: impl Into<String>) -> Self {
        let Classification { category, fields } = classification;
        Self {
            timestamp: parsed.timestamp,
            category,
            message: parsed.message,
            raw: raw.into(),
            player_name: fields.player_name,
            character_class: fields.character_class,
            level: fields.level,
            chat_channel: fields.chat_channel,
            chat_sender: fields.chat_sender,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
