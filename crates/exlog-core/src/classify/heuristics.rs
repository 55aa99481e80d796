//! Shape-based validators used by the rule table.
//!
//! Neither heuristic consults a list of known names. A speaker or chat sender
//! is accepted purely on how it looks, so characters added to the game later
//! are recognised without a code change.

use crate::types::ChatChannel;

/// Words that open system lines containing a colon (`Level 3: …`,
/// `Client version: …`). Matched case-sensitively against the start of the
/// speaker.
pub const RESERVED_SPEAKER_PREFIXES: &[&str] =
    &["Has", "Is", "Been", "Now", "Level", "Client", "Server"];

pub const MAX_SPEAKER_CHARS: usize = 100;
pub const MAX_UTTERANCE_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Dialogue
// ---------------------------------------------------------------------------

/// Whether `message` reads like `Speaker Name: something said`.
pub fn looks_like_dialogue(message: &str) -> bool {
    let Some((speaker, utterance)) = message.split_once(':') else {
        return false;
    };
    is_speaker_name(speaker.trim()) && is_utterance(utterance.trim())
}

fn is_speaker_name(speaker: &str) -> bool {
    let mut chars = speaker.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_uppercase() || speaker.chars().count() > MAX_SPEAKER_CHARS {
        return false;
    }
    if RESERVED_SPEAKER_PREFIXES
        .iter()
        .any(|word| speaker.starts_with(word))
    {
        return false;
    }
    // "Siora, Blade of the Mists", "O'Brien", "Jun Ortoi-Vale"
    speaker
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '\'' | '-' | ','))
}

fn is_utterance(utterance: &str) -> bool {
    if utterance.is_empty() || utterance.starts_with('[') || utterance.ends_with(']') {
        return false;
    }
    let total = utterance.chars().count();
    if total > MAX_UTTERANCE_CHARS {
        return false;
    }
    let letters = utterance.chars().filter(|c| c.is_alphabetic()).count();
    letters * 2 >= total
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// A chat line split at its channel symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLine<'a> {
    pub channel: ChatChannel,
    /// `None` for guild system announcements.
    pub sender: Option<&'a str>,
    pub content: &'a str,
}

/// Recognise a chat line by its leading symbol.
///
/// | prefix             | channel       |
/// |--------------------|---------------|
/// | `$Name: text`      | `Global`      |
/// | `#Name: text`      | `Local`       |
/// | `&: text`          | `GuildSystem` |
/// | `&Name: text`      | `Guild`       |
/// | `@From Name: text` | `Whisper`     |
pub fn parse_chat_prefix(message: &str) -> Option<ChatLine<'_>> {
    if let Some(rest) = message.strip_prefix("@From ") {
        return named(ChatChannel::Whisper, rest);
    }
    if let Some(rest) = message.strip_prefix('$') {
        return named(ChatChannel::Global, rest);
    }
    if let Some(rest) = message.strip_prefix('#') {
        return named(ChatChannel::Local, rest);
    }
    if let Some(rest) = message.strip_prefix('&') {
        if let Some(content) = rest.strip_prefix(':') {
            return Some(ChatLine {
                channel: ChatChannel::GuildSystem,
                sender: None,
                content: content.trim_start(),
            });
        }
        return named(ChatChannel::Guild, rest);
    }
    None
}

fn named(channel: ChatChannel, rest: &str) -> Option<ChatLine<'_>> {
    let (sender, content) = rest.split_once(':')?;
    if sender.is_empty() || sender.starts_with(char::is_whitespace) {
        return None;
    }
    Some(ChatLine {
        channel,
        sender: Some(sender.trim_end()),
        content: content.trim_start(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
