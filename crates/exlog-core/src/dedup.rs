//! Deduplicator — suppresses re-emission of an event already delivered in the
//! current watch session.
//!
//! The identity of an event is a short key: timestamp, category and the first
//! `key_chars` characters of the message, hashed to a `u64`. Two distinct
//! lines that share all three collide and the second is dropped; that is the
//! accepted cost of constant-size keys.
//!
//! Lines without a header (stack traces, wrapped continuation text) have no
//! timestamp to tell one occurrence from the next, so they are never treated
//! as duplicates and never remembered.
//!
//! The set is cleared by the pipeline whenever the source resets (truncation,
//! replacement) and when a new watch starts.

use crate::types::Event;
use std::{
    collections::{hash_map::DefaultHasher, HashSet},
    hash::{Hash, Hasher},
};

pub const DEFAULT_KEY_CHARS: usize = 50;

/// Hashed identity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey(u64);

#[derive(Debug, Clone)]
pub struct Deduplicator {
    seen: HashSet<DedupKey>,
    key_chars: usize,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_CHARS)
    }
}

impl Deduplicator {
    pub fn new(key_chars: usize) -> Self {
        Self {
            seen: HashSet::new(),
            key_chars,
        }
    }

    pub fn key(&self, event: &Event) -> DedupKey {
        let mut hasher = DefaultHasher::new();
        event.timestamp.hash(&mut hasher);
        event.category.hash(&mut hasher);
        let prefix_end = event
            .message
            .char_indices()
            .nth(self.key_chars)
            .map_or(event.message.len(), |(idx, _)| idx);
        event.message[..prefix_end].hash(&mut hasher);
        DedupKey(hasher.finish())
    }

    pub fn is_duplicate(&self, event: &Event) -> bool {
        has_identity(event) && self.seen.contains(&self.key(event))
    }

    pub fn remember(&mut self, event: &Event) {
        if has_identity(event) {
            self.seen.insert(self.key(event));
        }
    }

    /// Remember `event` and report whether it was new.
    pub fn admit(&mut self, event: &Event) -> bool {
        !has_identity(event) || self.seen.insert(self.key(event))
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

fn has_identity(event: &Event) -> bool {
    !event.timestamp.is_empty()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, ChatChannel};

    fn event(timestamp: &str, category: Category, message: &str) -> Event {
        Event {
            timestamp: timestamp.to_string(),
            category,
            message: message.to_string(),
            raw: format!("{timestamp} {message}"),
            player_name: None,
            character_class: None,
            level: None,
            chat_channel: None,
            chat_sender: None,
        }
    }

    #[test]
    fn same_event_twice_is_a_duplicate() {
        let mut dedup = Deduplicator::default();
        let e = event("2025/11/04 19:24:34", Category::Engine, "[ENGINE] ok");
        assert!(!dedup.is_duplicate(&e));
        dedup.remember(&e);
        assert!(dedup.is_duplicate(&e));
        assert!(!dedup.admit(&e));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn timestamp_and_category_are_part_of_the_key() {
        let mut dedup = Deduplicator::default();
        assert!(dedup.admit(&event("2025/11/04 19:24:34", Category::Engine, "x")));
        assert!(dedup.admit(&event("2025/11/04 19:24:35", Category::Engine, "x")));
        assert!(dedup.admit(&event("2025/11/04 19:24:35", Category::Audio, "x")));
        assert!(dedup.admit(&event(
            "2025/11/04 19:24:35",
            Category::Chat(ChatChannel::Local),
            "x"
        )));
        assert!(!dedup.admit(&event(
            "2025/11/04 19:24:35",
            Category::Chat(ChatChannel::Local),
            "x"
        )));
    }

    #[test]
    fn only_the_message_prefix_counts() {
        let mut dedup = Deduplicator::new(5);
        assert!(dedup.admit(&event("t", Category::Unknown, "abcdefXXX")));
        assert!(!dedup.admit(&event("t", Category::Unknown, "abcdeYYYYYY")));
        assert!(dedup.admit(&event("t", Category::Unknown, "abcd")));
    }

    #[test]
    fn prefix_respects_char_boundaries() {
        let mut dedup = Deduplicator::new(2);
        assert!(dedup.admit(&event("t", Category::Dialogue, "äöü")));
        assert!(!dedup.admit(&event("t", Category::Dialogue, "äöx")));
    }

    #[test]
    fn headerless_lines_are_never_duplicates() {
        let mut dedup = Deduplicator::default();
        let trace = event("", Category::Unknown, "    at Engine::tick()");
        assert!(dedup.admit(&trace));
        assert!(dedup.admit(&trace));
        dedup.remember(&trace);
        assert!(!dedup.is_duplicate(&trace));
        assert!(dedup.is_empty());
    }

    #[test]
    fn clear_forgets_everything() {
        let mut dedup = Deduplicator::default();
        let e = event("t", Category::Unknown, "m");
        dedup.remember(&e);
        dedup.clear();
        assert!(dedup.is_empty());
        assert!(!dedup.is_duplicate(&e));
    }
}
