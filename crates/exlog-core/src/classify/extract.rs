//! Field extraction for death and level-up announcements.
//!
//! The same patterns back the built-in `death` and `level-up` rules, so a line
//! that wins one of those rules always yields its fields.

use regex::Regex;
use std::sync::LazyLock;

/// `: Name has been slain.`
pub const DEATH_PATTERN: &str = r"^: (\w+) has been slain\.";

/// `: Name (Class) is now level N`
pub const LEVEL_UP_PATTERN: &str = r"^: (.+?) \(([^()]+)\) is now level (\d+)";

static DEATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEATH_PATTERN).expect("death pattern is a valid regex"));

static LEVEL_UP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(LEVEL_UP_PATTERN).expect("level-up pattern is a valid regex"));

/// Player name from a death line.
pub fn death(message: &str) -> Option<String> {
    DEATH.captures(message).map(|caps| caps[1].to_string())
}

/// A level-up announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUp {
    pub player_name: String,
    pub character_class: String,
    pub level: u32,
}

pub fn level_up(message: &str) -> Option<LevelUp> {
    let caps = LEVEL_UP.captures(message)?;
    Some(LevelUp {
        player_name: caps[1].to_string(),
        character_class: caps[2].to_string(),
        level: caps[3].parse().ok()?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
