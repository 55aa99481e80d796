//! LineParser — splits one raw log line into a [`ParsedLine`].
//!
//! Expected shape:
//!
//! ```text
//! DATE       TIME     COUNTER   THREAD   [LEVEL SOURCE PID] [SYSTEMTAG] MESSAGE
//! 2025/11/04 19:24:34 188191812 3ef232c2 [INFO Client 7776] [SHADER] Compiled …
//! ```
//!
//! [`parse`] never fails. A line that does not fit the header shape comes back
//! with every structured field empty and the whole line as `message`.

use crate::types::{LogLevel, ParsedLine};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

/// `chrono` format of the header timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}) (\d+) ([0-9A-Za-z]+) \[(\S+) (\S+) (\d+)\](?: (.*))?$",
    )
    .expect("header pattern is a valid regex")
});

/// Parse a raw line. Trailing `\r`/`\n` are ignored.
pub fn parse(raw: &str) -> ParsedLine {
    let line = raw.trim_end_matches(['\r', '\n']);

    let Some(caps) = HEADER.captures(line) else {
        return ParsedLine::unstructured(line);
    };

    // The regex guarantees digits; overflow is the only way these fail.
    let (Ok(monotonic_counter), Ok(process_id)) = (caps[2].parse::<i64>(), caps[6].parse::<u32>())
    else {
        return ParsedLine::unstructured(line);
    };
    // Digits in the right places are not enough: `2025/13/45` is not a date.
    if NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_FORMAT).is_err() {
        return ParsedLine::unstructured(line);
    }

    let rest = caps.get(7).map_or("", |m| m.as_str());
    let (system_tag, message) = split_system_tag(rest);

    ParsedLine {
        timestamp: caps[1].to_string(),
        monotonic_counter,
        thread_id: caps[3].to_string(),
        level: LogLevel::from_token(&caps[4]),
        source_tag: caps[5].to_string(),
        process_id,
        system_tag: system_tag.map(str::to_string),
        message: message.to_string(),
    }
}

/// Peel one leading `[TAG]` off the text after the header. Any further
/// bracketed tags stay in the message verbatim.
fn split_system_tag(rest: &str) -> (Option<&str>, &str) {
    let Some(inner) = rest.strip_prefix('[') else {
        return (None, rest);
    };
    match inner.find(']') {
        Some(end) if end > 0 && !inner[..end].contains('[') => {
            let tag = &inner[..end];
            let after = &inner[end + 1..];
            (Some(tag), after.strip_prefix(' ').unwrap_or(after))
        }
        _ => (None, rest),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
