//! Domain-specific assertion macros for exlog harnesses.
//!
//! These wrap plain comparisons with failure messages that show the raw line,
//! so a misclassification in a long corpus is easy to trace.

use exlog_core::Event;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

// ---------------------------------------------------------------------------
// Event assertions
// ---------------------------------------------------------------------------

/// Assert the serialized category name of an `Event`.
///
/// ```rust
/// assert_category!(event, "LevelUp");
/// ```
#[macro_export]
macro_rules! assert_category {
    ($event:expr, $name:expr) => {{
        let event: &exlog_core::Event = &$event;
        let expected: &str = $name;
        if event.category.name() != expected {
            panic!(
                "assert_category! failed:\n  expected: {:?}\n  actual:   {:?}\n  raw: {:?}",
                expected, event.category, event.raw
            );
        }
    }};
}

/// Assert that an `Event` serializes with `key` equal to `value`.
///
/// ```rust
/// assert_event_field!(event, "playerName", "Exile");
/// ```
#[macro_export]
macro_rules! assert_event_field {
    ($event:expr, $key:expr, $value:expr) => {{
        let event: &exlog_core::Event = &$event;
        let key: &str = $key;
        let json = serde_json::to_value(event).expect("event serializes");
        let expected = serde_json::json!($value);
        match json.get(key) {
            Some(actual) if *actual == expected => {}
            Some(actual) => panic!(
                "assert_event_field! failed:\n  event[{:?}]\n  expected: {}\n  actual:   {}\n  raw: {:?}",
                key, expected, actual, event.raw
            ),
            None => panic!(
                "assert_event_field! failed: {:?} missing.\n  event: {}",
                key, json
            ),
        }
    }};
}

/// Assert that an `Event` omits `key` from its serialized form.
#[macro_export]
macro_rules! assert_no_event_field {
    ($event:expr, $key:expr) => {{
        let event: &exlog_core::Event = &$event;
        let key: &str = $key;
        let json = serde_json::to_value(event).expect("event serializes");
        if let Some(actual) = json.get(key) {
            panic!(
                "assert_no_event_field! failed: {:?} present with {}\n  raw: {:?}",
                key, actual, event.raw
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Channel helpers
// ---------------------------------------------------------------------------

/// Receive exactly `n` events, failing if they do not all arrive in time.
pub async fn recv_n(rx: &mut UnboundedReceiver<Event>, n: usize) -> Vec<Event> {
    let mut events = Vec::with_capacity(n);
    while events.len() < n {
        match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            Ok(Some(event)) => events.push(event),
            Ok(None) => panic!("channel closed after {} of {n} events", events.len()),
            Err(_) => panic!("timed out after {} of {n} events: {events:#?}", events.len()),
        }
    }
    events
}

/// Assert that nothing arrives on `rx` within `wait`.
pub async fn assert_quiet(rx: &mut UnboundedReceiver<Event>, wait: Duration) {
    if let Ok(Some(event)) = tokio::time::timeout(wait, rx.recv()).await {
        panic!("expected no further events, got {event:#?}");
    }
}
