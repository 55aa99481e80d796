//! exlog-core — line parsing and categorisation for exlog.
//!
//! Everything in this crate is synchronous and free of I/O. The feed crate
//! drives these stages once per line read from the watched file:
//!
//! ```text
//! parser::parse ──► CategoryEngine::classify ──► Event ──► Deduplicator
//! ```
//!
//! The engine is built once from [`config::ClassifierConfig`] (or the
//! built-in table) and shared read-only across watch sessions.

pub mod classify;
pub mod config;
pub mod dedup;
pub mod error;
pub mod parser;
pub mod types;

pub use classify::CategoryEngine;
pub use dedup::Deduplicator;
pub use error::ConfigError;
pub use types::{
    Category, CategoryKind, ChatChannel, Classification, Event, ExtractedFields, LogLevel,
    ParsedLine,
};

/// Parse and classify one raw line into an [`Event`]. Pure; deduplication is
/// left to the caller.
pub fn process_line(engine: &CategoryEngine, raw: &str) -> Event {
    let parsed = parser::parse(raw);
    let classification = engine.classify(&parsed);
    Event::new(parsed, classification, raw.trim_end_matches(['\r', '\n']))
}
