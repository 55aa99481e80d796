//! exlog — live categorisation of game client logs.
//!
//! The binary is a headless host: it watches a `Client.txt`-style log, and
//! writes every classified event to stdout as one JSON object per line.
//!
//! # Architecture
//!
//! ```text
//! LineSource ──► parse ──► CategoryEngine ──► Deduplicator ──► subscribers
//!  (feeds)        (core)       (core)            (core)          (host)
//! ```
//!
//! The library half of this package only holds the output side so the
//! integration harnesses can check the exact wire shape.

use exlog_core::Event;
use std::io::{self, Write};

/// Write `event` to `out` as one JSON line and flush, so a downstream reader
/// sees it immediately.
pub fn write_event(out: &mut impl Write, event: &Event) -> io::Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    out.write_all(b"\n")?;
    out.flush()
}
