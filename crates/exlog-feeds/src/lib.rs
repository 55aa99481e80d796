//! exlog-feeds — file tailing and the ingestion pipeline for exlog.
//!
//! [`file::LineSource`] reads complete lines appended to one log file and
//! detects truncation or replacement. [`pipeline::IngestionPipeline`] drives a
//! source on a fixed interval and pushes classified, deduplicated
//! [`exlog_core::Event`]s onto async channels for its subscribers.

pub mod error;
pub mod file;
pub mod pipeline;

pub use error::WatchError;
pub use file::{Batch, LineSource, RawLine, ResetReason};
pub use pipeline::{replay, IngestionPipeline, PipelineState, SessionStats, WatchAck, WatchSession};
