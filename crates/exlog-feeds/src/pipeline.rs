//! IngestionPipeline — the watch lifecycle.
//!
//! One pipeline owns at most one active watch. `start` opens the file and
//! spawns a polling task; every tick that task reads new lines on the blocking
//! pool, turns them into events and fans them out to subscribers in file
//! order. A tick reads at most `max_batch_bytes`; while the source is behind
//! the next tick fires immediately. `stop` cancels the task and waits for it,
//! so once `stop` returns no further events are delivered for that session.
//!
//! ```text
//! interval tick ──► spawn_blocking(LineSource::poll + classify + dedup)
//!                          │
//!                          ▼
//!               subscribers (unbounded mpsc, one per subscribe())
//! ```

use crate::{
    error::WatchError,
    file::{Batch, LineSource},
};
use exlog_core::{config::WatchSettings, process_line, CategoryEngine, Deduplicator, Event};
use std::{
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinHandle},
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Counters for one watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub lines_read: u64,
    pub events_emitted: u64,
    pub duplicates_suppressed: u64,
    pub blank_lines_skipped: u64,
    pub resets: u64,
    pub poll_errors: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PipelineState {
    /// No watch has been started yet.
    #[default]
    Idle,
    Watching { path: PathBuf },
    Stopped,
}

/// Acknowledgement returned by [`IngestionPipeline::start`] and
/// [`IngestionPipeline::stop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAck {
    Started { path: PathBuf },
    /// `session` is `None` when nothing was running.
    Stopped { session: Option<(PathBuf, SessionStats)> },
}

// ---------------------------------------------------------------------------
// WatchSession
// ---------------------------------------------------------------------------

/// Per-watch state: the source, its dedup set and counters.
///
/// Everything here is synchronous. The pipeline moves the session onto the
/// blocking pool for each tick; [`replay`] drives it directly.
#[derive(Debug)]
pub struct WatchSession {
    source: LineSource,
    dedup: Deduplicator,
    skip_blank_lines: bool,
    stats: SessionStats,
}

impl WatchSession {
    pub fn new(source: LineSource, settings: &WatchSettings) -> Self {
        Self {
            source: source.with_max_batch_bytes(settings.max_batch_bytes),
            dedup: Deduplicator::new(settings.dedup_key_chars),
            skip_blank_lines: settings.skip_blank_lines,
            stats: SessionStats::default(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn path(&self) -> &Path {
        self.source.path()
    }

    /// More complete lines are waiting than the last tick was allowed to read.
    pub fn is_behind(&self) -> bool {
        self.source.is_behind()
    }

    /// Poll once and return the new, deduplicated events in file order.
    pub fn tick(&mut self, engine: &CategoryEngine) -> io::Result<Vec<Event>> {
        let batch = self.source.poll()?;
        Ok(self.ingest(&batch, engine))
    }

    /// Read everything up to end of file, including an unterminated last line.
    pub fn drain(&mut self, engine: &CategoryEngine) -> io::Result<Vec<Event>> {
        let mut events = Vec::new();
        loop {
            let batch = self.source.poll_to_end()?;
            let done = batch.is_empty();
            events.extend(self.ingest(&batch, engine));
            if done {
                return Ok(events);
            }
        }
    }

    fn ingest(&mut self, batch: &Batch, engine: &CategoryEngine) -> Vec<Event> {
        if let Some(reason) = batch.reset() {
            info!(
                path = %self.source.path().display(),
                %reason,
                "log file reset, reading from the start"
            );
            self.dedup.clear();
            self.stats.resets += 1;
        }

        let mut events = Vec::new();
        let mut duplicates = 0u64;
        for line in batch.lines() {
            self.stats.lines_read += 1;
            if self.skip_blank_lines && line.text.trim().is_empty() {
                self.stats.blank_lines_skipped += 1;
                continue;
            }
            let event = process_line(engine, &line.text);
            if self.dedup.admit(&event) {
                events.push(event);
            } else {
                duplicates += 1;
            }
        }
        self.stats.duplicates_suppressed += duplicates;

        if !batch.is_empty() {
            debug!(
                offset = batch.start_offset(),
                bytes = batch.len(),
                events = events.len(),
                duplicates,
                "batch ingested"
            );
        }
        events
    }
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct Subscribers(Arc<Mutex<Vec<mpsc::UnboundedSender<Event>>>>);

impl Subscribers {
    fn add(&self) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(tx);
        rx
    }

    /// Deliver to every live subscriber, pruning closed ones. Returns the
    /// number of subscribers dropped.
    fn emit(&self, event: &Event) -> usize {
        let mut senders = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let before = senders.len();
        senders.retain(|tx| tx.send(event.clone()).is_ok());
        before - senders.len()
    }
}

// ---------------------------------------------------------------------------
// IngestionPipeline
// ---------------------------------------------------------------------------

struct ActiveWatch {
    path: PathBuf,
    token: CancellationToken,
    handle: JoinHandle<Result<SessionStats, JoinError>>,
}

pub struct IngestionPipeline {
    engine: Arc<CategoryEngine>,
    settings: WatchSettings,
    subscribers: Subscribers,
    active: Option<ActiveWatch>,
    state: PipelineState,
}

impl IngestionPipeline {
    pub fn new(engine: Arc<CategoryEngine>, settings: WatchSettings) -> Result<Self, WatchError> {
        settings.validate()?;
        Ok(Self {
            engine,
            settings,
            subscribers: Subscribers::default(),
            active: None,
            state: PipelineState::Idle,
        })
    }

    /// Register a consumer. Receives every event emitted after this call, for
    /// this and all later sessions. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Event> {
        self.subscribers.add()
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn settings(&self) -> &WatchSettings {
        &self.settings
    }

    /// Stop any running watch, then start watching `path` from its beginning.
    pub async fn start(&mut self, path: impl AsRef<Path>) -> Result<WatchAck, WatchError> {
        let path = path.as_ref().to_path_buf();

        match self.shutdown_active().await {
            Ok(None) => {}
            Ok(Some(_)) => self.state = PipelineState::Stopped,
            Err(err) => {
                warn!(error = %err, "previous watch ended abnormally");
                self.state = PipelineState::Stopped;
            }
        }

        let source = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || LineSource::open(path))
                .await
                .map_err(WatchError::TaskFailed)??
        };
        let session = WatchSession::new(source, &self.settings);
        let token = CancellationToken::new();

        let handle = tokio::spawn(run_session(
            session,
            Arc::clone(&self.engine),
            self.subscribers.clone(),
            token.clone(),
            self.settings.clone(),
        ));

        info!(path = %path.display(), interval_ms = self.settings.poll_interval_ms, "watch started");
        self.active = Some(ActiveWatch {
            path: path.clone(),
            token,
            handle,
        });
        self.state = PipelineState::Watching { path: path.clone() };
        Ok(WatchAck::Started { path })
    }

    /// Stop the running watch, if any. Safe to call repeatedly.
    pub async fn stop(&mut self) -> Result<WatchAck, WatchError> {
        let session = self.shutdown_active().await;
        self.state = PipelineState::Stopped;
        Ok(WatchAck::Stopped { session: session? })
    }

    async fn shutdown_active(&mut self) -> Result<Option<(PathBuf, SessionStats)>, WatchError> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };
        active.token.cancel();

        let stats = match active.handle.await {
            Ok(Ok(stats)) => stats,
            Ok(Err(err)) | Err(err) => {
                error!(path = %active.path.display(), error = %err, "watch task failed");
                return Err(WatchError::TaskFailed(err));
            }
        };
        info!(
            path = %active.path.display(),
            lines = stats.lines_read,
            events = stats.events_emitted,
            duplicates = stats.duplicates_suppressed,
            resets = stats.resets,
            "watch stopped"
        );
        Ok(Some((active.path, stats)))
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.token.cancel();
        }
    }
}

async fn run_session(
    mut session: WatchSession,
    engine: Arc<CategoryEngine>,
    subscribers: Subscribers,
    token: CancellationToken,
    settings: WatchSettings,
) -> Result<SessionStats, JoinError> {
    let mut ticker = tokio::time::interval(settings.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    'ticks: loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let engine = Arc::clone(&engine);
        let joined = tokio::task::spawn_blocking(move || {
            let polled = session.tick(&engine);
            (session, polled)
        })
        .await;
        let (returned, polled) = match joined {
            Ok(pair) => pair,
            Err(err) => {
                error!(error = %err, "poll task panicked, watch ended");
                return Err(err);
            }
        };
        session = returned;
        if session.is_behind() {
            ticker.reset_immediately();
        }

        match polled {
            Ok(events) => {
                for event in &events {
                    if token.is_cancelled() {
                        break 'ticks;
                    }
                    let dropped = subscribers.emit(event);
                    if dropped > 0 {
                        warn!(dropped, "subscriber channel closed, unsubscribed");
                    }
                    session.stats.events_emitted += 1;
                }
            }
            Err(err) => {
                session.stats.poll_errors += 1;
                warn!(path = %session.path().display(), error = %err, "poll failed, retrying next tick");
            }
        }
    }

    Ok(session.stats)
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Read `path` once, start to end, through a fresh session and return its
/// events. No task is spawned.
pub fn replay(
    path: impl AsRef<Path>,
    engine: &CategoryEngine,
    settings: &WatchSettings,
) -> Result<Vec<Event>, WatchError> {
    let path = path.as_ref();
    let source = LineSource::open(path)?;
    let mut session = WatchSession::new(source, settings);
    session.drain(engine).map_err(|source| WatchError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
