//! LineSource — incremental tail of a single log file.
//!
//! Polls after [`LineSource::open`] walk the backlog from offset 0, at most
//! `max_batch_bytes` per poll, then return only complete lines appended since
//! the cursor. A trailing line without its terminator is left in the file and
//! picked up on a later poll once the writer finishes it.
//!
//! Before each read the file at the watched path is compared against the
//! [`Fingerprint`] from the previous poll. A shrink, an inode change or a
//! modification time that moves backwards means the file was truncated or
//! replaced: the path is reopened, the cursor goes back to 0 and the returned
//! [`Batch`] carries the [`ResetReason`].

use crate::error::WatchError;
use exlog_core::config::DEFAULT_MAX_BATCH_BYTES;
use std::{
    borrow::Cow,
    fs::{File, Metadata},
    io::{self, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    time::SystemTime,
};

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Cheap identity of the file behind a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub len: u64,
    pub modified: Option<SystemTime>,
    /// Unix only.
    pub inode: Option<u64>,
}

impl Fingerprint {
    pub fn of(meta: &Metadata) -> Self {
        Self {
            len: meta.len(),
            modified: meta.modified().ok(),
            inode: inode(meta),
        }
    }
}

#[cfg(unix)]
fn inode(meta: &Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ino())
}

#[cfg(not(unix))]
fn inode(_meta: &Metadata) -> Option<u64> {
    None
}

/// Why the source started over from offset 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    /// The file is shorter than what was already read.
    Truncated,
    /// A different file now lives at the path.
    Replaced,
    /// Modification time went backwards.
    Rewound,
}

impl std::fmt::Display for ResetReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetReason::Truncated => write!(f, "truncated"),
            ResetReason::Replaced => write!(f, "replaced"),
            ResetReason::Rewound => write!(f, "rewound"),
        }
    }
}

// ---------------------------------------------------------------------------
// Batch + RawLine
// ---------------------------------------------------------------------------

/// One line of text and the byte offset it started at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine<'a> {
    /// Lossy UTF-8, terminator stripped (`\n` or `\r\n`).
    pub text: Cow<'a, str>,
    pub offset: u64,
}

/// The bytes consumed by one poll.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    start: u64,
    buf: Vec<u8>,
    reset: Option<ResetReason>,
}

impl Batch {
    /// Lines in file order. Decoding happens lazily as the iterator advances.
    pub fn lines(&self) -> Lines<'_> {
        Lines {
            buf: &self.buf,
            pos: 0,
            base: self.start,
        }
    }

    /// Set when this poll started over from offset 0.
    pub fn reset(&self) -> Option<ResetReason> {
        self.reset
    }

    pub fn start_offset(&self) -> u64 {
        self.start
    }

    /// Number of bytes consumed.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Iterator over the lines of a [`Batch`].
pub struct Lines<'a> {
    buf: &'a [u8],
    pos: usize,
    base: u64,
}

impl<'a> Iterator for Lines<'a> {
    type Item = RawLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buf.len() {
            return None;
        }
        let rest = &self.buf[self.pos..];
        let (line, consumed) = match rest.iter().position(|&b| b == b'\n') {
            Some(nl) => (&rest[..nl], nl + 1),
            None => (rest, rest.len()),
        };
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let offset = self.base + self.pos as u64;
        self.pos += consumed;
        Some(RawLine {
            text: String::from_utf8_lossy(line),
            offset,
        })
    }
}

// ---------------------------------------------------------------------------
// LineSource
// ---------------------------------------------------------------------------

pub struct LineSource {
    path: PathBuf,
    file: File,
    cursor: u64,
    fingerprint: Fingerprint,
    max_batch_bytes: u64,
    /// The last poll stopped at the cap with more complete data behind it.
    behind: bool,
}

impl std::fmt::Debug for LineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSource")
            .field("path", &self.path)
            .field("cursor", &self.cursor)
            .field("fingerprint", &self.fingerprint)
            .field("max_batch_bytes", &self.max_batch_bytes)
            .finish()
    }
}

impl LineSource {
    /// Open `path` for tailing. The cursor starts at 0 so the first poll
    /// returns the existing backlog.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WatchError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|err| WatchError::open(&path, err))?;
        let meta = file.metadata().map_err(|err| WatchError::open(&path, err))?;
        if !meta.is_file() {
            return Err(WatchError::NotAFile(path));
        }
        Ok(Self {
            fingerprint: Fingerprint::of(&meta),
            path,
            file,
            cursor: 0,
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            behind: false,
        })
    }

    /// Cap the bytes read by one poll. A single line longer than the cap is
    /// still returned whole. Zero is treated as one.
    pub fn with_max_batch_bytes(mut self, max: u64) -> Self {
        self.max_batch_bytes = max.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset of the first unconsumed byte.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Whether the last poll was cut short by the batch cap, so the next one
    /// can run without waiting for new writes.
    pub fn is_behind(&self) -> bool {
        self.behind
    }

    /// Read the complete lines appended since the last poll, up to the batch
    /// cap.
    ///
    /// On error nothing is consumed; the next poll retries from the same
    /// cursor.
    pub fn poll(&mut self) -> io::Result<Batch> {
        self.read_batch(false)
    }

    /// Like [`poll`](Self::poll), but a final unterminated line is consumed
    /// too once the read reaches end of file. Used for one-shot reads of a
    /// file that is no longer written.
    pub fn poll_to_end(&mut self) -> io::Result<Batch> {
        self.read_batch(true)
    }

    fn read_batch(&mut self, include_partial: bool) -> io::Result<Batch> {
        let current = Fingerprint::of(&std::fs::metadata(&self.path)?);

        let reset = self.detect_reset(&current);
        let mut cursor = self.cursor;
        if reset.is_some() {
            self.file = File::open(&self.path)?;
            cursor = 0;
            self.cursor = 0;
        }

        let len = self.file.metadata()?.len();
        let available = len.saturating_sub(cursor);
        let mut buf = Vec::new();
        if available > 0 {
            self.file.seek(SeekFrom::Start(cursor))?;
            let mut complete = self.read_chunk(available, &mut buf)?;
            // A line longer than the cap: keep reading until it ends.
            while complete == 0 && (buf.len() as u64) < available {
                let before = buf.len();
                complete = self.read_chunk(available, &mut buf)?;
                if buf.len() == before {
                    break;
                }
            }
            let at_end = buf.len() as u64 >= available;
            if !(include_partial && at_end) {
                buf.truncate(complete);
            }
            self.behind = !at_end && complete > 0;
        } else {
            self.behind = false;
        }

        self.cursor = cursor + buf.len() as u64;
        self.fingerprint = current;
        Ok(Batch {
            start: cursor,
            buf,
            reset,
        })
    }

    /// Append up to one cap's worth of the `available` bytes to `buf` and
    /// return the length of its complete-line prefix.
    fn read_chunk(&mut self, available: u64, buf: &mut Vec<u8>) -> io::Result<usize> {
        let want = (available - buf.len() as u64).min(self.max_batch_bytes);
        (&mut self.file).take(want).read_to_end(buf)?;
        Ok(buf.iter().rposition(|&b| b == b'\n').map_or(0, |nl| nl + 1))
    }

    fn detect_reset(&self, current: &Fingerprint) -> Option<ResetReason> {
        if let (Some(before), Some(now)) = (self.fingerprint.inode, current.inode) {
            if before != now {
                return Some(ResetReason::Replaced);
            }
        }
        if current.len < self.cursor || current.len < self.fingerprint.len {
            return Some(ResetReason::Truncated);
        }
        if let (Some(before), Some(now)) = (self.fingerprint.modified, current.modified) {
            if now < before {
                return Some(ResetReason::Rewound);
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
