//! Test builders — raw log lines and log files on disk.
//!
//! These are for readability in tests, not production use. They panic on I/O
//! failure rather than returning `Result`.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

// ---------------------------------------------------------------------------
// LineBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for header-shaped raw lines.
///
/// ```rust
/// let raw = LineBuilder::new("19:24:34")
///     .level("WARN")
///     .body("[SHADER] Shader uses incorrect vertex layout")
///     .build();
/// ```
pub struct LineBuilder {
    date: String,
    time: String,
    counter: u64,
    thread: String,
    level: String,
    source: String,
    pid: u32,
    body: String,
}

impl LineBuilder {
    pub fn new(time: impl Into<String>) -> Self {
        Self {
            date: "2025/11/04".to_string(),
            time: time.into(),
            counter: 188_191_812,
            thread: "3ef232c2".to_string(),
            level: "INFO".to_string(),
            source: "Client".to_string(),
            pid: 7776,
            body: String::new(),
        }
    }

    /// A line `second` seconds after 19:00:00, with a matching counter.
    pub fn at_second(second: usize) -> Self {
        let time = format!(
            "{:02}:{:02}:{:02}",
            19 + second / 3600,
            (second / 60) % 60,
            second % 60
        );
        let mut builder = Self::new(time);
        builder.counter += second as u64 * 1000;
        builder
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn counter(mut self, counter: u64) -> Self {
        self.counter = counter;
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn timestamp(&self) -> String {
        format!("{} {}", self.date, self.time)
    }

    pub fn build(self) -> String {
        format!(
            "{} {} {} {} [{} {} {}] {}",
            self.date, self.time, self.counter, self.thread, self.level, self.source, self.pid,
            self.body
        )
    }
}

// ---------------------------------------------------------------------------
// LogFile
// ---------------------------------------------------------------------------

/// A log file inside its own temporary directory.
pub struct LogFile {
    tmp: tempfile::TempDir,
    path: PathBuf,
}

impl LogFile {
    /// Create `Client.txt` with `lines`, each newline-terminated.
    pub fn with_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Client.txt");
        std::fs::write(&path, join_lines(lines)).expect("write log file");
        Self { tmp: dir, path }
    }

    pub fn empty() -> Self {
        Self::with_lines::<&str>(&[])
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.tmp.path()
    }

    /// Append newline-terminated lines.
    pub fn append<S: AsRef<str>>(&self, lines: &[S]) {
        self.append_raw(&join_lines(lines));
    }

    /// Append bytes verbatim (no terminator added).
    pub fn append_raw(&self, data: &str) {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .expect("open for append");
        file.write_all(data.as_bytes()).expect("append");
        file.flush().expect("flush");
    }

    /// Truncate in place (same inode) and write `lines`.
    pub fn truncate_with<S: AsRef<str>>(&self, lines: &[S]) {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)
            .expect("open for truncate");
        file.write_all(join_lines(lines).as_bytes()).expect("rewrite");
        file.flush().expect("flush");
    }

    /// Move the current file aside and create a fresh one at the same path.
    pub fn rotate_with<S: AsRef<str>>(&self, lines: &[S]) {
        std::fs::rename(&self.path, self.dir().join("Client.txt.1")).expect("rotate");
        std::fs::write(&self.path, join_lines(lines)).expect("write rotated file");
    }
}

fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines.iter().fold(String::new(), |mut acc, line| {
        acc.push_str(line.as_ref());
        acc.push('\n');
        acc
    })
}
