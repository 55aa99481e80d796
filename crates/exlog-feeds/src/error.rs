//! Errors that cross the watch boundary.
//!
//! Only opening a file and building the pipeline can fail from the host's
//! point of view. I/O errors while polling are logged and retried on the next
//! tick; they never surface here.

use exlog_core::ConfigError;
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("log file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("watch task terminated abnormally")]
    TaskFailed(#[source] tokio::task::JoinError),
}

impl WatchError {
    /// Classify an error from opening or inspecting `path`.
    pub fn open(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => WatchError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => WatchError::PermissionDenied(path.to_path_buf()),
            _ => WatchError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}
