//! Error hierarchy for the embedded-store harness.
//!
//! Every failure is surfaced synchronously to the calling thread; nothing
//! is logged-and-suppressed except the deprecated stop operation, which
//! only warns and returns.

use std::path::PathBuf;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Process-singleton violations (second launch with a different config)
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Daemon activation failures (readiness never signaled)
    #[error(transparent)]
    Startup(#[from] StartupError),

    /// Engine directory-state reset failures
    #[error(transparent)]
    Reset(#[from] ResetError),

    /// A config resource id matched neither a bundled template nor a file on disk
    #[error("unknown config resource: {0}")]
    UnknownResource(String),

    /// Filesystem failures, propagated untranslated
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Two configurations cannot be launched in one process. Unrecoverable;
    /// the caller must restart the test process.
    #[error("cannot launch two store configurations in one process (running: {}, requested: {})", .running.display(), .requested.display())]
    ConflictingConfiguration { running: PathBuf, requested: PathBuf },
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Readiness latch never fired within the configured wait
    #[error("store daemon did not signal readiness within {timeout:?}")]
    Timeout { timeout: Duration },

    /// The waiting thread was interrupted while blocked on the latch
    #[error("interrupted while waiting for the store daemon to start")]
    Interrupted,
}

#[derive(Debug, thiserror::Error)]
pub enum ResetError {
    /// A configured commit-log or data directory is absent at reset time.
    /// Signals a packaging/config defect, not a transient condition.
    #[error("no such directory: {}", .path.display())]
    MissingDirectory { path: PathBuf },
}
