//! Deterministic directory-state reset for the scratch directory and the
//! engine's commit-log/data directories.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::Engine;
use crate::ResetError;
use crate::Result;

/// Recursively delete `path` if it exists, then recreate it empty.
pub fn reset_directory(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)?;
    Ok(())
}

/// Wipe the engine's on-disk state and realign its write-ahead log.
///
/// Sequence: create-all-directories, delete them, create-all-directories
/// again, then repair the commit-log state. The engine therefore only
/// ever observes directories that exist, never missing ones, and its
/// in-memory log pointer ends up consistent with the now-empty commit log.
pub fn reset_engine_state<E: Engine>(engine: &E) -> Result<()> {
    engine.create_all_directories()?;
    wipe_engine_directories(engine)?;
    engine.create_all_directories()?;
    engine.reset_commit_log();
    Ok(())
}

/// Delete the commit-log directory and every data directory. A configured
/// directory that does not exist is a fatal misconfiguration.
fn wipe_engine_directories<E: Engine>(engine: &E) -> Result<()> {
    let mut directories = vec![engine.commit_log_directory()];
    directories.extend(engine.data_directories());

    for dir in directories {
        if !dir.exists() {
            return Err(ResetError::MissingDirectory { path: dir }.into());
        }
        debug!(dir = %dir.display(), "wiping engine directory");
        fs::remove_dir_all(&dir)?;
    }
    Ok(())
}
