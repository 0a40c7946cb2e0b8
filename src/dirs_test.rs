use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tempfile::tempdir;

use crate::dirs::reset_directory;
use crate::dirs::reset_engine_state;
use crate::Engine;
use crate::Error;
use crate::ResetError;
use crate::Result;

/// Engine stub whose directory layout is handed in directly.
struct StubEngine {
    commit_log: PathBuf,
    data: Vec<PathBuf>,
    create_directories: bool,
    create_calls: AtomicUsize,
    commit_log_resets: AtomicUsize,
}

impl StubEngine {
    fn new(commit_log: PathBuf, data: Vec<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            commit_log,
            data,
            create_directories: true,
            create_calls: AtomicUsize::new(0),
            commit_log_resets: AtomicUsize::new(0),
        })
    }
}

impl Engine for Arc<StubEngine> {
    type Daemon = ();

    fn activate(&self) -> Self::Daemon {}

    fn create_all_directories(&self) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.create_directories {
            fs::create_dir_all(&self.commit_log)?;
            for dir in &self.data {
                fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }

    fn reset_commit_log(&self) {
        self.commit_log_resets.fetch_add(1, Ordering::SeqCst);
    }

    fn commit_log_directory(&self) -> PathBuf {
        self.commit_log.clone()
    }

    fn data_directories(&self) -> Vec<PathBuf> {
        self.data.clone()
    }

    fn admin_endpoint(&self) -> (String, u16) {
        ("127.0.0.1".to_string(), 0)
    }
}

fn populate(dir: &Path) {
    fs::create_dir_all(dir.join("nested")).expect("mkdir");
    fs::write(dir.join("nested").join("segment-1.db"), b"x").expect("write");
    fs::write(dir.join("stale.log"), b"y").expect("write");
}

#[test]
fn test_reset_directory_wipes_and_recreates() {
    let tmp = tempdir().expect("tempdir");
    let dir = tmp.path().join("scratch");
    populate(&dir);

    reset_directory(&dir).expect("reset should succeed");

    assert!(dir.is_dir());
    assert_eq!(fs::read_dir(&dir).expect("read_dir").count(), 0);
}

#[test]
fn test_reset_directory_creates_a_missing_directory() {
    let tmp = tempdir().expect("tempdir");
    let dir = tmp.path().join("never-existed");

    reset_directory(&dir).expect("reset should succeed");
    assert!(dir.is_dir());
}

#[test]
fn test_reset_engine_state_leaves_directories_present_and_empty() {
    let tmp = tempdir().expect("tempdir");
    let commit_log = tmp.path().join("commitlog");
    let data = vec![tmp.path().join("data0"), tmp.path().join("data1")];
    populate(&commit_log);
    for d in &data {
        populate(d);
    }

    let engine = StubEngine::new(commit_log.clone(), data.clone());
    reset_engine_state(&engine).expect("reset should succeed");

    for dir in std::iter::once(&commit_log).chain(data.iter()) {
        assert!(dir.is_dir(), "{} must exist after reset", dir.display());
        assert_eq!(
            fs::read_dir(dir).expect("read_dir").count(),
            0,
            "{} must be empty after reset",
            dir.display()
        );
    }

    // create -> wipe -> create, then one commit-log repair.
    assert_eq!(engine.create_calls.load(Ordering::SeqCst), 2);
    assert_eq!(engine.commit_log_resets.load(Ordering::SeqCst), 1);
}

#[test]
fn test_reset_engine_state_fails_on_missing_configured_directory() {
    let tmp = tempdir().expect("tempdir");
    let commit_log = tmp.path().join("commitlog");
    let data = vec![tmp.path().join("data0")];

    // An engine that never creates its directories: the wipe must treat
    // the absent commit log as a misconfiguration.
    let mut stub = StubEngine::new(commit_log.clone(), data);
    Arc::get_mut(&mut stub).expect("sole owner").create_directories = false;

    let result = reset_engine_state(&stub);
    match result {
        Err(Error::Reset(ResetError::MissingDirectory { path })) => {
            assert_eq!(path, commit_log);
        }
        other => panic!("expected MissingDirectory, got {other:?}"),
    }

    assert_eq!(stub.commit_log_resets.load(Ordering::SeqCst), 0);
}
