//! Shared fakes for the full-flow harness tests: an engine that behaves
//! like a well-mannered daemon on local directories, and an in-memory
//! administrative endpoint.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use parking_lot::Mutex;

use store_harness::AdminConnector;
use store_harness::AdminSession;
use store_harness::Engine;
use store_harness::Result;

#[derive(Default)]
pub struct FakeEngineState {
    pub create_calls: AtomicUsize,
    pub commit_log_resets: AtomicUsize,
    pub activations: AtomicUsize,
}

/// Engine fake rooted at a test-owned directory. Cheap to clone so tests
/// can keep inspecting the state the harness drives.
#[derive(Clone)]
pub struct FakeEngine {
    root: PathBuf,
    admin_port: u16,
    pub state: Arc<FakeEngineState>,
}

impl FakeEngine {
    pub fn new(root: PathBuf, admin_port: u16) -> Self {
        Self {
            root,
            admin_port,
            state: Arc::new(FakeEngineState::default()),
        }
    }
}

impl Engine for FakeEngine {
    type Daemon = ();

    fn activate(&self) -> Self::Daemon {
        self.state.activations.fetch_add(1, Ordering::SeqCst);
    }

    fn create_all_directories(&self) -> Result<()> {
        self.state.create_calls.fetch_add(1, Ordering::SeqCst);
        fs::create_dir_all(self.commit_log_directory())?;
        for dir in self.data_directories() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    fn reset_commit_log(&self) {
        self.state.commit_log_resets.fetch_add(1, Ordering::SeqCst);
    }

    fn commit_log_directory(&self) -> PathBuf {
        self.root.join("commitlog")
    }

    fn data_directories(&self) -> Vec<PathBuf> {
        vec![self.root.join("data")]
    }

    fn admin_endpoint(&self) -> (String, u16) {
        ("127.0.0.1".to_string(), self.admin_port)
    }
}

/// In-memory keyspace catalog shared between the "daemon" and the test.
#[derive(Clone, Default)]
pub struct FakeAdmin {
    pub keyspaces: Arc<Mutex<Vec<String>>>,
}

impl FakeAdmin {
    pub fn with_keyspaces(names: &[&str]) -> Self {
        Self {
            keyspaces: Arc::new(Mutex::new(names.iter().map(|s| s.to_string()).collect())),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.keyspaces.lock().clone()
    }
}

pub struct FakeSession {
    catalog: Arc<Mutex<Vec<String>>>,
}

impl AdminSession for FakeSession {
    fn keyspaces(&mut self) -> Result<Vec<String>> {
        Ok(self.catalog.lock().clone())
    }

    fn drop_keyspace(&mut self, name: &str) -> Result<()> {
        self.catalog.lock().retain(|ks| ks != name);
        Ok(())
    }
}

impl AdminConnector for FakeAdmin {
    type Session = FakeSession;

    fn connect(&self, _host: &str, _port: u16) -> Result<FakeSession> {
        Ok(FakeSession {
            catalog: Arc::clone(&self.keyspaces),
        })
    }
}
