//! Public coordinator tying admission, preparation, reset, launch and
//! cleanup together.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;
use tracing::warn;

use crate::cleaner;
use crate::config_prep;
use crate::launcher;
use crate::AdminConnector;
use crate::Engine;
use crate::LaunchDecision;
use crate::LifecycleGuard;
use crate::Result;
use crate::DEFAULT_CONFIG_RESOURCE;

/// Default bound on the readiness wait.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Default scratch directory for per-run config copies.
pub const DEFAULT_SCRATCH_DIR: &str = "target/embedded-store";

/// One embedded store daemon per test process.
///
/// The harness is meant to be constructed once and shared for the whole
/// test run; the daemon it launches lives until process exit. `start` is
/// idempotent for a given config document, and a second start with a
/// *different* config is rejected outright.
pub struct ServerHarness<E: Engine, A: AdminConnector> {
    engine: Arc<E>,
    connector: A,
    guard: LifecycleGuard,
    daemon: Mutex<Option<E::Daemon>>,
}

impl<E: Engine, A: AdminConnector> ServerHarness<E, A> {
    pub fn new(engine: E, connector: A) -> Self {
        Self {
            engine: Arc::new(engine),
            connector,
            guard: LifecycleGuard::new(),
            daemon: Mutex::new(None),
        }
    }

    /// Start with the bundled default template, default scratch directory
    /// and default timeout.
    pub fn start(&self) -> Result<()> {
        self.start_config_with(
            DEFAULT_CONFIG_RESOURCE,
            Path::new(DEFAULT_SCRATCH_DIR),
            DEFAULT_STARTUP_TIMEOUT,
        )
    }

    /// Start with the bundled default template and a custom timeout.
    pub fn start_with_timeout(&self, timeout: Duration) -> Result<()> {
        self.start_config_with(DEFAULT_CONFIG_RESOURCE, Path::new(DEFAULT_SCRATCH_DIR), timeout)
    }

    /// Start with a named config resource (bundled name or file path).
    pub fn start_config(&self, resource: &str) -> Result<()> {
        self.start_config_with(resource, Path::new(DEFAULT_SCRATCH_DIR), DEFAULT_STARTUP_TIMEOUT)
    }

    /// Full-control start: config resource, scratch directory and
    /// readiness timeout.
    ///
    /// The first call runs the complete initialization sequence:
    /// scratch-dir recreation, template copy + port rewrite, engine
    /// directory reset, daemon activation and the bounded readiness wait.
    /// A later call with the same config identity returns `Ok` without
    /// touching the filesystem; a different identity fails with
    /// [`LifecycleError::ConflictingConfiguration`](crate::LifecycleError).
    pub fn start_config_with(
        &self,
        resource: &str,
        scratch_dir: &Path,
        timeout: Duration,
    ) -> Result<()> {
        let identity = config_prep::prepared_config_path(resource, scratch_dir)?;
        match self.guard.request_launch(&identity)? {
            LaunchDecision::AlreadyRunning => {
                // nothing to do, the daemon is already up
                return Ok(());
            }
            LaunchDecision::Proceed => {}
        }

        debug!(resource, "starting embedded store daemon...");
        let prepared = config_prep::prepare_config(resource, scratch_dir)?;
        let daemon =
            launcher::launch_and_wait(Arc::clone(&self.engine), &prepared, scratch_dir, timeout)?;

        *self.daemon.lock() = Some(daemon);
        self.guard.mark_running(prepared.ports);
        Ok(())
    }

    /// Drop every non-system keyspace on the running daemon.
    pub fn clean_state(&self) -> Result<()> {
        cleaner::purge_non_system_keyspaces(self.engine.as_ref(), &self.connector)
    }

    /// RPC port of the running daemon; `0` before a successful start.
    pub fn rpc_port(&self) -> u16 {
        self.guard.ports().rpc
    }

    /// Native transport port of the running daemon; `0` before a
    /// successful start.
    pub fn native_transport_port(&self) -> u16 {
        self.guard.ports().native_transport
    }

    /// Stopping the embedded daemon is not supported; it persists for the
    /// process lifetime. This method only logs and returns.
    #[deprecated(note = "the embedded daemon cannot be stopped; it lives until process exit")]
    pub fn stop(&self) {
        warn!("ServerHarness::stop() is deprecated and does nothing; the daemon runs until process exit");
    }
}
