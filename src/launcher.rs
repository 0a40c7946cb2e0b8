//! Daemon activation on a dedicated single-use worker, with a bounded
//! readiness wait on the calling thread.

use std::env;
use std::path::Path;
use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;
use tracing::error;

use crate::config_prep;
use crate::dirs;
use crate::Engine;
use crate::PreparedConfig;
use crate::Result;
use crate::StartupError;
use crate::DIAGNOSTICS_CONFIG_RESOURCE;

/// Environment variable the engine reads to locate its config document.
pub const ENV_CONFIG: &str = "STORE_CONFIG";
/// Foreground / no-daemonize flag read by the engine at activation time.
pub const ENV_FOREGROUND: &str = "STORE_FOREGROUND";
/// Engine diagnostics configuration; only set when the caller has not
/// already supplied one.
pub const ENV_LOG_CONFIG: &str = "STORE_LOG_CONFIG";

/// Reset the engine's on-disk state, then activate it on a dedicated
/// worker thread and block until it signals readiness or `timeout`
/// elapses.
///
/// Activation is fire-and-forget from the worker's perspective: the
/// worker feeds nothing but the ready daemon back through the latch, so
/// an engine-internal activation failure is visible only as the latch
/// never firing. A timeout is a fatal test-environment error; the daemon
/// may still finish starting in the background and nothing can retract
/// that work.
pub fn launch_and_wait<E: Engine>(
    engine: Arc<E>,
    prepared: &PreparedConfig,
    scratch_dir: &Path,
    timeout: Duration,
) -> Result<E::Daemon> {
    env::set_var(ENV_CONFIG, &prepared.path);
    env::set_var(ENV_FOREGROUND, "true");

    // If there is no diagnostics config set already, fall back to the bundled one
    if env::var_os(ENV_LOG_CONFIG).is_none() {
        let diagnostics = config_prep::copy_resource(DIAGNOSTICS_CONFIG_RESOURCE, scratch_dir)?;
        env::set_var(ENV_LOG_CONFIG, diagnostics);
    }

    dirs::reset_engine_state(engine.as_ref())?;

    debug!("activating store daemon...");
    let (ready_tx, ready_rx) = mpsc::sync_channel::<E::Daemon>(1);
    thread::Builder::new()
        .name("store-activation".to_string())
        .spawn(move || {
            let daemon = engine.activate();
            // One-shot readiness latch; the worker is torn down right after.
            let _ = ready_tx.send(daemon);
        })?;

    match ready_rx.recv_timeout(timeout) {
        Ok(daemon) => Ok(daemon),
        Err(RecvTimeoutError::Timeout) => {
            error!(
                ?timeout,
                "store daemon did not start within the timeout. Consider increasing it"
            );
            Err(StartupError::Timeout { timeout }.into())
        }
        Err(RecvTimeoutError::Disconnected) => {
            // The worker died before signaling readiness. The activation
            // contract feeds no engine-internal errors back, so this
            // surfaces the same way as the latch never firing.
            error!("store activation worker terminated without signaling readiness");
            Err(StartupError::Timeout { timeout }.into())
        }
    }
}
