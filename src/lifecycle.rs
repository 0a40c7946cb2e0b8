//! Process-wide launch singleton enforcement.
//!
//! The guard owns an explicit `Uninitialized | Starting | Running` state
//! machine instead of implicit static fields, which turns the
//! "no two configurations per process" rule into a plain state-transition
//! check. There is no unregister operation; the state lives for the
//! process's lifetime.

use std::path::Path;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::LifecycleError;
use crate::ResolvedPorts;
use crate::Result;

/// Outcome of an admission check for a launch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchDecision {
    /// First request: the caller now owns the initialization sequence.
    Proceed,
    /// Same config already launched (or launching): skip initialization
    /// entirely. This is the harness's sole idempotency guarantee, not a
    /// health check of the running daemon.
    AlreadyRunning,
}

#[derive(Debug)]
enum LifecycleState {
    Uninitialized,
    Starting { config: PathBuf },
    Running { config: PathBuf, ports: ResolvedPorts },
}

/// Tracks whether a daemon has been launched in this process, and with
/// which config document.
#[derive(Debug)]
pub struct LifecycleGuard {
    state: Mutex<LifecycleState>,
}

impl Default for LifecycleGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleGuard {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::Uninitialized),
        }
    }

    /// Atomic check-and-record: at most one caller ever gets
    /// [`LaunchDecision::Proceed`]. A later request with the same config
    /// identity is admitted as a no-op; a different identity is rejected.
    pub fn request_launch(&self, identity: &Path) -> Result<LaunchDecision> {
        let mut state = self.state.lock();
        match &*state {
            LifecycleState::Uninitialized => {
                *state = LifecycleState::Starting {
                    config: identity.to_path_buf(),
                };
                Ok(LaunchDecision::Proceed)
            }
            LifecycleState::Starting { config } | LifecycleState::Running { config, .. } => {
                if config == identity {
                    Ok(LaunchDecision::AlreadyRunning)
                } else {
                    Err(LifecycleError::ConflictingConfiguration {
                        running: config.clone(),
                        requested: identity.to_path_buf(),
                    }
                    .into())
                }
            }
        }
    }

    /// Complete the `Starting -> Running` transition with the resolved
    /// ports. Ignored in any other state.
    pub fn mark_running(&self, ports: ResolvedPorts) {
        let mut state = self.state.lock();
        if let LifecycleState::Starting { config } = &*state {
            *state = LifecycleState::Running {
                config: config.clone(),
                ports,
            };
        }
    }

    /// Ports recorded at launch; all-zero unless the daemon is running.
    pub fn ports(&self) -> ResolvedPorts {
        match &*self.state.lock() {
            LifecycleState::Running { ports, .. } => *ports,
            _ => ResolvedPorts::default(),
        }
    }
}
