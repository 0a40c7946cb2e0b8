//! Collaborator contracts for the embedded engine and its admin client.
//!
//! The harness never implements a storage engine. It drives one through
//! [`Engine`], the activate/become-ready contract of the real daemon, and
//! cleans up between tests through [`AdminConnector`], a short-lived
//! administrative connection on the engine's RPC endpoint.

use std::path::PathBuf;

use crate::Result;

/// The embedded data-store engine, treated as an opaque daemon.
///
/// Configuration is passed out of band: before activation the launcher
/// points the [`ENV_CONFIG`](crate::ENV_CONFIG) environment variable at
/// the prepared config document, and the engine is expected to read it
/// there. The directory accessors report what the engine's *live*
/// configuration resolves to.
pub trait Engine: Send + Sync + 'static {
    /// Handle to the running daemon. Created once, never destroyed by the
    /// harness; the daemon persists until process exit.
    type Daemon: Send + 'static;

    /// Construct and activate the engine instance. Returns only once the
    /// engine is ready to accept connections. Runs on the launcher's
    /// dedicated worker thread, never on the caller's.
    fn activate(&self) -> Self::Daemon;

    /// The engine's own directory-creation routine: create every
    /// directory named in its live configuration.
    fn create_all_directories(&self) -> Result<()>;

    /// Realign the engine's in-memory write-ahead-log state with an
    /// empty-on-disk commit log. Called after the wipe, before activation.
    fn reset_commit_log(&self);

    /// Commit-log directory from the engine's live configuration.
    fn commit_log_directory(&self) -> PathBuf;

    /// All data-file directories from the engine's live configuration.
    fn data_directories(&self) -> Vec<PathBuf>;

    /// Administrative (RPC) host and port from the engine's live
    /// configuration.
    fn admin_endpoint(&self) -> (String, u16);
}

/// One administrative session against the running daemon.
pub trait AdminSession {
    /// Names of every keyspace currently defined, system ones included.
    fn keyspaces(&mut self) -> Result<Vec<String>>;

    fn drop_keyspace(&mut self, name: &str) -> Result<()>;
}

/// Opens short-lived administrative connections.
pub trait AdminConnector {
    type Session: AdminSession;

    fn connect(&self, host: &str, port: u16) -> Result<Self::Session>;
}
