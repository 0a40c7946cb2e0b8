//! # store-harness
//!
//! Boots a single in-process data-store daemon for the lifetime of a test
//! process and resets its state between test cases without restarting the
//! process.
//!
//! The engine itself is an external collaborator: it is handed to the
//! harness through the [`Engine`] trait and treated as an opaque daemon
//! with an activate/become-ready contract. Keyspace cleanup between tests
//! goes through an equally opaque [`AdminConnector`].
//!
//! Typical lifecycle:
//!
//! ```ignore
//! let harness = ServerHarness::new(MyEngine::default(), MyConnector::default());
//! harness.start()?;                 // first test: full boot
//! harness.start()?;                 // later tests: no-op
//! harness.clean_state()?;           // between tests: drop non-system keyspaces
//! let port = harness.native_transport_port();
//! ```
//!
//! The daemon is never shut down; it lives until process exit. Launching a
//! second, differently-configured daemon in the same process is rejected.

mod cleaner;
mod config_prep;
mod dirs;
mod engine;
mod errors;
mod harness;
mod launcher;
mod lifecycle;
mod ports;

pub use cleaner::*;
pub use config_prep::*;
pub use dirs::*;
pub use engine::*;
pub use errors::*;
pub use harness::*;
pub use launcher::*;
pub use lifecycle::*;
pub use ports::*;

//-----------------------------------------------------------
// Unit tests live in sibling `*_test.rs` files.

#[cfg(test)]
mod dirs_test;

#[cfg(test)]
pub(crate) fn enable_logger() {
    static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
    *LOGGER_INIT;
}
