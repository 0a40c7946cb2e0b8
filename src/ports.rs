//! OS-assigned ephemeral port allocation.

use std::net::TcpListener;

use crate::Result;

/// Ask the OS for a currently-unused TCP port.
///
/// Binds an ephemeral listener on the wildcard address, reads back the
/// assigned port and releases the socket immediately. The port was free at
/// the instant of the call; no reservation is held afterwards, so another
/// process may grab it before the daemon binds. That race is an accepted
/// limitation of the harness, kept deliberately instead of a reservation
/// scheme that would change startup timing.
pub fn find_unused_port() -> Result<u16> {
    let listener = TcpListener::bind(("0.0.0.0", 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}
