//! Between-test keyspace cleanup over the administrative client.

use tracing::debug;

use crate::AdminConnector;
use crate::AdminSession;
use crate::Engine;
use crate::Result;

/// The engine's own bookkeeping keyspaces, never subject to cleanup.
pub const RESERVED_KEYSPACES: [&str; 3] = ["system", "system_auth", "system_traces"];

/// Drop every keyspace except the reserved system ones.
///
/// Opens a short-lived administrative session against the daemon's
/// current RPC endpoint. Safe to call repeatedly; with only reserved
/// keyspaces present this is a no-op.
pub fn purge_non_system_keyspaces<E, A>(engine: &E, connector: &A) -> Result<()>
where
    E: Engine,
    A: AdminConnector,
{
    let (host, port) = engine.admin_endpoint();
    debug!(host = %host, port, "cleaning store keyspaces");

    let mut session = connector.connect(&host, port)?;
    for keyspace in session.keyspaces()? {
        if !RESERVED_KEYSPACES.contains(&keyspace.as_str()) {
            session.drop_keyspace(&keyspace)?;
        }
    }
    Ok(())
}
