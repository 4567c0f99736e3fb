//! Connecting to a server and keeping the recent-server list current

use common::mirror::NodeId;
use common::remote::{Connector, MemoryConnector, MemoryNamespace};
use common::servers::{normalize_address, RecentServers};
use common::{Explorer, ExplorerError};

use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session could be opened; the previous one is still active
    #[error("connection failed: {0}")]
    Connect(#[source] ExplorerError),
    /// The session is open and recorded, but the first tree load failed
    #[error("connected, but loading the tree failed: {0}")]
    Refresh(#[source] ExplorerError),
}

/// Pick the connector for this run: the built-in sample tree for demos,
/// otherwise live sessions with the configured timeouts
pub fn connector_for(state: &AppState, demo: bool) -> Box<dyn Connector> {
    if demo {
        return Box::new(MemoryConnector::serving_all(MemoryNamespace::sample()));
    }
    live_connector(state)
}

#[cfg(feature = "zookeeper")]
fn live_connector(state: &AppState) -> Box<dyn Connector> {
    Box::new(common::remote::ZkConnector::new(
        state.config.session_timeout(),
        state.config.connection_timeout(),
    ))
}

#[cfg(not(feature = "zookeeper"))]
fn live_connector(_state: &AppState) -> Box<dyn Connector> {
    tracing::warn!("Built without live session support, serving the sample tree");
    Box::new(MemoryConnector::serving_all(MemoryNamespace::sample()))
}

/// An [`Explorer`] plus the connector and server history used to
/// (re)connect it
#[derive(Debug)]
pub struct SessionManager {
    state: AppState,
    connector: Box<dyn Connector>,
    servers: RecentServers,
    explorer: Explorer,
}

impl SessionManager {
    pub fn new(state: AppState, connector: Box<dyn Connector>) -> Self {
        let servers = state.load_servers();
        let explorer = Explorer::new().with_legacy_bootstrap_root(state.config.legacy_bootstrap_root);
        Self {
            state,
            connector,
            servers,
            explorer,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn servers(&self) -> &RecentServers {
        &self.servers
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    pub fn explorer_mut(&mut self) -> &mut Explorer {
        &mut self.explorer
    }

    /// The address to use when none is given: the most recent server
    pub fn default_address(&self) -> String {
        self.servers
            .most_recent()
            .map(str::to_string)
            .unwrap_or_else(|| common::servers::DEFAULT_SERVER.to_string())
    }

    /// Connect to `address`, or the most recent server when `None`, then
    /// load the root and first level.
    ///
    /// Once the session is open the address moves to the front of the
    /// recent list and the list is saved; a failure to save is logged,
    /// not returned. The tree is loaded last, so a failed load still
    /// leaves the new session installed and recorded.
    pub async fn connect(&mut self, address: Option<&str>) -> Result<Option<NodeId>, SessionError> {
        let address = match address {
            Some(address) => normalize_address(address),
            None => self.default_address(),
        };

        self.explorer
            .connect(self.connector.as_ref(), &address)
            .await
            .map_err(SessionError::Connect)?;

        self.servers.promote(&address);
        if let Err(e) = self.state.save_servers(&self.servers) {
            tracing::warn!(error = %e, "Could not save server list");
        }

        self.explorer
            .refresh_root()
            .await
            .map_err(SessionError::Refresh)
    }
}
