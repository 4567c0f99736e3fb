//! One active session together with the mirror built from it
//!
//! The session and mirror are swapped as a unit: a mirror never outlives
//! the session that populated it.

use crate::mirror::{MirrorError, NodeId, NodeRecord, TreeMirror};
use crate::remote::{Connector, RemoteError, RemoteNamespace};
use crate::servers::normalize_address;

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("not connected to a server")]
    NotConnected,
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[derive(Debug)]
struct Session {
    address: String,
    client: Box<dyn RemoteNamespace>,
}

/// Owner of the active session and its mirror
#[derive(Debug, Default)]
pub struct Explorer {
    session: Option<Session>,
    mirror: TreeMirror,
    legacy_bootstrap_root: bool,
}

impl Explorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_legacy_bootstrap_root(mut self, enabled: bool) -> Self {
        self.legacy_bootstrap_root = enabled;
        self.mirror = self.fresh_mirror();
        self
    }

    /// Address of the active session
    pub fn address(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.address.as_str())
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn mirror(&self) -> &TreeMirror {
        &self.mirror
    }

    /// Open a session to `address` and install it with an empty mirror.
    ///
    /// The current session and mirror are only replaced once the new
    /// session is established. The mirror is not populated here; call
    /// [`Explorer::refresh_root`] afterwards.
    pub async fn connect(
        &mut self,
        connector: &dyn Connector,
        address: &str,
    ) -> Result<(), ExplorerError> {
        let address = normalize_address(address);
        tracing::info!(address = %address, "Connecting");
        let client = connector.connect(&address).await?;

        self.mirror = self.fresh_mirror();
        self.session = Some(Session { address, client });
        Ok(())
    }

    /// Drop the session and everything mirrored from it
    pub fn disconnect(&mut self) {
        self.mirror = self.fresh_mirror();
        if let Some(session) = self.session.take() {
            tracing::info!(address = %session.address, "Disconnected");
        }
    }

    pub async fn expand(&mut self, id: NodeId) -> Result<(), ExplorerError> {
        let (client, mirror) = self.parts()?;
        mirror.expand(client, id).await?;
        Ok(())
    }

    pub async fn expand_to_depth(
        &mut self,
        id: NodeId,
        depth: usize,
    ) -> Result<(), ExplorerError> {
        let (client, mirror) = self.parts()?;
        mirror.expand_to_depth(client, id, depth).await?;
        Ok(())
    }

    pub async fn refresh_root(&mut self) -> Result<Option<NodeId>, ExplorerError> {
        let (client, mirror) = self.parts()?;
        Ok(mirror.refresh_root(client).await?)
    }

    pub async fn refresh_leaf(&mut self, id: NodeId) -> Result<&NodeRecord, ExplorerError> {
        let (client, mirror) = self.parts()?;
        Ok(mirror.refresh_leaf(client, id).await?)
    }

    pub async fn resolve(&mut self, path: &str) -> Result<NodeId, ExplorerError> {
        let (client, mirror) = self.parts()?;
        Ok(mirror.resolve(client, path).await?)
    }

    /// Split into the active client and the mirror it feeds
    fn parts(&mut self) -> Result<(&dyn RemoteNamespace, &mut TreeMirror), ExplorerError> {
        let session = self.session.as_ref().ok_or(ExplorerError::NotConnected)?;
        Ok((session.client.as_ref(), &mut self.mirror))
    }

    fn fresh_mirror(&self) -> TreeMirror {
        TreeMirror::new().with_legacy_bootstrap_root(self.legacy_bootstrap_root)
    }
}
