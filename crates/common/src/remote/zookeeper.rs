//! Live ZooKeeper sessions

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use zookeeper_client as zk;

use super::{Connector, NodeData, NodeStat, RemoteError, RemoteNamespace};

/// A ZooKeeper session bound to one server address
#[derive(Clone)]
pub struct ZkNamespace {
    address: String,
    client: zk::Client,
}

impl ZkNamespace {
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Debug for ZkNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZkNamespace")
            .field("address", &self.address)
            .finish()
    }
}

impl From<zk::Stat> for NodeStat {
    fn from(stat: zk::Stat) -> Self {
        Self {
            ctime_millis: stat.ctime,
            mtime_millis: stat.mtime,
            create_txn_id: stat.czxid,
            modify_txn_id: stat.mzxid,
            child_txn_id: stat.pzxid,
            version: stat.version,
            child_version: stat.cversion,
            acl_version: stat.aversion,
            ephemeral_owner_id: stat.ephemeral_owner,
            data_length: stat.data_length,
            num_children: stat.num_children,
        }
    }
}

fn map_error(path: &str, err: zk::Error) -> RemoteError {
    match err {
        zk::Error::NoNode => RemoteError::NodeNotFound(path.to_string()),
        other => RemoteError::Session(other.to_string()),
    }
}

#[async_trait]
impl RemoteNamespace for ZkNamespace {
    async fn list_children(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        self.client
            .list_children(path)
            .await
            .map_err(|e| map_error(path, e))
    }

    async fn get_node(&self, path: &str) -> Result<NodeData, RemoteError> {
        let (value, stat) = self
            .client
            .get_data(path)
            .await
            .map_err(|e| map_error(path, e))?;
        Ok(NodeData {
            value,
            stat: stat.into(),
        })
    }
}

/// Opens ZooKeeper sessions with fixed timeouts
#[derive(Debug, Clone)]
pub struct ZkConnector {
    session_timeout: Duration,
    connection_timeout: Duration,
}

impl Default for ZkConnector {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(10),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl ZkConnector {
    pub fn new(session_timeout: Duration, connection_timeout: Duration) -> Self {
        Self {
            session_timeout,
            connection_timeout,
        }
    }
}

#[async_trait]
impl Connector for ZkConnector {
    async fn connect(&self, address: &str) -> Result<Box<dyn RemoteNamespace>, RemoteError> {
        tracing::debug!(
            address,
            session_timeout_ms = self.session_timeout.as_millis() as u64,
            "opening zookeeper session"
        );
        let client = zk::Client::connector()
            .session_timeout(self.session_timeout)
            .connection_timeout(self.connection_timeout)
            .connect(address)
            .await
            .map_err(|e| RemoteError::Connection(format!("{}: {}", address, e)))?;

        Ok(Box::new(ZkNamespace {
            address: address.to_string(),
            client,
        }))
    }
}
