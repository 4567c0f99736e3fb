//! Session seam to the remote namespace store
//!
//! The mirror never talks to a wire protocol directly. It goes through
//! [`RemoteNamespace`], which lists children and fetches single nodes, and a
//! [`Connector`], which opens a session for an address.
//!
//! # Implementations
//!
//! - **[`MemoryNamespace`]**: an in-process tree, used for tests and the
//!   built-in demo data set
//! - **[`ZkNamespace`]**: a live ZooKeeper session (feature `zookeeper`)
//!
//! Every call is attempted exactly once. Failures surface as
//! [`RemoteError`] and are never retried here.

mod memory;
#[cfg(feature = "zookeeper")]
mod zookeeper;

pub use memory::{MemoryConnector, MemoryNamespace};
#[cfg(feature = "zookeeper")]
pub use zookeeper::{ZkConnector, ZkNamespace};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata the remote store keeps for every node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStat {
    /// Creation time, millis since the Unix epoch
    pub ctime_millis: i64,
    /// Last modification time, millis since the Unix epoch
    pub mtime_millis: i64,
    /// Transaction id that created the node (czxid)
    pub create_txn_id: i64,
    /// Transaction id of the last data change (mzxid)
    pub modify_txn_id: i64,
    /// Transaction id of the last child list change (pzxid)
    pub child_txn_id: i64,
    /// Data version
    pub version: i32,
    /// Child list version
    pub child_version: i32,
    /// ACL version
    pub acl_version: i32,
    /// Session id of the owner for ephemeral nodes, 0 otherwise
    pub ephemeral_owner_id: i64,
    /// Length of the value in bytes
    pub data_length: i32,
    /// Number of children
    pub num_children: i32,
}

/// A node's value together with its metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeData {
    pub value: Vec<u8>,
    pub stat: NodeStat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The path does not exist on the remote store
    #[error("node not found: {0}")]
    NodeNotFound(String),
    /// The session failed while serving a request
    #[error("session error: {0}")]
    Session(String),
    /// A session could not be established
    #[error("connection error: {0}")]
    Connection(String),
}

/// An established session to a remote namespace
#[async_trait]
pub trait RemoteNamespace: Send + Sync + std::fmt::Debug {
    /// List the raw segment names of the children of `path`
    async fn list_children(&self, path: &str) -> Result<Vec<String>, RemoteError>;

    /// Fetch the value and metadata of `path`
    async fn get_node(&self, path: &str) -> Result<NodeData, RemoteError>;
}

/// Opens sessions to a remote namespace
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug {
    /// Connect to `address` (`host:port`)
    async fn connect(&self, address: &str) -> Result<Box<dyn RemoteNamespace>, RemoteError>;
}
