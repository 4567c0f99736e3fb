//! Core of the zkview namespace explorer.
//!
//! This crate mirrors a remote hierarchical namespace (a coordination-service
//! tree of small valued nodes) into a local tree, one level at a time, and
//! renders node names and values for display:
//! - [`mirror`]: lazy expansion, subtree refresh and leaf refresh
//! - [`content`]: JSON / URL-query / raw detection and conversion
//! - [`path`]: absolute path building and segment decoding
//! - [`remote`]: the session seam to the remote store
//! - [`explorer`]: one active session plus its mirror, swapped together
//! - [`display`]: detail blocks and tree rows
//! - [`servers`]: the recent-server list

pub mod content;
pub mod display;
pub mod explorer;
pub mod mirror;
pub mod path;
pub mod remote;
pub mod servers;

pub use content::{ContentKind, ContentMode};
pub use explorer::{Explorer, ExplorerError};
pub use mirror::{ExpansionState, MirrorError, NodeId, NodeRecord, TreeMirror};
pub use remote::{Connector, NodeStat, RemoteError, RemoteNamespace};
pub use servers::RecentServers;
