//! In-process namespace store
//!
//! Behaves like a small coordination-service tree: every node has a value,
//! metadata and an insertion-ordered child list. Listings come back in
//! insertion order, not sorted, the way a real server makes no ordering
//! promise.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Connector, NodeData, NodeStat, RemoteError, RemoteNamespace};
use crate::path::{self, ROOT};

/// Logical clock origin for node timestamps (2020-09-13 12:26:40 UTC)
const CLOCK_ORIGIN_MILLIS: i64 = 1_600_000_000_000;

#[derive(Debug, Clone, Default)]
struct MemoryNode {
    value: Vec<u8>,
    stat: NodeStat,
    children: Vec<String>,
}

#[derive(Debug)]
struct Inner {
    nodes: HashMap<String, MemoryNode>,
    next_txn: i64,
}

/// Shared in-memory namespace; clones see the same tree
#[derive(Debug, Clone)]
pub struct MemoryNamespace {
    inner: Arc<RwLock<Inner>>,
    round_trips: Arc<AtomicU64>,
}

impl Default for MemoryNamespace {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNamespace {
    /// Create a namespace holding only the root
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT.to_string(),
            MemoryNode {
                stat: NodeStat {
                    ctime_millis: CLOCK_ORIGIN_MILLIS,
                    mtime_millis: CLOCK_ORIGIN_MILLIS,
                    ..Default::default()
                },
                ..Default::default()
            },
        );

        Self {
            inner: Arc::new(RwLock::new(Inner { nodes, next_txn: 1 })),
            round_trips: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A small sample tree of animals, fruits and vegetables
    pub fn sample() -> Self {
        let ns = Self::new();
        for p in [
            "/Animals/Elephant",
            "/Animals/Dolphin",
            "/Animals/Monkey/BetaMonkey",
            "/Animals/Monkey/GammaMonkey",
            "/Animals/Monkey/AlphaMonkey",
            "/Fruits/Watermelon",
            "/Fruits/Banana",
            "/Fruits/Orange",
            "/Fruits/Apple",
            "/Vegetables/Broccoli",
            "/Vegetables/Tomato",
            "/Vegetables/Potato",
            "/Vegetables/Union",
            "/Vegetables/Cucumber",
        ] {
            ns.ensure_path(p);
        }
        ns.set("/Animals/Dolphin", b"This is a dolphin");
        ns.set("/Vegetables/Potato", b"This is a potato");

        let dragon = "/Animals/Dragon?hello=world&lorem=ipsum&foo=bar";
        ns.ensure_path(dragon);
        ns.set(
            dragon,
            br#"{"hello": "world", "lorem": "ipsum", "foo": "bar"}"#,
        );
        ns
    }

    /// Create `path` and any missing ancestors with empty values
    pub fn ensure_path(&self, path: &str) {
        let mut inner = self.inner.write();
        let mut current = ROOT.to_string();
        for segment in path::segments(path) {
            let child = path::join_path(&current, segment);
            if !inner.nodes.contains_key(&child) {
                let txn = inner.tick();
                let now = clock(txn);
                inner.nodes.insert(
                    child.clone(),
                    MemoryNode {
                        stat: NodeStat {
                            ctime_millis: now,
                            mtime_millis: now,
                            create_txn_id: txn,
                            modify_txn_id: txn,
                            child_txn_id: txn,
                            ..Default::default()
                        },
                        ..Default::default()
                    },
                );
                if let Some(parent) = inner.nodes.get_mut(&current) {
                    parent.children.push(segment.to_string());
                    parent.stat.num_children += 1;
                    parent.stat.child_version += 1;
                    parent.stat.child_txn_id = txn;
                }
            }
            current = child;
        }
    }

    /// Replace the value of an existing node
    pub fn set(&self, path: &str, value: &[u8]) -> bool {
        let mut inner = self.inner.write();
        let txn = inner.tick();
        match inner.nodes.get_mut(path) {
            Some(node) => {
                node.value = value.to_vec();
                node.stat.data_length = value.len() as i32;
                node.stat.version += 1;
                node.stat.modify_txn_id = txn;
                node.stat.mtime_millis = clock(txn);
                true
            }
            None => false,
        }
    }

    /// Delete a node and everything under it
    pub fn delete(&self, path: &str) -> bool {
        if path == ROOT {
            return false;
        }
        let mut inner = self.inner.write();
        if !inner.nodes.contains_key(path) {
            return false;
        }

        let prefix = format!("{}/", path);
        inner
            .nodes
            .retain(|p, _| p.as_str() != path && !p.starts_with(&prefix));

        let parent = path::parent_path(path).to_string();
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        let txn = inner.tick();
        if let Some(parent) = inner.nodes.get_mut(&parent) {
            parent.children.retain(|c| *c != name);
            parent.stat.num_children = parent.children.len() as i32;
            parent.stat.child_version += 1;
            parent.stat.child_txn_id = txn;
        }
        true
    }

    /// Number of remote calls served so far
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::SeqCst)
    }
}

impl Inner {
    fn tick(&mut self) -> i64 {
        let txn = self.next_txn;
        self.next_txn += 1;
        txn
    }
}

fn clock(txn: i64) -> i64 {
    CLOCK_ORIGIN_MILLIS + txn * 1000
}

#[async_trait]
impl RemoteNamespace for MemoryNamespace {
    async fn list_children(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        self.inner
            .read()
            .nodes
            .get(path)
            .map(|node| node.children.clone())
            .ok_or_else(|| RemoteError::NodeNotFound(path.to_string()))
    }

    async fn get_node(&self, path: &str) -> Result<NodeData, RemoteError> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        self.inner
            .read()
            .nodes
            .get(path)
            .map(|node| NodeData {
                value: node.value.clone(),
                stat: node.stat,
            })
            .ok_or_else(|| RemoteError::NodeNotFound(path.to_string()))
    }
}

/// Connector handing out sessions to in-memory namespaces by address
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    namespaces: HashMap<String, MemoryNamespace>,
    fallback: Option<MemoryNamespace>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `namespace` at exactly `address`
    pub fn with_namespace(mut self, address: &str, namespace: MemoryNamespace) -> Self {
        self.namespaces.insert(address.to_string(), namespace);
        self
    }

    /// Serve `namespace` at every address without a dedicated one
    pub fn serving_all(namespace: MemoryNamespace) -> Self {
        Self {
            namespaces: HashMap::new(),
            fallback: Some(namespace),
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, address: &str) -> Result<Box<dyn RemoteNamespace>, RemoteError> {
        self.namespaces
            .get(address)
            .or(self.fallback.as_ref())
            .map(|ns| Box::new(ns.clone()) as Box<dyn RemoteNamespace>)
            .ok_or_else(|| RemoteError::Connection(format!("no namespace at {}", address)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_path_creates_ancestors() {
        let ns = MemoryNamespace::new();
        ns.ensure_path("/a/b/c");

        assert_eq!(ns.list_children("/").await.unwrap(), vec!["a"]);
        assert_eq!(ns.list_children("/a").await.unwrap(), vec!["b"]);
        assert_eq!(ns.list_children("/a/b").await.unwrap(), vec!["c"]);
        assert_eq!(ns.get_node("/a").await.unwrap().stat.num_children, 1);
    }

    #[tokio::test]
    async fn test_listing_keeps_insertion_order() {
        let ns = MemoryNamespace::new();
        ns.ensure_path("/b");
        ns.ensure_path("/a");
        assert_eq!(ns.list_children("/").await.unwrap(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_set_updates_stat() {
        let ns = MemoryNamespace::new();
        ns.ensure_path("/a");
        let before = ns.get_node("/a").await.unwrap();

        assert!(ns.set("/a", b"hello"));
        let after = ns.get_node("/a").await.unwrap();

        assert_eq!(after.value, b"hello");
        assert_eq!(after.stat.data_length, 5);
        assert_eq!(after.stat.version, before.stat.version + 1);
        assert!(after.stat.mtime_millis > before.stat.mtime_millis);
        assert!(!ns.set("/missing", b"x"));
    }

    #[tokio::test]
    async fn test_delete_is_recursive() {
        let ns = MemoryNamespace::new();
        ns.ensure_path("/a/b");
        ns.ensure_path("/ab");

        assert!(ns.delete("/a"));
        assert!(matches!(
            ns.get_node("/a/b").await,
            Err(RemoteError::NodeNotFound(_))
        ));
        assert!(ns.get_node("/ab").await.is_ok());
        assert_eq!(ns.list_children("/").await.unwrap(), vec!["ab"]);
        assert_eq!(ns.get_node("/").await.unwrap().stat.num_children, 1);
    }

    #[tokio::test]
    async fn test_missing_node() {
        let ns = MemoryNamespace::new();
        let err = ns.list_children("/nope").await.unwrap_err();
        assert_eq!(err, RemoteError::NodeNotFound("/nope".to_string()));
    }

    #[tokio::test]
    async fn test_round_trips_counted() {
        let ns = MemoryNamespace::sample();
        ns.list_children("/").await.unwrap();
        ns.get_node("/Fruits").await.unwrap();
        assert_eq!(ns.round_trips(), 2);
    }

    #[tokio::test]
    async fn test_connector() {
        let ns = MemoryNamespace::sample();
        let connector = MemoryConnector::new().with_namespace("127.0.0.1:2181", ns);

        let session = connector.connect("127.0.0.1:2181").await.unwrap();
        assert_eq!(session.list_children("/").await.unwrap().len(), 3);

        let err = connector.connect("10.0.0.1:2181").await.unwrap_err();
        assert!(matches!(err, RemoteError::Connection(_)));
    }
}
