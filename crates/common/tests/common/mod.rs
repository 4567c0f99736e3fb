//! Shared fixtures for mirror integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ::common::remote::{MemoryNamespace, NodeData, RemoteError, RemoteNamespace};
use async_trait::async_trait;

/// Initialize tracing for test visibility
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Two top-level nodes, each with children of its own
pub fn fruits_and_animals() -> MemoryNamespace {
    let ns = MemoryNamespace::new();
    ns.ensure_path("/Fruits/Apple");
    ns.ensure_path("/Fruits/Banana");
    ns.ensure_path("/Animals/Elephant");
    ns.set("/Fruits", b"sweet");
    ns
}

/// Wraps a namespace and fails `get_node` for one path while armed
#[derive(Debug, Clone)]
pub struct FlakyNamespace {
    inner: MemoryNamespace,
    failing_path: String,
    remaining_failures: Arc<AtomicUsize>,
}

impl FlakyNamespace {
    pub fn new(inner: MemoryNamespace, failing_path: &str, failures: usize) -> Self {
        Self {
            inner,
            failing_path: failing_path.to_string(),
            remaining_failures: Arc::new(AtomicUsize::new(failures)),
        }
    }
}

#[async_trait]
impl RemoteNamespace for FlakyNamespace {
    async fn list_children(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        self.inner.list_children(path).await
    }

    async fn get_node(&self, path: &str) -> Result<NodeData, RemoteError> {
        if path == self.failing_path {
            let armed = self
                .remaining_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if armed {
                return Err(RemoteError::Session("connection loss".to_string()));
            }
        }
        self.inner.get_node(path).await
    }
}

/// Lists a synthetic `/` child under the root, the way early bootstrap
/// fixtures modeled the root. `new` does so on the first root listing
/// only, `always` on every one.
#[derive(Debug, Clone)]
pub struct LegacyRootNamespace {
    inner: MemoryNamespace,
    root_listings: Arc<AtomicUsize>,
    synthetic_listings: usize,
}

impl LegacyRootNamespace {
    pub fn new(inner: MemoryNamespace) -> Self {
        Self {
            inner,
            root_listings: Arc::new(AtomicUsize::new(0)),
            synthetic_listings: 1,
        }
    }

    pub fn always(inner: MemoryNamespace) -> Self {
        Self {
            synthetic_listings: usize::MAX,
            ..Self::new(inner)
        }
    }
}

#[async_trait]
impl RemoteNamespace for LegacyRootNamespace {
    async fn list_children(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        if path == "/" && self.root_listings.fetch_add(1, Ordering::SeqCst) < self.synthetic_listings
        {
            return Ok(vec!["/".to_string()]);
        }
        self.inner.list_children(path).await
    }

    async fn get_node(&self, path: &str) -> Result<NodeData, RemoteError> {
        self.inner.get_node(path).await
    }
}
