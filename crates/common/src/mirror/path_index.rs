//! Path → node handle lookup for the mirror
//!
//! Paths are unique within a mirror, so every materialized node is
//! registered here under its exact raw absolute path. No trimming or
//! slash stripping happens: `/a` and `/a ` are different nodes.

use std::collections::HashMap;

use super::NodeId;

#[derive(Debug)]
pub(crate) struct PathIndex {
    path_to_id: HashMap<String, NodeId>,
    /// Next handle to hand out (1 is reserved for the root of the first
    /// generation)
    next_id: u64,
}

impl PathIndex {
    /// Create an index with `root` registered at `/`
    pub(crate) fn new(root: NodeId) -> Self {
        let mut index = Self {
            path_to_id: HashMap::new(),
            next_id: root.0 + 1,
        };
        index.path_to_id.insert("/".to_string(), root);
        index
    }

    /// Allocate a fresh node handle
    pub(crate) fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register `id` under `path`. An existing registration wins.
    pub(crate) fn insert(&mut self, path: &str, id: NodeId) -> bool {
        if self.path_to_id.contains_key(path) {
            return false;
        }
        self.path_to_id.insert(path.to_string(), id);
        true
    }

    pub(crate) fn get(&self, path: &str) -> Option<NodeId> {
        self.path_to_id.get(path).copied()
    }

    /// Remove the registration of `path` if it belongs to `id`
    pub(crate) fn remove(&mut self, path: &str, id: NodeId) {
        if self.path_to_id.get(path) == Some(&id) {
            self.path_to_id.remove(path);
        }
    }

    /// Drop every registration and register a new `root`.
    ///
    /// Handles keep counting up, so handles from before the reset never
    /// alias new nodes.
    pub(crate) fn reset(&mut self) -> NodeId {
        self.path_to_id.clear();
        let root = self.allocate();
        self.path_to_id.insert("/".to_string(), root);
        root
    }

    pub(crate) fn len(&self) -> usize {
        self.path_to_id.len()
    }
}
