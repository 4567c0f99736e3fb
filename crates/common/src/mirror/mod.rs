//! Lazy local mirror of a remote namespace tree
//!
//! The mirror starts out holding only the root. Nodes are materialized when
//! their parent is expanded, and a node's subtree is only ever rebuilt
//! wholesale (by expanding it again after a reset or failure), never
//! patched in place.
//!
//! # Expansion
//!
//! Expanding a node with N children costs `1 + N` sequential round-trips:
//! one listing, then one fetch per child. Children are ordered by their raw
//! (still percent-encoded) segment name, compared byte-wise.
//!
//! Expansion is not transactional. If a fetch fails halfway, the children
//! appended so far stay in place and the node drops back to
//! [`ExpansionState::Unexpanded`]; the next expansion discards them and
//! starts over.

mod node;
mod path_index;

pub use node::{ExpansionState, NodeId, NodeRecord};

use std::collections::HashMap;

use path_index::PathIndex;

use crate::path;
use crate::remote::{NodeData, RemoteError, RemoteNamespace};

/// Segment name that marked a synthetic bootstrap root in legacy listings
const LEGACY_ROOT_SEGMENT: &str = "/";

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// The handle does not belong to the current mirror generation
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// A path segment is missing from its parent's listing
    #[error("path not found: {0}")]
    PathNotFound(String),
}

/// The in-memory partial copy of the remote tree
#[derive(Debug)]
pub struct TreeMirror {
    nodes: HashMap<NodeId, NodeRecord>,
    index: PathIndex,
    root: NodeId,
    legacy_bootstrap_root: bool,
}

impl Default for TreeMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeMirror {
    /// Create a mirror holding only an unexpanded root
    pub fn new() -> Self {
        let root = NodeId(1);
        let mut nodes = HashMap::new();
        nodes.insert(root, NodeRecord::root(root));

        Self {
            nodes,
            index: PathIndex::new(root),
            root,
            legacy_bootstrap_root: false,
        }
    }

    /// Auto-expand a root child whose raw name is `/`, as legacy fixtures
    /// that model the bootstrap root as a literal child expect.
    ///
    /// Only direct children of the root qualify. A `/` entry deeper down
    /// joins back to the same path and stays an ordinary child.
    pub fn with_legacy_bootstrap_root(mut self, enabled: bool) -> Self {
        self.legacy_bootstrap_root = enabled;
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&NodeRecord, MirrorError> {
        self.nodes.get(&id).ok_or(MirrorError::UnknownNode(id))
    }

    /// Look up a materialized node by absolute raw path
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.index.get(path)
    }

    /// Number of materialized nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Rebuild a node's absolute path by walking parent links to the root
    pub fn compute_path(&self, id: NodeId) -> Result<String, MirrorError> {
        let mut names = Vec::new();
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            names.push(current.raw_name.as_str());
            current = self.node(parent)?;
        }

        Ok(names
            .iter()
            .rev()
            .fold(path::ROOT.to_string(), |acc, name| path::join_path(&acc, name)))
    }

    /// Discard every node and start over from an unexpanded root
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.root = self.index.reset();
        self.nodes.insert(self.root, NodeRecord::root(self.root));
    }

    /// Materialize the children of `id`.
    ///
    /// No-op if the node is already expanded.
    pub async fn expand(
        &mut self,
        client: &dyn RemoteNamespace,
        id: NodeId,
    ) -> Result<(), MirrorError> {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let bootstrap = self.expand_one(client, next).await?;
            pending.extend(bootstrap.into_iter().rev());
        }
        Ok(())
    }

    /// Reset the mirror, expand the root, then refresh the first child in
    /// display order. Returns that child, if any.
    pub async fn refresh_root(
        &mut self,
        client: &dyn RemoteNamespace,
    ) -> Result<Option<NodeId>, MirrorError> {
        tracing::info!("Refreshing tree");
        self.reset();
        let root = self.root;
        self.expand(client, root).await?;

        let first = self.node(root)?.children.first().copied();
        if let Some(first) = first {
            self.refresh_leaf(client, first).await?;
        }
        Ok(first)
    }

    /// Re-fetch a node's value and metadata without touching its children
    pub async fn refresh_leaf(
        &mut self,
        client: &dyn RemoteNamespace,
        id: NodeId,
    ) -> Result<&NodeRecord, MirrorError> {
        let path = self.node(id)?.path.clone();
        tracing::info!(path = %path, "Refreshing leaf");

        let NodeData { value, stat } = client.get_node(&path).await?;

        let record = self
            .nodes
            .get_mut(&id)
            .ok_or(MirrorError::UnknownNode(id))?;
        record.value = value;
        record.stat = stat;
        Ok(record)
    }

    /// Find the node at `path`, expanding each ancestor on the way down
    pub async fn resolve(
        &mut self,
        client: &dyn RemoteNamespace,
        path: &str,
    ) -> Result<NodeId, MirrorError> {
        let mut current = self.root;
        for segment in path::segments(path) {
            self.expand(client, current).await?;
            current = self
                .node(current)?
                .children
                .iter()
                .copied()
                .find(|child| {
                    self.nodes
                        .get(child)
                        .is_some_and(|record| record.raw_name == segment)
                })
                .ok_or_else(|| MirrorError::PathNotFound(path.to_string()))?;
        }
        Ok(current)
    }

    /// Expand `id` and its descendants down to `depth` levels below it
    pub async fn expand_to_depth(
        &mut self,
        client: &dyn RemoteNamespace,
        id: NodeId,
        depth: usize,
    ) -> Result<(), MirrorError> {
        let mut pending = vec![(id, depth)];
        while let Some((next, remaining)) = pending.pop() {
            if remaining == 0 {
                continue;
            }
            self.expand(client, next).await?;
            let children = self.node(next)?.children.clone();
            pending.extend(children.into_iter().rev().map(|c| (c, remaining - 1)));
        }
        Ok(())
    }

    /// Pre-order walk below `id` through expanded nodes only, as
    /// `(node, depth)` pairs with the children of `id` at depth 0
    pub fn visible(&self, id: NodeId) -> Vec<(NodeId, usize)> {
        let mut rows = Vec::new();
        let mut stack: Vec<(NodeId, usize)> =
            match self.get(id).and_then(|n| n.expanded_children()) {
                Some(children) => children.iter().rev().map(|&c| (c, 0)).collect(),
                None => return rows,
            };

        while let Some((next, depth)) = stack.pop() {
            rows.push((next, depth));
            if let Some(children) = self.get(next).and_then(|n| n.expanded_children()) {
                stack.extend(children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        rows
    }

    /// Expand a single node; returns children that need a bootstrap
    /// expansion of their own
    async fn expand_one(
        &mut self,
        client: &dyn RemoteNamespace,
        id: NodeId,
    ) -> Result<Vec<NodeId>, MirrorError> {
        let record = self
            .nodes
            .get_mut(&id)
            .ok_or(MirrorError::UnknownNode(id))?;
        if record.state == ExpansionState::Expanded {
            return Ok(Vec::new());
        }
        record.state = ExpansionState::Expanding;
        let path = record.path.clone();

        self.discard_children(id);
        tracing::info!(path = %path, "Expanding path");

        let result = self.populate(client, id, &path).await;
        let state = match result {
            Ok(_) => ExpansionState::Expanded,
            Err(ref err) => {
                tracing::warn!(path = %path, error = %err, "expansion failed");
                ExpansionState::Unexpanded
            }
        };
        if let Some(record) = self.nodes.get_mut(&id) {
            record.state = state;
        }
        result
    }

    async fn populate(
        &mut self,
        client: &dyn RemoteNamespace,
        id: NodeId,
        path: &str,
    ) -> Result<Vec<NodeId>, MirrorError> {
        let mut names = client.list_children(path).await?;
        names.sort();

        let bootstrap_allowed = self.legacy_bootstrap_root && id == self.root;
        let mut bootstrap = Vec::new();
        for name in names {
            let child_path = path::join_path(path, &name);
            tracing::debug!(path = %child_path, "fetching child");
            let data = client.get_node(&child_path).await?;

            let is_bootstrap = bootstrap_allowed && name == LEGACY_ROOT_SEGMENT;
            let child = self.append_child(id, name, child_path, data);
            if is_bootstrap {
                bootstrap.push(child);
            }
        }
        Ok(bootstrap)
    }

    fn append_child(
        &mut self,
        parent: NodeId,
        raw_name: String,
        path: String,
        data: NodeData,
    ) -> NodeId {
        let id = self.index.allocate();
        self.index.insert(&path, id);
        self.nodes.insert(
            id,
            NodeRecord {
                id,
                parent: Some(parent),
                raw_name,
                path,
                value: data.value,
                stat: data.stat,
                children: Vec::new(),
                state: ExpansionState::Unexpanded,
            },
        );
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.push(id);
        }
        id
    }

    /// Drop every descendant of `id`
    fn discard_children(&mut self, id: NodeId) {
        let mut pending = match self.nodes.get_mut(&id) {
            Some(record) => std::mem::take(&mut record.children),
            None => return,
        };
        while let Some(child) = pending.pop() {
            if let Some(record) = self.nodes.remove(&child) {
                self.index.remove(&record.path, child);
                pending.extend(record.children);
            }
        }
    }
}
