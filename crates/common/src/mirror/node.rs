use std::borrow::Cow;
use std::fmt;

use crate::path;
use crate::remote::NodeStat;

/// Handle to a node in a [`TreeMirror`](super::TreeMirror).
///
/// Handles are never reused within one mirror, so a handle held across a
/// reset simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Expansion progress of a single node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpansionState {
    /// Children have not been listed (or the last attempt failed)
    #[default]
    Unexpanded,
    /// A listing is in flight
    Expanding,
    /// Children are materialized, possibly zero of them
    Expanded,
}

/// One materialized node of the remote namespace
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) raw_name: String,
    pub(crate) path: String,
    pub(crate) value: Vec<u8>,
    pub(crate) stat: NodeStat,
    pub(crate) children: Vec<NodeId>,
    pub(crate) state: ExpansionState,
}

impl NodeRecord {
    pub(crate) fn root(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            raw_name: path::ROOT.to_string(),
            path: path::ROOT.to_string(),
            value: Vec::new(),
            stat: NodeStat::default(),
            children: Vec::new(),
            state: ExpansionState::Unexpanded,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Parent handle, `None` only for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Segment name as stored remotely (percent-encoded)
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Segment name decoded for display
    pub fn display_name(&self) -> Cow<'_, str> {
        path::decode_segment(&self.raw_name)
    }

    /// Absolute path with raw segments
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn stat(&self) -> &NodeStat {
        &self.stat
    }

    pub fn created_at_millis(&self) -> i64 {
        self.stat.ctime_millis
    }

    pub fn updated_at_millis(&self) -> i64 {
        self.stat.mtime_millis
    }

    /// Child count reported by the remote the last time this node was
    /// fetched. May disagree with the materialized children.
    pub fn child_count_hint(&self) -> i32 {
        self.stat.num_children
    }

    pub fn state(&self) -> ExpansionState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == ExpansionState::Expanded
    }

    /// Children in display order, or `None` if not yet expanded
    pub fn expanded_children(&self) -> Option<&[NodeId]> {
        self.is_expanded().then_some(self.children.as_slice())
    }

    /// Whatever children are currently materialized, including leftovers
    /// of a failed expansion
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
