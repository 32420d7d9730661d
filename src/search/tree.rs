//! Observation of the game tree as it is searched.
//!
//! A [`GameTreeSink`] receives a notification for every expanded node, its
//! backed-up value, and any siblings cut off by alpha-beta. Sinks observe
//! only; nothing they do can change the outcome of a search.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::Move;

/// Identifier of a node within one search pass. The root is always 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// A node as seen at the moment it is expanded.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Plies below the root
    pub ply: u32,
    /// The move leading to this node; for the root, the last move played
    pub mv: Option<Move>,
    pub alpha: i32,
    pub beta: i32,
}

/// Receives search events, typically to feed a tree viewer.
pub trait GameTreeSink: Send {
    fn on_node_explored(&mut self, node: &TreeNode);

    /// Backed-up value of a node, from player 1's perspective.
    fn on_node_evaluated(&mut self, _id: NodeId, _inherited_value: i32) {}

    /// Moves under `parent` that were never searched because of a cutoff.
    fn on_siblings_pruned(&mut self, _parent: NodeId, _pruned: &[Move]) {}
}

impl<T: GameTreeSink + ?Sized> GameTreeSink for Arc<Mutex<T>> {
    fn on_node_explored(&mut self, node: &TreeNode) {
        self.lock().on_node_explored(node);
    }

    fn on_node_evaluated(&mut self, id: NodeId, inherited_value: i32) {
        self.lock().on_node_evaluated(id, inherited_value);
    }

    fn on_siblings_pruned(&mut self, parent: NodeId, pruned: &[Move]) {
        self.lock().on_siblings_pruned(parent, pruned);
    }
}

/// A node captured by [`GameTreeRecorder`].
#[derive(Clone, Debug)]
pub struct RecordedNode {
    pub node: TreeNode,
    pub inherited_value: Option<i32>,
    pub children: Vec<usize>,
    pub pruned: Vec<Move>,
}

/// Arena that records the most recent search pass.
///
/// Each pass starts with a root node; receiving one discards the previous
/// tree, so after iterative deepening only the deepest pass remains.
#[derive(Clone, Debug, Default)]
pub struct GameTreeRecorder {
    nodes: Vec<RecordedNode>,
    index: HashMap<NodeId, usize>,
}

impl GameTreeRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn root(&self) -> Option<&RecordedNode> {
        self.nodes.first()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&RecordedNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Children of `id` in the order they were searched.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &RecordedNode> {
        self.get(id)
            .into_iter()
            .flat_map(move |node| node.children.iter().map(move |&i| &self.nodes[i]))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RecordedNode> {
        self.nodes.iter()
    }

    /// Total number of moves cut off anywhere in the tree.
    #[must_use]
    pub fn pruned_count(&self) -> usize {
        self.nodes.iter().map(|n| n.pruned.len()).sum()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }
}

impl GameTreeSink for GameTreeRecorder {
    fn on_node_explored(&mut self, node: &TreeNode) {
        if node.parent.is_none() {
            self.clear();
        }
        let slot = self.nodes.len();
        if let Some(parent) = node.parent.and_then(|p| self.index.get(&p).copied()) {
            self.nodes[parent].children.push(slot);
        }
        self.index.insert(node.id, slot);
        self.nodes.push(RecordedNode {
            node: node.clone(),
            inherited_value: None,
            children: Vec::new(),
            pruned: Vec::new(),
        });
    }

    fn on_node_evaluated(&mut self, id: NodeId, inherited_value: i32) {
        if let Some(&i) = self.index.get(&id) {
            self.nodes[i].inherited_value = Some(inherited_value);
        }
    }

    fn on_siblings_pruned(&mut self, parent: NodeId, pruned: &[Move]) {
        if let Some(&i) = self.index.get(&parent) {
            self.nodes[i].pruned.extend_from_slice(pruned);
        }
    }
}
