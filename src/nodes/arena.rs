use std::ops::{Index, IndexMut};

use crate::NodeTracker;

use super::node::{Children, Node, NodeEntry, NodeId, NodeKind};

/// Owns every node of one index. Each slot holds one node; released slots are
/// recycled through a free list.
pub(crate) struct NodeArena<T: NodeTracker> {
    slots: Vec<Option<NodeEntry>>,
    free: Vec<NodeId>,
    live_internal: usize,
    live_leaves: usize,
    tracker: T,
}

impl<T: NodeTracker> NodeArena<T> {
    pub(crate) fn new(tracker: T) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live_internal: 0,
            live_leaves: 0,
            tracker,
        }
    }

    fn allocate(&mut self, entry: NodeEntry) -> NodeId {
        let kind = entry.kind();
        self.tracker.on_allocate(kind, kind.node_size());
        match kind {
            NodeKind::Internal => self.live_internal += 1,
            NodeKind::Leaf => self.live_leaves += 1,
        }

        if let Some(id) = self.free.pop() {
            debug_assert!(self.slots[id.index()].is_none());
            self.slots[id.index()] = Some(entry);
            id
        } else {
            self.slots.push(Some(entry));
            NodeId::from_index(self.slots.len() - 1)
        }
    }

    /// New internal node with all 64 slots empty.
    pub(crate) fn allocate_internal(&mut self, parent: Option<NodeId>, height: u8) -> NodeId {
        self.allocate(NodeEntry {
            parent,
            height,
            node: Node::Internal(Children::empty()),
        })
    }

    pub(crate) fn allocate_leaf(
        &mut self,
        parent: NodeId,
        height: u8,
        rest: u64,
        payload: usize,
    ) -> NodeId {
        self.allocate(NodeEntry {
            parent: Some(parent),
            height,
            node: Node::Leaf { rest, payload },
        })
    }

    /// Takes the node out of the arena. The caller must already have
    /// detached it from its parent.
    pub(crate) fn release(&mut self, id: NodeId) -> NodeEntry {
        let entry = self.slots[id.index()]
            .take()
            .expect("node released twice");

        let kind = entry.kind();
        self.tracker.on_release(kind, kind.node_size());
        match kind {
            NodeKind::Internal => self.live_internal -= 1,
            NodeKind::Leaf => self.live_leaves -= 1,
        }
        self.free.push(id);
        entry
    }

    /// (internal, leaf) nodes currently allocated.
    pub(crate) fn live_nodes(&self) -> (usize, usize) {
        (self.live_internal, self.live_leaves)
    }

    pub(crate) fn tracker(&self) -> &T {
        &self.tracker
    }
}

impl<T: NodeTracker> Index<NodeId> for NodeArena<T> {
    type Output = NodeEntry;

    #[inline]
    fn index(&self, id: NodeId) -> &NodeEntry {
        self.slots[id.index()].as_ref().expect("dangling node id")
    }
}

impl<T: NodeTracker> IndexMut<NodeId> for NodeArena<T> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut NodeEntry {
        self.slots[id.index()].as_mut().expect("dangling node id")
    }
}
