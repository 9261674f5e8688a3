use std::num::NonZeroU32;

use crate::utils::RADIX_SIZE;

/// Handle of a node inside the [NodeArena](super::NodeArena).
///
/// Stored as `index + 1` so that `Option<NodeId>` stays four bytes and an
/// all-zero child table means "every slot empty".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(NonZeroU32);

impl NodeId {
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index + 1).expect("node arena exceeded u32::MAX entries");
        // SAFETY: index + 1 is never zero.
        Self(unsafe { NonZeroU32::new_unchecked(raw) })
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

/// The two node shapes, used for memory accounting.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeKind {
    Internal,
    Leaf,
}

impl NodeKind {
    /// Heap bytes held by one node of this kind.
    pub fn node_size(self) -> usize {
        match self {
            NodeKind::Internal => std::mem::size_of::<NodeEntry>() + std::mem::size_of::<Children>(),
            NodeKind::Leaf => std::mem::size_of::<NodeEntry>(),
        }
    }
}

/// The 64 child slots of an internal node.
pub(crate) struct Children {
    slots: [Option<NodeId>; RADIX_SIZE],
    count: u8,
}

const _: () = assert!(std::mem::size_of::<Children>() == 260);
const _: () = assert!(std::mem::size_of::<Option<NodeId>>() == 4);

impl Children {
    pub(crate) fn empty() -> Box<Self> {
        Box::new(Self {
            slots: [None; RADIX_SIZE],
            count: 0,
        })
    }

    #[inline]
    pub(crate) fn get(&self, digit: u8) -> Option<NodeId> {
        self.slots[digit as usize]
    }

    /// Fills an empty slot.
    #[inline]
    pub(crate) fn insert(&mut self, digit: u8, child: NodeId) {
        debug_assert!(self.slots[digit as usize].is_none());

        self.slots[digit as usize] = Some(child);
        self.count += 1;
    }

    /// Swaps the child of an occupied slot, returning the old one.
    #[inline]
    pub(crate) fn change(&mut self, digit: u8, child: NodeId) -> Option<NodeId> {
        debug_assert!(self.slots[digit as usize].is_some());

        self.slots[digit as usize].replace(child)
    }

    #[inline]
    pub(crate) fn remove(&mut self, digit: u8) -> Option<NodeId> {
        let old = self.slots[digit as usize].take();
        if old.is_some() {
            self.count -= 1;
        }
        old
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.count as usize
    }

    /// Occupied slots in ascending digit order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (u8, NodeId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(d, c)| c.map(|c| (d as u8, c)))
    }
}

pub(crate) enum Node {
    Internal(Box<Children>),
    Leaf { rest: u64, payload: usize },
}

/// A node plus its position in the tree.
///
/// An internal node's `height` is the digit position it consumes. A leaf's
/// `height` is that of its parent, so it keeps the key bits below that digit
/// as `rest`.
pub(crate) struct NodeEntry {
    pub(crate) parent: Option<NodeId>,
    pub(crate) height: u8,
    pub(crate) node: Node,
}

impl NodeEntry {
    #[inline]
    pub(crate) fn kind(&self) -> NodeKind {
        match self.node {
            Node::Internal(_) => NodeKind::Internal,
            Node::Leaf { .. } => NodeKind::Leaf,
        }
    }

    #[inline]
    pub(crate) fn children(&self) -> Option<&Children> {
        match &self.node {
            Node::Internal(children) => Some(&**children),
            Node::Leaf { .. } => None,
        }
    }

    #[inline]
    pub(crate) fn children_mut(&mut self) -> Option<&mut Children> {
        match &mut self.node {
            Node::Internal(children) => Some(&mut **children),
            Node::Leaf { .. } => None,
        }
    }

    /// `Some(rest)` if this is a leaf.
    #[inline]
    pub(crate) fn leaf_rest(&self) -> Option<u64> {
        match self.node {
            Node::Leaf { rest, .. } => Some(rest),
            Node::Internal(_) => None,
        }
    }
}
