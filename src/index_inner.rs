use crate::{
    DefaultTracker, NodeTracker,
    error::IndexError,
    nodes::{Node, NodeArena, NodeId},
    utils::{self, KeyTracker},
};

pub(crate) type DrainCallback = Box<dyn FnMut(u64, usize) + Send>;

/// The tree itself. [RadixIndex](crate::RadixIndex) is the public face.
pub(crate) struct IndexInner<T: NodeTracker = DefaultTracker> {
    arena: NodeArena<T>,
    root: NodeId,
    height: u8,
    len: usize,
    drain_callback: Option<DrainCallback>,
}

pub(crate) trait IndexVisitor {
    fn visit_leaf(&mut self, _node: NodeId, _key: u64, _payload: usize, _height: u8) {}
    fn pre_visit_internal(&mut self, _node: NodeId, _height: u8, _occupied: usize) {}
    fn post_visit_internal(&mut self, _node: NodeId, _height: u8) {}
}

/// Collects nodes children-first, hands every remaining entry to the drainer.
struct TeardownVisitor {
    order: Vec<NodeId>,
    drain_callback: Option<DrainCallback>,
}

impl IndexVisitor for TeardownVisitor {
    fn visit_leaf(&mut self, node: NodeId, key: u64, payload: usize, _height: u8) {
        if let Some(drain) = self.drain_callback.as_mut() {
            drain(key, payload);
        }
        self.order.push(node);
    }

    fn post_visit_internal(&mut self, node: NodeId, _height: u8) {
        self.order.push(node);
    }
}

impl<T: NodeTracker> Drop for IndexInner<T> {
    fn drop(&mut self) {
        let (internal, leaves) = self.node_count();
        let mut visitor = TeardownVisitor {
            order: Vec::with_capacity(internal + leaves),
            drain_callback: self.drain_callback.take(),
        };
        self.dfs_visitor(&mut visitor);

        // post-order: every child goes before its parent, the root goes last
        let released = visitor.order.len();
        for node in visitor.order {
            self.arena.release(node);
        }
        debug_assert_eq!(self.arena.live_nodes(), (0, 0));

        tracing::debug!(
            height = self.height,
            released,
            entries = self.len,
            "radix index destroyed"
        );
    }
}

impl<T: NodeTracker> IndexInner<T> {
    pub(crate) fn new(
        height: u8,
        tracker: T,
        drain_callback: Option<DrainCallback>,
    ) -> Result<Self, IndexError> {
        if height > utils::MAX_HEIGHT {
            return Err(IndexError::InvalidHeight {
                height,
                max: utils::MAX_HEIGHT,
            });
        }

        let mut arena = NodeArena::new(tracker);
        let root = arena.allocate_internal(None, height);
        tracing::debug!(
            height,
            max_key = utils::max_key(height),
            "radix index created"
        );

        Ok(Self {
            arena,
            root,
            height,
            len: 0,
            drain_callback,
        })
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// (internal, leaf) nodes in the tree, root included.
    #[inline]
    pub(crate) fn node_count(&self) -> (usize, usize) {
        self.arena.live_nodes()
    }

    #[inline]
    pub(crate) fn tracker(&self) -> &T {
        self.arena.tracker()
    }

    pub(crate) fn insert(&mut self, key: u64, payload: usize) -> Result<(), IndexError> {
        if !utils::key_fits(key, self.height) {
            return Err(IndexError::InvalidKey {
                key,
                height: self.height,
            });
        }

        let mut node = self.root;
        let mut height = self.height;
        let mut rest = key;

        loop {
            let digit = utils::digit(rest, height);
            let residual = utils::residual(rest, height);

            let children = self.arena[node]
                .children()
                .expect("insert descended into a leaf");

            let Some(child) = children.get(digit) else {
                let leaf = self.arena.allocate_leaf(node, height, residual, payload);
                self.arena[node]
                    .children_mut()
                    .expect("insert descended into a leaf")
                    .insert(digit, leaf);
                self.len += 1;
                return Ok(());
            };

            match self.arena[child].leaf_rest() {
                Some(leaf_rest) if leaf_rest == residual => {
                    return Err(IndexError::DuplicateKey { key });
                }
                Some(_) => {
                    // Leaves under a height 0 node have no bits left, so two
                    // of them can only differ above height 0.
                    debug_assert!(height > 0);
                    node = self.split_leaf(node, digit, child, height - 1);
                }
                None => node = child,
            }
            height -= 1;
            rest = residual;
        }
    }

    /// Pushes the leaf in `parent[digit]` one level down: a new internal node
    /// of `height` takes its slot and the leaf moves under it, keeping fewer
    /// bits as `rest`. Returns the new internal node.
    fn split_leaf(&mut self, parent: NodeId, digit: u8, leaf: NodeId, height: u8) -> NodeId {
        let internal = self.arena.allocate_internal(Some(parent), height);
        let old = self.arena[parent]
            .children_mut()
            .expect("leaf parent must be internal")
            .change(digit, internal);
        debug_assert_eq!(old, Some(leaf));

        let entry = &mut self.arena[leaf];
        let Node::Leaf { rest, .. } = &mut entry.node else {
            unreachable!("only leaves are split");
        };
        let leaf_digit = utils::digit(*rest, height);
        *rest = utils::residual(*rest, height);
        entry.parent = Some(internal);
        entry.height = height;

        self.arena[internal]
            .children_mut()
            .expect("freshly allocated internal node")
            .insert(leaf_digit, leaf);

        tracing::trace!(height, digit, leaf_digit, "split leaf");
        internal
    }

    /// The leaf holding exactly `key`.
    fn locate(&self, key: u64) -> Option<NodeId> {
        if !utils::key_fits(key, self.height) {
            return None;
        }

        let mut node = self.root;
        let mut height = self.height;
        let mut rest = key;

        loop {
            let children = self.arena[node].children()?;
            let child = children.get(utils::digit(rest, height))?;
            let residual = utils::residual(rest, height);

            match self.arena[child].leaf_rest() {
                // a compressed leaf may belong to a different key, always check
                Some(leaf_rest) => return (leaf_rest == residual).then_some(child),
                None => {
                    node = child;
                    height -= 1;
                    rest = residual;
                }
            }
        }
    }

    #[inline]
    pub(crate) fn get(&self, key: u64) -> Option<usize> {
        let leaf = self.locate(key)?;
        match self.arena[leaf].node {
            Node::Leaf { payload, .. } => Some(payload),
            Node::Internal(_) => None,
        }
    }

    /// Detaches and frees the leaf of `key`. Internal nodes left sparse are
    /// kept as they are.
    pub(crate) fn remove(&mut self, key: u64) -> Option<usize> {
        let leaf = self.locate(key)?;
        let (parent, height) = {
            let entry = &self.arena[leaf];
            (entry.parent?, entry.height)
        };

        let digit = utils::digit(key, height);
        let detached = self.arena[parent]
            .children_mut()
            .expect("leaf parent must be internal")
            .remove(digit);
        debug_assert_eq!(detached, Some(leaf));

        let entry = self.arena.release(leaf);
        self.len -= 1;
        tracing::trace!(key, height, "removed leaf");

        match entry.node {
            Node::Leaf { payload, .. } => Some(payload),
            Node::Internal(_) => unreachable!("locate only returns leaves"),
        }
    }

    /// Depth-first walk from the root, children in ascending digit order.
    pub(crate) fn dfs_visitor<V: IndexVisitor>(&self, visitor: &mut V) {
        let mut key_tracker = KeyTracker::new(self.height);
        self.recursive_dfs(self.root, &mut key_tracker, visitor);
        debug_assert_eq!(key_tracker.len(), 0);
    }

    fn recursive_dfs<V: IndexVisitor>(
        &self,
        node: NodeId,
        key_tracker: &mut KeyTracker,
        visitor: &mut V,
    ) {
        let entry = &self.arena[node];
        let Some(children) = entry.children() else {
            return;
        };

        visitor.pre_visit_internal(node, entry.height, children.count());
        for (digit, child) in children.iter() {
            key_tracker.push(digit);

            let child_entry = &self.arena[child];
            match child_entry.node {
                Node::Leaf { rest, payload } => {
                    visitor.visit_leaf(child, key_tracker.to_key(rest), payload, child_entry.height);
                }
                Node::Internal(_) => self.recursive_dfs(child, key_tracker, visitor),
            }

            key_tracker.pop();
        }
        visitor.post_visit_internal(node, entry.height);
    }
}

#[cfg(test)]
impl<T: NodeTracker> IndexInner<T> {
    /// Panics if any structural invariant is broken.
    pub(crate) fn validate(&self) {
        struct Check<'a, T: NodeTracker> {
            inner: &'a IndexInner<T>,
            leaves: usize,
            internal: usize,
        }

        impl<T: NodeTracker> IndexVisitor for Check<'_, T> {
            fn visit_leaf(&mut self, node: NodeId, key: u64, payload: usize, height: u8) {
                let entry = &self.inner.arena[node];
                let parent = entry.parent.expect("leaf without parent");
                assert_eq!(self.inner.arena[parent].height, height);
                assert_eq!(entry.leaf_rest(), Some(utils::residual(key, height)));
                assert_eq!(self.inner.get(key), Some(payload));
                self.leaves += 1;
            }

            fn pre_visit_internal(&mut self, node: NodeId, height: u8, occupied: usize) {
                let entry = &self.inner.arena[node];
                match entry.parent {
                    None => {
                        assert_eq!(node, self.inner.root);
                        assert_eq!(height, self.inner.height);
                    }
                    Some(parent) => assert_eq!(self.inner.arena[parent].height, height + 1),
                }
                assert_eq!(entry.children().map(|c| c.count()), Some(occupied));
                for (_digit, child) in entry.children().into_iter().flat_map(|c| c.iter()) {
                    assert_eq!(self.inner.arena[child].parent, Some(node));
                }
                self.internal += 1;
            }
        }

        let mut check = Check {
            inner: self,
            leaves: 0,
            internal: 0,
        };
        self.dfs_visitor(&mut check);
        assert_eq!(check.leaves, self.len);
        assert_eq!((check.internal, check.leaves), self.node_count());
    }
}
