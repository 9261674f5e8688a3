#![doc = include_str!("../README.md")]
#![allow(clippy::len_without_is_empty)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod index_inner;
mod nodes;
mod radix_index;
mod radix_map;
mod utils;

#[cfg(feature = "stats")]
mod stats;

#[cfg(test)]
mod tests;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

pub use error::IndexError;
pub use nodes::NodeKind;
pub use radix_index::RadixIndex;
pub use radix_map::RadixMap;
pub use utils::MAX_HEIGHT;

#[cfg(feature = "stats")]
#[cfg_attr(docsrs, doc(cfg(feature = "stats")))]
pub use stats::{LevelStats, NodeStats};

/// Observes every node the index allocates or releases.
///
/// Nodes always come from the global allocator, one allocation per node; a
/// tracker only gets to see them. Use [MemoryStatsTracker] to account memory
/// or to check that a destroyed index left nothing behind.
pub trait NodeTracker {
    fn on_allocate(&self, kind: NodeKind, size: usize);

    fn on_release(&self, kind: NodeKind, size: usize);
}

/// Tracker that does nothing.
#[derive(Clone, Copy, Default, Debug)]
pub struct DefaultTracker {}

impl NodeTracker for DefaultTracker {
    #[inline]
    fn on_allocate(&self, _kind: NodeKind, _size: usize) {}

    #[inline]
    fn on_release(&self, _kind: NodeKind, _size: usize) {}
}

#[derive(Default)]
struct MemoryStatsInner {
    allocated: AtomicUsize,
    deallocated: AtomicUsize,
    allocated_nodes: AtomicUsize,
    released_nodes: AtomicUsize,
}

/// Counts node allocations and releases, then forwards them to the inner
/// tracker. Clones share the same counters, so a clone kept outside the index
/// can be read after the index is gone.
///
/// ```
/// use radix_index::{DefaultTracker, MemoryStatsTracker, RadixIndex};
///
/// let tracker = MemoryStatsTracker::new(DefaultTracker {});
/// let mut index = RadixIndex::with_tracker(2, tracker.clone()).unwrap();
/// index.insert(1, 10).unwrap();
/// index.insert(2, 20).unwrap();
/// assert!(tracker.live_nodes() > 0);
///
/// index.destroy();
/// assert_eq!(tracker.live_nodes(), 0);
/// assert_eq!(tracker.allocated_memory(), tracker.deallocated_memory());
/// ```
#[derive(Clone)]
pub struct MemoryStatsTracker<T: NodeTracker = DefaultTracker> {
    inner: T,
    stats: Arc<MemoryStatsInner>,
}

impl<T: NodeTracker> MemoryStatsTracker<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            stats: Arc::new(MemoryStatsInner::default()),
        }
    }

    /// Bytes handed out over the tracker's lifetime.
    pub fn allocated_memory(&self) -> usize {
        self.stats.allocated.load(Ordering::Relaxed)
    }

    /// Bytes given back over the tracker's lifetime.
    pub fn deallocated_memory(&self) -> usize {
        self.stats.deallocated.load(Ordering::Relaxed)
    }

    pub fn allocated_nodes(&self) -> usize {
        self.stats.allocated_nodes.load(Ordering::Relaxed)
    }

    pub fn released_nodes(&self) -> usize {
        self.stats.released_nodes.load(Ordering::Relaxed)
    }

    /// Nodes allocated and not yet released.
    pub fn live_nodes(&self) -> usize {
        self.allocated_nodes().saturating_sub(self.released_nodes())
    }
}

impl<T: NodeTracker> NodeTracker for MemoryStatsTracker<T> {
    fn on_allocate(&self, kind: NodeKind, size: usize) {
        self.stats.allocated.fetch_add(size, Ordering::Relaxed);
        self.stats.allocated_nodes.fetch_add(1, Ordering::Relaxed);
        self.inner.on_allocate(kind, size);
    }

    fn on_release(&self, kind: NodeKind, size: usize) {
        self.stats.deallocated.fetch_add(size, Ordering::Relaxed);
        self.stats.released_nodes.fetch_add(1, Ordering::Relaxed);
        self.inner.on_release(kind, size);
    }
}
