use crate::{DefaultTracker, IndexError, NodeTracker, index_inner::IndexInner, utils};

/// A 64-way radix tree from `u64` keys to pointer-sized payloads.
///
/// Every level consumes one 6-bit digit of the key, so a tree of height `h`
/// indexes keys of up to `6h + 6` bits in at most `h + 1` steps. A key is
/// stored in a leaf at the first free slot on its path; the leaf keeps the
/// bits not consumed yet and is pushed down only when another key shows up
/// on the same path.
///
/// Payloads are opaque to the index. Destroying the index never touches what
/// they point to; use [RadixIndex::new_with_drainer] to get them back.
pub struct RadixIndex<T: NodeTracker = DefaultTracker> {
    inner: IndexInner<T>,
}

impl Default for RadixIndex {
    /// An index covering the whole `u64` key space.
    fn default() -> Self {
        Self::new(utils::MAX_HEIGHT)
    }
}

impl RadixIndex {
    /// Creates an empty index of the given height.
    ///
    /// # Panics
    ///
    /// Panics if `height` is greater than [MAX_HEIGHT](crate::MAX_HEIGHT).
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::RadixIndex;
    /// // keys up to 18 bits
    /// let index = RadixIndex::new(2);
    /// assert_eq!(index.max_key(), (1 << 18) - 1);
    /// ```
    pub fn new(height: u8) -> Self {
        match Self::try_new(height) {
            Ok(index) => index,
            Err(e) => panic!("{e}"),
        }
    }

    /// Creates an empty index, rejecting heights above
    /// [MAX_HEIGHT](crate::MAX_HEIGHT).
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::{IndexError, RadixIndex};
    /// assert!(RadixIndex::try_new(10).is_ok());
    /// assert!(matches!(
    ///     RadixIndex::try_new(11),
    ///     Err(IndexError::InvalidHeight { height: 11, .. })
    /// ));
    /// ```
    pub fn try_new(height: u8) -> Result<Self, IndexError> {
        Self::with_tracker(height, DefaultTracker {})
    }
}

impl<T: NodeTracker> RadixIndex<T> {
    /// Creates an empty index that reports node allocations to `tracker`.
    pub fn with_tracker(height: u8, tracker: T) -> Result<Self, IndexError> {
        Ok(Self {
            inner: IndexInner::new(height, tracker, None)?,
        })
    }

    /// Creates an empty index that calls `drainer(key, payload)` once for every
    /// entry still stored when the index is destroyed or dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use radix_index::{DefaultTracker, RadixIndex};
    ///
    /// let drained = Arc::new(Mutex::new(Vec::new()));
    /// let sink = drained.clone();
    /// let mut index = RadixIndex::new_with_drainer(3, DefaultTracker {}, move |k, v| {
    ///     sink.lock().unwrap().push((k, v));
    /// })
    /// .unwrap();
    ///
    /// index.insert(7, 70).unwrap();
    /// index.insert(9, 90).unwrap();
    /// index.remove(9);
    /// index.destroy();
    ///
    /// assert_eq!(*drained.lock().unwrap(), vec![(7, 70)]);
    /// ```
    pub fn new_with_drainer(
        height: u8,
        tracker: T,
        drainer: impl FnMut(u64, usize) + Send + 'static,
    ) -> Result<Self, IndexError> {
        Ok(Self {
            inner: IndexInner::new(height, tracker, Some(Box::new(drainer)))?,
        })
    }

    /// Inserts `payload` under `key`.
    ///
    /// An existing key is never overwritten: the call fails with
    /// [IndexError::DuplicateKey] and the tree is left as it was. Keys above
    /// [max_key](RadixIndex::max_key) fail with [IndexError::InvalidKey].
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::{IndexError, RadixIndex};
    /// let mut index = RadixIndex::new(2);
    ///
    /// index.insert(1, 42).unwrap();
    /// assert_eq!(index.insert(1, 43), Err(IndexError::DuplicateKey { key: 1 }));
    /// assert_eq!(index.get(1), Some(42));
    ///
    /// assert!(matches!(index.insert(1 << 18, 0), Err(IndexError::InvalidKey { .. })));
    /// ```
    #[inline]
    pub fn insert(&mut self, key: u64, payload: usize) -> Result<(), IndexError> {
        self.inner.insert(key, payload)
    }

    /// Returns the payload stored under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::RadixIndex;
    /// let mut index = RadixIndex::new(2);
    ///
    /// index.insert(0x1234, 42).unwrap();
    /// assert_eq!(index.get(0x1234), Some(42));
    /// assert_eq!(index.get(0x1235), None);
    /// ```
    #[doc(alias = "lookup")]
    #[inline]
    pub fn get(&self, key: u64) -> Option<usize> {
        self.inner.get(key)
    }

    #[inline]
    pub fn contains_key(&self, key: u64) -> bool {
        self.inner.get(key).is_some()
    }

    /// Removes `key` and returns its payload, or `None` if it was not stored.
    ///
    /// Only the leaf is freed; internal nodes on the way are kept even when
    /// they end up with one child or none.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::RadixIndex;
    /// let mut index = RadixIndex::new(2);
    ///
    /// index.insert(1, 42).unwrap();
    /// assert_eq!(index.remove(1), Some(42));
    /// assert_eq!(index.remove(1), None);
    /// assert!(index.get(1).is_none());
    /// ```
    #[doc(alias = "delete")]
    #[inline]
    pub fn remove(&mut self, key: u64) -> Option<usize> {
        self.inner.remove(key)
    }

    /// Frees every node of the tree, children before parents.
    ///
    /// Payloads are left alone, apart from being handed to the drainer if one
    /// was installed. Dropping the index does the same.
    pub fn destroy(self) {
        drop(self)
    }

    /// Number of stored keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// The height fixed at creation.
    #[inline]
    pub fn height(&self) -> u8 {
        self.inner.height()
    }

    /// The largest key this index accepts.
    #[inline]
    pub fn max_key(&self) -> u64 {
        utils::max_key(self.inner.height())
    }

    /// Number of (internal, leaf) nodes, root included.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::RadixIndex;
    /// let mut index = RadixIndex::new(3);
    ///
    /// // a lone key is a single leaf right under the root
    /// index.insert(0b000001_000010_000011_000100, 1).unwrap();
    /// assert_eq!(index.node_count(), (1, 1));
    ///
    /// // a second key on the same path pushes it down to where they differ
    /// index.insert(0b000001_000010_000011_000101, 2).unwrap();
    /// assert_eq!(index.node_count(), (4, 2));
    /// ```
    #[inline]
    pub fn node_count(&self) -> (usize, usize) {
        self.inner.node_count()
    }

    #[inline]
    pub fn tracker(&self) -> &T {
        self.inner.tracker()
    }

    /// Per-height node statistics.
    #[cfg(feature = "stats")]
    #[cfg_attr(docsrs, doc(cfg(feature = "stats")))]
    pub fn stats(&self) -> crate::NodeStats {
        self.inner.stats()
    }

    #[cfg(test)]
    pub(crate) fn validate(&self) {
        self.inner.validate()
    }
}
