use std::{
    marker::PhantomData,
    ptr::{with_exposed_provenance, with_exposed_provenance_mut},
};

use crate::{DefaultTracker, IndexError, NodeTracker, RadixIndex};

/// A [RadixIndex] that owns its values.
///
/// Each value is boxed and the box address is stored as the payload. Values
/// still in the map are dropped together with it.
pub struct RadixMap<V, T: NodeTracker = DefaultTracker> {
    index: RadixIndex<T>,
    pt_val: PhantomData<Box<V>>,
}

/// # Safety
/// `payload` must come from `Box::<V>::into_raw(..).expose_provenance()` and
/// must not have been reclaimed yet.
unsafe fn box_from_payload<V>(payload: usize) -> Box<V> {
    let ptr: *mut V = with_exposed_provenance_mut(payload);
    unsafe { Box::from_raw(ptr) }
}

impl<V: 'static> RadixMap<V> {
    /// Creates an empty map of the given height.
    ///
    /// # Panics
    ///
    /// Panics if `height` is greater than [MAX_HEIGHT](crate::MAX_HEIGHT).
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::RadixMap;
    /// let map: RadixMap<String> = RadixMap::new(4);
    /// assert!(map.is_empty());
    /// ```
    pub fn new(height: u8) -> Self {
        match Self::with_tracker(height, DefaultTracker {}) {
            Ok(map) => map,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<V: 'static, T: NodeTracker> RadixMap<V, T> {
    pub fn with_tracker(height: u8, tracker: T) -> Result<Self, IndexError> {
        let drainer = |_key: u64, payload: usize| {
            // Safety: every payload left in the index is a live box
            drop(unsafe { box_from_payload::<V>(payload) });
        };
        Ok(Self {
            index: RadixIndex::new_with_drainer(height, tracker, drainer)?,
            pt_val: PhantomData,
        })
    }

    /// Inserts `value` under `key`. On error the value is dropped and the map
    /// is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::{IndexError, RadixMap};
    /// let mut map = RadixMap::new(4);
    ///
    /// map.insert(7, "seven".to_string()).unwrap();
    /// assert_eq!(
    ///     map.insert(7, "again".to_string()),
    ///     Err(IndexError::DuplicateKey { key: 7 })
    /// );
    /// assert_eq!(map.get(7).unwrap(), "seven");
    /// ```
    pub fn insert(&mut self, key: u64, value: V) -> Result<(), IndexError> {
        let ptr = Box::into_raw(Box::new(value));
        let payload = ptr.expose_provenance();
        let rv = self.index.insert(key, payload);
        if rv.is_err() {
            // Safety: the index did not take the payload
            drop(unsafe { box_from_payload::<V>(payload) });
        }
        rv
    }

    pub fn get(&self, key: u64) -> Option<&V> {
        let payload = self.index.get(key)?;
        let ptr: *const V = with_exposed_provenance(payload);
        // Safety: the box lives as long as the key stays in the index, and
        // removing it needs `&mut self`.
        Some(unsafe { &*ptr })
    }

    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        let payload = self.index.get(key)?;
        let ptr: *mut V = with_exposed_provenance_mut(payload);
        // Safety: as in `get`, and `&mut self` rules out any other borrow
        Some(unsafe { &mut *ptr })
    }

    #[inline]
    pub fn contains_key(&self, key: u64) -> bool {
        self.index.contains_key(key)
    }

    /// Removes `key` and hands its value back.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::RadixMap;
    /// let mut map = RadixMap::new(4);
    ///
    /// map.insert(1, vec![1, 2, 3]).unwrap();
    /// assert_eq!(map.remove(1), Some(vec![1, 2, 3]));
    /// assert!(map.get(1).is_none());
    /// ```
    pub fn remove(&mut self, key: u64) -> Option<V> {
        let payload = self.index.remove(key)?;
        // Safety: the payload was just detached from the index
        Some(*unsafe { box_from_payload::<V>(payload) })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The underlying index.
    #[inline]
    pub fn index(&self) -> &RadixIndex<T> {
        &self.index
    }

    /// Drops the map together with every value still in it.
    pub fn destroy(self) {
        drop(self)
    }
}
