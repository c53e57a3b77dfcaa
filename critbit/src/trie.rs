// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use crate::bits::prefix_matches;
use crate::checker::{self, CheckerError, TrieStats};
use crate::iter::{
    Iter, KeyMask, KeyRange, Keys, MaskIter, RangeIter, SignedKeyRange, SignedRangeIter,
    Traversal, Unbounded, Values,
};
use crate::logger::{trace, warn};
use crate::mutate;
use crate::node::{Side, Slot};

/// An immutable version of a [`CritBit64`].
///
/// Cloning a snapshot is cheap: nodes are shared, and only the value of an
/// inline single entry is cloned. A snapshot is never affected by later
/// writes to the trie it was taken from.
#[derive(Debug, Clone)]
pub struct Snapshot<V> {
    // `None` for an empty trie, a leaf for exactly one entry, and a branch
    // (whose word is the shared prefix) for two or more
    pub(crate) root: Option<Slot<V>>,
    pub(crate) size: usize,
}

/// A crit-bit trie over 64-bit keys with copy-on-write mutation.
///
/// Writes take `&mut self` and are therefore serialized by the borrow checker.
/// Every write replaces the nodes on its path instead of changing them in
/// place, so iterators and [`Snapshot`]s taken earlier keep observing the
/// entries that were present when they were created.
///
/// Iteration yields entries in ascending unsigned key order.
#[derive(Debug, Clone)]
pub struct CritBit64<V> {
    pub(crate) current: Snapshot<V>,
}

impl<V> Snapshot<V> {
    /// A snapshot with no entries.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            root: None,
            size: 0,
        }
    }

    /// The number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Whether there are no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: u64) -> Option<&V> {
        let mut slot = self.root.as_ref()?;
        loop {
            match slot {
                Slot::Leaf { key: found, value } => return (*found == key).then_some(value),
                Slot::Branch { prefix, node } => {
                    if !prefix_matches(node.crit_bit, key, *prefix) {
                        return None;
                    }
                    slot = node.slot(Side::of(key, node.crit_bit));
                }
            }
        }
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: u64) -> bool {
        self.get(key).is_some()
    }

    /// Validates the structural invariants, returning basic statistics.
    ///
    /// # Errors
    ///
    /// Returns the first violation found. A violation means a bug in this
    /// crate; correct use of the public API never produces one.
    pub fn check(&self) -> Result<TrieStats, CheckerError> {
        checker::check(self.root.as_ref(), self.size)
    }

    /// Like [`Snapshot::check`], but logs the violation and returns `false`.
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        match self.check() {
            Ok(_) => true,
            Err(err) => {
                warn!("crit-bit invariant violated: {err}");
                false
            }
        }
    }
}

impl<V: Clone> Snapshot<V> {
    /// Iterates over every `(key, value)` pair.
    pub fn iter(&self) -> Iter<V> {
        Traversal::new(self.root.clone(), Unbounded)
    }

    /// Iterates over every key.
    pub fn keys(&self) -> Keys<V, Unbounded> {
        self.iter().keys()
    }

    /// Iterates over every value.
    pub fn values(&self) -> Values<V, Unbounded> {
        self.iter().values()
    }

    /// Iterates over the entries with `min <= key <= max`.
    ///
    /// An inverted range (`min > max`) yields nothing.
    pub fn query(&self, min: u64, max: u64) -> RangeIter<V> {
        Traversal::new(self.root.clone(), KeyRange::new(min, max))
    }

    /// Iterates over the entries whose key, read as a two's complement
    /// `i64`, satisfies `min <= key <= max`. Entries come out in ascending
    /// signed order.
    pub fn query_signed(&self, min: i64, max: i64) -> SignedRangeIter<V> {
        Traversal::new(self.root.clone(), SignedKeyRange::new(min, max))
    }

    /// Iterates over the entries whose key has every bit of `min` set and no
    /// bit set outside `max`.
    ///
    /// Unlike [`Snapshot::query`] this is bitwise inclusion, not numeric
    /// order: `(key | min) == key && (key & max) == key`.
    pub fn query_with_mask(&self, min: u64, max: u64) -> MaskIter<V> {
        Traversal::new(self.root.clone(), KeyMask::new(min, max))
    }
}

impl<V> Default for Snapshot<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> CritBit64<V> {
    /// Creates an empty trie.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: Snapshot::empty(),
        }
    }

    /// The number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: u64) -> Option<&V> {
        self.current.get(key)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: u64) -> bool {
        self.current.contains(key)
    }

    /// See [`Snapshot::check`].
    ///
    /// # Errors
    ///
    /// Returns the first invariant violation found.
    pub fn check(&self) -> Result<TrieStats, CheckerError> {
        self.current.check()
    }

    /// See [`Snapshot::check_invariants`].
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        self.current.check_invariants()
    }

    /// Consumes the trie, returning its current version.
    #[must_use]
    pub fn into_snapshot(self) -> Snapshot<V> {
        self.current
    }

    /// Removes every entry. Outstanding snapshots are unaffected.
    pub fn clear(&mut self) {
        self.current = Snapshot::empty();
    }
}

impl<V: Clone> CritBit64<V> {
    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// Replacing the value of an existing key leaves the size unchanged.
    pub fn put(&mut self, key: u64, value: V) -> Option<V> {
        let previous = match self.current.root.take() {
            None => {
                self.current.root = Some(Slot::Leaf { key, value });
                None
            }
            Some(root) => {
                let (root, previous) = mutate::insert(root, key, value);
                self.current.root = Some(root);
                previous
            }
        };
        if previous.is_none() {
            self.current.size += 1;
        }
        trace!(
            "put {key:#018x}: {} (size {})",
            if previous.is_some() { "replaced" } else { "inserted" },
            self.current.size
        );
        previous
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: u64) -> Option<V> {
        // probe first so that a miss leaves every node where it is
        if !self.current.contains(key) {
            trace!("remove {key:#018x}: absent");
            return None;
        }
        let root = self.current.root.take()?;
        let (root, removed) = mutate::remove(root, key);
        self.current.root = root;
        if removed.is_some() {
            self.current.size -= 1;
        }
        trace!("remove {key:#018x}: removed (size {})", self.current.size);
        removed
    }

    /// Captures the current version. Later writes do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<V> {
        self.current.clone()
    }

    /// See [`Snapshot::iter`].
    pub fn iter(&self) -> Iter<V> {
        self.current.iter()
    }

    /// See [`Snapshot::keys`].
    pub fn keys(&self) -> Keys<V, Unbounded> {
        self.current.keys()
    }

    /// See [`Snapshot::values`].
    pub fn values(&self) -> Values<V, Unbounded> {
        self.current.values()
    }

    /// See [`Snapshot::query`].
    pub fn query(&self, min: u64, max: u64) -> RangeIter<V> {
        self.current.query(min, max)
    }

    /// See [`Snapshot::query_signed`].
    pub fn query_signed(&self, min: i64, max: i64) -> SignedRangeIter<V> {
        self.current.query_signed(min, max)
    }

    /// See [`Snapshot::query_with_mask`].
    pub fn query_with_mask(&self, min: u64, max: u64) -> MaskIter<V> {
        self.current.query_with_mask(min, max)
    }
}

impl<V> Default for CritBit64<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<Snapshot<V>> for CritBit64<V> {
    fn from(current: Snapshot<V>) -> Self {
        Self { current }
    }
}

impl<V: Clone> FromIterator<(u64, V)> for CritBit64<V> {
    fn from_iter<I: IntoIterator<Item = (u64, V)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<V: Clone> Extend<(u64, V)> for CritBit64<V> {
    fn extend<I: IntoIterator<Item = (u64, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<V: Clone> IntoIterator for &CritBit64<V> {
    type Item = (u64, V);
    type IntoIter = Iter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: Clone> IntoIterator for &Snapshot<V> {
    type Item = (u64, V);
    type IntoIter = Iter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
