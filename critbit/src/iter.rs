// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

//! Stack-based traversal of a captured trie version.
//!
//! All traversal flavors share one engine, [`Traversal`], and differ
//! only in the [`KeyFilter`] deciding which subtrees to enter and which
//! leaves to yield:
//!
//! * [`Unbounded`] visits every entry.
//! * [`KeyRange`] visits the entries with `min <= key <= max`.
//! * [`SignedKeyRange`] does the same with keys read as two's complement
//!   `i64`, yielding negative keys first.
//! * [`KeyMask`] visits the entries with `(key | min) == key` and
//!   `(key & max) == key`.
//!
//! The engine never recurses. Each stack frame holds a node together with the
//! prefix that led to it and a cursor recording which half comes next. Since
//! critical bits strictly increase with depth, the stack holds at most
//! [`KEY_BITS`] frames.

use std::iter::FusedIterator;

use crate::bits::{KEY_BITS, clear_bit, high_mask, set_bit};
use crate::node::{SharedNode, Side, Slot};

/// Error returned by [`Traversal::try_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TraversalError {
    /// The traversal has already produced its last entry.
    #[error("no such element: the traversal is exhausted")]
    NoSuchElement,
}

/// Decides which parts of the trie a [`Traversal`] visits.
pub trait KeyFilter {
    /// Whether any key whose leading `depth` bits equal those of `prefix`
    /// could be admitted. Returning `false` skips the whole subtree.
    ///
    /// Bits of `prefix` at or after `depth` are unspecified and must be
    /// ignored.
    fn admits_prefix(&self, prefix: u64, depth: u8) -> bool;

    /// Whether the entry stored under `key` is yielded.
    fn admits_key(&self, key: u64) -> bool;

    /// Whether the half with `crit_bit` set is visited before the other one.
    /// The default yields keys in ascending unsigned order.
    fn upper_first(&self, _crit_bit: u8) -> bool {
        false
    }
}

/// Admits every key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl KeyFilter for Unbounded {
    #[inline]
    fn admits_prefix(&self, _prefix: u64, _depth: u8) -> bool {
        true
    }

    #[inline]
    fn admits_key(&self, _key: u64) -> bool {
        true
    }
}

/// Admits the keys of the closed interval `[min, max]`, in unsigned order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRange {
    min: u64,
    max: u64,
}

impl KeyRange {
    /// The closed interval `[min, max]`. Empty when `min > max`.
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }
}

impl KeyFilter for KeyRange {
    fn admits_prefix(&self, prefix: u64, depth: u8) -> bool {
        // truncating to the leading bits is monotone, so a prefix outside the
        // truncated bounds cannot have any key inside the real ones
        let mask = high_mask(depth);
        let prefix = prefix & mask;
        (self.min & mask) <= prefix && prefix <= (self.max & mask)
    }

    #[inline]
    fn admits_key(&self, key: u64) -> bool {
        self.min <= key && key <= self.max
    }
}

/// Admits the keys whose two's complement reading lies in `[min, max]`.
///
/// The traversal visits the sign bit's upper half first, so keys come out in
/// ascending signed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedKeyRange {
    min: i64,
    max: i64,
}

impl SignedKeyRange {
    /// The closed interval `[min, max]`. Empty when `min > max`.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

#[expect(clippy::cast_possible_wrap, reason = "two's complement reading of the key")]
const fn signed(word: u64) -> i64 {
    word as i64
}

impl KeyFilter for SignedKeyRange {
    fn admits_prefix(&self, prefix: u64, depth: u8) -> bool {
        // clearing low bits floors a two's complement word, which is monotone
        let mask = signed(high_mask(depth));
        let prefix = signed(prefix) & mask;
        (self.min & mask) <= prefix && prefix <= (self.max & mask)
    }

    #[inline]
    fn admits_key(&self, key: u64) -> bool {
        (self.min..=self.max).contains(&signed(key))
    }

    #[inline]
    fn upper_first(&self, crit_bit: u8) -> bool {
        crit_bit == 0
    }
}

/// Admits the keys that contain every bit of `min` and no bit outside `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMask {
    min: u64,
    max: u64,
}

impl KeyMask {
    /// Keys `k` with `(k | min) == k` and `(k & max) == k`.
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }
}

impl KeyFilter for KeyMask {
    fn admits_prefix(&self, prefix: u64, depth: u8) -> bool {
        let mask = high_mask(depth);
        let prefix = prefix & mask;
        (prefix | (self.min & mask)) == prefix && (prefix & (self.max & mask)) == prefix
    }

    #[inline]
    fn admits_key(&self, key: u64) -> bool {
        (key | self.min) == key && (key & self.max) == key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    ReadFirst,
    ReadSecond,
    ReturnToParent,
}

#[derive(Debug)]
struct Frame<V> {
    node: SharedNode<V>,
    // valid on bits [0, node.crit_bit)
    prefix: u64,
    cursor: Cursor,
}

enum Step<V> {
    Skip,
    Yield(u64, V),
    Descend(Frame<V>),
}

/// A lazy traversal of one trie version, filtered by `F`.
///
/// The traversal owns the root it was created from, so writes made to the
/// trie afterwards are never observed. It yields `(key, value)` pairs in
/// ascending key order (unsigned unless the filter says otherwise) and cannot
/// be restarted.
#[derive(Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Traversal<V, F> {
    filter: F,
    stack: Vec<Frame<V>>,
    // the entry the next call to `next` returns
    pending: Option<(u64, V)>,
}

/// Traversal over every entry.
pub type Iter<V> = Traversal<V, Unbounded>;

/// Traversal over a closed key interval.
pub type RangeIter<V> = Traversal<V, KeyRange>;

/// Traversal over a closed signed key interval.
pub type SignedRangeIter<V> = Traversal<V, SignedKeyRange>;

/// Traversal over a bitwise key mask.
pub type MaskIter<V> = Traversal<V, KeyMask>;

impl<V: Clone, F: KeyFilter> Traversal<V, F> {
    pub(crate) fn new(root: Option<Slot<V>>, filter: F) -> Self {
        let mut this = Self {
            filter,
            stack: Vec::new(),
            pending: None,
        };
        match root {
            None => {}
            Some(Slot::Leaf { key, value }) => {
                if this.filter.admits_key(key) {
                    this.pending = Some((key, value));
                }
            }
            Some(Slot::Branch { prefix, node }) => {
                if this.filter.admits_prefix(prefix, node.crit_bit) {
                    this.stack.reserve_exact(usize::from(KEY_BITS));
                    this.stack.push(Frame {
                        node,
                        prefix,
                        cursor: Cursor::ReadFirst,
                    });
                    this.pending = this.advance();
                }
            }
        }
        this
    }

    /// Whether another entry remains.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.pending.is_some()
    }

    /// The key the next call to [`Iterator::next`] returns, if any.
    #[must_use]
    pub fn peek_key(&self) -> Option<u64> {
        self.pending.as_ref().map(|(key, _)| *key)
    }

    /// Returns the next entry.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::NoSuchElement`] once every entry has been produced.
    pub fn try_next(&mut self) -> Result<(u64, V), TraversalError> {
        self.next().ok_or(TraversalError::NoSuchElement)
    }

    /// Converts this traversal into one over keys only.
    pub const fn keys(self) -> Keys<V, F> {
        Keys { inner: self }
    }

    /// Converts this traversal into one over values only.
    pub const fn values(self) -> Values<V, F> {
        Values { inner: self }
    }

    /// Walks the stack until the next admitted leaf.
    fn advance(&mut self) -> Option<(u64, V)> {
        while let Some(frame) = self.stack.last_mut() {
            let crit = frame.node.crit_bit;
            let upper_first = self.filter.upper_first(crit);
            let (side, last) = match frame.cursor {
                Cursor::ReadFirst => {
                    frame.cursor = Cursor::ReadSecond;
                    (if upper_first { Side::Hi } else { Side::Lo }, false)
                }
                Cursor::ReadSecond => {
                    frame.cursor = Cursor::ReturnToParent;
                    (if upper_first { Side::Lo } else { Side::Hi }, true)
                }
                Cursor::ReturnToParent => {
                    self.stack.pop();
                    continue;
                }
            };
            let candidate = match side {
                Side::Lo => clear_bit(frame.prefix, crit),
                Side::Hi => set_bit(frame.prefix, crit),
            };

            // the candidate is decided on bits [0, crit]
            let step = if self.filter.admits_prefix(candidate, crit + 1) {
                match frame.node.slot(side) {
                    Slot::Leaf { key, value } if self.filter.admits_key(*key) => {
                        Step::Yield(*key, value.clone())
                    }
                    Slot::Leaf { .. } => Step::Skip,
                    Slot::Branch { prefix, node } => Step::Descend(Frame {
                        node: node.clone(),
                        prefix: *prefix,
                        cursor: Cursor::ReadFirst,
                    }),
                }
            } else {
                Step::Skip
            };

            match step {
                Step::Skip => {}
                Step::Yield(key, value) => {
                    if last {
                        // nothing left at this level
                        self.stack.pop();
                    }
                    return Some((key, value));
                }
                Step::Descend(child) => {
                    debug_assert!(self.stack.len() < usize::from(KEY_BITS));
                    self.stack.push(child);
                }
            }
        }
        None
    }
}

impl<V: Clone, F: KeyFilter> Iterator for Traversal<V, F> {
    type Item = (u64, V);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.pending.take()?;
        self.pending = self.advance();
        Some(current)
    }
}

impl<V: Clone, F: KeyFilter> FusedIterator for Traversal<V, F> {}

/// A [`Traversal`] yielding keys only.
#[derive(Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<V, F> {
    inner: Traversal<V, F>,
}

impl<V: Clone, F: KeyFilter> Keys<V, F> {
    /// Returns the next key.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::NoSuchElement`] once every key has been produced.
    pub fn try_next(&mut self) -> Result<u64, TraversalError> {
        self.inner.try_next().map(|(key, _)| key)
    }
}

impl<V: Clone, F: KeyFilter> Iterator for Keys<V, F> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

impl<V: Clone, F: KeyFilter> FusedIterator for Keys<V, F> {}

/// A [`Traversal`] yielding values only.
#[derive(Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<V, F> {
    inner: Traversal<V, F>,
}

impl<V: Clone, F: KeyFilter> Values<V, F> {
    /// Returns the next value.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::NoSuchElement`] once every value has been produced.
    pub fn try_next(&mut self) -> Result<V, TraversalError> {
        self.inner.try_next().map(|(_, value)| value)
    }
}

impl<V: Clone, F: KeyFilter> Iterator for Values<V, F> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }
}

impl<V: Clone, F: KeyFilter> FusedIterator for Values<V, F> {}
