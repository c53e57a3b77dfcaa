// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use crate::bits::{bit_at, crit_bit, prefix_through};

/// A shared node, which is just a triomphe Arc of a node.
pub(crate) type SharedNode<V> = triomphe::Arc<Node<V>>;

/// Which half of a [`Node`] a key falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Lo,
    Hi,
}

impl Side {
    /// The side `word` belongs to when split at `crit_bit`.
    #[inline]
    pub(crate) const fn of(word: u64, crit_bit: u8) -> Self {
        if bit_at(word, crit_bit) {
            Side::Hi
        } else {
            Side::Lo
        }
    }
}

/// One half of a [`Node`], or the root of a trie.
///
/// A leaf carries the full key of its entry. A branch carries the prefix
/// shared by every key below it; only the bits before the child's critical
/// bit are meaningful and the rest are kept zeroed.
#[derive(Debug, Clone)]
pub(crate) enum Slot<V> {
    Leaf { key: u64, value: V },
    Branch { prefix: u64, node: SharedNode<V> },
}

/// An interior vertex: the critical bit at which its two halves diverge.
#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
    pub(crate) crit_bit: u8,
    pub(crate) lo: Slot<V>,
    pub(crate) hi: Slot<V>,
}

impl<V> Slot<V> {
    /// Builds a branch slot, normalizing the prefix to the child's critical bit.
    pub(crate) fn branch(prefix: u64, node: Node<V>) -> Self {
        Slot::Branch {
            prefix: prefix_through(prefix, node.crit_bit),
            node: SharedNode::new(node),
        }
    }

    /// The key of a leaf or the prefix of a branch.
    #[inline]
    pub(crate) const fn word(&self) -> u64 {
        match self {
            Slot::Leaf { key, .. } => *key,
            Slot::Branch { prefix, .. } => *prefix,
        }
    }

    /// Re-derives the stored prefix of a branch from its child's critical bit.
    /// Leaves are returned untouched.
    pub(crate) fn normalized(self) -> Self {
        match self {
            Slot::Branch { prefix, node } => Slot::Branch {
                prefix: prefix_through(prefix, node.crit_bit),
                node,
            },
            leaf @ Slot::Leaf { .. } => leaf,
        }
    }
}

impl<V> Node<V> {
    /// Places two slots that diverge at `crit_bit` on their proper sides.
    pub(crate) fn pair(crit_bit: u8, a: Slot<V>, b: Slot<V>) -> Self {
        debug_assert_ne!(
            Side::of(a.word(), crit_bit),
            Side::of(b.word(), crit_bit),
            "slots must diverge at the critical bit"
        );
        match Side::of(a.word(), crit_bit) {
            Side::Lo => Node {
                crit_bit,
                lo: a,
                hi: b,
            },
            Side::Hi => Node {
                crit_bit,
                lo: b,
                hi: a,
            },
        }
    }

    /// Builds the node that separates two distinct keys.
    ///
    /// The critical bit is the first position at which the keys differ. Equal
    /// keys cannot be split; both values are handed back unchanged.
    pub(crate) fn split(k1: u64, v1: V, k2: u64, v2: V) -> Result<Self, (V, V)> {
        match crit_bit(k1, k2) {
            None => Err((v1, v2)),
            Some(pos) => Ok(Node::pair(
                pos,
                Slot::Leaf { key: k1, value: v1 },
                Slot::Leaf { key: k2, value: v2 },
            )),
        }
    }

    #[inline]
    pub(crate) const fn slot(&self, side: Side) -> &Slot<V> {
        match side {
            Side::Lo => &self.lo,
            Side::Hi => &self.hi,
        }
    }

    /// Consumes the node, returning `(chosen, sibling)` for `side`.
    #[inline]
    pub(crate) fn into_slots(self, side: Side) -> (Slot<V>, Slot<V>) {
        match side {
            Side::Lo => (self.lo, self.hi),
            Side::Hi => (self.hi, self.lo),
        }
    }

    /// Rebuilds a node from a slot on `side` and the untouched sibling.
    #[inline]
    pub(crate) fn from_slots(
        crit_bit: u8,
        side: Side,
        chosen: Slot<V>,
        sibling: Slot<V>,
    ) -> Self {
        match side {
            Side::Lo => Node {
                crit_bit,
                lo: chosen,
                hi: sibling,
            },
            Side::Hi => Node {
                crit_bit,
                lo: sibling,
                hi: chosen,
            },
        }
    }
}

/// Takes a node out of its shared pointer for modification.
///
/// If no other version still refers to the node it is moved out; otherwise it
/// is cloned and the older version keeps the original untouched.
#[inline]
pub(crate) fn unshare<V: Clone>(node: SharedNode<V>) -> Node<V> {
    triomphe::Arc::try_unwrap(node).unwrap_or_else(|shared| Node::clone(&shared))
}
