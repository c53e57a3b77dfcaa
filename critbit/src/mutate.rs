// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

//! Copy-on-write insertion and removal.
//!
//! Both operations consume the slot they start from and return its
//! replacement. Every node on the path from that slot to the mutation point
//! is taken apart with [`unshare`] and reassembled into a freshly allocated
//! node, so a version of the trie that is still referenced elsewhere never
//! observes the change. Siblings that are not on the path stay shared.

use crate::bits::{crit_bit, prefix_matches};
use crate::node::{Node, SharedNode, Side, Slot, unshare};

/// Inserts `key` below `slot`, returning the new slot and the value `key`
/// previously held, if any.
pub(crate) fn insert<V: Clone>(slot: Slot<V>, key: u64, value: V) -> (Slot<V>, Option<V>) {
    match slot {
        Slot::Leaf {
            key: existing,
            value: old,
        } => match Node::split(key, value, existing, old) {
            Ok(node) => (Slot::branch(key, node), None),
            Err((value, old)) => (Slot::Leaf { key, value }, Some(old)),
        },
        Slot::Branch { prefix, node } => {
            let crit = node.crit_bit;
            match crit_bit(key, prefix) {
                // the key leaves the shared prefix above this node: splice a
                // new node in between that owns the whole old subtree
                Some(diverge) if diverge < crit => {
                    let subtree = Slot::Branch { prefix, node };
                    let leaf = Slot::Leaf { key, value };
                    (Slot::branch(key, Node::pair(diverge, leaf, subtree)), None)
                }
                _ => {
                    let side = Side::of(key, crit);
                    let (chosen, sibling) = unshare(node).into_slots(side);
                    let (chosen, previous) = insert(chosen, key, value);
                    let node = Node::from_slots(crit, side, chosen, sibling);
                    (
                        Slot::Branch {
                            prefix,
                            node: SharedNode::new(node),
                        },
                        previous,
                    )
                }
            }
        }
    }
}

/// Removes `key` from below `slot`.
///
/// Returns the remaining slot, `None` when `slot` was the matching leaf
/// itself, and the removed value. When a leaf below a node is removed the
/// node disappears and its other half takes its place in the parent.
pub(crate) fn remove<V: Clone>(slot: Slot<V>, key: u64) -> (Option<Slot<V>>, Option<V>) {
    match slot {
        Slot::Leaf {
            key: existing,
            value,
        } if existing == key => (None, Some(value)),
        leaf @ Slot::Leaf { .. } => (Some(leaf), None),
        Slot::Branch { prefix, node } if !prefix_matches(node.crit_bit, key, prefix) => {
            (Some(Slot::Branch { prefix, node }), None)
        }
        Slot::Branch { prefix, node } => {
            let crit = node.crit_bit;
            let side = Side::of(key, crit);
            let (chosen, sibling) = unshare(node).into_slots(side);
            match remove(chosen, key) {
                (None, removed) => (Some(sibling.normalized()), removed),
                (Some(chosen), removed) => {
                    let node = Node::from_slots(crit, side, chosen, sibling);
                    (
                        Some(Slot::Branch {
                            prefix,
                            node: SharedNode::new(node),
                        }),
                        removed,
                    )
                }
            }
        }
    }
}
