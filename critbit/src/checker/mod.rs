// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

mod error;

use crate::bits::{KEY_BITS, high_mask, prefix_matches};
use crate::node::{Node, Side, Slot};

pub use error::CheckerError;

/// Shape statistics collected while checking a trie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrieStats {
    /// The number of entries
    pub leaves: usize,
    /// The number of interior nodes
    pub branches: usize,
    /// The largest number of nodes on a root-to-leaf path
    pub max_depth: usize,
}

/// Walk the trie from `root` and check it. It proceeds in the following steps:
/// 1. every critical bit lies inside the key and after its parent's
/// 2. every branch prefix is zero from its child's critical bit onwards
/// 3. every key and prefix agrees with the path leading to it and lies on
///    the side of its node that its critical bit selects
/// 4. the number of leaves matches the recorded size
pub(crate) fn check<V>(root: Option<&Slot<V>>, size: usize) -> Result<TrieStats, CheckerError> {
    let mut stats = TrieStats::default();

    match root {
        None => {}
        Some(Slot::Leaf { .. }) => stats.leaves = 1,
        Some(Slot::Branch { prefix, node }) => {
            check_masked(*prefix, node)?;
            traverse(node, *prefix, 0, &mut stats)?;
        }
    }

    if stats.leaves != size {
        return Err(CheckerError::SizeMismatch {
            recorded: size,
            counted: stats.leaves,
        });
    }
    Ok(stats)
}

fn check_masked<V>(prefix: u64, node: &Node<V>) -> Result<(), CheckerError> {
    if prefix & !high_mask(node.crit_bit) != 0 {
        return Err(CheckerError::PrefixNotMasked {
            prefix,
            crit_bit: node.crit_bit,
        });
    }
    Ok(())
}

/// Recursively check the subtree below `node`, reached through `prefix`.
///
/// Recursion depth is bounded by the key width since critical bits strictly
/// increase on the way down.
fn traverse<V>(
    node: &Node<V>,
    prefix: u64,
    depth: usize,
    stats: &mut TrieStats,
) -> Result<(), CheckerError> {
    let crit = node.crit_bit;
    if crit >= KEY_BITS {
        return Err(CheckerError::CritBitOutOfRange {
            depth,
            crit_bit: crit,
        });
    }

    stats.branches += 1;
    stats.max_depth = stats.max_depth.max(depth + 1);

    for (side, slot) in [(Side::Lo, &node.lo), (Side::Hi, &node.hi)] {
        if let Slot::Branch { node: child, .. } = slot {
            if child.crit_bit <= crit {
                return Err(CheckerError::CritBitOrder {
                    depth: depth + 1,
                    crit_bit: child.crit_bit,
                    min: crit + 1,
                });
            }
        }

        let word = slot.word();
        if Side::of(word, crit) != side {
            return Err(CheckerError::WrongSide {
                word,
                crit_bit: crit,
                found: match side {
                    Side::Lo => "lo",
                    Side::Hi => "hi",
                },
            });
        }
        if !prefix_matches(crit, word, prefix) {
            return Err(CheckerError::PrefixMismatch {
                word,
                expected: prefix,
                bits: crit,
            });
        }

        match slot {
            Slot::Leaf { .. } => stats.leaves += 1,
            Slot::Branch {
                prefix: child_prefix,
                node: child,
            } => {
                check_masked(*child_prefix, child)?;
                traverse(child, *child_prefix, depth + 1, stats)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]

    use super::*;
    use crate::CritBit64;
    use crate::node::SharedNode;

    fn leaf(key: u64) -> Slot<()> {
        Slot::Leaf { key, value: () }
    }

    fn branch(prefix: u64, crit_bit: u8, lo: Slot<()>, hi: Slot<()>) -> Slot<()> {
        Slot::Branch {
            prefix,
            node: SharedNode::new(Node { crit_bit, lo, hi }),
        }
    }

    #[test]
    fn valid_tries_pass() {
        assert_eq!(check::<()>(None, 0).unwrap(), TrieStats::default());
        assert_eq!(check(Some(&leaf(5)), 1).unwrap().leaves, 1);

        let trie: CritBit64<()> = (0..64).map(|i| (1u64 << i, ())).collect();
        let stats = trie.check().unwrap();
        assert_eq!(stats.leaves, 64);
        assert_eq!(stats.branches, 63);
        assert_eq!(stats.max_depth, 63);
    }

    #[test]
    fn size_mismatch() {
        let root = branch(0, 63, leaf(0), leaf(1));
        assert_eq!(
            check(Some(&root), 3),
            Err(CheckerError::SizeMismatch {
                recorded: 3,
                counted: 2
            })
        );
        assert!(matches!(
            check::<()>(None, 1),
            Err(CheckerError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn leaf_on_wrong_side() {
        let root = branch(0, 63, leaf(1), leaf(0));
        assert_eq!(
            check(Some(&root), 2),
            Err(CheckerError::WrongSide {
                word: 1,
                crit_bit: 63,
                found: "lo"
            })
        );
    }

    #[test]
    fn crit_bit_must_increase() {
        let child = branch(0, 10, leaf(0), leaf(1 << 53));
        let root = branch(0, 20, child, leaf(1 << 43));
        assert!(matches!(
            check(Some(&root), 3),
            Err(CheckerError::CritBitOrder {
                depth: 1,
                crit_bit: 10,
                min: 21
            })
        ));
    }

    #[test]
    fn crit_bit_must_fit_the_key() {
        let root = branch(0, 64, leaf(0), leaf(1));
        assert!(matches!(
            check(Some(&root), 2),
            Err(CheckerError::CritBitOutOfRange { crit_bit: 64, .. })
        ));
    }

    #[test]
    fn prefix_must_be_masked() {
        let root = branch(1, 62, leaf(0), leaf(2));
        assert_eq!(
            check(Some(&root), 2),
            Err(CheckerError::PrefixNotMasked {
                prefix: 1,
                crit_bit: 62
            })
        );
    }

    #[test]
    fn leaf_must_share_the_prefix() {
        // both leaves are on the right sides of bit 63 but the prefix says
        // every key starts with a one
        let root = branch(1 << 63, 63, leaf(0), leaf(1));
        assert_eq!(
            check(Some(&root), 2),
            Err(CheckerError::PrefixMismatch {
                word: 0,
                expected: 1 << 63,
                bits: 63
            })
        );
    }
}
