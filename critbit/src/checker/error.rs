// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use thiserror::Error;

/// Errors returned by the checker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CheckerError {
    /// The recorded size differs from the number of leaves found
    #[error("trie records {recorded} entries but {counted} leaves were found")]
    SizeMismatch {
        /// The size recorded by the trie
        recorded: usize,
        /// The number of leaves reachable from the root
        counted: usize,
    },

    /// A node's critical bit does not come after its parent's
    #[error("node at depth {depth} has critical bit {crit_bit}, expected at least {min}")]
    CritBitOrder {
        /// The number of nodes above this one
        depth: usize,
        /// The critical bit of the node
        crit_bit: u8,
        /// The first position not already decided by the parent
        min: u8,
    },

    /// A node's critical bit lies outside the key
    #[error("node at depth {depth} has critical bit {crit_bit}, keys only have 64 bits")]
    CritBitOutOfRange {
        /// The number of nodes above this one
        depth: usize,
        /// The critical bit of the node
        crit_bit: u8,
    },

    /// A branch prefix carries bits at or after its child's critical bit
    #[error("prefix {prefix:#018x} has bits set at or after critical bit {crit_bit}")]
    PrefixNotMasked {
        /// The stored prefix
        prefix: u64,
        /// The critical bit of the child node
        crit_bit: u8,
    },

    /// A prefix or key disagrees with the path leading to it
    #[error("word {word:#018x} disagrees with {expected:#018x} on the leading {bits} bits")]
    PrefixMismatch {
        /// The key or prefix found in the slot
        word: u64,
        /// The prefix accumulated along the path
        expected: u64,
        /// The number of leading bits that must agree
        bits: u8,
    },

    /// A slot sits on the wrong side of its node
    #[error("word {word:#018x} is stored on the {found} side of critical bit {crit_bit}")]
    WrongSide {
        /// The key or prefix found in the slot
        word: u64,
        /// The critical bit of the node
        crit_bit: u8,
        /// The side it was found on, `"lo"` or `"hi"`
        found: &'static str,
    },
}
