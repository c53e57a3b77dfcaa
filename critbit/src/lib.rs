// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]
#![deny(unsafe_code)]

//! # firewood-critbit is a copy-on-write crit-bit trie over 64-bit keys
//!
//! A [`CritBit64`] maps `u64` keys to values in a binary PATRICIA trie. Every
//! interior node records the first bit position (most significant bit first)
//! at which the keys below it diverge, so a lookup inspects at most one bit
//! per level and the depth never exceeds 64.
//!
//! Mutation replaces the nodes on the path to the change instead of editing
//! them, which makes [`Snapshot`]s and iterators immutable views. Traversals
//! share one engine: all entries, a closed key range in unsigned
//! ([`CritBit64::query`]) or signed ([`CritBit64::query_signed`]) order, and a
//! bitwise mask ([`CritBit64::query_with_mask`]).
//!
//! [`SharedCritBit64`] publishes successive snapshots for concurrent readers
//! while serializing writers.

pub mod bits;
mod checker;
mod debug;
mod iter;
pub mod logger;
mod mutate;
mod node;
mod shared;
mod trie;

pub use checker::{CheckerError, TrieStats};
pub use iter::{
    Iter, KeyFilter, KeyMask, KeyRange, Keys, MaskIter, RangeIter, SignedKeyRange,
    SignedRangeIter, Traversal, TraversalError, Unbounded, Values,
};
pub use shared::{Revision, SharedConfig, SharedCritBit64};
pub use trie::{CritBit64, Snapshot};

#[cfg(any(test, feature = "test_utils"))]
mod test_utils {
    use std::cell::RefCell;

    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng, TryRngCore};

    /// A reproducible random source for randomized tests.
    ///
    /// Methods take `&self`, so one generator can feed several closures in a
    /// test. `&SeededRng` implements [`RngCore`] for use with `rand` adaptors
    /// such as `SliceRandom::shuffle`.
    #[derive(Debug)]
    #[must_use]
    pub struct SeededRng(RefCell<StdRng>);

    impl SeededRng {
        const ENV: &str = "CRITBIT_TEST_SEED";

        /// A generator with a fixed seed.
        pub fn new(seed: u64) -> Self {
            Self(RefCell::new(StdRng::seed_from_u64(seed)))
        }

        /// Seeds from `CRITBIT_TEST_SEED`, or `None` if it is unset.
        ///
        /// # Panics
        ///
        /// Panics if the variable is set but is not a `u64`.
        #[track_caller]
        #[must_use]
        pub fn from_env() -> Option<Self> {
            let seed = std::env::var(Self::ENV).ok()?;
            Some(Self::new(seed.trim().parse().unwrap_or_else(|_| {
                panic!("{} must be a valid u64, got {seed:?}", Self::ENV)
            })))
        }

        /// Seeds from the OS and prints the seed for reruns.
        pub fn from_random() -> Self {
            let seed = rand::rngs::OsRng.unwrap_err().next_u64();
            eprintln!("Seed {seed}: to rerun with this data, export {}={seed}", Self::ENV);
            Self::new(seed)
        }

        /// [`SeededRng::from_env`], falling back to [`SeededRng::from_random`].
        #[track_caller]
        pub fn from_env_or_random() -> Self {
            Self::from_env().unwrap_or_else(Self::from_random)
        }

        /// A random `u32`.
        #[must_use]
        pub fn next_u32(&self) -> u32 {
            self.0.borrow_mut().next_u32()
        }

        /// A random `u64`.
        #[must_use]
        pub fn next_u64(&self) -> u64 {
            self.0.borrow_mut().next_u64()
        }

        /// [`rand::Rng::random_range`] through a shared reference.
        #[track_caller]
        pub fn random_range<T, R>(&self, range: R) -> T
        where
            T: rand::distr::uniform::SampleUniform,
            R: rand::distr::uniform::SampleRange<T>,
        {
            rand::Rng::random_range(&mut &*self, range)
        }
    }

    impl RngCore for &SeededRng {
        fn next_u32(&mut self) -> u32 {
            SeededRng::next_u32(self)
        }

        fn next_u64(&mut self) -> u64 {
            SeededRng::next_u64(self)
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            self.0.borrow_mut().fill_bytes(dst);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use rand::seq::SliceRandom;

        #[test]
        fn same_seed_same_stream() {
            let (a, b) = (SeededRng::new(7), SeededRng::new(7));
            assert_eq!(a.next_u64(), b.next_u64());
            assert_eq!(a.random_range(0..1_000u32), b.random_range(0..1_000u32));

            let (mut x, mut y) = ([1, 2, 3, 4, 5, 6, 7, 8], [1, 2, 3, 4, 5, 6, 7, 8]);
            x.shuffle(&mut &a);
            y.shuffle(&mut &b);
            assert_eq!(x, y);
        }
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub use self::test_utils::SeededRng;
