// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

//! A trie shared between threads.
//!
//! Readers load the latest published [`Revision`] with one atomic operation
//! and never wait for writers. Writers are serialized by a mutex, build the
//! next version with copy-on-write and publish it with a single pointer swap,
//! so a reader observes either the whole write or none of it.

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use typed_builder::TypedBuilder;

use crate::logger::{debug, error, trace};
use crate::{CritBit64, Snapshot};

/// Settings of a [`SharedCritBit64`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, TypedBuilder)]
pub struct SharedConfig {
    /// The number of published revisions to keep, the latest included.
    /// Values below one are treated as one.
    #[builder(default = 64)]
    max_revisions: usize,
    /// Run the invariant checker on every commit and log failures.
    #[builder(default = false)]
    check_invariants_on_commit: bool,
}

impl SharedConfig {
    /// The number of published revisions that are kept.
    #[must_use]
    pub const fn max_revisions(&self) -> usize {
        self.max_revisions
    }

    /// Whether commits are validated.
    #[must_use]
    pub const fn check_invariants_on_commit(&self) -> bool {
        self.check_invariants_on_commit
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A published version of a [`SharedCritBit64`].
#[derive(Debug)]
pub struct Revision<V> {
    version: u64,
    snapshot: Snapshot<V>,
}

impl<V> Revision<V> {
    /// The version number. The initial empty trie is version 0 and every
    /// commit adds one.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// The contents of this version.
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot<V> {
        &self.snapshot
    }
}

impl<V> Deref for Revision<V> {
    type Target = Snapshot<V>;

    fn deref(&self) -> &Self::Target {
        &self.snapshot
    }
}

/// A [`CritBit64`] with lock-free readers and serialized writers.
#[derive(Debug)]
pub struct SharedCritBit64<V> {
    current: ArcSwap<Revision<V>>,
    // the writer lock; also guards the retained revisions, oldest first
    history: Mutex<VecDeque<Arc<Revision<V>>>>,
    config: SharedConfig,
}

impl<V> SharedCritBit64<V> {
    /// Creates an empty shared trie.
    #[must_use]
    pub fn new(config: SharedConfig) -> Self {
        Self::with_contents(CritBit64::new(), config)
    }

    /// Publishes `trie` as version 0.
    #[must_use]
    pub fn with_contents(trie: CritBit64<V>, config: SharedConfig) -> Self {
        let initial = Arc::new(Revision {
            version: 0,
            snapshot: trie.into_snapshot(),
        });
        Self {
            current: ArcSwap::new(Arc::clone(&initial)),
            history: Mutex::new(VecDeque::from([initial])),
            config,
        }
    }

    /// The configuration this trie was created with.
    #[must_use]
    pub const fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// The latest published revision. It stays valid and unchanged for as
    /// long as the caller holds it.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Revision<V>> {
        self.current.load_full()
    }

    /// The version number of the latest published revision.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.current.load().version
    }

    /// The number of entries in the latest revision.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    /// Whether the latest revision has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Whether `key` is present in the latest revision.
    #[must_use]
    pub fn contains(&self, key: u64) -> bool {
        self.current.load().contains(key)
    }

    /// Returns a retained revision by version number.
    #[must_use]
    pub fn revision(&self, version: u64) -> Option<Arc<Revision<V>>> {
        self.history
            .lock()
            .iter()
            .find(|revision| revision.version == version)
            .cloned()
    }
}

impl<V: Clone> SharedCritBit64<V> {
    /// Returns a copy of the value stored under `key` in the latest revision.
    #[must_use]
    pub fn get(&self, key: u64) -> Option<V> {
        self.current.load().get(key).cloned()
    }

    /// Stores `value` under `key` and publishes the result.
    pub fn put(&self, key: u64, value: V) -> Option<V> {
        self.update(|trie| trie.put(key, value))
    }

    /// Removes `key` and publishes the result. Nothing is published when the
    /// key is absent.
    pub fn remove(&self, key: u64) -> Option<V> {
        let mut history = self.history.lock();
        let latest = self.current.load_full();
        if !latest.contains(key) {
            return None;
        }
        self.commit(&mut history, &latest, |trie| trie.remove(key))
    }

    /// Applies a batch of writes and publishes them as one revision.
    ///
    /// Readers see either none or all of the batch. A new revision is
    /// published even if `f` changes nothing.
    pub fn update<R>(&self, f: impl FnOnce(&mut CritBit64<V>) -> R) -> R {
        let mut history = self.history.lock();
        let latest = self.current.load_full();
        self.commit(&mut history, &latest, f)
    }

    fn commit<R>(
        &self,
        history: &mut VecDeque<Arc<Revision<V>>>,
        latest: &Revision<V>,
        f: impl FnOnce(&mut CritBit64<V>) -> R,
    ) -> R {
        let mut trie = CritBit64::from(latest.snapshot.clone());
        let result = f(&mut trie);
        let revision = Arc::new(Revision {
            version: latest.version + 1,
            snapshot: trie.into_snapshot(),
        });

        if self.config.check_invariants_on_commit {
            if let Err(err) = revision.check() {
                error!("revision {} is corrupt: {err}", revision.version);
            }
        }

        self.current.store(Arc::clone(&revision));
        trace!(
            "published revision {} with {} entries",
            revision.version,
            revision.len()
        );
        history.push_back(revision);

        let retained = self.config.max_revisions.max(1);
        while history.len() > retained {
            if let Some(pruned) = history.pop_front() {
                debug!("dropping revision {}", pruned.version);
            }
        }
        result
    }
}

impl<V> Default for SharedCritBit64<V> {
    fn default() -> Self {
        Self::new(SharedConfig::default())
    }
}

impl<V> From<CritBit64<V>> for SharedCritBit64<V> {
    fn from(trie: CritBit64<V>) -> Self {
        Self::with_contents(trie, SharedConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]

    use super::*;
    use test_case::test_case;

    #[test]
    fn default_config() {
        let config = SharedConfig::default();
        assert_eq!(config.max_revisions(), 64);
        assert!(!config.check_invariants_on_commit());
    }

    #[test]
    fn writes_publish_new_versions() {
        let shared = SharedCritBit64::default();
        assert_eq!(shared.version(), 0);
        assert_eq!(shared.put(1, "one"), None);
        assert_eq!(shared.put(1, "uno"), Some("one"));
        assert_eq!(shared.version(), 2);
        assert_eq!(shared.get(1), Some("uno"));
        assert_eq!(shared.remove(1), Some("uno"));
        assert_eq!(shared.version(), 3);
        assert!(shared.is_empty());
    }

    #[test]
    fn missing_remove_publishes_nothing() {
        let shared: SharedCritBit64<u8> = CritBit64::from_iter([(4, 4)]).into();
        assert_eq!(shared.remove(5), None);
        assert_eq!(shared.version(), 0);
        assert_eq!(shared.len(), 1);
    }

    #[test]
    fn held_snapshot_is_isolated() {
        let shared = SharedCritBit64::default();
        shared.update(|trie| trie.extend((0..10).map(|k| (k, k))));
        let before = shared.snapshot();

        shared.update(|trie| {
            for k in 0..5 {
                trie.remove(k);
            }
            trie.put(100, 100);
        });

        assert_eq!(before.version(), 1);
        assert_eq!(before.len(), 10);
        assert_eq!(before.keys().collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());
        let after = shared.snapshot();
        assert_eq!(after.version(), 2);
        assert_eq!(after.keys().collect::<Vec<_>>(), [5, 6, 7, 8, 9, 100]);
    }

    #[test]
    fn update_returns_closure_result() {
        let shared = SharedCritBit64::default();
        let inserted =
            shared.update(|trie| (0..8).filter(|&k| trie.put(k % 4, k).is_none()).count());
        assert_eq!(inserted, 4);
        assert_eq!(shared.len(), 4);
    }

    #[test_case(1)]
    #[test_case(3)]
    #[test_case(0)]
    fn history_is_bounded(max_revisions: usize) {
        let config = SharedConfig::builder()
            .max_revisions(max_revisions)
            .build();
        let shared = SharedCritBit64::new(config);
        for k in 0..10 {
            shared.put(k, k);
        }
        let retained = u64::try_from(max_revisions.max(1)).unwrap();
        for version in 0..=10 {
            let found = shared.revision(version);
            if version > 10 - retained {
                assert_eq!(found.unwrap().len(), usize::try_from(version).unwrap());
            } else {
                assert!(found.is_none(), "version {version} should be pruned");
            }
        }
    }

    #[test]
    fn checked_commits_stay_valid() {
        let config = SharedConfig::builder()
            .check_invariants_on_commit(true)
            .build();
        let shared = SharedCritBit64::new(config);
        for k in [3, 1 << 60, 7, u64::MAX, 0] {
            shared.put(k, ());
        }
        assert!(shared.snapshot().check_invariants());
        assert_eq!(shared.snapshot().check().unwrap().leaves, 5);
    }
}
