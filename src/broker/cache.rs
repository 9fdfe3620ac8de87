// Per-broker dictionary cache holding non-owning entries

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use super::dictionary::{Dictionary, DictionaryInner};

/// Lookup key (language tag or word-list path) to a weak dictionary reference.
///
/// Keys are compared exactly as given; word-list paths stay `PathBuf` so
/// non-UTF-8 paths never collide. An entry never keeps its dictionary alive.
/// Entries whose dictionary was dropped or disposed read as misses and are
/// pruned on lookup.
#[derive(Debug)]
pub(crate) struct DictionaryCache<K> {
    entries: HashMap<K, Weak<DictionaryInner>>,
}

impl<K: Hash + Eq + Debug> DictionaryCache<K> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Live dictionary cached under `key`, if any
    pub fn try_get<Q>(&mut self, key: &Q) -> Option<Dictionary>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let entry = self.entries.get(key)?;
        match entry.upgrade().map(Dictionary::from_inner) {
            Some(dictionary) if !dictionary.is_disposed() => Some(dictionary),
            _ => {
                crate::trace!("Pruning stale cache entry for {:?}", key);
                self.entries.remove(key);
                None
            }
        }
    }

    /// Cache `dictionary` under `key`, replacing any previous entry
    pub fn register(&mut self, key: K, dictionary: &Dictionary) {
        self.entries.insert(key, Arc::downgrade(dictionary.inner()));
    }

    /// Remove the entry referring to this exact dictionary instance.
    ///
    /// Matches by identity: the key may already point at a newer dictionary.
    pub fn unregister(&mut self, dictionary: &Dictionary) {
        let target = Arc::as_ptr(dictionary.inner());
        self.entries
            .retain(|_, entry| !std::ptr::eq(entry.as_ptr(), target));
    }

    /// Take every dictionary still reachable through the cache and clear it
    pub fn drain_live_entries(&mut self) -> Vec<Dictionary> {
        self.entries
            .drain()
            .filter_map(|(_, entry)| entry.upgrade())
            .map(Dictionary::from_inner)
            .collect()
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
