use crate::dictionary::WordsId;
use crate::geometry::LayoutId;
use crate::gesture::GesturePath;
use crate::scorer::Pruner;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Small fixed-capacity LRU. Most recently used entries sit at the front; capacities
/// here are single digits, so lookups are linear scans.
#[derive(Debug)]
pub struct LruCache<K, V> {
    entries: VecDeque<(K, V)>,
    capacity: usize,
}

impl<K: PartialEq, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        if pos > 0 {
            let entry = self.entries.remove(pos)?;
            self.entries.push_front(entry);
        }
        self.entries.front().map(|(_, v)| v)
    }

    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(pos);
        }
        self.entries.push_front((key, value));
        self.entries.truncate(self.capacity);
    }

    /// Removes every entry whose key matches; returns how many were dropped.
    pub fn remove_where<F: FnMut(&K) -> bool>(&mut self, mut pred: F) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| !pred(k));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Identity of a (layout, word table) pairing. Changes exactly when either input does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId {
    pub layout: LayoutId,
    pub words: WordsId,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub model: ModelId,
    pub gesture: GesturePath,
    pub max_count: usize,
}

/// The two recognizer caches: finished suggestion lists for recent queries, and
/// pruners for recently active (layout, word table) pairs.
///
/// Invalidation is eager: callers clear entries when the active model changes
/// instead of checking for staleness on read.
#[derive(Debug)]
pub struct ResultCache {
    queries: Mutex<LruCache<QueryKey, Vec<String>>>,
    pruners: Mutex<LruCache<ModelId, Arc<Pruner>>>,
}

impl ResultCache {
    pub fn new(query_capacity: usize, pruner_capacity: usize) -> Self {
        Self {
            queries: Mutex::new(LruCache::new(query_capacity)),
            pruners: Mutex::new(LruCache::new(pruner_capacity)),
        }
    }

    fn queries(&self) -> MutexGuard<'_, LruCache<QueryKey, Vec<String>>> {
        self.queries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pruners(&self) -> MutexGuard<'_, LruCache<ModelId, Arc<Pruner>>> {
        self.pruners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn suggestions(&self, key: &QueryKey) -> Option<Vec<String>> {
        self.queries().get(key).cloned()
    }

    pub fn store_suggestions(&self, key: QueryKey, words: Vec<String>) {
        self.queries().put(key, words);
    }

    pub fn pruner(&self, model: &ModelId) -> Option<Arc<Pruner>> {
        self.pruners().get(model).cloned()
    }

    pub fn store_pruner(&self, model: ModelId, pruner: Arc<Pruner>) {
        self.pruners().put(model, pruner);
    }

    pub fn invalidate_queries(&self) {
        let mut queries = self.queries();
        if !queries.is_empty() {
            debug!("Dropping {} cached suggestion lists", queries.len());
        }
        queries.clear();
    }

    /// Drops pruners built for any geometry carrying this layout label.
    pub fn evict_layout(&self, name: &str) -> usize {
        let removed = self.pruners().remove_where(|m| m.layout.name == name);
        if removed > 0 {
            debug!("Evicted {} pruner(s) for layout '{}'", removed, name);
        }
        removed
    }

    /// Drops pruners built for any word table carrying this dictionary label.
    pub fn evict_words(&self, name: &str) -> usize {
        let removed = self.pruners().remove_where(|m| m.words.name == name);
        if removed > 0 {
            debug!("Evicted {} pruner(s) for dictionary '{}'", removed, name);
        }
        removed
    }

    pub fn clear(&self) {
        self.queries().clear();
        self.pruners().clear();
    }

    pub fn query_count(&self) -> usize {
        self.queries().len()
    }

    pub fn pruner_count(&self) -> usize {
        self.pruners().len()
    }
}
