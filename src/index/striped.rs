//! Lock-striped concurrent hash map.
//!
//! Open hashing with chained entries: a backing array of buckets where every
//! bucket carries its own `RwLock`, so operations on unrelated keys rarely
//! contend. The table doubles once the element count exceeds 0.75x the bucket
//! count.
//!
//! Resize discipline: an outer `RwLock` wraps the bucket array. Every bucket
//! operation holds it in read mode (shared, so cross-bucket parallelism is
//! unaffected) and resize holds it in write mode, which excludes all other
//! operations while entries are rehashed. This is deliberately stronger than
//! a per-bucket drain, where a writer hashing against the old bucket count
//! could insert into a bucket that has already been drained.

use ahash::RandomState;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

const DEFAULT_CAPACITY: usize = 16;
const LOAD_FACTOR: f64 = 0.75;

type Bucket<K, V> = RwLock<Vec<(K, V)>>;

/// Hash map with one read/write lock per bucket.
pub struct StripedMap<K, V> {
    table: RwLock<Vec<Bucket<K, V>>>,
    len: AtomicUsize,
    hasher: RandomState,
}

impl<K: Hash + Eq, V> StripedMap<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let buckets = capacity.max(1);
        Self {
            table: RwLock::new((0..buckets).map(|_| RwLock::new(Vec::new())).collect()),
            len: AtomicUsize::new(0),
            hasher: RandomState::new(),
        }
    }

    fn bucket_of<Q>(&self, key: &Q, buckets: usize) -> usize
    where
        Q: Hash + ?Sized,
    {
        (self.hasher.hash_one(key) as usize) % buckets
    }

    /// Number of entries. Maintained as an atomic counter, so it may lag a
    /// concurrent writer by a moment.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert or overwrite a value.
    pub fn insert(&self, key: K, value: V) {
        self.maybe_grow();
        let table = self.table.read().unwrap();
        let idx = self.bucket_of(&key, table.len());
        let mut bucket = table[idx].write().unwrap();
        if let Some(entry) = bucket.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
            return;
        }
        bucket.push((key, value));
        self.len.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let table = self.table.read().unwrap();
        let idx = self.bucket_of(key, table.len());
        let bucket = table[idx].read().unwrap();
        bucket
            .iter()
            .find(|(k, _)| k.borrow() == key)
            .map(|(_, v)| v.clone())
    }

    pub fn get_or<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let table = self.table.read().unwrap();
        let idx = self.bucket_of(key, table.len());
        let bucket = table[idx].read().unwrap();
        bucket.iter().any(|(k, _)| k.borrow() == key)
    }

    /// Return the value for `key`, inserting `create()` first if the key is
    /// absent. The whole check-then-insert runs under the bucket's write
    /// lock, so `create` runs at most once per key even under contention.
    pub fn get_or_insert_with(&self, key: K, create: impl FnOnce() -> V) -> V
    where
        V: Clone,
    {
        self.maybe_grow();
        let table = self.table.read().unwrap();
        let idx = self.bucket_of(&key, table.len());
        let mut bucket = table[idx].write().unwrap();
        if let Some((_, v)) = bucket.iter().find(|(k, _)| *k == key) {
            return v.clone();
        }
        let value = create();
        bucket.push((key, value.clone()));
        self.len.fetch_add(1, Ordering::Relaxed);
        value
    }

    /// Mutate the value for `key` in place, inserting `default()` first if
    /// the key is absent. Atomic against other writers on the same bucket.
    pub fn upsert(&self, key: K, default: impl FnOnce() -> V, apply: impl FnOnce(&mut V)) {
        self.maybe_grow();
        let table = self.table.read().unwrap();
        let idx = self.bucket_of(&key, table.len());
        let mut bucket = table[idx].write().unwrap();
        if let Some((_, v)) = bucket.iter_mut().find(|(k, _)| *k == key) {
            apply(v);
            return;
        }
        let mut value = default();
        apply(&mut value);
        bucket.push((key, value));
        self.len.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of all entries, taken bucket by bucket under each bucket's
    /// read lock. Weakly consistent: concurrent writes may or may not appear.
    pub fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let table = self.table.read().unwrap();
        let mut out = Vec::with_capacity(self.len());
        for bucket in table.iter() {
            let bucket = bucket.read().unwrap();
            out.extend(bucket.iter().cloned());
        }
        out
    }

    /// Empty the map, one bucket at a time. Atomic per bucket, not across
    /// the whole table.
    pub fn clear(&self) {
        let table = self.table.read().unwrap();
        for bucket in table.iter() {
            let mut bucket = bucket.write().unwrap();
            let removed = bucket.len();
            bucket.clear();
            self.len.fetch_sub(removed, Ordering::Relaxed);
        }
    }

    /// Double the table once the load factor is exceeded. Called before any
    /// inserting operation, while no locks are held.
    fn maybe_grow(&self) {
        {
            let table = self.table.read().unwrap();
            if (self.len() as f64) <= table.len() as f64 * LOAD_FACTOR {
                return;
            }
        }

        let mut table = self.table.write().unwrap();
        // Another thread may have grown the table while we waited.
        if (self.len() as f64) <= table.len() as f64 * LOAD_FACTOR {
            return;
        }

        let new_capacity = table.len() * 2;
        let mut new_table: Vec<Bucket<K, V>> =
            (0..new_capacity).map(|_| RwLock::new(Vec::new())).collect();
        // The outer write lock is exclusive here, so the per-bucket locks
        // are uncontended and get_mut suffices.
        for bucket in table.iter_mut() {
            for (key, value) in bucket.get_mut().unwrap().drain(..) {
                let idx = self.bucket_of(&key, new_capacity);
                new_table[idx].get_mut().unwrap().push((key, value));
            }
        }
        *table = new_table;
    }
}

impl<K: Hash + Eq, V> Default for StripedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn insert_and_get() {
        let map: StripedMap<String, u32> = StripedMap::new();
        assert!(map.is_empty());
        map.insert("alpha".to_string(), 1);
        map.insert("beta".to_string(), 2);
        assert_eq!(map.get("alpha"), Some(1));
        assert_eq!(map.get("beta"), Some(2));
        assert_eq!(map.get("gamma"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn insert_overwrites() {
        let map: StripedMap<String, u32> = StripedMap::new();
        map.insert("key".to_string(), 1);
        map.insert("key".to_string(), 2);
        assert_eq!(map.get("key"), Some(2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn get_or_falls_back() {
        let map: StripedMap<String, u32> = StripedMap::new();
        map.insert("present".to_string(), 7);
        assert_eq!(map.get_or("present", 0), 7);
        assert_eq!(map.get_or("absent", 0), 0);
    }

    #[test]
    fn contains_key_works() {
        let map: StripedMap<String, u32> = StripedMap::new();
        map.insert("here".to_string(), 1);
        assert!(map.contains_key("here"));
        assert!(!map.contains_key("gone"));
    }

    #[test]
    fn growth_preserves_entries() {
        // Well past 0.75 * 16, forcing several doublings.
        let map: StripedMap<u32, u32> = StripedMap::new();
        for i in 0..500 {
            map.insert(i, i * 2);
        }
        assert_eq!(map.len(), 500);
        for i in 0..500 {
            assert_eq!(map.get(&i), Some(i * 2));
        }
    }

    #[test]
    fn clear_empties_everything() {
        let map: StripedMap<u32, u32> = StripedMap::new();
        for i in 0..100 {
            map.insert(i, i);
        }
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get(&42), None);
        assert!(map.entries().is_empty());
    }

    #[test]
    fn entries_snapshots_all_buckets() {
        let map: StripedMap<u32, u32> = StripedMap::new();
        for i in 0..50 {
            map.insert(i, i + 100);
        }
        let mut entries = map.entries();
        entries.sort();
        assert_eq!(entries.len(), 50);
        assert_eq!(entries[0], (0, 100));
        assert_eq!(entries[49], (49, 149));
    }

    #[test]
    fn upsert_creates_then_mutates() {
        let map: StripedMap<String, Vec<u32>> = StripedMap::new();
        map.upsert("w".to_string(), Vec::new, |v| v.push(1));
        map.upsert("w".to_string(), Vec::new, |v| v.push(2));
        assert_eq!(map.get("w"), Some(vec![1, 2]));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn factory_runs_once_per_key() {
        let map: Arc<StripedMap<String, u32>> = Arc::new(StripedMap::new());
        let calls = Arc::new(AtomicUsize::new(0));

        thread::scope(|s| {
            for _ in 0..8 {
                let map = Arc::clone(&map);
                let calls = Arc::clone(&calls);
                s.spawn(move || {
                    for _ in 0..100 {
                        map.get_or_insert_with("shared".to_string(), || {
                            calls.fetch_add(1, Ordering::Relaxed);
                            9
                        });
                    }
                });
            }
        });

        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(map.get("shared"), Some(9));
    }

    #[test]
    fn concurrent_writers_disjoint_keys() {
        let map: Arc<StripedMap<String, u32>> = Arc::new(StripedMap::new());

        thread::scope(|s| {
            for t in 0..8u32 {
                let map = Arc::clone(&map);
                s.spawn(move || {
                    for i in 0..500u32 {
                        map.insert(format!("{t}-{i}"), t * 1000 + i);
                    }
                });
            }
        });

        assert_eq!(map.len(), 8 * 500);
        for t in 0..8u32 {
            for i in 0..500u32 {
                assert_eq!(map.get(&format!("{t}-{i}")), Some(t * 1000 + i));
            }
        }
    }
}
