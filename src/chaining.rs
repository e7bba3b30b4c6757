//! ChainingHashMap: separate chaining over a bucket array of append lists.

use crate::error::{check_growth, TableError};
use crate::probe::{reduce, RatioCheck};
use crate::reentrancy::OpGuard;
use crate::slot::Entry;
use crate::table::{needs_growth, HashTable};
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;

type Bucket<K, V> = Vec<Entry<K, V, u64>>;

/// Separate-chaining hash table.
///
/// `R` is the load ratio: the bucket array doubles when
/// `buckets * (R - 1) < (len + 1) * R`, so average chain length stays below
/// `(R - 1) / R`. Small ratios keep chains sparse; large ones (e.g. 20) trade
/// longer chains for fewer buckets. [`capacity`](HashTable::capacity) is the
/// bucket count.
pub struct ChainingHashMap<K, V, S = DefaultHashBuilder, const R: usize = 4> {
    chains: Chains<K, V, S, R>,
    guard: OpGuard,
}

struct Chains<K, V, S, const R: usize> {
    hasher: S,
    buckets: Vec<Bucket<K, V>>,
    len: usize,
}

impl<K, V, S, const R: usize> Chains<K, V, S, R>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        reduce(hash, self.buckets.len())
    }

    fn position(&self, key: &K) -> (usize, Option<usize>) {
        let hash = self.hasher.hash_one(key);
        let bucket = self.bucket_of(hash);
        let at = self.buckets[bucket]
            .iter()
            .position(|e| e.hashes == hash && e.key == *key);
        (bucket, at)
    }

    fn insert(&mut self, entry: Entry<K, V, u64>) -> bool {
        if needs_growth(self.buckets.len(), self.len, R) {
            let target = self.buckets.len().saturating_mul(2);
            self.resize(target);
        }
        let bucket = self.bucket_of(entry.hashes);
        let chain = &mut self.buckets[bucket];
        match chain
            .iter_mut()
            .find(|e| e.hashes == entry.hashes && e.key == entry.key)
        {
            Some(existing) => {
                existing.value = entry.value;
                false
            }
            None => {
                chain.push(entry);
                self.len += 1;
                true
            }
        }
    }

    /// Every entry is re-bucketed from its cached hash.
    fn resize(&mut self, bucket_count: usize) {
        log::debug!(
            "chaining rehash: {} -> {} buckets ({} entries)",
            self.buckets.len(),
            bucket_count,
            self.len
        );
        let mut fresh = Vec::with_capacity(bucket_count);
        fresh.resize_with(bucket_count, Vec::new);
        let old = mem::replace(&mut self.buckets, fresh);
        self.len = 0;
        for entry in old.into_iter().flatten() {
            self.insert(entry);
        }
    }
}

impl<K, V, const R: usize> ChainingHashMap<K, V, DefaultHashBuilder, R>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V, S, const R: usize> ChainingHashMap<K, V, S, R>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Starts with `R` buckets.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(R, hasher)
    }

    pub fn with_capacity_and_hasher(bucket_count: usize, hasher: S) -> Self {
        let () = RatioCheck::<R>::OK;
        let bucket_count = bucket_count.max(1);
        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, Vec::new);
        Self {
            chains: Chains {
                hasher,
                buckets,
                len: 0,
            },
            guard: OpGuard::new(),
        }
    }

    pub fn hasher(&self) -> &S {
        &self.chains.hasher
    }

    /// Length of each bucket's chain, in bucket order.
    pub fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.chains.buckets.iter().map(Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.chains
            .buckets
            .iter()
            .flatten()
            .map(|e| (&e.key, &e.value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        self.chains
            .buckets
            .iter_mut()
            .flatten()
            .map(|e| (&e.key, &mut e.value))
    }
}

impl<K, V, S, const R: usize> HashTable<K, V> for ChainingHashMap<K, V, S, R>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        self.chains.len
    }

    fn capacity(&self) -> usize {
        self.chains.buckets.len()
    }

    fn insert(&mut self, key: K, value: V) -> bool {
        let _g = self.guard.enter();
        let hash = self.chains.hasher.hash_one(&key);
        self.chains.insert(Entry::new(key, value, hash))
    }

    fn erase(&mut self, key: &K) -> bool {
        let _g = self.guard.enter();
        match self.chains.position(key) {
            (bucket, Some(at)) => {
                // `remove`, not `swap_remove`: the rest of the chain keeps its
                // append order.
                self.chains.buckets[bucket].remove(at);
                self.chains.len -= 1;
                true
            }
            (_, None) => false,
        }
    }

    fn find(&self, key: &K) -> Option<&V> {
        let _g = self.guard.enter();
        let (bucket, at) = self.chains.position(key);
        at.map(|i| &self.chains.buckets[bucket][i].value)
    }

    fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.guard.enter();
        let (bucket, at) = self.chains.position(key);
        at.map(|i| &mut self.chains.buckets[bucket][i].value)
    }

    fn rehash(&mut self, new_capacity: usize) -> Result<(), TableError> {
        let _g = self.guard.enter();
        check_growth(new_capacity, self.chains.buckets.len())?;
        self.chains.resize(new_capacity);
        Ok(())
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(self.iter())
    }
}

impl<K, V, S, const R: usize> Default for ChainingHashMap<K, V, S, R>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S, const R: usize> Extend<(K, V)> for ChainingHashMap<K, V, S, R>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S, const R: usize> FromIterator<(K, V)> for ChainingHashMap<K, V, S, R>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

impl<K, V, S, const R: usize> fmt::Debug for ChainingHashMap<K, V, S, R>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
