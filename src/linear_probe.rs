//! Linear probing: `h, h + 1, h + 2, ...` modulo capacity.

use crate::probe::{add_mod, reduce, ProbePolicy, RatioCheck};
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Visits every slot exactly once per `capacity` steps, so any capacity works.
/// Clusters under high load; the default ratio of 4 keeps occupancy below 3/4.
#[derive(Clone, Debug)]
pub struct LinearProbe<S = DefaultHashBuilder, const R: usize = 4> {
    hasher: S,
}

impl<S, const R: usize> LinearProbe<S, R> {
    pub fn with_hasher(hasher: S) -> Self {
        let () = RatioCheck::<R>::OK;
        Self { hasher }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<S: Default, const R: usize> Default for LinearProbe<S, R> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, S, const R: usize> ProbePolicy<K> for LinearProbe<S, R>
where
    K: ?Sized + Hash,
    S: BuildHasher,
{
    type Hashes = u64;

    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    #[inline]
    fn home(&self, hash: u64, capacity: usize) -> usize {
        reduce(hash, capacity)
    }

    #[inline]
    fn run(&self, hash: u64, count: usize, capacity: usize) -> usize {
        add_mod(reduce(hash, capacity), count % capacity, capacity)
    }

    fn load_ratio(&self) -> usize {
        R
    }

    fn fit_capacity(&self, requested: usize) -> usize {
        requested.max(1)
    }
}
