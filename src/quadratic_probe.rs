//! Quadratic probing: `h, h + 1, h + 4, h + 9, ...` modulo capacity.

use crate::probe::{add_mod, mul_mod, next_prime, reduce, ProbePolicy};
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Quadratic offsets reach only part of the table. With a prime capacity `p`
/// the first `(p + 1) / 2` offsets land on distinct slots, so keeping the
/// table under half full (ratio 2) guarantees a free slot on every probe
/// sequence. Capacities are therefore rounded up to primes.
#[derive(Clone, Debug, Default)]
pub struct QuadraticProbe<S = DefaultHashBuilder> {
    hasher: S,
}

impl<S> QuadraticProbe<S> {
    /// Must stay at 2 for the coverage argument above.
    pub const LOAD_RATIO: usize = 2;

    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<K, S> ProbePolicy<K> for QuadraticProbe<S>
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
        let offset = mul_mod(count as u64, count as u64, capacity);
        add_mod(reduce(hash, capacity), offset, capacity)
    }

    fn load_ratio(&self) -> usize {
        Self::LOAD_RATIO
    }

    fn fit_capacity(&self, requested: usize) -> usize {
        next_prime(requested)
    }
}
