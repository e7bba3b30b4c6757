//! Double hashing: `h1, h1 + s, h1 + 2s, ...` with a per-key step `s`.

use crate::probe::{add_mod, mul_mod, reduce, ProbePolicy, RatioCheck};
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Base and step hashes of one key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DoubleHashes {
    pub base: u64,
    /// Always odd.
    pub step: u64,
}

/// Two independent hash builders: `base` picks the home slot, `step`
/// produces the stride, forced odd as `2 * h + 1`. An odd stride is coprime
/// with every power of two, so capacities are rounded up to powers of two and
/// each probe sequence visits all slots before repeating.
#[derive(Clone, Debug)]
pub struct DoubleHashProbe<S1 = DefaultHashBuilder, S2 = DefaultHashBuilder, const R: usize = 4> {
    base: S1,
    step: S2,
}

impl<S1, S2, const R: usize> DoubleHashProbe<S1, S2, R> {
    pub fn with_hashers(base: S1, step: S2) -> Self {
        let () = RatioCheck::<R>::OK;
        Self { base, step }
    }
}

impl<S1: Default, S2: Default, const R: usize> Default for DoubleHashProbe<S1, S2, R> {
    fn default() -> Self {
        Self::with_hashers(S1::default(), S2::default())
    }
}

impl<K, S1, S2, const R: usize> ProbePolicy<K> for DoubleHashProbe<S1, S2, R>
where
    K: ?Sized + Hash,
    S1: BuildHasher,
    S2: BuildHasher,
{
    type Hashes = DoubleHashes;

    #[inline]
    fn hash(&self, key: &K) -> DoubleHashes {
        DoubleHashes {
            base: self.base.hash_one(key),
            step: self.step.hash_one(key).wrapping_mul(2).wrapping_add(1),
        }
    }

    #[inline]
    fn home(&self, hashes: DoubleHashes, capacity: usize) -> usize {
        reduce(hashes.base, capacity)
    }

    #[inline]
    fn run(&self, hashes: DoubleHashes, count: usize, capacity: usize) -> usize {
        let stride = reduce(hashes.step, capacity) as u64;
        let offset = mul_mod((count % capacity) as u64, stride, capacity);
        add_mod(reduce(hashes.base, capacity), offset, capacity)
    }

    fn load_ratio(&self) -> usize {
        R
    }

    fn fit_capacity(&self, requested: usize) -> usize {
        requested.max(1).next_power_of_two()
    }
}
