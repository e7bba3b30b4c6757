//! Probe policies plugged into [`OpenAddressing`](crate::OpenAddressing).
//!
//! A policy turns a key into cached raw hash value(s) once, then maps those
//! values to the home slot and to every later step of the probe sequence for
//! a given capacity. It also owns the capacity scheme that makes its sequence
//! cover enough slots:
//!
//! | policy      | sequence                         | capacities      | ratio |
//! |-------------|----------------------------------|-----------------|-------|
//! | linear      | `h + i`                          | any             | `R`   |
//! | quadratic   | `h + i*i`                        | primes          | 2     |
//! | double hash | `h1 + i * (2*h2 + 1)`            | powers of two   | `R`   |

/// Strategy for producing a probe sequence.
pub trait ProbePolicy<K: ?Sized> {
    /// Raw hash value(s) cached alongside every entry so that later probe
    /// steps and rehashes never recompute them.
    type Hashes: Copy + PartialEq + core::fmt::Debug;

    fn hash(&self, key: &K) -> Self::Hashes;

    /// First slot probed.
    fn home(&self, hashes: Self::Hashes, capacity: usize) -> usize;

    /// Slot probed after `count` additional steps from [`home`](Self::home).
    /// `run(h, 0, c) == home(h, c)`.
    fn run(&self, hashes: Self::Hashes, count: usize, capacity: usize) -> usize;

    /// Growth triggers when `capacity * (R - 1) < (len + 1) * R`.
    fn load_ratio(&self) -> usize;

    /// Smallest capacity this policy accepts that is `>= requested`.
    fn fit_capacity(&self, requested: usize) -> usize;
}

/// `(a + b) mod m` for `a, b < m` without overflow.
#[inline]
pub(crate) fn add_mod(a: usize, b: usize, m: usize) -> usize {
    debug_assert!(a < m && b < m);
    let (sum, carry) = a.overflowing_add(b);
    if carry || sum >= m {
        sum.wrapping_sub(m)
    } else {
        sum
    }
}

/// `(a * b) mod m` widened through `u128`.
#[inline]
pub(crate) fn mul_mod(a: u64, b: u64, m: usize) -> usize {
    ((a as u128 * b as u128) % m as u128) as usize
}

#[inline]
pub(crate) fn reduce(hash: u64, m: usize) -> usize {
    (hash % m as u64) as usize
}

pub(crate) fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3usize;
    while d.saturating_mul(d) <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

pub(crate) fn next_prime(n: usize) -> usize {
    let mut p = n.max(2);
    while !is_prime(p) {
        p += 1;
    }
    p
}

/// Compile-time rejection of load ratios below 2; with `R = 1` every insert
/// would grow and `R = 0` underflows.
pub(crate) struct RatioCheck<const R: usize>;

impl<const R: usize> RatioCheck<R> {
    pub(crate) const OK: () = assert!(R >= 2, "load ratio must be at least 2");
}
