//! hash-engines: interchangeable hash table engines behind one contract.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: compare collision-resolution strategies under identical
//!   semantics. Every engine implements [`HashTable`], so call sites (and
//!   `Box<dyn HashTable<K, V>>`) switch strategy without other changes.
//! - Layers:
//!   - `HashTable<K, V>`: the contract (insert/erase/find/rehash, size and
//!     capacity, unordered iteration).
//!   - `OpenAddressing<K, V, P>`: slot storage with tombstones, growth and
//!     rehashing, generic over a `ProbePolicy` that decides where a key may
//!     live. Three policies: linear, quadratic, double hashing.
//!   - `ChainingHashMap<K, V, S, R>`: bucket array of append lists.
//!   - `CuckooHashMap<K, V, S1, S2>`: two salted half-tables with bounded
//!     eviction walks and re-salting.
//!
//! Constraints
//! - Single-threaded: no interior locking. Tables are `Send` when their
//!   contents are.
//! - Unique keys; `insert` on a present key overwrites and reports `false`.
//! - Capacity never shrinks and changes only during a rehash.
//! - After any successful operation `len / capacity` stays below
//!   `(R - 1) / R` for the engine's load ratio `R` (cuckoo keeps each half
//!   under `1 / R` with `R = 2`).
//!
//! Hasher and rehashing invariants
//! - Hash functions are injected as `BuildHasher`s (hashbrown's default
//!   builder unless chosen otherwise; see [`digest`] for byte digests).
//! - Each entry stores the raw hash value(s) computed at insertion and all
//!   positions are derived from them; `K: Hash` is never invoked after
//!   insertion, so growth and re-salting do not call into user code.
//!
//! Reentrancy policy
//! - Engines call user code (`K: Eq`, `K: Hash`) while probing. Every public
//!   operation enters a debug-only guard; re-entering the same table from
//!   that user code panics in debug builds. Release builds carry no guard.
//!
//! Reference invalidation
//! - `find` and `find_mut` hand out borrows of the table, so any structural
//!   mutation ends them. Holding one across `insert` does not compile:
//!
//! ```compile_fail
//! use hash_engines::{HashTable, LinearHashMap};
//!
//! let mut m: LinearHashMap<u32, u32> = LinearHashMap::new();
//! m.insert(1, 10);
//! let v = m.find(&1).unwrap();
//! m.insert(2, 20);
//! assert_eq!(*v, 10);
//! ```
//!
//! Failure model
//! - Missing keys, duplicate keys and empty tables are ordinary outcomes
//!   (`bool` / `Option`). Only caller-contract violations are errors:
//!   [`TableError`] from `rehash` to a non-larger capacity and from digest
//!   constructors given unusable parameters.
//!
//! Logging
//! - Through the `log` facade: `debug` on every rehash, `trace` on cuckoo
//!   re-salts, `warn` when a probe sequence is exhausted or an entry is
//!   parked in the cuckoo stash. The crate installs no logger.
//!
//! ```
//! use hash_engines::{ChainingHashMap, CuckooHashMap, DoubleHashMap, HashTable};
//!
//! let mut engines: Vec<Box<dyn HashTable<u32, &str>>> = vec![
//!     Box::new(DoubleHashMap::<u32, &str>::new()),
//!     Box::new(ChainingHashMap::<u32, &str>::new()),
//!     Box::new(CuckooHashMap::<u32, &str>::new()),
//! ];
//! for m in engines.iter_mut() {
//!     assert!(m.insert(7, "seven"));
//!     assert!(!m.insert(7, "SEVEN"));
//!     assert_eq!(m.find(&7), Some(&"SEVEN"));
//!     assert!(m.erase(&7));
//!     assert!(m.is_empty());
//! }
//! ```

mod chaining;
mod cuckoo;
pub mod digest;
mod double_hash_probe;
mod error;
mod linear_probe;
mod open_addressing;
mod probe;
mod quadratic_probe;
mod reentrancy;
mod slot;
mod table;
#[cfg(test)]
mod table_proptest;

// Public surface
pub use chaining::ChainingHashMap;
pub use cuckoo::CuckooHashMap;
pub use double_hash_probe::{DoubleHashProbe, DoubleHashes};
pub use error::TableError;
pub use linear_probe::LinearProbe;
pub use open_addressing::OpenAddressing;
pub use probe::ProbePolicy;
pub use quadratic_probe::QuadraticProbe;
pub use table::HashTable;

/// Cuckoo tuning constants.
pub mod cuckoo_params {
    pub use crate::cuckoo::{LOAD_RATIO, MAX_GROWTH_ROUNDS, SPARSE_FACTOR};
}

use hashbrown::hash_map::DefaultHashBuilder;

/// Open addressing with linear probing.
pub type LinearHashMap<K, V, S = DefaultHashBuilder, const R: usize = 4> =
    OpenAddressing<K, V, LinearProbe<S, R>>;

/// Open addressing with quadratic probing over prime capacities.
pub type QuadraticHashMap<K, V, S = DefaultHashBuilder> = OpenAddressing<K, V, QuadraticProbe<S>>;

/// Open addressing with double hashing over power-of-two capacities.
pub type DoubleHashMap<K, V, S1 = DefaultHashBuilder, S2 = DefaultHashBuilder, const R: usize = 4> =
    OpenAddressing<K, V, DoubleHashProbe<S1, S2, R>>;
