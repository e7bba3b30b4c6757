//! The contract every engine implements.

use crate::error::TableError;

/// A key/value associative container with unique keys.
///
/// All engines in this crate implement this trait with identical observable
/// semantics, so a call site written against `HashTable` (or against
/// `Box<dyn HashTable<K, V>>`) can switch collision-resolution strategy
/// without other changes.
///
/// References returned by [`find`](HashTable::find) and
/// [`find_mut`](HashTable::find_mut) borrow the table; any structural
/// mutation (`insert`, `erase`, `rehash`) ends that borrow.
pub trait HashTable<K, V> {
    /// Number of live entries.
    fn len(&self) -> usize;

    /// Current slot (or bucket) count. Never shrinks.
    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts or overwrites. Returns `true` if a new entry was created and
    /// `false` if an existing key had its value replaced.
    fn insert(&mut self, key: K, value: V) -> bool;

    /// Removes `key`. Returns `true` if it was present.
    fn erase(&mut self, key: &K) -> bool;

    fn find(&self, key: &K) -> Option<&V>;

    fn find_mut(&mut self, key: &K) -> Option<&mut V>;

    fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Rebuilds the table with at least `new_capacity` slots, reinserting every
    /// live entry. Fails without touching the table when `new_capacity` does
    /// not exceed [`capacity`](HashTable::capacity).
    fn rehash(&mut self, new_capacity: usize) -> Result<(), TableError>;

    /// Live entries in unspecified order.
    fn entries(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_>;
}

/// `capacity * (ratio - 1) < (len + 1) * ratio`: one more entry would push
/// occupancy to or past `(ratio - 1) / ratio`.
#[inline]
pub(crate) fn needs_growth(capacity: usize, len: usize, ratio: usize) -> bool {
    capacity.saturating_mul(ratio - 1) < (len + 1).saturating_mul(ratio)
}
