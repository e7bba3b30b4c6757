//! OpenAddressing: slot storage, tombstones and growth shared by every probe
//! policy.
//!
//! The engine owns the slot array and the load/rehash rules; where a key may
//! live is entirely the policy's business. Invariant kept by every mutation:
//! a present key sits on its own probe sequence before the first `Empty` slot
//! of that sequence, and within the first `capacity` steps.

use crate::error::{check_growth, TableError};
use crate::probe::ProbePolicy;
use crate::reentrancy::OpGuard;
use crate::slot::{empty_slots, Entry, Slot};
use crate::table::{needs_growth, HashTable};
use core::fmt;
use core::mem;

type StoredEntry<K, V, P> = Entry<K, V, <P as ProbePolicy<K>>::Hashes>;

/// Open-addressing hash table parameterized by a probe policy.
///
/// See [`LinearHashMap`](crate::LinearHashMap),
/// [`QuadraticHashMap`](crate::QuadraticHashMap) and
/// [`DoubleHashMap`](crate::DoubleHashMap) for the ready-made variants.
pub struct OpenAddressing<K, V, P>
where
    P: ProbePolicy<K>,
{
    table: Table<K, V, P>,
    guard: OpGuard,
}

struct Table<K, V, P>
where
    P: ProbePolicy<K>,
{
    policy: P,
    slots: Vec<Slot<K, V, P::Hashes>>,
    len: usize,
    tombstones: usize,
}

enum Probe {
    /// Slot holding an equal key.
    Found(usize),
    /// Where a new entry should go: the first tombstone on the sequence if
    /// one was passed, otherwise the terminating empty slot.
    Vacant(usize),
    /// The whole sequence was occupied by other keys.
    Exhausted,
}

impl<K, V, P> Table<K, V, P>
where
    K: Eq,
    P: ProbePolicy<K>,
{
    fn new(policy: P, capacity: usize) -> Self {
        let capacity = policy.fit_capacity(capacity);
        Self {
            policy,
            slots: empty_slots(capacity),
            len: 0,
            tombstones: 0,
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn step(&self, hashes: P::Hashes, count: usize) -> usize {
        let capacity = self.capacity();
        if count == 0 {
            self.policy.home(hashes, capacity)
        } else {
            self.policy.run(hashes, count, capacity)
        }
    }

    fn probe(&self, key: &K, hashes: P::Hashes) -> Probe {
        let mut reusable = None;
        for count in 0..self.capacity() {
            let index = self.step(hashes, count);
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(reusable.unwrap_or(index)),
                Slot::Tombstone => {
                    reusable.get_or_insert(index);
                }
                Slot::Occupied(e) => {
                    if e.hashes == hashes && e.key == *key {
                        return Probe::Found(index);
                    }
                }
            }
        }
        match reusable {
            Some(index) => Probe::Vacant(index),
            None => Probe::Exhausted,
        }
    }

    fn locate(&self, key: &K) -> Option<usize> {
        let hashes = self.policy.hash(key);
        for count in 0..self.capacity() {
            let index = self.step(hashes, count);
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied(e) => {
                    if e.hashes == hashes && e.key == *key {
                        return Some(index);
                    }
                }
            }
        }
        None
    }

    fn insert(&mut self, entry: StoredEntry<K, V, P>) -> bool {
        if needs_growth(self.capacity(), self.len, self.policy.load_ratio()) {
            self.grow();
        }
        match self.probe(&entry.key, entry.hashes) {
            Probe::Found(index) => {
                if let Some(existing) = self.slots[index].entry_mut() {
                    existing.value = entry.value;
                }
                false
            }
            Probe::Vacant(index) => {
                if matches!(self.slots[index], Slot::Tombstone) {
                    self.tombstones -= 1;
                }
                self.slots[index] = Slot::Occupied(entry);
                self.len += 1;
                true
            }
            Probe::Exhausted => {
                log::warn!(
                    "probe sequence exhausted at capacity {} with {} entries; growing",
                    self.capacity(),
                    self.len
                );
                self.grow();
                self.insert(entry)
            }
        }
    }

    fn erase(&mut self, key: &K) -> bool {
        let Some(index) = self.locate(key) else {
            return false;
        };
        if self.slots[index].bury().is_some() {
            self.len -= 1;
            self.tombstones += 1;
        }
        true
    }

    fn grow(&mut self) {
        let target = self.policy.fit_capacity(self.capacity().saturating_mul(2));
        self.resize(target);
    }

    /// Drains the old slots and reinserts every live entry through `insert`,
    /// dropping tombstones. Homes are recomputed from the cached hashes.
    fn resize(&mut self, new_capacity: usize) {
        log::debug!(
            "open addressing rehash: {} -> {} slots ({} live, {} tombstones)",
            self.capacity(),
            new_capacity,
            self.len,
            self.tombstones
        );
        let old = mem::replace(&mut self.slots, empty_slots(new_capacity));
        self.len = 0;
        self.tombstones = 0;
        for slot in old {
            if let Slot::Occupied(entry) = slot {
                self.insert(entry);
            }
        }
    }
}

impl<K, V, P> OpenAddressing<K, V, P>
where
    K: Eq,
    P: ProbePolicy<K> + Default,
{
    /// Empty table at the policy's smallest capacity.
    pub fn new() -> Self {
        Self::with_policy(P::default())
    }

    /// Empty table with at least `capacity` slots (rounded per policy).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_policy(capacity, P::default())
    }
}

impl<K, V, P> OpenAddressing<K, V, P>
where
    K: Eq,
    P: ProbePolicy<K>,
{
    pub fn with_policy(policy: P) -> Self {
        Self::with_capacity_and_policy(1, policy)
    }

    pub fn with_capacity_and_policy(capacity: usize, policy: P) -> Self {
        Self {
            table: Table::new(policy, capacity),
            guard: OpGuard::new(),
        }
    }

    pub fn policy(&self) -> &P {
        &self.table.policy
    }

    /// Number of deleted slots still occupying storage. Reset by every rehash.
    pub fn tombstones(&self) -> usize {
        self.table.tombstones
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.table
            .slots
            .iter()
            .filter_map(Slot::entry)
            .map(|e| (&e.key, &e.value))
    }

    /// Live entries with mutable values, in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        self.table
            .slots
            .iter_mut()
            .filter_map(Slot::entry_mut)
            .map(|e| (&e.key, &mut e.value))
    }
}

impl<K, V, P> HashTable<K, V> for OpenAddressing<K, V, P>
where
    K: Eq,
    P: ProbePolicy<K>,
{
    fn len(&self) -> usize {
        self.table.len
    }

    fn capacity(&self) -> usize {
        self.table.capacity()
    }

    fn insert(&mut self, key: K, value: V) -> bool {
        let _g = self.guard.enter();
        let hashes = self.table.policy.hash(&key);
        self.table.insert(Entry::new(key, value, hashes))
    }

    fn erase(&mut self, key: &K) -> bool {
        let _g = self.guard.enter();
        self.table.erase(key)
    }

    fn find(&self, key: &K) -> Option<&V> {
        let _g = self.guard.enter();
        let index = self.table.locate(key)?;
        self.table.slots[index].entry().map(|e| &e.value)
    }

    fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.guard.enter();
        let index = self.table.locate(key)?;
        self.table.slots[index].entry_mut().map(|e| &mut e.value)
    }

    fn rehash(&mut self, new_capacity: usize) -> Result<(), TableError> {
        let _g = self.guard.enter();
        check_growth(new_capacity, self.table.capacity())?;
        let target = self.table.policy.fit_capacity(new_capacity);
        self.table.resize(target);
        Ok(())
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(self.iter())
    }
}

impl<K, V, P> Default for OpenAddressing<K, V, P>
where
    K: Eq,
    P: ProbePolicy<K> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, P> Extend<(K, V)> for OpenAddressing<K, V, P>
where
    K: Eq,
    P: ProbePolicy<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, P> FromIterator<(K, V)> for OpenAddressing<K, V, P>
where
    K: Eq,
    P: ProbePolicy<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<K, V, P> fmt::Debug for OpenAddressing<K, V, P>
where
    K: Eq + fmt::Debug,
    V: fmt::Debug,
    P: ProbePolicy<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
