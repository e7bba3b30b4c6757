//! CuckooHashMap: two-choice hashing with bounded eviction walks and
//! adaptive re-salting.
//!
//! Storage is one slot array split into a left half and a right half of
//! `capacity` slots each. A key may only live at
//!
//! ```text
//! left  = mix(h_left(key)  ^ salt_left)  % capacity
//! right = mix(h_right(key) ^ salt_right) % capacity + capacity
//! ```
//!
//! so a lookup inspects exactly two slots. `mix` is a bijective 64-bit
//! finalizer; without it a new salt would merely permute a power-of-two table
//! and could never break up a collision.
//!
//! Insertion that finds both candidates taken runs an eviction walk of at most
//! `2 * capacity` displacements. When the walk fails the table falls back in
//! tiers: one re-salt at the same capacity, then up to
//! [`MAX_GROWTH_ROUNDS`] doublings (each followed by a re-salt), and finally
//! the overflow stash. Growth rounds stop early once the table is
//! [`SPARSE_FACTOR`] times larger than the load ratio requires, so a poor
//! hash function costs stash lookups rather than unbounded memory. The stash
//! only fills up when the injected hash functions cannot tell keys apart
//! (e.g. three keys with the same pair of raw hashes), and every rebuild
//! retries its entries.

use crate::error::{check_growth, TableError};
use crate::probe::reduce;
use crate::reentrancy::OpGuard;
use crate::slot::Entry;
use crate::table::{needs_growth, HashTable};
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Fixed load ratio: the table is kept under half of one half-table.
pub const LOAD_RATIO: usize = 2;

/// Doublings attempted by one failed insertion before parking the leftover
/// entries in the stash.
pub const MAX_GROWTH_ROUNDS: usize = 4;

/// Once each half has this many times the slots the load ratio asks for,
/// a failed placement parks entries instead of growing. Together with
/// ordinary growth this keeps `capacity < 2 * SPARSE_FACTOR * LOAD_RATIO * len`.
pub const SPARSE_FACTOR: usize = 4;

/// Raw outputs of the two hash functions, cached per entry. Salts are applied
/// on top, so re-salting never rehashes a key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PairHashes {
    pub left: u64,
    pub right: u64,
}

type Nested<K, V> = Entry<K, V, PairHashes>;

#[derive(Copy, Clone, Debug)]
struct Salts {
    left: u64,
    right: u64,
}

impl Salts {
    fn draw(rng: &mut SmallRng) -> Self {
        Self {
            left: rng.gen(),
            right: rng.gen(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Location {
    Slot(usize),
    Stash(usize),
}

/// Murmur3 `fmix64`.
#[inline]
fn mix(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}

fn empty_nest<K, V>(slots: usize) -> Vec<Option<Nested<K, V>>> {
    let mut v = Vec::with_capacity(slots);
    v.resize_with(slots, || None);
    v
}

/// Cuckoo hash table with two independently seeded hash builders.
pub struct CuckooHashMap<K, V, S1 = DefaultHashBuilder, S2 = DefaultHashBuilder> {
    left_hasher: S1,
    right_hasher: S2,
    nest: Nest<K, V>,
    guard: OpGuard,
}

/// Everything except the hashers: all algorithms below work from cached
/// [`PairHashes`] only.
struct Nest<K, V> {
    slots: Vec<Option<Nested<K, V>>>,
    stash: Vec<Nested<K, V>>,
    len: usize,
    salts: Salts,
    rng: SmallRng,
    resalts: usize,
    growths: usize,
}

impl<K: Eq, V> Nest<K, V> {
    fn new(capacity: usize, mut rng: SmallRng) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: empty_nest(capacity * 2),
            stash: Vec::new(),
            len: 0,
            salts: Salts::draw(&mut rng),
            rng,
            resalts: 0,
            growths: 0,
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len() / 2
    }

    #[inline]
    fn left_pos(&self, h: PairHashes) -> usize {
        reduce(mix(h.left ^ self.salts.left), self.capacity())
    }

    #[inline]
    fn right_pos(&self, h: PairHashes) -> usize {
        let capacity = self.capacity();
        reduce(mix(h.right ^ self.salts.right), capacity) + capacity
    }

    /// The only slot in `index`'s half where an entry with `h` may sit.
    #[inline]
    fn legal_pos(&self, h: PairHashes, index: usize) -> usize {
        if index < self.capacity() {
            self.left_pos(h)
        } else {
            self.right_pos(h)
        }
    }

    fn locate(&self, key: &K, h: PairHashes) -> Option<Location> {
        for index in [self.left_pos(h), self.right_pos(h)] {
            if let Some(e) = &self.slots[index] {
                if e.hashes == h && e.key == *key {
                    return Some(Location::Slot(index));
                }
            }
        }
        if self.stash.is_empty() {
            return None;
        }
        self.stash
            .iter()
            .position(|e| e.hashes == h && e.key == *key)
            .map(Location::Stash)
    }

    fn entry(&self, at: Location) -> Option<&Nested<K, V>> {
        match at {
            Location::Slot(i) => self.slots[i].as_ref(),
            Location::Stash(i) => self.stash.get(i),
        }
    }

    fn entry_mut(&mut self, at: Location) -> Option<&mut Nested<K, V>> {
        match at {
            Location::Slot(i) => self.slots[i].as_mut(),
            Location::Stash(i) => self.stash.get_mut(i),
        }
    }

    /// Both candidate slots already hold entries with exactly these raw
    /// hashes. No salt or capacity can seat a third such entry.
    fn is_blocked(&self, h: PairHashes) -> bool {
        [self.left_pos(h), self.right_pos(h)]
            .into_iter()
            .all(|i| matches!(&self.slots[i], Some(e) if e.hashes == h))
    }

    fn insert(&mut self, entry: Nested<K, V>) -> bool {
        let capacity = self.capacity();
        if needs_growth(capacity, self.len, LOAD_RATIO) {
            self.grow(capacity.saturating_mul(2));
        }
        if let Some(at) = self.locate(&entry.key, entry.hashes) {
            if let Some(existing) = self.entry_mut(at) {
                existing.value = entry.value;
            }
            return false;
        }
        if self.is_blocked(entry.hashes) {
            self.park(entry);
            return true;
        }
        if let Err(homeless) = self.place(entry) {
            self.settle(vec![homeless]);
        }
        true
    }

    /// Eviction walk. Starts at the first free candidate (left preferred),
    /// otherwise at the right candidate, and keeps pushing the displaced entry
    /// to its other candidate, alternating halves. Gives the last displaced
    /// entry back if the walk returns to its start or runs `2 * capacity`
    /// steps. All entries left in the table remain at legal positions.
    fn place(&mut self, entry: Nested<K, V>) -> Result<(), Nested<K, V>> {
        let mut carried = entry;
        let left = self.left_pos(carried.hashes);
        let (mut index, mut on_left) = if self.slots[left].is_none() {
            (left, true)
        } else {
            (self.right_pos(carried.hashes), false)
        };
        let start = index;
        for _ in 0..self.capacity().saturating_mul(2) {
            match self.slots[index].replace(carried) {
                None => {
                    self.len += 1;
                    return Ok(());
                }
                Some(evicted) => {
                    carried = evicted;
                    index = if on_left {
                        self.right_pos(carried.hashes)
                    } else {
                        self.left_pos(carried.hashes)
                    };
                    on_left = !on_left;
                    if index == start {
                        break;
                    }
                }
            }
        }
        Err(carried)
    }

    /// Draws new salts, pulls out every entry whose slot is no longer legal
    /// (plus the stash), and seats them together with `pending`. Returns the
    /// entries that could not be seated; everything in the table afterwards
    /// is at a legal position for the new salts.
    fn resalt(&mut self, mut pending: Vec<Nested<K, V>>) -> Vec<Nested<K, V>> {
        self.salts = Salts::draw(&mut self.rng);
        self.resalts += 1;
        log::trace!(
            "cuckoo re-salt #{} at capacity {} ({} pending)",
            self.resalts,
            self.capacity(),
            pending.len()
        );
        self.len -= self.stash.len();
        pending.append(&mut self.stash);
        for index in 0..self.slots.len() {
            let misplaced = match &self.slots[index] {
                Some(e) => self.legal_pos(e.hashes, index) != index,
                None => false,
            };
            if misplaced {
                if let Some(e) = self.slots[index].take() {
                    self.len -= 1;
                    pending.push(e);
                }
            }
        }
        let mut homeless = Vec::new();
        for e in pending {
            if let Err(e) = self.place(e) {
                homeless.push(e);
            }
        }
        homeless
    }

    /// Replaces storage with `new_capacity` empty slots per half and returns
    /// every entry that was stored, stash included.
    fn reallocate(&mut self, new_capacity: usize) -> Vec<Nested<K, V>> {
        log::debug!(
            "cuckoo rehash: {} -> {} slots per half ({} entries)",
            self.capacity(),
            new_capacity,
            self.len
        );
        self.growths += 1;
        let old = mem::replace(&mut self.slots, empty_nest(new_capacity.saturating_mul(2)));
        let mut drained: Vec<_> = old.into_iter().flatten().collect();
        drained.append(&mut self.stash);
        self.len = 0;
        drained
    }

    fn grow(&mut self, new_capacity: usize) {
        let drained = self.reallocate(new_capacity);
        let homeless = self.resalt(drained);
        if !homeless.is_empty() {
            self.settle(homeless);
        }
    }

    /// Fallback for entries an eviction walk or a rebuild could not seat:
    /// re-salt once at the current capacity, then double up to
    /// `MAX_GROWTH_ROUNDS` times while the table is not already sparse, then
    /// stash whatever is still left.
    fn settle(&mut self, homeless: Vec<Nested<K, V>>) {
        let mut pending = self.resalt(homeless);
        let mut rounds = 0;
        while !pending.is_empty() {
            let (blocked, rest): (Vec<_>, Vec<_>) =
                pending.into_iter().partition(|e| self.is_blocked(e.hashes));
            for e in blocked {
                self.park(e);
            }
            if rest.is_empty() {
                return;
            }
            if rounds == MAX_GROWTH_ROUNDS || self.is_sparse(rest.len()) {
                for e in rest {
                    self.park(e);
                }
                return;
            }
            rounds += 1;
            let mut drained = self.reallocate(self.capacity().saturating_mul(2));
            drained.extend(rest);
            pending = self.resalt(drained);
        }
    }

    /// Capacity is far above what `len + pending` entries need, so more
    /// doublings would not help the hash functions separate them.
    fn is_sparse(&self, pending: usize) -> bool {
        let needed = (self.len + pending)
            .saturating_mul(LOAD_RATIO)
            .saturating_mul(SPARSE_FACTOR);
        self.capacity() >= needed
    }

    fn park(&mut self, entry: Nested<K, V>) {
        log::warn!(
            "cuckoo stash holds {} entries: hash functions cannot separate keys at capacity {}",
            self.stash.len() + 1,
            self.capacity()
        );
        self.stash.push(entry);
        self.len += 1;
    }

    fn erase(&mut self, key: &K, h: PairHashes) -> bool {
        match self.locate(key, h) {
            Some(Location::Slot(index)) => {
                self.slots[index] = None;
                self.len -= 1;
                self.refill(index);
                true
            }
            Some(Location::Stash(at)) => {
                self.stash.swap_remove(at);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Moves a stashed entry into a freshly freed slot if that slot is one of
    /// its candidates.
    fn refill(&mut self, index: usize) {
        if self.stash.is_empty() {
            return;
        }
        let fits = self
            .stash
            .iter()
            .position(|e| self.left_pos(e.hashes) == index || self.right_pos(e.hashes) == index);
        if let Some(at) = fits {
            let e = self.stash.swap_remove(at);
            self.slots[index] = Some(e);
        }
    }
}

impl<K, V> CuckooHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hashers(Default::default(), Default::default())
    }

    /// Empty table with at least `capacity` slots per half.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(
            capacity,
            Default::default(),
            Default::default(),
            SmallRng::from_entropy(),
        )
    }
}

impl<K, V, S1, S2> CuckooHashMap<K, V, S1, S2>
where
    K: Eq + Hash,
    S1: BuildHasher,
    S2: BuildHasher,
{
    pub fn with_hashers(left: S1, right: S2) -> Self {
        Self::from_parts(1, left, right, SmallRng::from_entropy())
    }

    /// Salts are drawn from a generator seeded with `seed`; with
    /// deterministic hash builders the whole layout is reproducible.
    pub fn with_hashers_and_seed(left: S1, right: S2, seed: u64) -> Self {
        Self::from_parts(1, left, right, SmallRng::seed_from_u64(seed))
    }

    fn from_parts(capacity: usize, left: S1, right: S2, rng: SmallRng) -> Self {
        Self {
            left_hasher: left,
            right_hasher: right,
            nest: Nest::new(capacity, rng),
            guard: OpGuard::new(),
        }
    }

    #[inline]
    fn hash(&self, key: &K) -> PairHashes {
        PairHashes {
            left: self.left_hasher.hash_one(key),
            right: self.right_hasher.hash_one(key),
        }
    }

    /// The two physical slots `key` may occupy under the current salts:
    /// `[left, right]`, with `right >= capacity()`.
    pub fn candidate_slots(&self, key: &K) -> [usize; 2] {
        let h = self.hash(key);
        [self.nest.left_pos(h), self.nest.right_pos(h)]
    }

    /// Physical slot holding `key`, or `None` if absent or stashed.
    pub fn slot_of(&self, key: &K) -> Option<usize> {
        let _g = self.guard.enter();
        match self.nest.locate(key, self.hash(key))? {
            Location::Slot(i) => Some(i),
            Location::Stash(_) => None,
        }
    }

    /// Entries that could not be seated in either candidate slot.
    pub fn stash_len(&self) -> usize {
        self.nest.stash.len()
    }

    /// Number of salt changes so far, including those following a rehash.
    pub fn resalts(&self) -> usize {
        self.nest.resalts
    }

    /// Number of storage reallocations so far (growth and explicit rehash).
    pub fn growths(&self) -> usize {
        self.nest.growths
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.nest
            .slots
            .iter()
            .flatten()
            .chain(self.nest.stash.iter())
            .map(|e| (&e.key, &e.value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        let Nest { slots, stash, .. } = &mut self.nest;
        slots
            .iter_mut()
            .flatten()
            .chain(stash.iter_mut())
            .map(|e| (&e.key, &mut e.value))
    }
}

impl<K, V, S1, S2> CuckooHashMap<K, V, S1, S2>
where
    K: Eq + Hash,
    S1: BuildHasher + Default,
    S2: BuildHasher + Default,
{
    pub fn with_seed(seed: u64) -> Self {
        Self::with_hashers_and_seed(S1::default(), S2::default(), seed)
    }
}

impl<K, V, S1, S2> HashTable<K, V> for CuckooHashMap<K, V, S1, S2>
where
    K: Eq + Hash,
    S1: BuildHasher,
    S2: BuildHasher,
{
    fn len(&self) -> usize {
        self.nest.len
    }

    /// Slots per half; physical storage is twice this.
    fn capacity(&self) -> usize {
        self.nest.capacity()
    }

    fn insert(&mut self, key: K, value: V) -> bool {
        let _g = self.guard.enter();
        let h = self.hash(&key);
        self.nest.insert(Entry::new(key, value, h))
    }

    fn erase(&mut self, key: &K) -> bool {
        let _g = self.guard.enter();
        let h = self.hash(key);
        self.nest.erase(key, h)
    }

    fn find(&self, key: &K) -> Option<&V> {
        let _g = self.guard.enter();
        let at = self.nest.locate(key, self.hash(key))?;
        self.nest.entry(at).map(|e| &e.value)
    }

    fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.guard.enter();
        let h = self.hash(key);
        let at = self.nest.locate(key, h)?;
        self.nest.entry_mut(at).map(|e| &mut e.value)
    }

    fn rehash(&mut self, new_capacity: usize) -> Result<(), TableError> {
        let _g = self.guard.enter();
        check_growth(new_capacity, self.nest.capacity())?;
        self.nest.grow(new_capacity);
        Ok(())
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(self.iter())
    }
}

impl<K, V, S1, S2> Default for CuckooHashMap<K, V, S1, S2>
where
    K: Eq + Hash,
    S1: BuildHasher + Default,
    S2: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hashers(S1::default(), S2::default())
    }
}

impl<K, V, S1, S2> Extend<(K, V)> for CuckooHashMap<K, V, S1, S2>
where
    K: Eq + Hash,
    S1: BuildHasher,
    S2: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S1, S2> FromIterator<(K, V)> for CuckooHashMap<K, V, S1, S2>
where
    K: Eq + Hash,
    S1: BuildHasher + Default,
    S2: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

impl<K, V, S1, S2> fmt::Debug for CuckooHashMap<K, V, S1, S2>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S1: BuildHasher,
    S2: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
