//! Entry and slot representations shared by the engines.

/// An owned key/value pair together with the raw hash value(s) computed when
/// it was inserted. Positions are always derived from `hashes`, so growth and
/// re-salting never call back into `K: Hash`.
#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V, H> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hashes: H,
}

impl<K, V, H> Entry<K, V, H> {
    pub(crate) fn new(key: K, value: V, hashes: H) -> Self {
        Self { key, value, hashes }
    }
}

/// One cell of open-addressing storage.
///
/// `Tombstone` keeps probe chains that ran through a deleted entry intact
/// while still being reusable by `insert`.
#[derive(Debug, Clone)]
pub(crate) enum Slot<K, V, H> {
    Empty,
    Occupied(Entry<K, V, H>),
    Tombstone,
}

impl<K, V, H> Slot<K, V, H> {
    #[inline]
    pub(crate) fn entry(&self) -> Option<&Entry<K, V, H>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self) -> Option<&mut Entry<K, V, H>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    /// Replaces an occupied slot with a tombstone and hands back the entry.
    /// Empty slots and tombstones are left as they are.
    pub(crate) fn bury(&mut self) -> Option<Entry<K, V, H>> {
        match core::mem::replace(self, Slot::Tombstone) {
            Slot::Occupied(e) => Some(e),
            other => {
                *self = other;
                None
            }
        }
    }
}

/// Fresh storage of `capacity` empty slots.
pub(crate) fn empty_slots<K, V, H>(capacity: usize) -> Vec<Slot<K, V, H>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || Slot::Empty);
    slots
}
