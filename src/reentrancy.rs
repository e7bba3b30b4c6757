//! Debug-only detection of re-entry into a table.
//!
//! Engines call user code (`K: Eq`, `K: Hash`) while a probe or an eviction
//! walk is in flight. If that code reaches back into the same table, the
//! table would observe itself half-updated. Every public entry point takes an
//! [`OpGuard`] for the duration of the call; a nested `enter` panics in debug
//! builds. Release builds carry no state and no checks.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

/// Busy flag embedded in each table.
#[derive(Debug, Default)]
pub struct OpGuard {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
}

impl OpGuard {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
        }
    }

    /// Marks the table busy until the returned token is dropped.
    ///
    /// # Panics
    ///
    /// In debug builds, if the table is already inside an operation.
    #[inline]
    pub fn enter(&self) -> Entered<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "hash table re-entered while an operation was in progress"
            );
        }
        Entered {
            #[cfg(debug_assertions)]
            owner: self,
            _lt: PhantomData,
        }
    }

    /// True while some caller holds an [`Entered`] token. Always false in
    /// release builds.
    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        #[cfg(debug_assertions)]
        {
            self.busy.get()
        }
        #[cfg(not(debug_assertions))]
        {
            false
        }
    }
}

/// Token returned by [`OpGuard::enter`]; clears the busy flag on drop.
pub struct Entered<'a> {
    #[cfg(debug_assertions)]
    owner: &'a OpGuard,
    _lt: PhantomData<&'a OpGuard>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(false);
    }
}
