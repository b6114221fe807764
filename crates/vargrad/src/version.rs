//! Generation counter shared between a variable and its saved snapshots.
//!
//! A single-writer/many-readers clock: the owning variable increments
//! the counter on every in-place mutation of its data, and saved
//! references observe the live value without mutation rights. `Rc` is
//! enough for sharing because the computation graph is single-threaded.

use std::cell::Cell;
use std::rc::Rc;

/// Mutation-tracking counter owned by a variable.
///
/// # Examples
///
/// ```
/// use vargrad::VersionCounter;
///
/// let counter = VersionCounter::new();
/// let saved = counter.saved_ref();
///
/// counter.increment();
/// assert_eq!(counter.read(), 1);
/// assert_eq!(saved.read(), 1);
/// ```
#[derive(Debug, Default)]
pub struct VersionCounter {
    cell: Rc<Cell<u64>>,
}

impl VersionCounter {
    /// Fresh counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one in-place mutation.
    ///
    /// The new value is immediately visible to every [`SavedRef`]
    /// minted from this counter; they alias the same cell, not a copy.
    pub fn increment(&self) {
        self.cell.set(self.cell.get() + 1);
    }

    /// Current generation.
    pub fn read(&self) -> u64 {
        self.cell.get()
    }

    /// Mint a read-only alias of the live counter.
    ///
    /// The alias co-owns the cell, so it stays valid even if the live
    /// counter's owner is dropped first.
    pub fn saved_ref(&self) -> SavedRef {
        SavedRef {
            cell: Rc::clone(&self.cell),
        }
    }
}

/// Read-only view into a [`VersionCounter`], held by saved snapshots.
#[derive(Debug, Clone)]
pub struct SavedRef {
    cell: Rc<Cell<u64>>,
}

impl SavedRef {
    /// Current generation of the aliased counter.
    pub fn read(&self) -> u64 {
        self.cell.get()
    }
}
