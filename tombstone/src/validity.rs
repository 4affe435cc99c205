//! Where a slot records whether it holds a value.

use std::cell::RefCell;
use std::fmt;

use bit_vec::BitVec;
use thiserror::Error;
use tracing::trace;

/// Tracks whether a slot's storage holds a live value.
///
/// Only the slot itself calls the mutators, and only `mark_constructed` can make a slot valid:
/// it is called after a value has been written into storage, never before.
///
/// # Safety
///
/// A slot reads and drops its storage on the strength of `is_valid` alone. `is_valid` must return
/// exactly what the most recent call to `mark_constructed` or `mark_tombstoned` recorded, and
/// nothing other than those two calls may change the answer.
///
/// Implementing it therefore takes `unsafe`:
///
/// ```compile_fail
/// use tombstone::Validity;
///
/// struct AlwaysValid;
///
/// impl Validity for AlwaysValid {
///     fn is_valid(&self) -> bool { true }
///     fn mark_constructed(&mut self) {}
///     fn mark_tombstoned(&mut self) {}
/// }
/// ```
pub unsafe trait Validity {
    fn is_valid(&self) -> bool;

    /// Records that a value has just been constructed in the slot.
    fn mark_constructed(&mut self);

    /// Records that the slot no longer holds a value.
    fn mark_tombstoned(&mut self);
}

/// A validity flag stored alongside the value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flag(bool);

impl Flag {
    /// A flag for an empty slot.
    #[inline(always)]
    pub const fn tombstone() -> Self {
        Flag(false)
    }
}

unsafe impl Validity for Flag {
    #[inline(always)]
    fn is_valid(&self) -> bool {
        self.0
    }

    #[inline(always)]
    fn mark_constructed(&mut self) {
        self.0 = true
    }

    #[inline(always)]
    fn mark_tombstoned(&mut self) {
        self.0 = false
    }
}

/// Returned when a [`Table`] has no free entries left.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("validity table full: all {capacity} entries in use")]
pub struct TableFull {
    pub capacity: usize,
}

/// Validity flags for a group of slots, kept outside the slots themselves.
///
/// Each slot holds an [`Entry`], which addresses its flag by index. The table has a fixed
/// capacity; entries are recycled when dropped.
pub struct Table {
    inner: RefCell<Inner>,
}

struct Inner {
    valid: BitVec,
    in_use: BitVec,
    free: Vec<usize>,
}

impl Table {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RefCell::new(Inner {
                valid: BitVec::from_elem(capacity, false),
                in_use: BitVec::from_elem(capacity, false),
                free: (0 .. capacity).rev().collect(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.borrow().valid.len()
    }

    /// Number of entries currently handed out.
    pub fn len(&self) -> usize {
        let inner = self.inner.borrow();
        inner.valid.len() - inner.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries whose slot currently holds a value.
    pub fn live(&self) -> usize {
        self.inner.borrow().valid.iter().filter(|valid| *valid).count()
    }

    /// Returns the flag at `index`; `false` for unused or out-of-range indexes.
    pub fn is_valid(&self, index: usize) -> bool {
        self.inner.borrow().valid.get(index).unwrap_or(false)
    }

    /// Hands out a fresh entry, initially tombstoned.
    pub fn register(&self) -> Result<Entry<'_>, TableFull> {
        let mut inner = self.inner.borrow_mut();
        let capacity = inner.valid.len();
        let index = inner.free.pop().ok_or(TableFull { capacity })?;

        debug_assert!(!inner.in_use[index]);
        inner.in_use.set(index, true);
        inner.valid.set(index, false);
        trace!(index, capacity, "registered validity entry");

        Ok(Entry { table: self, index })
    }

    fn set(&self, index: usize, valid: bool) {
        self.inner.borrow_mut().valid.set(index, valid)
    }

    fn release(&self, index: usize) {
        let mut inner = self.inner.borrow_mut();
        debug_assert!(inner.in_use[index]);
        inner.valid.set(index, false);
        inner.in_use.set(index, false);
        inner.free.push(index);
        trace!(index, "released validity entry");
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Table")
            .field("valid", &inner.valid)
            .field("in_use", &inner.in_use)
            .finish()
    }
}

/// A slot's handle to its flag in a [`Table`].
pub struct Entry<'t> {
    table: &'t Table,
    index: usize,
}

impl Entry<'_> {
    pub fn index(&self) -> usize {
        self.index
    }
}

unsafe impl Validity for Entry<'_> {
    #[inline]
    fn is_valid(&self) -> bool {
        self.table.is_valid(self.index)
    }

    #[inline]
    fn mark_constructed(&mut self) {
        self.table.set(self.index, true)
    }

    #[inline]
    fn mark_tombstoned(&mut self) {
        self.table.set(self.index, false)
    }
}

impl Drop for Entry<'_> {
    fn drop(&mut self) {
        self.table.release(self.index)
    }
}

impl fmt::Debug for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Entry")
            .field("index", &self.index)
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use static_assertions::{assert_eq_size, assert_not_impl_any};

    assert_eq_size!(Flag, bool);
    assert_not_impl_any!(Table: Sync);
    assert_not_impl_any!(Entry<'static>: Send, Sync, Clone);

    #[test]
    fn flag() {
        let mut flag = Flag::default();
        assert_eq!(flag, Flag::tombstone());
        assert!(!flag.is_valid());

        flag.mark_constructed();
        assert!(flag.is_valid());

        flag.mark_tombstoned();
        assert!(!flag.is_valid());
    }

    #[test]
    fn table_entries() {
        let table = Table::with_capacity(2);
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 2);

        let mut a = table.register().unwrap();
        let b = table.register().unwrap();
        assert_ne!(a.index(), b.index());
        assert_eq!(table.len(), 2);
        assert_eq!(table.live(), 0);

        assert_eq!(table.register().unwrap_err(), TableFull { capacity: 2 });

        a.mark_constructed();
        assert!(a.is_valid());
        assert!(!b.is_valid());
        assert!(table.is_valid(a.index()));
        assert_eq!(table.live(), 1);

        let a_index = a.index();
        drop(a);
        assert!(!table.is_valid(a_index));
        assert_eq!(table.len(), 1);
        assert_eq!(table.live(), 0);

        // released entries are recycled, tombstoned
        let c = table.register().unwrap();
        assert_eq!(c.index(), a_index);
        assert!(!c.is_valid());
    }

    #[test]
    fn out_of_range_is_tombstoned() {
        let table = Table::with_capacity(1);
        assert!(!table.is_valid(7));
    }

    #[test]
    fn table_full_message() {
        let err = Table::with_capacity(0).register().unwrap_err();
        assert_eq!(err.to_string(), "validity table full: all 0 entries in use");
    }
}
