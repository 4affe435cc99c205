use std::cell::{Cell, RefCell};

use tombstone::{emplace, exempt_members, Bitwise, Extends, Flag, Forward, Slot, Table};

#[derive(Default)]
struct Counts {
    made: Cell<usize>,
    dropped: Cell<usize>,
}

impl Counts {
    fn get(&self) -> (usize, usize) {
        (self.made.get(), self.dropped.get())
    }
}

struct X<'a> {
    counts: &'a Counts,
    n: u32,
}

impl<'a> From<&'a Counts> for X<'a> {
    fn from(counts: &'a Counts) -> Self {
        counts.made.set(counts.made.get() + 1);
        X { counts, n: 0 }
    }
}

impl Drop for X<'_> {
    fn drop(&mut self) {
        self.counts.dropped.set(self.counts.dropped.get() + 1);
    }
}

#[test]
fn construct_reset_construct() {
    let counts = Counts::default();
    {
        let mut x: Slot<X> = Slot::emplaced(emplace(&counts));
        assert_eq!(counts.get(), (1, 0));

        x.reset();
        assert_eq!(counts.get(), (1, 1));

        x.emplace(emplace(&counts));
        assert_eq!(counts.get(), (2, 1));
    }
    assert_eq!(counts.get(), (2, 2));
}

#[test]
fn move_construct() {
    let counts = Counts::default();
    {
        let mut a: Slot<X> = Slot::emplaced(emplace(&counts));
        a.n = 42;

        let b = Slot::take_from(&mut a);
        assert!(!a.is_valid());
        assert!(b.is_valid());
        assert_eq!(b.n, 42);

        // moving is not constructing
        assert_eq!(counts.get(), (1, 0));
    }
    assert_eq!(counts.get(), (1, 1));
}

#[test]
fn assign_from_tombstone_drops_once() {
    let counts = Counts::default();
    let mut a: Slot<X> = Slot::tombstone();
    let mut b: Slot<X> = Slot::emplaced(emplace(&counts));

    b.assign_from(&mut a);
    assert!(!b.is_valid());
    assert_eq!(counts.get(), (1, 1));

    drop(b);
    drop(a);
    assert_eq!(counts.get(), (1, 1));
}

#[derive(Debug, PartialEq)]
struct Handle(u64);

/// A handle with its top bit set.
#[derive(Debug, PartialEq)]
#[repr(transparent)]
struct Pinned(Handle);

unsafe impl Extends<Handle> for Pinned {}

impl From<u64> for Pinned {
    fn from(n: u64) -> Self {
        Pinned(Handle(n | 1 << 63))
    }
}

#[test]
fn emplace_derived() {
    let mut slot: Slot<Handle> = Slot::tombstone();
    let pinned = slot.emplace_extended::<Pinned, _>(emplace(5u64));
    assert_eq!((pinned.0).0, 5 | 1 << 63);

    assert_eq!(*slot, Handle(5 | 1 << 63));

    let again: &Pinned = unsafe { (&slot).downcast::<Pinned>() };
    assert_eq!(again, &Pinned(Handle(5 | 1 << 63)));
}

thread_local! {
    static DROPPED: RefCell<Vec<String>> = RefCell::new(vec![]);
}

struct Logged(String);

impl Drop for Logged {
    fn drop(&mut self) {
        DROPPED.with(|d| d.borrow_mut().push(self.0.clone()))
    }
}

fn dropped() -> Vec<String> {
    DROPPED.with(|d| d.borrow().clone())
}

struct Session {
    id: u32,
    scratch: Logged,
    audit: Logged,
}

exempt_members! {
    struct LeavesScratch for Session {
        scratch = Logged(String::from("left-scratch")),
        audit = Logged(String::from("left-audit")),
    }
}

fn session(id: u32) -> Session {
    Session {
        id,
        scratch: Logged(format!("scratch-{}", id)),
        audit: Logged(format!("audit-{}", id)),
    }
}

#[test]
fn exempt_members_through_slot() {
    let mut src = Slot::<Session, Flag, LeavesScratch>::new_in(session(1), Flag::tombstone());
    let mut dst = Slot::<Session, Flag, Bitwise>::new_in(session(2), Flag::tombstone());

    dst.assign_from(&mut src);
    assert!(!src.is_valid());
    assert_eq!(dst.id, 1);

    // the remains left in src, in reverse order, then dst's old value
    assert_eq!(dropped(), ["left-audit", "left-scratch", "scratch-2", "audit-2"]);

    drop(src);
    assert_eq!(dropped().len(), 4);

    drop(dst);
    assert_eq!(dropped(), ["left-audit", "left-scratch", "scratch-2", "audit-2", "scratch-1", "audit-1"]);
}

#[test]
fn pooled_validity() {
    let table = Table::with_capacity(4);
    let mut slots: Vec<Slot<String, _>> = (0 .. 4)
        .map(|_| Slot::tombstone_in(table.register().unwrap()))
        .collect();
    assert!(table.register().is_err());

    slots[1].construct(String::from("one"));
    slots[3].assign("three");
    assert_eq!(table.live(), 2);

    let one = slots[1].take();
    assert_eq!(one, "one");
    assert_eq!(table.live(), 1);

    let copy = Slot::copy_from(&slots[3]);
    assert_eq!(*copy, "three");
    assert_eq!(table.live(), 1);

    drop(slots);
    assert!(table.is_empty());
    assert_eq!(table.live(), 0);
}
