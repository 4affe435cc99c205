//! Moving values out of slots.
//!
//! Draining a slot moves its value out and leaves the slot tombstoned, so the slot never drops
//! the value a second time. For most types a Rust move is already the whole story: the bytes are
//! copied out and nothing is left behind to clean up. Some types however leave parts of
//! themselves behind when moved out of a place, for instance a field that is swapped for a fresh
//! value rather than taken. A [`Drain`] policy describes both halves: how the value is moved out,
//! and which parts of the moved-from remains still need dropping.

use std::ptr;

/// How values of type `T` are moved out of a slot.
///
/// # Safety
///
/// `move_out` must return a value that owns everything the source owned, except for the parts
/// it replaced in the source with fresh values. If it panics, the source must be untouched.
///
/// `drop_moved_from` must drop exactly those replaced parts, and nothing else: every other part
/// of the moved-from value is a bitwise duplicate of something the moved-out value now owns.
pub unsafe trait Drain<T> {
    /// Whether values of `T` may be drained at all.
    ///
    /// If `false`, every attempt to create a `Slot` with this policy fails to compile.
    const DESTRUCTIVE_MOVE: bool = true;

    /// Moves the value out of `src`.
    ///
    /// # Safety
    ///
    /// `src` must be live. Afterwards it is moved-from, and the only valid operation on it is
    /// `drop_moved_from`.
    #[inline(always)]
    unsafe fn move_out(src: &mut T) -> T {
        ptr::read(src)
    }

    /// Drops whatever a moved-from value still owns.
    ///
    /// # Safety
    ///
    /// `moved_from` must have been passed to `move_out`, and not to this function yet.
    #[inline(always)]
    unsafe fn drop_moved_from(moved_from: &mut T) {
        let _ = moved_from;
    }
}

/// Moves values bitwise; nothing is left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bitwise;

unsafe impl<T> Drain<T> for Bitwise {}

/// Forbids draining, and with it putting the type in a slot at all.
///
/// ```compile_fail
/// use tombstone::{Slot, Flag, Disabled};
///
/// let _ = Slot::<u8, Flag, Disabled>::tombstone_in(Flag::tombstone());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Disabled;

unsafe impl<T> Drain<T> for Disabled {
    const DESTRUCTIVE_MOVE: bool = false;
}

pub(crate) struct Check<T, P>(std::marker::PhantomData<(fn() -> T, P)>);

impl<T, P: Drain<T>> Check<T, P> {
    pub(crate) const ENABLED: () = assert!(P::DESTRUCTIVE_MOVE,
                                           "destructive move is disabled for this type");
}

/// Declares a drain policy for a struct whose move leaves some fields behind.
///
/// Each listed field is replaced in the moved-from value by the given expression, and the
/// moved-out value takes the original. When the remains are dropped, exactly the listed fields
/// are dropped, last listed first, so the remains are torn down in the reverse of the order they
/// were put in place. That is deliberately the opposite of Rust's own drop order for struct
/// fields, which runs in declaration order.
///
/// The replacement expressions are all evaluated before anything is moved, so a panic in one of
/// them leaves the source untouched.
///
/// ```
/// use tombstone::{exempt_members, Slot, Flag};
///
/// pub struct Conn {
///     id: u32,
///     buf: Vec<u8>,
///     journal: Vec<String>,
/// }
///
/// exempt_members! {
///     /// Leaves a preallocated journal behind.
///     pub struct KeepJournal for Conn {
///         journal = Vec::with_capacity(16),
///     }
/// }
///
/// let conn = Conn { id: 1, buf: vec![1], journal: vec![] };
/// let mut src = Slot::<Conn, Flag, KeepJournal>::new_in(conn, Flag::tombstone());
/// let conn = src.take();
/// assert_eq!(conn.id, 1);
/// assert!(!src.is_valid());
/// ```
#[macro_export]
macro_rules! exempt_members {
    (
        $(#[$attr:meta])*
        $vis:vis struct $policy:ident for $ty:ty {
            $( $field:ident = $fresh:expr ),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        $vis struct $policy;

        unsafe impl $crate::Drain<$ty> for $policy {
            unsafe fn move_out(src: &mut $ty) -> $ty {
                $( let $field = $fresh; )+

                let moved = ::core::ptr::read(src);
                $( ::core::ptr::write(&mut src.$field, $field); )+
                moved
            }

            unsafe fn drop_moved_from(moved_from: &mut $ty) {
                $crate::__drop_reversed!(moved_from; $($field),+);
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __drop_reversed {
    ($src:ident; ) => {};
    ($src:ident; $first:ident $(, $rest:ident)*) => {
        $crate::__drop_reversed!($src; $($rest),*);
        ::core::ptr::drop_in_place(&mut $src.$first);
    };
}
