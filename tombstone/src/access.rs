//! Forwarding access paths from a slot to its value.

use qualify::{Exclusive, Kind, Moved, Shared, Volatile, VolatileExclusive, VolatileMut, VolatileRef};

use crate::cast::{self, Extends};
use crate::drain::Drain;
use crate::slot::Slot;
use crate::validity::Validity;

/// A path of kind `K` to a `U`.
pub type Path<'a, K, U> = <K as Kind<'a>>::Ref<U>;

/// An access path to a slot, which can be turned into the same kind of path to its value.
///
/// `&Slot` forwards to `&T`, `&mut Slot` to `&mut T`, the volatile paths to volatile paths, and
/// an owned `Slot` to an owned `T`. All of them panic if the slot is tombstoned.
pub trait Forward<'a, T: 'a>: Sized {
    type Kind: Kind<'a>;

    fn forward(self) -> Path<'a, Self::Kind, T>;

    /// Forwards to the value, as one of its bases.
    #[inline]
    fn upcast<Base: 'a>(self) -> Path<'a, Self::Kind, Base>
        where T: Extends<Base>
    {
        cast::upcast::<Self::Kind, T, Base>(self.forward())
    }

    /// Forwards to the value, as a type extending it.
    ///
    /// # Safety
    ///
    /// The value must satisfy the invariants of `Derived`; this isn't checked.
    #[inline]
    unsafe fn downcast<Derived>(self) -> Path<'a, Self::Kind, Derived>
        where Derived: 'a + Extends<T>
    {
        cast::downcast::<Self::Kind, T, Derived>(self.forward())
    }
}

impl<'a, T: 'a, V: Validity, P: Drain<T>> Forward<'a, T> for &'a Slot<T, V, P> {
    type Kind = Shared<'a>;

    #[inline]
    fn forward(self) -> &'a T {
        self.value()
    }
}

impl<'a, T: 'a, V: Validity, P: Drain<T>> Forward<'a, T> for &'a mut Slot<T, V, P> {
    type Kind = Exclusive<'a>;

    #[inline]
    fn forward(self) -> &'a mut T {
        self.value_mut()
    }
}

impl<'a, T: 'a, V: Validity, P: Drain<T>> Forward<'a, T> for VolatileRef<'a, Slot<T, V, P>> {
    type Kind = Volatile<'a>;

    #[inline]
    fn forward(self) -> VolatileRef<'a, T> {
        self.map(|slot| slot.value())
    }
}

impl<'a, T: 'a, V: Validity, P: Drain<T>> Forward<'a, T> for VolatileMut<'a, Slot<T, V, P>> {
    type Kind = VolatileExclusive<'a>;

    #[inline]
    fn forward(self) -> VolatileMut<'a, T> {
        self.map(|slot| slot.value_mut())
    }
}

impl<'a, T: 'a, V: Validity, P: Drain<T>> Forward<'a, T> for Slot<T, V, P> {
    type Kind = Moved<'a>;

    #[inline]
    fn forward(self) -> T {
        self.into_value()
    }
}
