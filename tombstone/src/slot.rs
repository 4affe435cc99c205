use std::any::type_name;
use std::borrow::{Borrow, BorrowMut};
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ops;
use std::ptr;

use qualify::{Exclusive, Moved, Shared, VolatileMut, VolatileRef};
use tracing::trace;

use crate::cast::{self, Extends};
use crate::drain::{Bitwise, Check, Drain};
use crate::emplace::Build;
use crate::validity::{Flag, Validity};

const TOMBSTONED: &str = "slot is tombstoned";
const LIVE: &str = "slot already holds a value";

/// Storage for a single `T`, which may be empty.
///
/// A slot is either *valid*, holding a live `T`, or *tombstoned*. Moving the value out of a slot
/// tombstones it, so the slot never drops a value that has been moved elsewhere. Whether the slot
/// is valid is recorded by `V`, either a [`Flag`] stored in the slot, or an entry in a table kept
/// elsewhere. `P` decides what moving the value out leaves behind.
///
/// Accessing the value of a tombstoned slot is a bug; the safe accessors panic.
pub struct Slot<T, V: Validity = Flag, P: Drain<T> = Bitwise> {
    marker: PhantomData<fn() -> P>,
    validity: V,
    storage: MaybeUninit<T>,
}

impl<T> Slot<T> {
    /// Creates a slot holding `value`.
    #[inline]
    pub fn new(value: T) -> Self {
        Self::new_in(value, Flag::tombstone())
    }

    /// Creates an empty slot.
    #[inline]
    pub fn tombstone() -> Self {
        Self::tombstone_in(Flag::tombstone())
    }

    /// Creates a slot holding a value built from `params`.
    #[inline]
    pub fn emplaced(params: impl Build<T>) -> Self {
        Self::emplaced_in(params, Flag::tombstone())
    }

    /// Creates a slot by draining `src`.
    ///
    /// `src` is tombstoned afterwards. If it was tombstoned to begin with, so is the new slot.
    #[inline]
    pub fn take_from<V2: Validity, P2: Drain<T>>(src: &mut Slot<T, V2, P2>) -> Self {
        Self::take_from_in(src, Flag::tombstone())
    }

    /// Creates a slot holding a clone of `src`'s value, leaving `src` untouched.
    #[inline]
    pub fn copy_from<V2: Validity, P2: Drain<T>>(src: &Slot<T, V2, P2>) -> Self
        where T: Clone
    {
        Self::copy_from_in(src, Flag::tombstone())
    }
}

impl<T, V: Validity, P: Drain<T>> Slot<T, V, P> {
    /// Creates an empty slot, recording validity in `validity`.
    pub fn tombstone_in(mut validity: V) -> Self {
        let () = Check::<T, P>::ENABLED;

        validity.mark_tombstoned();
        Self {
            marker: PhantomData,
            validity,
            storage: MaybeUninit::uninit(),
        }
    }

    pub fn new_in(value: T, validity: V) -> Self {
        let mut this = Self::tombstone_in(validity);
        this.construct(value);
        this
    }

    pub fn emplaced_in(params: impl Build<T>, validity: V) -> Self {
        let mut this = Self::tombstone_in(validity);
        this.emplace(params);
        this
    }

    pub fn take_from_in<V2: Validity, P2: Drain<T>>(src: &mut Slot<T, V2, P2>, validity: V) -> Self {
        let mut this = Self::tombstone_in(validity);
        if let Some(value) = src.try_take() {
            this.construct(value);
        }
        this
    }

    pub fn copy_from_in<V2: Validity, P2: Drain<T>>(src: &Slot<T, V2, P2>, validity: V) -> Self
        where T: Clone
    {
        let mut this = Self::tombstone_in(validity);
        if let Some(value) = src.get() {
            this.construct(value.clone());
        }
        this
    }

    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.validity.is_valid()
    }

    #[inline(always)]
    pub fn has_value(&self) -> bool {
        self.is_valid()
    }

    #[inline(always)]
    pub fn validity(&self) -> &V {
        &self.validity
    }

    #[inline]
    pub fn get(&self) -> Option<&T> {
        if self.is_valid() {
            Some(unsafe { self.value_unchecked() })
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.is_valid() {
            Some(unsafe { self.value_unchecked_mut() })
        } else {
            None
        }
    }

    /// Returns the value.
    ///
    /// # Panics
    ///
    /// Panics if the slot is tombstoned.
    #[inline]
    pub fn value(&self) -> &T {
        assert!(self.is_valid(), "{}", TOMBSTONED);
        unsafe { self.value_unchecked() }
    }

    /// Returns the value mutably.
    ///
    /// # Panics
    ///
    /// Panics if the slot is tombstoned.
    #[inline]
    pub fn value_mut(&mut self) -> &mut T {
        assert!(self.is_valid(), "{}", TOMBSTONED);
        unsafe { self.value_unchecked_mut() }
    }

    /// Returns the value without checking that there is one.
    ///
    /// # Safety
    ///
    /// The slot must be valid. This is only checked in debug builds.
    #[inline(always)]
    pub unsafe fn value_unchecked(&self) -> &T {
        debug_assert!(self.is_valid(), "{}", TOMBSTONED);
        self.storage.assume_init_ref()
    }

    /// # Safety
    ///
    /// The slot must be valid. This is only checked in debug builds.
    #[inline(always)]
    pub unsafe fn value_unchecked_mut(&mut self) -> &mut T {
        debug_assert!(self.is_valid(), "{}", TOMBSTONED);
        self.storage.assume_init_mut()
    }

    /// Returns a clone of the value, or `default` if the slot is tombstoned.
    #[inline]
    pub fn value_or(&self, default: T) -> T
        where T: Clone
    {
        match self.get() {
            Some(value) => value.clone(),
            None => default,
        }
    }

    /// Returns the value with volatile access.
    ///
    /// # Panics
    ///
    /// Panics if the slot is tombstoned.
    #[inline]
    pub fn volatile(&self) -> VolatileRef<'_, T> {
        VolatileRef::new(self.value())
    }

    #[inline]
    pub fn volatile_mut(&mut self) -> VolatileMut<'_, T> {
        VolatileMut::new(self.value_mut())
    }

    /// Constructs a value in an empty slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot already holds a value.
    #[inline]
    pub fn construct(&mut self, value: T) -> &mut T {
        self.construct_with(|| value)
    }

    /// Constructs a value from the result of `f`.
    ///
    /// If `f` panics the slot stays tombstoned.
    ///
    /// # Panics
    ///
    /// Panics if the slot already holds a value.
    #[inline]
    pub fn construct_with(&mut self, f: impl FnOnce() -> T) -> &mut T {
        assert!(!self.is_valid(), "{}", LIVE);
        let value = f();
        unsafe { self.fill(value) }
    }

    /// Constructs a value from the result of a fallible constructor.
    ///
    /// If `f` fails the error is returned as is, and the slot stays tombstoned.
    ///
    /// # Panics
    ///
    /// Panics if the slot already holds a value.
    #[inline]
    pub fn try_construct_with<E>(&mut self, f: impl FnOnce() -> Result<T, E>) -> Result<&mut T, E> {
        assert!(!self.is_valid(), "{}", LIVE);
        let value = f()?;
        Ok(unsafe { self.fill(value) })
    }

    /// Constructs a value built from `params`.
    ///
    /// # Panics
    ///
    /// Panics if the slot already holds a value.
    #[inline]
    pub fn emplace(&mut self, params: impl Build<T>) -> &mut T {
        self.construct_with(|| params.build())
    }

    /// Constructs a value of a type extending `T`.
    ///
    /// The slot still holds a `T` as far as its type is concerned, but the returned reference
    /// gives access to the extension.
    ///
    /// # Panics
    ///
    /// Panics if the slot already holds a value.
    pub fn emplace_extended<D, B>(&mut self, params: B) -> &mut D
        where D: Extends<T>,
              B: Build<D>,
    {
        assert!(!self.is_valid(), "{}", LIVE);
        let derived: D = params.build();
        let value = cast::upcast::<Moved, D, T>(derived);

        let value = unsafe { self.fill(value) };

        // SAFETY: the value was a D a moment ago
        unsafe { cast::downcast::<Exclusive, T, D>(value) }
    }

    #[inline(always)]
    unsafe fn fill(&mut self, value: T) -> &mut T {
        debug_assert!(!self.is_valid());
        let r = self.storage.write(value);
        self.validity.mark_constructed();
        r
    }

    /// Drops the value, leaving the slot tombstoned.
    ///
    /// # Panics
    ///
    /// Panics if the slot is tombstoned.
    #[inline]
    pub fn reset(&mut self) {
        assert!(self.is_valid(), "{}", TOMBSTONED);

        // Tombstone first, so a panicking destructor can't lead to a second drop.
        self.validity.mark_tombstoned();
        unsafe { ptr::drop_in_place(self.storage.as_mut_ptr()) }
    }

    /// Moves the value out, leaving the slot tombstoned.
    ///
    /// # Panics
    ///
    /// Panics if the slot is tombstoned.
    #[inline]
    pub fn take(&mut self) -> T {
        assert!(self.is_valid(), "{}", TOMBSTONED);
        unsafe { self.drain() }
    }

    /// Moves the value out if there is one.
    #[inline]
    pub fn try_take(&mut self) -> Option<T> {
        if self.is_valid() {
            Some(unsafe { self.drain() })
        } else {
            None
        }
    }

    unsafe fn drain(&mut self) -> T {
        let src = &mut *self.storage.as_mut_ptr();
        let value = P::move_out(src);

        self.validity.mark_tombstoned();
        P::drop_moved_from(src);

        trace!(value_type = type_name::<T>(), "drained slot");
        value
    }

    /// Consumes the slot, returning its value.
    ///
    /// # Panics
    ///
    /// Panics if the slot is tombstoned.
    #[inline]
    pub fn into_value(mut self) -> T {
        self.take()
    }

    #[inline]
    pub fn into_value_or(mut self, default: T) -> T {
        self.try_take().unwrap_or(default)
    }

    #[inline]
    pub fn into_option(mut self) -> Option<T> {
        self.try_take()
    }

    /// Assigns a value, constructing it if the slot is tombstoned.
    pub fn assign(&mut self, value: impl Into<T>) -> &mut T {
        let value = value.into();
        if self.is_valid() {
            let dst = unsafe { self.value_unchecked_mut() };
            *dst = value;
            dst
        } else {
            unsafe { self.fill(value) }
        }
    }

    /// Assigns from another slot, draining it.
    ///
    /// If `src` is tombstoned, so is `self` afterwards.
    pub fn assign_from<V2: Validity, P2: Drain<T>>(&mut self, src: &mut Slot<T, V2, P2>) {
        match src.try_take() {
            Some(value) => {
                self.assign(value);
            },
            None => if self.is_valid() {
                self.reset()
            },
        }
    }

    /// Assigns a clone of another slot's value, leaving the other slot untouched.
    ///
    /// If `src` is tombstoned, so is `self` afterwards.
    pub fn assign_copy<V2: Validity, P2: Drain<T>>(&mut self, src: &Slot<T, V2, P2>)
        where T: Clone
    {
        match src.get() {
            Some(value) => if self.is_valid() {
                let dst = unsafe { self.value_unchecked_mut() };
                dst.clone_from(value)
            } else {
                unsafe { self.fill(value.clone()); }
            },
            None => if self.is_valid() {
                self.reset()
            },
        }
    }

    /// Returns the value as a base type.
    #[inline]
    pub fn upcast_ref<Base>(&self) -> &Base
        where T: Extends<Base>
    {
        cast::upcast::<Shared, T, Base>(self.value())
    }

    #[inline]
    pub fn upcast_mut<Base>(&mut self) -> &mut Base
        where T: Extends<Base>
    {
        cast::upcast::<Exclusive, T, Base>(self.value_mut())
    }
}

impl<T, V: Validity, P: Drain<T>> Drop for Slot<T, V, P> {
    fn drop(&mut self) {
        if self.validity.is_valid() {
            self.validity.mark_tombstoned();
            if mem::needs_drop::<T>() {
                unsafe { ptr::drop_in_place(self.storage.as_mut_ptr()) }
            }
        }
    }
}

impl<T, V: Validity, P: Drain<T>> ops::Deref for Slot<T, V, P> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.value()
    }
}

impl<T, V: Validity, P: Drain<T>> ops::DerefMut for Slot<T, V, P> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        self.value_mut()
    }
}

impl<T, V: Validity, P: Drain<T>> AsRef<T> for Slot<T, V, P> {
    #[inline]
    fn as_ref(&self) -> &T {
        self.value()
    }
}

impl<T, V: Validity, P: Drain<T>> AsMut<T> for Slot<T, V, P> {
    #[inline]
    fn as_mut(&mut self) -> &mut T {
        self.value_mut()
    }
}

impl<T, V: Validity, P: Drain<T>> Borrow<T> for Slot<T, V, P> {
    #[inline]
    fn borrow(&self) -> &T {
        self.value()
    }
}

impl<T, V: Validity, P: Drain<T>> BorrowMut<T> for Slot<T, V, P> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut T {
        self.value_mut()
    }
}

impl<T: Default, V: Validity + Default, P: Drain<T>> Default for Slot<T, V, P> {
    fn default() -> Self {
        Self::new_in(T::default(), V::default())
    }
}

impl<T> From<T> for Slot<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T, V: Validity, P: Drain<T>> From<&Slot<T, V, P>> for bool {
    #[inline]
    fn from(slot: &Slot<T, V, P>) -> bool {
        slot.is_valid()
    }
}

impl<T: Clone, P: Drain<T>> Clone for Slot<T, Flag, P> {
    fn clone(&self) -> Self {
        Self::copy_from_in(self, Flag::tombstone())
    }

    fn clone_from(&mut self, src: &Self) {
        self.assign_copy(src)
    }
}

impl<T: fmt::Debug, V: Validity, P: Drain<T>> fmt::Debug for Slot<T, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Slot").field(value).finish(),
            None => f.write_str("Slot(<tombstone>)"),
        }
    }
}

impl<T, U, V, V2, P, P2> PartialEq<Slot<U, V2, P2>> for Slot<T, V, P>
where T: PartialEq<U>,
      V: Validity, V2: Validity,
      P: Drain<T>, P2: Drain<U>,
{
    fn eq(&self, other: &Slot<U, V2, P2>) -> bool {
        match (self.get(), other.get()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Eq, V: Validity, P: Drain<T>> Eq for Slot<T, V, P> {}
