use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

/// A read-only reference whose reads are volatile.
///
/// Volatile access gives no atomicity and no ordering; it only stops the compiler from eliding
/// or merging the accesses.
pub struct VolatileRef<'a, T> {
    marker: PhantomData<&'a T>,
    ptr: NonNull<T>,
}

/// A writable reference whose reads and writes are volatile.
pub struct VolatileMut<'a, T> {
    marker: PhantomData<&'a mut T>,
    ptr: NonNull<T>,
}

impl<'a, T> VolatileRef<'a, T> {
    #[inline(always)]
    pub fn new(r: &'a T) -> Self {
        Self {
            marker: PhantomData,
            ptr: NonNull::from(r),
        }
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Reads the referent with a volatile load.
    #[inline]
    pub fn read(&self) -> T
        where T: Copy
    {
        unsafe { ptr::read_volatile(self.ptr.as_ptr()) }
    }

    /// Narrows the reference to part of the referent.
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(&'a T) -> &'a U) -> VolatileRef<'a, U> {
        // SAFETY: ptr came from a &'a T
        let r = unsafe { &*self.ptr.as_ptr() };
        VolatileRef::new(f(r))
    }

    #[inline(always)]
    pub(crate) unsafe fn cast<U>(self) -> VolatileRef<'a, U> {
        VolatileRef {
            marker: PhantomData,
            ptr: self.ptr.cast(),
        }
    }
}

impl<T> Clone for VolatileRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for VolatileRef<'_, T> {}

impl<'a, T> VolatileMut<'a, T> {
    #[inline(always)]
    pub fn new(r: &'a mut T) -> Self {
        Self {
            marker: PhantomData,
            ptr: NonNull::from(r),
        }
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn read(&self) -> T
        where T: Copy
    {
        unsafe { ptr::read_volatile(self.ptr.as_ptr()) }
    }

    /// Overwrites the referent with a volatile store.
    ///
    /// `T: Copy`, so there is no old value to drop.
    #[inline]
    pub fn write(&mut self, value: T)
        where T: Copy
    {
        unsafe { ptr::write_volatile(self.ptr.as_ptr(), value) }
    }

    #[inline]
    pub fn map<U>(self, f: impl FnOnce(&'a mut T) -> &'a mut U) -> VolatileMut<'a, U> {
        // SAFETY: ptr came from a &'a mut T, and self is consumed
        let r = unsafe { &mut *self.ptr.as_ptr() };
        VolatileMut::new(f(r))
    }

    /// Gives up write access.
    #[inline]
    pub fn downgrade(self) -> VolatileRef<'a, T> {
        VolatileRef {
            marker: PhantomData,
            ptr: self.ptr,
        }
    }

    #[inline(always)]
    pub(crate) unsafe fn cast<U>(self) -> VolatileMut<'a, U> {
        VolatileMut {
            marker: PhantomData,
            ptr: self.ptr.cast(),
        }
    }
}

impl<T> fmt::Debug for VolatileRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("VolatileRef")
            .field(&self.ptr)
            .finish()
    }
}

impl<T> fmt::Debug for VolatileMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("VolatileMut")
            .field(&self.ptr)
            .finish()
    }
}
