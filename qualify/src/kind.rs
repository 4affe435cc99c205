use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr;

use super::{Category, Qualifiers, VolatileRef, VolatileMut};

/// A kind of access path, independent of what it points to.
///
/// `Ref<U>` is "this kind of path, to a `U`": it copies the qualifiers and category of the kind
/// onto `U`.
///
/// # Safety
///
/// `QUALIFIERS` and `CATEGORY` must describe `Ref<U>` truthfully, and `reinterpret` must return a
/// path of the same kind to the same address.
pub unsafe trait Kind<'a> {
    type Ref<U: 'a>;

    const QUALIFIERS: Qualifiers;
    const CATEGORY: Category;

    /// Reinterprets a path to a `T` as a path to a `U`.
    ///
    /// # Safety
    ///
    /// `T` and `U` must have the same size and alignment, and the bytes of the `T` must be a
    /// valid `U`.
    unsafe fn reinterpret<T: 'a, U: 'a>(path: Self::Ref<T>) -> Self::Ref<U>;
}

/// `&'a U`
#[derive(Debug)]
pub struct Shared<'a>(PhantomData<&'a ()>);

/// `&'a mut U`
#[derive(Debug)]
pub struct Exclusive<'a>(PhantomData<&'a mut ()>);

/// `VolatileRef<'a, U>`
#[derive(Debug)]
pub struct Volatile<'a>(PhantomData<&'a ()>);

/// `VolatileMut<'a, U>`
#[derive(Debug)]
pub struct VolatileExclusive<'a>(PhantomData<&'a mut ()>);

/// An owned `U`.
#[derive(Debug)]
pub struct Moved<'a>(PhantomData<&'a ()>);

unsafe impl<'a> Kind<'a> for Shared<'a> {
    type Ref<U: 'a> = &'a U;

    const QUALIFIERS: Qualifiers = Qualifiers::CONST;
    const CATEGORY: Category = Category::Place;

    #[inline(always)]
    unsafe fn reinterpret<T: 'a, U: 'a>(path: &'a T) -> &'a U {
        &*(path as *const T as *const U)
    }
}

unsafe impl<'a> Kind<'a> for Exclusive<'a> {
    type Ref<U: 'a> = &'a mut U;

    const QUALIFIERS: Qualifiers = Qualifiers::empty();
    const CATEGORY: Category = Category::Place;

    #[inline(always)]
    unsafe fn reinterpret<T: 'a, U: 'a>(path: &'a mut T) -> &'a mut U {
        &mut *(path as *mut T as *mut U)
    }
}

unsafe impl<'a> Kind<'a> for Volatile<'a> {
    type Ref<U: 'a> = VolatileRef<'a, U>;

    const QUALIFIERS: Qualifiers = Qualifiers::CONST_VOLATILE;
    const CATEGORY: Category = Category::Place;

    #[inline(always)]
    unsafe fn reinterpret<T: 'a, U: 'a>(path: VolatileRef<'a, T>) -> VolatileRef<'a, U> {
        path.cast()
    }
}

unsafe impl<'a> Kind<'a> for VolatileExclusive<'a> {
    type Ref<U: 'a> = VolatileMut<'a, U>;

    const QUALIFIERS: Qualifiers = Qualifiers::VOLATILE;
    const CATEGORY: Category = Category::Place;

    #[inline(always)]
    unsafe fn reinterpret<T: 'a, U: 'a>(path: VolatileMut<'a, T>) -> VolatileMut<'a, U> {
        path.cast()
    }
}

unsafe impl<'a> Kind<'a> for Moved<'a> {
    type Ref<U: 'a> = U;

    const QUALIFIERS: Qualifiers = Qualifiers::empty();
    const CATEGORY: Category = Category::Value;

    #[inline(always)]
    unsafe fn reinterpret<T: 'a, U: 'a>(path: T) -> U {
        let path = ManuallyDrop::new(path);
        ptr::read(&*path as *const T as *const U)
    }
}
