//! Same-footprint conversions between a type and the types that extend it.

use std::marker::PhantomData;
use std::mem;

use qualify::Kind;

/// Declares `Self` an extension of `Base` with the same footprint.
///
/// Slots have fixed-size storage, so a slot for `Base` can hold a `Self` only if the two are
/// interchangeable byte for byte. The usual way to get there is a `#[repr(transparent)]` wrapper
/// around `Base` that adds behaviour or invariants, but no state.
///
/// # Safety
///
/// `Self` must have the same size, alignment and layout as `Base`, every valid `Self` must be a
/// valid `Base`, and dropping a `Self` must be equivalent to dropping the `Base` it wraps.
///
/// Getting the footprint wrong is caught at compile time, as soon as a conversion is used:
///
/// ```compile_fail
/// use tombstone::{emplace, Extends, Slot};
///
/// struct Small(u8);
/// struct Big(u64);
///
/// impl From<u64> for Big {
///     fn from(n: u64) -> Self { Big(n) }
/// }
///
/// unsafe impl Extends<Small> for Big {}
///
/// let mut slot = Slot::<Small>::tombstone();
/// slot.emplace_extended::<Big, _>(emplace(1u64));
/// ```
pub unsafe trait Extends<Base> {}

unsafe impl<T> Extends<T> for T {}

struct Footprint<Src, Dst>(PhantomData<(fn() -> Src, fn() -> Dst)>);

impl<Src, Dst> Footprint<Src, Dst> {
    const SAME: () = assert!(mem::size_of::<Src>() == mem::size_of::<Dst>()
                             && mem::align_of::<Src>() == mem::align_of::<Dst>(),
                             "types differ in footprint");
}

/// Converts a path to a `Src` into the same kind of path to a `Dst`.
///
/// The footprint check happens at compile time: instantiating this with types that differ in
/// size or alignment is an error.
///
/// # Safety
///
/// The bytes of the `Src` must be a valid `Dst`.
#[inline(always)]
pub(crate) unsafe fn convert<'a, K, Src, Dst>(path: K::Ref<Src>) -> K::Ref<Dst>
    where K: Kind<'a>,
          Src: 'a,
          Dst: 'a,
{
    let () = Footprint::<Src, Dst>::SAME;
    K::reinterpret::<Src, Dst>(path)
}

/// Converts a path to a `T` into a path to one of its bases.
#[inline(always)]
pub fn upcast<'a, K, T, Base>(path: K::Ref<T>) -> K::Ref<Base>
    where K: Kind<'a>,
          T: 'a + Extends<Base>,
          Base: 'a,
{
    // SAFETY: every valid T is a valid Base
    unsafe { convert::<K, T, Base>(path) }
}

/// Converts a path to a `T` into a path to a type extending it.
///
/// # Safety
///
/// Nothing is checked at runtime: the `T` must actually satisfy whatever invariants `Derived`
/// adds.
#[inline(always)]
pub unsafe fn downcast<'a, K, T, Derived>(path: K::Ref<T>) -> K::Ref<Derived>
    where K: Kind<'a>,
          T: 'a,
          Derived: 'a + Extends<T>,
{
    convert::<K, T, Derived>(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    use qualify::{Shared, Exclusive, Moved};

    #[derive(Debug, PartialEq)]
    struct Celsius(f32);

    /// Celsius, never below absolute zero.
    #[derive(Debug, PartialEq)]
    #[repr(transparent)]
    struct Physical(Celsius);

    unsafe impl Extends<Celsius> for Physical {}

    #[test]
    fn upcast_paths() {
        let mut p = Physical(Celsius(21.5));
        let addr = &p as *const Physical as usize;

        let c: &Celsius = upcast::<Shared, Physical, Celsius>(&p);
        assert_eq!(c as *const Celsius as usize, addr);
        assert_eq!(c, &Celsius(21.5));

        let c: &mut Celsius = upcast::<Exclusive, Physical, Celsius>(&mut p);
        c.0 = 0.0;
        assert_eq!(p, Physical(Celsius(0.0)));

        let c: Celsius = upcast::<Moved, Physical, Celsius>(p);
        assert_eq!(c, Celsius(0.0));
    }

    #[test]
    fn downcast_paths() {
        let c = Celsius(-3.0);
        let p: &Physical = unsafe { downcast::<Shared, Celsius, Physical>(&c) };
        assert_eq!(&p.0 as *const Celsius, &c as *const Celsius);
    }

    #[test]
    fn reflexive() {
        let s = String::from("same");
        let s: String = upcast::<Moved, String, String>(s);
        assert_eq!(s, "same");
    }
}
