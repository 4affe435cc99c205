//! Bundled constructor arguments.
//!
//! A [`Params`] holds the arguments for constructing a value somewhere else, so a slot can be
//! handed "what to build" as a single value and do the building in place. Consuming a bundle
//! builds once with the arguments moved in; building from a shared reference leaves the bundle
//! intact so it can build any number of independent values, with the reuse policy deciding how
//! the arguments are passed each time.

use std::fmt;
use std::marker::PhantomData;

/// Something a `T` can be built from.
pub trait Build<T> {
    fn build(self) -> T;
}

/// How a shared bundle passes its arguments on each reuse.
pub trait Reuse<T, A> {
    fn rebuild(args: &A) -> T;
}

/// Reuse policy: the arguments are lent to the constructor by shared reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByRef;

/// Reuse policy: each build gets its own clone of the arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cloned;

impl<T, A> Reuse<T, A> for ByRef
where T: for<'r> From<&'r A>,
{
    #[inline]
    fn rebuild(args: &A) -> T {
        T::from(args)
    }
}

impl<T, A> Reuse<T, A> for Cloned
where T: From<A>,
      A: Clone,
{
    #[inline]
    fn rebuild(args: &A) -> T {
        T::from(args.clone())
    }
}

/// Constructor arguments `A`, with reuse policy `R`.
pub struct Params<A, R = ByRef> {
    marker: PhantomData<fn() -> R>,
    args: A,
}

/// Bundles `args` with the default [`ByRef`] reuse policy.
#[inline(always)]
pub fn emplace<A>(args: A) -> Params<A> {
    Params::new(args)
}

/// Bundles `args` with an explicit reuse policy.
#[inline(always)]
pub fn emplace_with<R, A>(args: A) -> Params<A, R> {
    Params::new(args)
}

impl<A, R> Params<A, R> {
    #[inline(always)]
    pub fn new(args: A) -> Self {
        Self {
            marker: PhantomData,
            args,
        }
    }

    #[inline(always)]
    pub fn args(&self) -> &A {
        &self.args
    }

    #[inline(always)]
    pub fn into_args(self) -> A {
        self.args
    }
}

impl<T, A, R> Build<T> for Params<A, R>
where T: From<A>,
{
    #[inline]
    fn build(self) -> T {
        T::from(self.args)
    }
}

impl<T, A, R> Build<T> for &'_ Params<A, R>
where R: Reuse<T, A>,
{
    #[inline]
    fn build(self) -> T {
        R::rebuild(&self.args)
    }
}

impl<A: fmt::Debug, R> fmt::Debug for Params<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Params")
            .field("args", &self.args)
            .field("reuse", &std::any::type_name::<R>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Label {
        text: String,
        width: usize,
    }

    impl From<(&str, usize)> for Label {
        fn from((text, width): (&str, usize)) -> Self {
            Label { text: text.to_owned(), width }
        }
    }

    impl<'r> From<&'r (&str, usize)> for Label {
        fn from(&(text, width): &'r (&str, usize)) -> Self {
            Label { text: text.to_owned(), width }
        }
    }

    impl From<String> for Label {
        fn from(text: String) -> Self {
            let width = text.len();
            Label { text, width }
        }
    }

    #[test]
    fn build_once() {
        let label: Label = emplace(("abc", 3usize)).build();
        assert_eq!(label, Label { text: "abc".into(), width: 3 });
    }

    #[test]
    fn reuse_by_ref() {
        let params = emplace(("x", 1usize));
        let a: Label = (&params).build();
        let b: Label = (&params).build();
        assert_eq!(a, b);
        assert_ne!(a.text.as_ptr(), b.text.as_ptr());

        // still usable after reuse
        let c: Label = params.build();
        assert_eq!(c, a);
    }

    #[test]
    fn reuse_cloned() {
        let params = emplace_with::<Cloned, _>(String::from("hello"));
        let a: Label = (&params).build();
        let b: Label = (&params).build();
        assert_eq!(a, b);
        assert_eq!(a.width, 5);
        assert_eq!(params.args(), "hello");
        assert_eq!(params.into_args(), "hello");
    }

    #[test]
    fn debug() {
        let params = emplace_with::<Cloned, _>(7u8);
        let s = format!("{:?}", params);
        assert!(s.starts_with("Params { args: 7, reuse: "));
        assert!(s.contains("Cloned"));
    }
}
