//! Qualifier bookkeeping for access paths.
//!
//! Rust has no `const`/`volatile` type qualifiers, but an access path still carries the same
//! information: a `&T` is a read-only place, a `&mut T` a writable place, a [`VolatileRef`] a
//! read-only place that must be accessed with volatile operations, and an owned `T` is a value
//! that can be moved out of. This crate names those qualifiers, lets a path be retargeted at a
//! different type while keeping them ([`Kind::Ref`]), and classifies conversions between paths
//! as implicit or explicit ([`cast_kind`]).

use core::fmt;

mod kind;
pub use self::kind::{Kind, Shared, Exclusive, Volatile, VolatileExclusive, Moved};

mod volatile;
pub use self::volatile::{VolatileRef, VolatileMut};

bitflags::bitflags! {
    /// The qualifiers carried by an access path.
    ///
    /// Qualifier strength is the subset order: `CONST_VOLATILE` is at least as strong as
    /// everything, the empty set is at least as strong as nothing but itself.
    pub struct Qualifiers: u8 {
        const CONST    = 0b01;
        const VOLATILE = 0b10;

        const CONST_VOLATILE = Self::CONST.bits | Self::VOLATILE.bits;
    }
}

impl Qualifiers {
    /// Returns true if a path with these qualifiers can stand in for one with `other` without
    /// discarding anything.
    #[inline]
    pub fn is_at_least(self, other: Qualifiers) -> bool {
        self.contains(other)
    }
}

/// Whether a path names a place or a value that may be moved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A borrowed place; the referent outlives the path.
    Place,

    /// An owned value; using the path consumes it.
    Value,
}

/// How the target type of a conversion relates to the source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Same,

    /// The target is a base the source extends.
    Base,

    /// The target extends the source with the same footprint.
    Derived,

    Unrelated,
}

/// Whether a conversion may happen without the caller opting in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    Implicit,
    Explicit,
}

impl fmt::Display for CastKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CastKind::Implicit => f.write_str("implicit"),
            CastKind::Explicit => f.write_str("explicit"),
        }
    }
}

/// Classifies a conversion from a `source` path to a `target` path.
///
/// A conversion is implicit only if it keeps the category, does not weaken the qualifiers, and
/// lands on the same type or one of its bases. Anything else, including reinterpreting a base as
/// a more-derived type, requires the caller to opt in.
pub fn cast_kind(relation: Relation,
                 target: (Qualifiers, Category),
                 source: (Qualifiers, Category)) -> CastKind
{
    let (target_quals, target_cat) = target;
    let (source_quals, source_cat) = source;

    if target_cat != source_cat || !target_quals.is_at_least(source_quals) {
        return CastKind::Explicit;
    }

    match relation {
        Relation::Same | Relation::Base => CastKind::Implicit,
        Relation::Derived | Relation::Unrelated => CastKind::Explicit,
    }
}

/// Classifies a conversion between two kinds of path.
pub fn cast_kind_between<'a, Target, Source>(relation: Relation) -> CastKind
    where Target: Kind<'a>,
          Source: Kind<'a>,
{
    cast_kind(relation,
              (Target::QUALIFIERS, Target::CATEGORY),
              (Source::QUALIFIERS, Source::CATEGORY))
}
