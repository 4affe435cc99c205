//! Single-value slots that know when they've been moved out of.
//!
//! A [`Slot`] holds at most one value. Moving the value out tombstones the slot, and a
//! tombstoned slot drops nothing when it goes out of scope, so each value is constructed once and
//! dropped once no matter how often it changes hands:
//!
//! ```
//! use tombstone::Slot;
//!
//! let mut a = Slot::new(String::from("payload"));
//! let b = Slot::take_from(&mut a);
//!
//! assert!(!a.is_valid());
//! assert_eq!(*b, "payload");
//! ```
//!
//! The validity flag can live inside the slot ([`Flag`]) or in a [`Table`] shared by many slots.
//! Values can be built in place from bundled constructor arguments ([`emplace`]), viewed through
//! any kind of access path ([`Forward`]), and cast to and from same-footprint types
//! ([`Extends`]).

pub mod validity;
pub use self::validity::{Validity, Flag, Table, Entry, TableFull};

pub mod emplace;
pub use self::emplace::{emplace, emplace_with, Build, Params, Reuse, ByRef, Cloned};

pub mod drain;
pub use self::drain::{Drain, Bitwise, Disabled};

pub mod cast;
pub use self::cast::Extends;

mod access;
pub use self::access::{Forward, Path};

mod slot;
pub use self::slot::Slot;
