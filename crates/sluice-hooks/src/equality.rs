//! Equality functions for selector bindings
//!
//! A selector binding only writes its signal when the equality function says
//! the new result differs from the previous one. The default is
//! [`ref_equality`]: shared values (`Rc`, `Arc`, references) compare by
//! pointer and plain scalars by value, so a check never walks a selection.
//! Deeper comparisons are opt-in through [`value_equality`] and
//! [`shallow_equal`].

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

/// Reference equality: the same allocation for shared values, the same
/// value for scalars.
///
/// Implemented only for types whose comparison costs the same regardless of
/// how much data they lead to. Collections and structs have no impl; wrap
/// them in an `Rc` or pass an explicit equality function.
pub trait RefEq {
	/// Returns `true` if both sides are the same reference or scalar.
	fn ref_eq(&self, other: &Self) -> bool;
}

macro_rules! impl_ref_eq_by_value {
	($($ty:ty),* $(,)?) => {
		$(
			impl RefEq for $ty {
				fn ref_eq(&self, other: &Self) -> bool {
					self == other
				}
			}
		)*
	};
}

impl_ref_eq_by_value!(
	(),
	bool,
	char,
	i8,
	i16,
	i32,
	i64,
	i128,
	isize,
	u8,
	u16,
	u32,
	u64,
	u128,
	usize,
	f32,
	f64,
);

impl<T: ?Sized> RefEq for Rc<T> {
	fn ref_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(self, other)
	}
}

impl<T: ?Sized> RefEq for Arc<T> {
	fn ref_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(self, other)
	}
}

impl<T: ?Sized> RefEq for &T {
	fn ref_eq(&self, other: &Self) -> bool {
		core::ptr::eq(*self, *other)
	}
}

impl<T: RefEq> RefEq for Option<T> {
	fn ref_eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Some(a), Some(b)) => a.ref_eq(b),
			(None, None) => true,
			_ => false,
		}
	}
}

/// Compares with [`RefEq`]. This is the default for selector bindings.
pub fn ref_equality<T: RefEq + ?Sized>(a: &T, b: &T) -> bool {
	a.ref_eq(b)
}

/// Compares by value with [`PartialEq`].
///
/// The cost grows with the size of the selection; prefer returning shared
/// values and keeping the default.
pub fn value_equality<T: PartialEq + ?Sized>(a: &T, b: &T) -> bool {
	a == b
}

/// Compares shared values by pointer.
///
/// Useful when a selector returns an `Rc` taken from the state: the result
/// is "unchanged" exactly when the state still holds the same allocation.
pub fn identity_equality<T: ?Sized>(a: &Rc<T>, b: &Rc<T>) -> bool {
	Rc::ptr_eq(a, b)
}

/// One-level comparison of collections.
///
/// Two collections are shallowly equal when they have the same length and
/// the same entries (same keys for maps), each entry compared with
/// [`PartialEq`]. Entries that are `Rc` can be compared by pointer with
/// [`shallow_identity_equal`] instead.
pub trait ShallowEqual {
	/// Returns `true` if both collections hold equal entries.
	fn shallow_equal(&self, other: &Self) -> bool;
}

impl<T: PartialEq> ShallowEqual for [T] {
	fn shallow_equal(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a == b)
	}
}

impl<T: PartialEq> ShallowEqual for Vec<T> {
	fn shallow_equal(&self, other: &Self) -> bool {
		self.as_slice().shallow_equal(other.as_slice())
	}
}

impl<K, V, H> ShallowEqual for HashMap<K, V, H>
where
	K: Eq + Hash,
	V: PartialEq,
	H: BuildHasher,
{
	fn shallow_equal(&self, other: &Self) -> bool {
		self.len() == other.len()
			&& self
				.iter()
				.all(|(key, value)| other.get(key).is_some_and(|other| value == other))
	}
}

impl<K: Ord, V: PartialEq> ShallowEqual for BTreeMap<K, V> {
	fn shallow_equal(&self, other: &Self) -> bool {
		self.len() == other.len()
			&& self
				.iter()
				.all(|(key, value)| other.get(key).is_some_and(|other| value == other))
	}
}

/// Free-function form of [`ShallowEqual::shallow_equal`], usable directly as
/// an equality function.
pub fn shallow_equal<C: ShallowEqual + ?Sized>(a: &C, b: &C) -> bool {
	a.shallow_equal(b)
}

/// Compares two sequences of shared values element by element by pointer.
pub fn shallow_identity_equal<T: ?Sized>(a: &[Rc<T>], b: &[Rc<T>]) -> bool {
	a.len() == b.len() && a.iter().zip(b).all(|(a, b)| Rc::ptr_eq(a, b))
}
