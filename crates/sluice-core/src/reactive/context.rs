//! Context identifiers
//!
//! A [`Context`] is a typed key used with [`Scope::provide`] and
//! [`Scope::inject`]. Two contexts created with [`Context::new`] never
//! collide, even when they carry the same value type, which lets several
//! independent stores coexist in one scope tree.
//!
//! [`Scope::provide`]: crate::Scope::provide
//! [`Scope::inject`]: crate::Scope::inject

use core::fmt;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Unique identifier of a context channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(usize);

impl ContextId {
	/// Id reserved for [`Context::default_channel`].
	pub const DEFAULT: Self = Self(0);

	fn next() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(1);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}

	/// Raw numeric value.
	pub fn as_usize(self) -> usize {
		self.0
	}
}

impl fmt::Display for ContextId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if *self == Self::DEFAULT {
			f.write_str("context#default")
		} else {
			write!(f, "context#{}", self.0)
		}
	}
}

/// A typed provide/inject key.
///
/// # Example
///
/// ```
/// use sluice_core::{Context, Scope};
///
/// let theme: Context<String> = Context::new();
/// let app = Scope::root();
/// app.provide(&theme, "dark".to_string());
///
/// let child = app.child();
/// assert_eq!(child.inject(&theme), Some("dark".to_string()));
/// ```
pub struct Context<T> {
	id: ContextId,
	_marker: PhantomData<fn() -> T>,
}

impl<T> Context<T> {
	/// Creates a context with a fresh id.
	pub fn new() -> Self {
		Self {
			id: ContextId::next(),
			_marker: PhantomData,
		}
	}

	/// The shared default channel for `T`.
	///
	/// Every call returns the same key, so it can be used from a `const` or
	/// `static` without coordination.
	pub const fn default_channel() -> Self {
		Self {
			id: ContextId::DEFAULT,
			_marker: PhantomData,
		}
	}

	/// Returns the context id.
	pub fn id(&self) -> ContextId {
		self.id
	}
}

/// The default value of a context key is its [default channel].
///
/// [default channel]: Context::default_channel
impl<T> Default for Context<T> {
	fn default() -> Self {
		Self::default_channel()
	}
}

impl<T> Clone for Context<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Context<T> {}

impl<T> PartialEq for Context<T> {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl<T> Eq for Context<T> {}

impl<T> fmt::Debug for Context<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Context")
			.field("id", &self.id)
			.field("type", &core::any::type_name::<T>())
			.finish()
	}
}
