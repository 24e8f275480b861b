//! Signal - observable cell for derived values
//!
//! A [`Signal`] holds the latest value produced by a selector binding and
//! notifies subscribers whenever it is written. It performs no equality
//! check of its own: callers decide whether a write is warranted.
//!
//! Subscribers are held weakly. The [`SignalSubscription`] guard returned by
//! [`Signal::subscribe`] owns the callback, and dropping the guard stops
//! delivery.

use core::cell::{Cell, RefCell};
use core::fmt;

extern crate alloc;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;

type Callback<T> = Rc<dyn Fn(&T)>;
type WeakCallback<T> = Weak<dyn Fn(&T)>;

struct SignalInner<T> {
	value: RefCell<T>,
	version: Cell<u64>,
	subscribers: RefCell<Vec<WeakCallback<T>>>,
}

/// A readable and writable observable cell.
///
/// Cloning a `Signal` yields another handle to the same cell.
///
/// # Example
///
/// ```
/// use sluice_core::Signal;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let count = Signal::new(0);
/// let seen = Rc::new(Cell::new(0));
/// let _guard = count.subscribe({
///     let seen = seen.clone();
///     move |value: &i32| seen.set(*value)
/// });
///
/// count.set(3);
/// assert_eq!(seen.get(), 3);
/// assert_eq!(count.version(), 1);
/// ```
pub struct Signal<T> {
	inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: 'static> Signal<T> {
	/// Creates a signal holding `value` at version 0.
	pub fn new(value: T) -> Self {
		Self {
			inner: Rc::new(SignalInner {
				value: RefCell::new(value),
				version: Cell::new(0),
				subscribers: RefCell::new(Vec::new()),
			}),
		}
	}

	/// Reads the value by reference.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.inner.value.borrow())
	}

	/// Number of writes since creation.
	pub fn version(&self) -> u64 {
		self.inner.version.get()
	}

	/// Number of live subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.inner
			.subscribers
			.borrow()
			.iter()
			.filter(|weak| weak.strong_count() > 0)
			.count()
	}

	/// Registers a callback invoked with the new value after every write.
	pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> SignalSubscription {
		let strong: Callback<T> = Rc::new(callback);
		self.inner
			.subscribers
			.borrow_mut()
			.push(Rc::downgrade(&strong));
		SignalSubscription {
			_guard: Rc::new(strong),
		}
	}

	/// Returns a handle that can read but not write.
	pub fn read_only(&self) -> ReadSignal<T> {
		ReadSignal {
			signal: self.clone(),
		}
	}
}

impl<T: Clone + 'static> Signal<T> {
	/// Returns a clone of the current value.
	pub fn get(&self) -> T {
		self.inner.value.borrow().clone()
	}

	/// Replaces the value and notifies subscribers.
	pub fn set(&self, value: T) {
		*self.inner.value.borrow_mut() = value;
		self.bump_and_notify();
	}

	/// Mutates the value in place and notifies subscribers.
	pub fn update(&self, f: impl FnOnce(&mut T)) {
		f(&mut self.inner.value.borrow_mut());
		self.bump_and_notify();
	}

	fn bump_and_notify(&self) {
		self.inner.version.set(self.inner.version.get() + 1);

		let callbacks: Vec<Callback<T>> = {
			let mut subscribers = self.inner.subscribers.borrow_mut();
			subscribers.retain(|weak| weak.strong_count() > 0);
			subscribers.iter().filter_map(Weak::upgrade).collect()
		};
		if callbacks.is_empty() {
			return;
		}

		// Callbacks see a copy so they may write to the signal themselves.
		let value = self.get();
		for callback in callbacks {
			callback(&value);
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("value", &self.inner.value.borrow())
			.field("version", &self.inner.version.get())
			.finish()
	}
}

/// Read-only view of a [`Signal`].
pub struct ReadSignal<T> {
	signal: Signal<T>,
}

impl<T> Clone for ReadSignal<T> {
	fn clone(&self) -> Self {
		Self {
			signal: self.signal.clone(),
		}
	}
}

impl<T: 'static> ReadSignal<T> {
	/// Reads the value by reference.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		self.signal.with(f)
	}

	/// Number of writes to the underlying signal.
	pub fn version(&self) -> u64 {
		self.signal.version()
	}

	/// Registers a change callback.
	pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> SignalSubscription {
		self.signal.subscribe(callback)
	}
}

impl<T: Clone + 'static> ReadSignal<T> {
	/// Returns a clone of the current value.
	pub fn get(&self) -> T {
		self.signal.get()
	}
}

impl<T: fmt::Debug> fmt::Debug for ReadSignal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ReadSignal").field(&self.signal).finish()
	}
}

/// Guard that keeps a signal callback registered.
pub struct SignalSubscription {
	_guard: Rc<dyn core::any::Any>,
}

impl fmt::Debug for SignalSubscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SignalSubscription").finish_non_exhaustive()
	}
}
