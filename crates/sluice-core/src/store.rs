//! Store - the external state container contract
//!
//! A store owns the application state. This crate never mutates it directly:
//! state is read through [`Store::get_state`], changed only through
//! [`Store::dispatch`], and observed through [`Store::subscribe`].
//!
//! [`ReducerStore`] is a complete implementation driven by a reducer
//! function, used by the test suites and by applications that do not bring
//! their own container.

use core::cell::RefCell;
use core::fmt;

extern crate alloc;
use alloc::boxed::Box;
use alloc::rc::Rc;

use crate::error::StoreResult;

pub mod reducer;

pub use reducer::ReducerStore;

/// A change callback registered with a store or a subscription.
pub type Listener = Rc<dyn Fn()>;

/// A store shared between a provider and every hook below it.
pub type SharedStore<S, A> = Rc<dyn Store<State = S, Action = A>>;

/// The state container observed by the bindings.
///
/// Implementations must call every listener registered at the start of a
/// dispatch after the new state is in place, synchronously, on the calling
/// thread.
pub trait Store {
	/// The root state type.
	type State: 'static;
	/// The action type accepted by [`dispatch`](Store::dispatch).
	type Action: 'static;

	/// Returns a snapshot of the current state.
	fn get_state(&self) -> Rc<Self::State>;

	/// Applies an action and notifies subscribers. Returns the action that was
	/// dispatched.
	fn dispatch(&self, action: Self::Action) -> StoreResult<Self::Action>;

	/// Registers a change listener.
	fn subscribe(&self, listener: Listener) -> Unsubscribe;
}

/// Handle returned by [`Store::subscribe`] that removes the listener.
///
/// Calling [`unsubscribe`](Unsubscribe::unsubscribe) more than once is a
/// no-op. Dropping the handle without calling it leaves the listener
/// registered.
pub struct Unsubscribe {
	release: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Unsubscribe {
	/// Wraps the function that removes a listener.
	pub fn new<F>(release: F) -> Self
	where
		F: FnOnce() + 'static,
	{
		Self {
			release: RefCell::new(Some(Box::new(release))),
		}
	}

	/// A handle that has nothing to release.
	pub fn noop() -> Self {
		Self {
			release: RefCell::new(None),
		}
	}

	/// Removes the listener. Subsequent calls do nothing.
	pub fn unsubscribe(&self) {
		// Take the closure out first so the borrow is released before it runs.
		let release = self.release.borrow_mut().take();
		if let Some(release) = release {
			release();
		}
	}

	/// Whether the listener is still registered through this handle.
	pub fn is_active(&self) -> bool {
		self.release.borrow().is_some()
	}
}

impl fmt::Debug for Unsubscribe {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Unsubscribe")
			.field("active", &self.is_active())
			.finish()
	}
}
