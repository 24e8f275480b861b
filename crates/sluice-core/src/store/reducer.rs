//! Reducer-driven store
//!
//! [`ReducerStore`] follows Redux `createStore` semantics:
//!
//! - `dispatch` runs the reducer against the current state and replaces the
//!   state with the result (always a fresh `Rc`, so the root state changes
//!   identity on every dispatch).
//! - Listeners are snapshotted just before they are called. Subscribing or
//!   unsubscribing from inside a listener takes effect on the next dispatch.
//! - A listener may dispatch; the reducer may not.

use core::cell::{Cell, RefCell};
use core::fmt;

extern crate alloc;
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;

use super::{Listener, Store, Unsubscribe};
use crate::error::{StoreError, StoreResult};

type Reducer<S, A> = Box<dyn Fn(&S, &A) -> S>;

#[derive(Default)]
struct ListenerRegistry {
	next_id: u64,
	entries: Vec<(u64, Listener)>,
}

/// A store whose state transitions are computed by a reducer.
///
/// # Example
///
/// ```
/// use sluice_core::{ReducerStore, Store};
///
/// #[derive(Debug)]
/// enum Action {
///     Increment,
///     Add(i32),
/// }
///
/// let store = ReducerStore::new(
///     |count: &i32, action: &Action| match action {
///         Action::Increment => count + 1,
///         Action::Add(n) => count + n,
///     },
///     0,
/// );
///
/// store.dispatch(Action::Increment).unwrap();
/// store.dispatch(Action::Add(41)).unwrap();
/// assert_eq!(*store.get_state(), 42);
/// ```
pub struct ReducerStore<S: 'static, A: 'static> {
	state: RefCell<Rc<S>>,
	reducer: Reducer<S, A>,
	listeners: Rc<RefCell<ListenerRegistry>>,
	is_dispatching: Cell<bool>,
}

impl<S: 'static, A: 'static> ReducerStore<S, A> {
	/// Create a store with the given reducer and initial state.
	pub fn new<R>(reducer: R, initial: S) -> Self
	where
		R: Fn(&S, &A) -> S + 'static,
	{
		Self {
			state: RefCell::new(Rc::new(initial)),
			reducer: Box::new(reducer),
			listeners: Rc::new(RefCell::new(ListenerRegistry::default())),
			is_dispatching: Cell::new(false),
		}
	}

	/// Create a store already wrapped for sharing with providers.
	pub fn shared<R>(reducer: R, initial: S) -> Rc<Self>
	where
		R: Fn(&S, &A) -> S + 'static,
	{
		Rc::new(Self::new(reducer, initial))
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.listeners.borrow().entries.len()
	}
}

/// Clears the dispatching flag even if the reducer panics.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

impl<S: 'static, A: 'static> Store for ReducerStore<S, A> {
	type State = S;
	type Action = A;

	fn get_state(&self) -> Rc<S> {
		self.state.borrow().clone()
	}

	fn dispatch(&self, action: A) -> StoreResult<A> {
		if self.is_dispatching.get() {
			return Err(StoreError::ReducerDispatch);
		}

		{
			self.is_dispatching.set(true);
			let _guard = DispatchGuard(&self.is_dispatching);
			let current = self.get_state();
			let next = (self.reducer)(&current, &action);
			*self.state.borrow_mut() = Rc::new(next);
		}

		let snapshot: Vec<Listener> = self
			.listeners
			.borrow()
			.entries
			.iter()
			.map(|(_, listener)| listener.clone())
			.collect();

		tracing::trace!(listeners = snapshot.len(), "store dispatched action");

		for listener in snapshot {
			listener();
		}

		Ok(action)
	}

	fn subscribe(&self, listener: Listener) -> Unsubscribe {
		let id = {
			let mut registry = self.listeners.borrow_mut();
			let id = registry.next_id;
			registry.next_id += 1;
			registry.entries.push((id, listener));
			id
		};

		let registry: Weak<RefCell<ListenerRegistry>> = Rc::downgrade(&self.listeners);
		Unsubscribe::new(move || {
			if let Some(registry) = registry.upgrade() {
				let removed = {
					let mut registry = registry.borrow_mut();
					registry
						.entries
						.iter()
						.position(|(entry_id, _)| *entry_id == id)
						.map(|index| registry.entries.remove(index))
				};
				// The listener may own handles whose drop touches this registry.
				drop(removed);
			}
		})
	}
}

impl<S: fmt::Debug + 'static, A: 'static> fmt::Debug for ReducerStore<S, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReducerStore")
			.field("state", &self.state.borrow())
			.field("listeners", &self.listener_count())
			.field("is_dispatching", &self.is_dispatching.get())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn counter() -> Rc<ReducerStore<i32, i32>> {
		ReducerStore::shared(|count: &i32, delta: &i32| count + delta, 0)
	}

	#[rstest]
	fn test_dispatch_replaces_state(counter: Rc<ReducerStore<i32, i32>>) {
		let before = counter.get_state();
		let returned = counter.dispatch(3).unwrap();

		assert_eq!(returned, 3);
		assert_eq!(*counter.get_state(), 3);
		assert!(!Rc::ptr_eq(&before, &counter.get_state()));
	}

	#[rstest]
	fn test_listeners_run_in_subscription_order(counter: Rc<ReducerStore<i32, i32>>) {
		let log = Rc::new(RefCell::new(Vec::new()));
		let _a = counter.subscribe({
			let log = log.clone();
			Rc::new(move || log.borrow_mut().push('a'))
		});
		let _b = counter.subscribe({
			let log = log.clone();
			Rc::new(move || log.borrow_mut().push('b'))
		});

		counter.dispatch(1).unwrap();

		assert_eq!(*log.borrow(), vec!['a', 'b']);
	}

	#[rstest]
	fn test_unsubscribe_stops_notifications(counter: Rc<ReducerStore<i32, i32>>) {
		let calls = Rc::new(Cell::new(0));
		let unsubscribe = counter.subscribe({
			let calls = calls.clone();
			Rc::new(move || calls.set(calls.get() + 1))
		});

		counter.dispatch(1).unwrap();
		unsubscribe.unsubscribe();
		counter.dispatch(1).unwrap();

		assert_eq!(calls.get(), 1);
		assert_eq!(counter.listener_count(), 0);
	}

	#[rstest]
	fn test_unsubscribe_during_dispatch_keeps_snapshot(counter: Rc<ReducerStore<i32, i32>>) {
		let second_calls = Rc::new(Cell::new(0));
		let second: Rc<RefCell<Option<Unsubscribe>>> = Rc::new(RefCell::new(None));

		let _first = counter.subscribe({
			let second = second.clone();
			Rc::new(move || {
				if let Some(handle) = second.borrow().as_ref() {
					handle.unsubscribe();
				}
			})
		});
		*second.borrow_mut() = Some(counter.subscribe({
			let second_calls = second_calls.clone();
			Rc::new(move || second_calls.set(second_calls.get() + 1))
		}));

		// Snapshot taken before the first listener removed the second one.
		counter.dispatch(1).unwrap();
		assert_eq!(second_calls.get(), 1);

		counter.dispatch(1).unwrap();
		assert_eq!(second_calls.get(), 1);
	}

	#[rstest]
	fn test_reducer_may_not_dispatch() {
		let slot: Rc<RefCell<Option<Rc<ReducerStore<i32, i32>>>>> = Rc::new(RefCell::new(None));
		let outcome = Rc::new(RefCell::new(None));
		let store = ReducerStore::shared(
			{
				let slot = slot.clone();
				let outcome = outcome.clone();
				move |count: &i32, delta: &i32| {
					if let Some(store) = slot.borrow().as_ref() {
						*outcome.borrow_mut() = Some(store.dispatch(0));
					}
					count + delta
				}
			},
			0,
		);
		*slot.borrow_mut() = Some(store.clone());

		store.dispatch(1).unwrap();

		assert_eq!(*outcome.borrow(), Some(Err(StoreError::ReducerDispatch)));
		assert_eq!(*store.get_state(), 1);
		// Break the cycle between the store and its reducer.
		slot.borrow_mut().take();
	}

	#[rstest]
	fn test_listener_may_dispatch(counter: Rc<ReducerStore<i32, i32>>) {
		let _bounce = counter.subscribe({
			let store = Rc::downgrade(&counter);
			Rc::new(move || {
				if let Some(store) = store.upgrade() {
					if *store.get_state() == 1 {
						store.dispatch(10).unwrap();
					}
				}
			})
		});

		counter.dispatch(1).unwrap();

		assert_eq!(*counter.get_state(), 11);
	}
}
