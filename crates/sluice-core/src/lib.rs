//! # Sluice Core
//!
//! Building blocks shared by every sluice binding:
//!
//! - [`store`]: the contract an external state container must satisfy
//!   ([`Store`]) plus [`ReducerStore`], a reference implementation with
//!   Redux `createStore` semantics.
//! - [`reactive`]: the subscription propagation tree ([`Subscription`]), the
//!   observable value cell handed to rendering code ([`Signal`]), and the
//!   component scope stand-in ([`Scope`]) that carries provide/inject and
//!   disposal.
//!
//! ## Architecture
//!
//! A change flows through the crate in one direction:
//!
//! 1. `Store::dispatch` runs the reducer and calls every store listener.
//! 2. The root [`Subscription`] of a tree is one of those listeners; it fans
//!    the notification out to its own listeners and then to its children,
//!    level by level.
//! 3. Listeners typically recompute a derived value and write it into a
//!    [`Signal`], which in turn notifies whoever renders it.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); none of the handles
//! are `Send`.
//!
//! ## Example
//!
//! ```
//! use sluice_core::{ReducerStore, Store, Subscription};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let store = Rc::new(ReducerStore::new(|count: &i32, delta: &i32| count + delta, 0));
//! let root = Subscription::root(store.clone());
//! root.set_on_state_change({
//!     let root = root.downgrade();
//!     move || {
//!         if let Some(root) = root.upgrade() {
//!             root.notify_nested_subs();
//!         }
//!     }
//! });
//! root.try_subscribe();
//!
//! let seen = Rc::new(Cell::new(0));
//! let handle = root.add_nested_sub({
//!     let seen = seen.clone();
//!     let store = store.clone();
//!     Rc::new(move || seen.set(*store.get_state()))
//! });
//!
//! store.dispatch(5).unwrap();
//! assert_eq!(seen.get(), 5);
//! handle.unsubscribe();
//! ```

pub mod error;
pub mod reactive;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use reactive::{
	Context, ContextId, ListenerHandle, ReadSignal, Scope, ScopeId, Signal,
	SignalSubscription, Subscription, SubscriptionId, WeakSubscription, create_subscription,
};
pub use store::{Listener, ReducerStore, SharedStore, Store, Unsubscribe};
