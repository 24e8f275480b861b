//! # Sluice
//!
//! Bridges an external, Redux-style state store into a tree of component
//! scopes. Components read derived values through selector bindings that
//! recompute on every store change but only notify when the selection
//! actually changes.
//!
//! ## Crates
//!
//! - [`sluice_core`]: the [`Store`] contract, [`ReducerStore`], the
//!   subscription propagation tree, [`Signal`]s and [`Scope`]s.
//! - [`sluice_hooks`]: providers ([`provide_store`], [`provide_store_to_app`])
//!   and the hooks that read from them ([`use_selector`], [`use_dispatch`],
//!   [`use_store`], [`use_redux_context`]).
//!
//! ## Quick Example
//!
//! ```
//! use sluice::prelude::*;
//!
//! let store = ReducerStore::shared(|count: &i32, delta: &i32| count + delta, 0);
//! let app = Scope::root();
//! provide_store_to_app::<i32, i32>(&app, ProviderProps::new(store.clone()));
//!
//! let component = app.child();
//! let doubled = use_selector::<i32, i32, _>(&component, |count| count * 2).unwrap();
//! use_dispatch::<i32, i32>(&component).unwrap().dispatch(4).unwrap();
//!
//! assert_eq!(doubled.get(), 8);
//! ```

pub use sluice_core::{
	Context, ContextId, Listener, ListenerHandle, ReadSignal, ReducerStore, Scope, ScopeId,
	SharedStore, Signal, SignalSubscription, Store, StoreError, StoreResult, Subscription,
	SubscriptionId, Unsubscribe, WeakSubscription, create_subscription,
};
pub use sluice_hooks::{
	BindingSettings, BindingState, CheckFrequency, DevModeChecks, DevModeWarning, Dispatch,
	DispatchHook, EqualityFn, HookError, HookResult, ProviderProps, ReduxChannel, ReduxContextHook,
	ReduxContextValue, RefEq, Selected, SelectorHook, SelectorOptions, ShallowEqual, StoreHook,
	create_context_value, create_dispatch_hook, create_redux_context_hook, create_selector_hook,
	create_store_hook, default_channel, dispose_context_value, identity_equality, provide_store,
	provide_store_to_app, ref_equality, shallow_equal, shallow_identity_equal, use_dispatch,
	use_redux_context, use_selector, use_selector_with, use_store, value_equality,
};

/// Store contract, subscription tree, signals and scopes.
pub mod core {
	pub use sluice_core::*;
}

/// Providers, hooks, equality helpers and settings.
pub mod hooks {
	pub use sluice_hooks::*;
}

pub mod prelude {
	// Store and scope tree
	pub use crate::{ReducerStore, Scope, Store};

	// Providers
	pub use crate::{ProviderProps, ReduxChannel, provide_store, provide_store_to_app};

	// Hooks
	pub use crate::{
		Selected, SelectorOptions, use_dispatch, use_redux_context, use_selector,
		use_selector_with, use_store,
	};

	// Equality
	pub use crate::{identity_equality, shallow_equal, value_equality};

	// Errors
	pub use crate::{HookError, HookResult, StoreError};
}
