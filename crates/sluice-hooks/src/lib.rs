//! # Sluice Hooks
//!
//! Store providers and the hooks components use to read from them.
//!
//! ## Overview
//!
//! - A **provider** ([`provide_store`], [`provide_store_to_app`]) publishes
//!   a [`ReduxContextValue`] (a store plus the root of a subscription tree)
//!   on a scope.
//! - **Hooks** ([`use_selector`], [`use_dispatch`], [`use_store`],
//!   [`use_redux_context`]) resolve that value from a descendant scope.
//! - Each selector binding attaches a nested subscription below the nearest
//!   binding or provider above it, so parents always recompute before their
//!   children.
//!
//! Several stores can coexist in one scope tree by publishing them on
//! distinct [`ReduxChannel`]s and reading them through the `create_*_hook`
//! factories.
//!
//! ## Example
//!
//! ```
//! use sluice_core::{ReducerStore, Scope, Store};
//! use sluice_hooks::{ProviderProps, provide_store, use_dispatch, use_selector};
//!
//! #[derive(Debug, Clone, Copy)]
//! enum Action {
//!     Increment,
//! }
//!
//! #[derive(Debug, Clone, Default)]
//! struct State {
//!     count: u32,
//!     label: &'static str,
//! }
//!
//! let store = ReducerStore::shared(
//!     |state: &State, action: &Action| match action {
//!         Action::Increment => State { count: state.count + 1, ..state.clone() },
//!     },
//!     State { count: 0, label: "clicks" },
//! );
//!
//! let app = Scope::root();
//! let provider = app.child();
//! provide_store::<State, Action>(&provider, ProviderProps::new(store.clone()));
//!
//! let counter = provider.child();
//! let count = use_selector::<State, Action, _>(&counter, |state| state.count).unwrap();
//! let label = use_selector::<State, Action, _>(&counter, |state| state.label).unwrap();
//! let dispatch = use_dispatch::<State, Action>(&counter).unwrap();
//!
//! dispatch.dispatch(Action::Increment).unwrap();
//!
//! assert_eq!(count.get(), 1);
//! assert_eq!(label.version(), 0);
//!
//! app.dispose();
//! assert_eq!(store.listener_count(), 0);
//! ```

pub mod context;
pub mod dev_mode;
pub mod equality;
pub mod error;
pub mod hooks;
pub mod provider;
pub mod settings;

pub use context::{
	ReduxChannel, ReduxContextValue, create_context_value, default_channel, dispose_context_value,
};
pub use dev_mode::{CheckFrequency, DevModeChecks, DevModeWarning};
pub use equality::{
	RefEq, ShallowEqual, identity_equality, ref_equality, shallow_equal, shallow_identity_equal,
	value_equality,
};
pub use error::{HookError, HookResult};
pub use hooks::{
	BindingState, Dispatch, DispatchHook, EqualityFn, ReduxContextHook, Selected, SelectorHook,
	SelectorOptions, StoreHook, create_dispatch_hook, create_redux_context_hook,
	create_selector_hook, create_store_hook, use_dispatch, use_redux_context, use_selector,
	use_selector_with, use_store,
};
pub use provider::{ProviderProps, provide_store, provide_store_to_app};
pub use settings::BindingSettings;
