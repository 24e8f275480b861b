//! Hooks for reading the store from a component scope
//!
//! Every hook resolves the nearest [`ReduxContextValue`] on its channel and
//! returns [`HookError::MissingStore`] when none is provided.
//!
//! | Hook | Returns |
//! |------|---------|
//! | [`use_selector`] | a [`Selected`] value kept in sync with the store |
//! | [`use_dispatch`] | the store's dispatch as a [`Dispatch`] |
//! | [`use_store`] | the store itself |
//! | [`use_redux_context`] | the whole context value |
//!
//! Each hook has a channel-bound form created by a `create_*_hook`
//! factory, for components that read an alternate store.
//!
//! [`ReduxContextValue`]: crate::ReduxContextValue
//! [`HookError::MissingStore`]: crate::HookError::MissingStore

mod context;
mod dispatch;
mod selector;
mod store;

pub use context::{ReduxContextHook, create_redux_context_hook, use_redux_context};
pub use dispatch::{Dispatch, DispatchHook, create_dispatch_hook, use_dispatch};
pub use selector::{
	BindingState, EqualityFn, Selected, SelectorHook, SelectorOptions, create_selector_hook,
	use_selector, use_selector_with,
};
pub use store::{StoreHook, create_store_hook, use_store};
