//! Dispatch hook: use_dispatch

use core::fmt;

use sluice_core::{Scope, SharedStore, StoreResult};

use super::context::resolve;
use crate::context::{ReduxChannel, default_channel};
use crate::error::HookResult;

/// The dispatch function of a store.
///
/// Calls go straight to [`Store::dispatch`](sluice_core::Store::dispatch)
/// with no wrapping.
pub struct Dispatch<S: 'static, A: 'static> {
	store: SharedStore<S, A>,
}

impl<S: 'static, A: 'static> Dispatch<S, A> {
	/// Dispatches `action` and returns it.
	pub fn dispatch(&self, action: A) -> StoreResult<A> {
		self.store.dispatch(action)
	}
}

impl<S: 'static, A: 'static> Clone for Dispatch<S, A> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
		}
	}
}

impl<S: 'static, A: 'static> fmt::Debug for Dispatch<S, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Dispatch").finish_non_exhaustive()
	}
}

/// Returns the dispatch function of the store on the default channel.
///
/// # Errors
///
/// [`HookError::MissingStore`](crate::HookError::MissingStore) when no
/// provider is above `scope`.
///
/// # Example
///
/// ```
/// use sluice_core::{ReducerStore, Scope, Store};
/// use sluice_hooks::{ProviderProps, provide_store, use_dispatch};
///
/// let store = ReducerStore::shared(|count: &i64, delta: &i64| count + delta, 0);
/// let provider = Scope::root().child();
/// provide_store::<i64, i64>(&provider, ProviderProps::new(store.clone()));
///
/// let dispatch = use_dispatch::<i64, i64>(&provider.child()).unwrap();
/// dispatch.dispatch(3).unwrap();
/// assert_eq!(*store.get_state(), 3);
/// ```
pub fn use_dispatch<S, A>(scope: &Scope) -> HookResult<Dispatch<S, A>>
where
	S: 'static,
	A: 'static,
{
	create_dispatch_hook(default_channel()).use_dispatch(scope)
}

/// `use_dispatch` bound to one channel.
pub struct DispatchHook<S: 'static, A: 'static> {
	channel: ReduxChannel<S, A>,
}

/// Creates a dispatch hook reading from `channel`.
pub fn create_dispatch_hook<S, A>(channel: ReduxChannel<S, A>) -> DispatchHook<S, A>
where
	S: 'static,
	A: 'static,
{
	DispatchHook { channel }
}

impl<S: 'static, A: 'static> DispatchHook<S, A> {
	/// Returns the dispatch function on this hook's channel.
	pub fn use_dispatch(&self, scope: &Scope) -> HookResult<Dispatch<S, A>> {
		resolve(scope, &self.channel).map(|context| Dispatch {
			store: context.store,
		})
	}
}

impl<S: 'static, A: 'static> Default for DispatchHook<S, A> {
	fn default() -> Self {
		create_dispatch_hook(default_channel())
	}
}

impl<S: 'static, A: 'static> Clone for DispatchHook<S, A> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<S: 'static, A: 'static> Copy for DispatchHook<S, A> {}

impl<S: 'static, A: 'static> fmt::Debug for DispatchHook<S, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DispatchHook")
			.field("channel", &self.channel.id())
			.finish()
	}
}
