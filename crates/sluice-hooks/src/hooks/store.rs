//! Store hook: use_store

use core::fmt;

use sluice_core::{Scope, SharedStore};

use super::context::resolve;
use crate::context::{ReduxChannel, default_channel};
use crate::error::HookResult;

/// Returns the store published on the default channel.
///
/// # Errors
///
/// [`HookError::MissingStore`](crate::HookError::MissingStore) when no
/// provider is above `scope`.
pub fn use_store<S, A>(scope: &Scope) -> HookResult<SharedStore<S, A>>
where
	S: 'static,
	A: 'static,
{
	create_store_hook(default_channel()).use_store(scope)
}

/// `use_store` bound to one channel.
pub struct StoreHook<S: 'static, A: 'static> {
	channel: ReduxChannel<S, A>,
}

/// Creates a store hook reading from `channel`.
pub fn create_store_hook<S, A>(channel: ReduxChannel<S, A>) -> StoreHook<S, A>
where
	S: 'static,
	A: 'static,
{
	StoreHook { channel }
}

impl<S: 'static, A: 'static> StoreHook<S, A> {
	/// Returns the store on this hook's channel.
	pub fn use_store(&self, scope: &Scope) -> HookResult<SharedStore<S, A>> {
		resolve(scope, &self.channel).map(|context| context.store)
	}
}

impl<S: 'static, A: 'static> Default for StoreHook<S, A> {
	fn default() -> Self {
		create_store_hook(default_channel())
	}
}

impl<S: 'static, A: 'static> Clone for StoreHook<S, A> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<S: 'static, A: 'static> Copy for StoreHook<S, A> {}

impl<S: 'static, A: 'static> fmt::Debug for StoreHook<S, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StoreHook")
			.field("channel", &self.channel.id())
			.finish()
	}
}
