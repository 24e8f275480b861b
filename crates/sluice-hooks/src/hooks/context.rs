//! Context hook: use_redux_context

use core::fmt;

use sluice_core::Scope;

use crate::context::{ReduxChannel, ReduxContextValue, default_channel};
use crate::error::{HookError, HookResult};

pub(crate) fn resolve<S, A>(
	scope: &Scope,
	channel: &ReduxChannel<S, A>,
) -> HookResult<ReduxContextValue<S, A>>
where
	S: 'static,
	A: 'static,
{
	scope.inject(channel).ok_or_else(|| {
		tracing::debug!(scope = %scope.id(), channel = %channel.id(), "no store provider in scope");
		HookError::MissingStore {
			channel: channel.id(),
		}
	})
}

/// Returns the context value on the default channel.
///
/// # Errors
///
/// [`HookError::MissingStore`] when no provider is above `scope`.
pub fn use_redux_context<S, A>(scope: &Scope) -> HookResult<ReduxContextValue<S, A>>
where
	S: 'static,
	A: 'static,
{
	resolve(scope, &default_channel())
}

/// `use_redux_context` bound to one channel.
pub struct ReduxContextHook<S: 'static, A: 'static> {
	channel: ReduxChannel<S, A>,
}

/// Creates a context hook reading from `channel`.
pub fn create_redux_context_hook<S, A>(channel: ReduxChannel<S, A>) -> ReduxContextHook<S, A>
where
	S: 'static,
	A: 'static,
{
	ReduxContextHook { channel }
}

impl<S: 'static, A: 'static> ReduxContextHook<S, A> {
	/// The channel this hook reads from.
	pub fn channel(&self) -> ReduxChannel<S, A> {
		self.channel
	}

	/// Returns the context value on this hook's channel.
	pub fn use_redux_context(&self, scope: &Scope) -> HookResult<ReduxContextValue<S, A>> {
		resolve(scope, &self.channel)
	}
}

impl<S: 'static, A: 'static> Default for ReduxContextHook<S, A> {
	fn default() -> Self {
		create_redux_context_hook(default_channel())
	}
}

impl<S: 'static, A: 'static> Clone for ReduxContextHook<S, A> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<S: 'static, A: 'static> Copy for ReduxContextHook<S, A> {}

impl<S: 'static, A: 'static> fmt::Debug for ReduxContextHook<S, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReduxContextHook")
			.field("channel", &self.channel.id())
			.finish()
	}
}
