//! Context value shared by a provider and its descendants
//!
//! A [`ReduxContextValue`] pairs one store with the subscription that
//! descendants attach to. At a provider it holds the root subscription of a
//! new tree; below a selector binding it holds that binding's nested
//! subscription so deeper bindings become its children.

use core::fmt;

use sluice_core::{Context, SharedStore, Subscription};

use crate::settings::BindingSettings;

/// The value published on a [`ReduxChannel`].
pub struct ReduxContextValue<S: 'static, A: 'static> {
	/// Store observed by the bindings.
	pub store: SharedStore<S, A>,
	/// Subscription new bindings attach below.
	pub subscription: Subscription,
	/// Settings inherited by bindings.
	pub settings: BindingSettings,
}

impl<S: 'static, A: 'static> Clone for ReduxContextValue<S, A> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			subscription: self.subscription.clone(),
			settings: self.settings,
		}
	}
}

impl<S: 'static, A: 'static> fmt::Debug for ReduxContextValue<S, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReduxContextValue")
			.field("subscription", &self.subscription)
			.field("settings", &self.settings)
			.finish_non_exhaustive()
	}
}

/// Channel key a provider publishes on and hooks read from.
///
/// `ReduxChannel::default()` is the well-known default channel; allocate an
/// alternate one with `ReduxChannel::new()` to isolate an independent store.
pub type ReduxChannel<S, A> = Context<ReduxContextValue<S, A>>;

/// The default channel for a given state and action type.
pub const fn default_channel<S: 'static, A: 'static>() -> ReduxChannel<S, A> {
	Context::default_channel()
}

/// Creates a context value whose root subscription is already listening.
///
/// The root subscription forwards every store change to its own
/// descendants.
pub fn create_context_value<S, A>(
	store: SharedStore<S, A>,
	settings: BindingSettings,
) -> ReduxContextValue<S, A>
where
	S: 'static,
	A: 'static,
{
	let subscription = Subscription::root(store.clone());
	let root = subscription.downgrade();
	subscription.set_on_state_change(move || {
		if let Some(root) = root.upgrade() {
			root.notify_nested_subs();
		}
	});
	subscription.try_subscribe();

	ReduxContextValue {
		store,
		subscription,
		settings,
	}
}

/// Stops a context value's subscription and detaches its change callback.
///
/// Calling it more than once is harmless.
pub fn dispose_context_value<S: 'static, A: 'static>(value: &ReduxContextValue<S, A>) {
	value.subscription.try_unsubscribe();
	value.subscription.clear_on_state_change();
}
