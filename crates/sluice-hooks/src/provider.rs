//! Store providers
//!
//! A provider publishes a [`ReduxContextValue`] on a scope so every
//! descendant scope can resolve it.
//!
//! - [`provide_store`] mounts the provider on a component scope. Disposing
//!   that scope unsubscribes the root subscription.
//! - [`provide_store_to_app`] publishes on the application scope. The value
//!   lives until the application scope releases it.

use core::fmt;

use sluice_core::{Scope, SharedStore};

use crate::context::{
	ReduxChannel, ReduxContextValue, create_context_value, default_channel, dispose_context_value,
};
use crate::settings::BindingSettings;

/// Arguments to a store provider.
pub struct ProviderProps<S: 'static, A: 'static> {
	/// Store to publish.
	pub store: SharedStore<S, A>,
	/// Alternate channel; the default channel when `None`.
	pub context: Option<ReduxChannel<S, A>>,
	/// Settings inherited by bindings below the provider.
	pub settings: BindingSettings,
}

impl<S: 'static, A: 'static> ProviderProps<S, A> {
	/// Props for `store` on the default channel with default settings.
	pub fn new(store: SharedStore<S, A>) -> Self {
		Self {
			store,
			context: None,
			settings: BindingSettings::default(),
		}
	}

	/// Publishes on `channel` instead of the default channel.
	pub fn with_context(mut self, channel: ReduxChannel<S, A>) -> Self {
		self.context = Some(channel);
		self
	}

	/// Replaces the settings.
	pub fn with_settings(mut self, settings: BindingSettings) -> Self {
		self.settings = settings;
		self
	}

	/// The channel these props publish on.
	pub fn channel(&self) -> ReduxChannel<S, A> {
		self.context.unwrap_or_else(default_channel)
	}
}

impl<S: 'static, A: 'static> fmt::Debug for ProviderProps<S, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProviderProps")
			.field("channel", &self.channel().id())
			.field("settings", &self.settings)
			.finish_non_exhaustive()
	}
}

/// Publishes a store on `scope` for its descendants.
///
/// The root subscription is unsubscribed when `scope` is disposed.
///
/// # Example
///
/// ```
/// use sluice_core::{ReducerStore, Scope};
/// use sluice_hooks::{ProviderProps, provide_store};
///
/// let store = ReducerStore::shared(|count: &u32, delta: &u32| count + delta, 0);
/// let app = Scope::root();
/// let provider = app.child();
///
/// let value = provide_store(&provider, ProviderProps::new(store));
/// assert!(value.subscription.is_subscribed());
///
/// provider.dispose();
/// assert!(!value.subscription.is_subscribed());
/// ```
pub fn provide_store<S, A>(scope: &Scope, props: ProviderProps<S, A>) -> ReduxContextValue<S, A>
where
	S: 'static,
	A: 'static,
{
	let channel = props.channel();
	let value = create_context_value(props.store, props.settings);
	scope.provide(&channel, value.clone());

	scope.on_dispose({
		let value = value.clone();
		move || {
			dispose_context_value(&value);
			tracing::debug!(
				channel = %channel.id(),
				subscription = %value.subscription.id(),
				"store provider disposed"
			);
		}
	});

	tracing::debug!(
		scope = %scope.id(),
		channel = %channel.id(),
		subscription = %value.subscription.id(),
		"store provided"
	);
	value
}

/// Publishes a store on the application scope.
///
/// No disposal hook is registered; the root subscription stops when the
/// application scope drops its provided values.
pub fn provide_store_to_app<S, A>(
	app: &Scope,
	props: ProviderProps<S, A>,
) -> ReduxContextValue<S, A>
where
	S: 'static,
	A: 'static,
{
	let channel = props.channel();
	let value = create_context_value(props.store, props.settings);
	app.provide(&channel, value.clone());

	tracing::debug!(
		scope = %app.id(),
		channel = %channel.id(),
		subscription = %value.subscription.id(),
		"store provided to app"
	);
	value
}
