//! Selector hook: use_selector
//!
//! A selector binding derives a value from the store state and keeps it in
//! a [`Signal`] that changes only when the derived value changes.
//!
//! ## Lifecycle
//!
//! ```text
//! Computing ──▶ Subscribed ──▶ Recomputing ──▶ Subscribed ──▶ … ──▶ Unsubscribed
//! ```
//!
//! 1. **Computing**: the ambient context value is resolved and the selector
//!    runs once against the current state.
//! 2. **Subscribed**: a nested subscription is attached below the ambient
//!    one and activated before the hook returns, so no dispatch after mount
//!    is missed.
//! 3. **Recomputing**: on every notification the selector runs again; the
//!    signal is written only if the equality function reports a difference.
//! 4. **Unsubscribed**: disposing the component scope removes the listener
//!    and detaches the nested subscription.
//!
//! The nested subscription is re-published on the component scope, so
//! bindings in descendant scopes are notified after this one. A scope that
//! already holds a value on the channel keeps it: a provider on the same
//! scope stays the nearest provider for its descendants.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::Rc;

use sluice_core::{ReadSignal, Scope, Signal, SignalSubscription, Subscription, SubscriptionId};

use super::context::resolve;
use crate::context::{ReduxChannel, ReduxContextValue, default_channel};
use crate::dev_mode::{DevModeChecks, DevModeWarning, run_checks};
use crate::equality::{RefEq, ref_equality};
use crate::error::HookResult;

/// Equality function shared by a binding and its listener.
pub type EqualityFn<T> = Rc<dyn Fn(&T, &T) -> bool>;

type SelectorFn<S, T> = Rc<dyn Fn(&S) -> T>;

/// Where a selector binding is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
	/// The initial value is being computed.
	Computing,
	/// Listening for store changes.
	Subscribed,
	/// A notification is being handled.
	Recomputing,
	/// The component scope was disposed.
	Unsubscribed,
}

/// Options accepted by [`use_selector_with`].
///
/// A bare closure converts into options with that equality function.
pub struct SelectorOptions<T> {
	/// Decides whether a recomputed value counts as unchanged.
	pub equality_fn: EqualityFn<T>,
	/// Overrides the provider's development-mode checks.
	pub dev_mode_checks: Option<DevModeChecks>,
}

impl<T> SelectorOptions<T> {
	/// Options with a custom equality function.
	pub fn new<F>(equality_fn: F) -> Self
	where
		F: Fn(&T, &T) -> bool + 'static,
	{
		Self {
			equality_fn: Rc::new(equality_fn),
			dev_mode_checks: None,
		}
	}

	/// Overrides the development-mode checks for this binding.
	pub fn with_dev_mode_checks(mut self, checks: DevModeChecks) -> Self {
		self.dev_mode_checks = Some(checks);
		self
	}
}

impl<T: RefEq + 'static> Default for SelectorOptions<T> {
	fn default() -> Self {
		Self::new(ref_equality::<T>)
	}
}

impl<T, F> From<F> for SelectorOptions<T>
where
	F: Fn(&T, &T) -> bool + 'static,
{
	fn from(equality_fn: F) -> Self {
		Self::new(equality_fn)
	}
}

impl<T> Clone for SelectorOptions<T> {
	fn clone(&self) -> Self {
		Self {
			equality_fn: self.equality_fn.clone(),
			dev_mode_checks: self.dev_mode_checks,
		}
	}
}

impl<T> fmt::Debug for SelectorOptions<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SelectorOptions")
			.field("dev_mode_checks", &self.dev_mode_checks)
			.finish_non_exhaustive()
	}
}

/// The value produced by a selector binding.
///
/// Reads go through a read-only signal; the binding is the only writer.
pub struct Selected<T> {
	value: ReadSignal<T>,
	state: Rc<Cell<BindingState>>,
	subscription: SubscriptionId,
	warnings: Rc<RefCell<Vec<DevModeWarning>>>,
}

impl<T> Clone for Selected<T> {
	fn clone(&self) -> Self {
		Self {
			value: self.value.clone(),
			state: self.state.clone(),
			subscription: self.subscription,
			warnings: self.warnings.clone(),
		}
	}
}

impl<T: 'static> Selected<T> {
	/// Reads the value by reference.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		self.value.with(f)
	}

	/// Number of times the value changed since mount.
	pub fn version(&self) -> u64 {
		self.value.version()
	}

	/// Registers a callback run whenever the value changes.
	pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> SignalSubscription {
		self.value.subscribe(callback)
	}

	/// The underlying read-only signal.
	pub fn signal(&self) -> &ReadSignal<T> {
		&self.value
	}

	/// Current lifecycle state.
	pub fn state(&self) -> BindingState {
		self.state.get()
	}

	/// Whether the binding still follows the store.
	pub fn is_active(&self) -> bool {
		self.state.get() != BindingState::Unsubscribed
	}

	/// Id of the binding's nested subscription.
	pub fn subscription_id(&self) -> SubscriptionId {
		self.subscription
	}

	/// Development-mode check failures recorded since mount, oldest first.
	///
	/// Always empty in builds without `debug_assertions`.
	pub fn dev_mode_warnings(&self) -> Vec<DevModeWarning> {
		self.warnings.borrow().clone()
	}
}

impl<T: Clone + 'static> Selected<T> {
	/// Returns a clone of the current value.
	pub fn get(&self) -> T {
		self.value.get()
	}
}

impl<T: fmt::Debug> fmt::Debug for Selected<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Selected")
			.field("value", &self.value)
			.field("state", &self.state.get())
			.field("subscription", &self.subscription)
			.field("dev_mode_warnings", &self.warnings.borrow())
			.finish()
	}
}

fn mount<S, A, T>(
	scope: &Scope,
	channel: &ReduxChannel<S, A>,
	selector: SelectorFn<S, T>,
	options: SelectorOptions<T>,
) -> HookResult<Selected<T>>
where
	S: 'static,
	A: 'static,
	T: Clone + 'static,
{
	let context = resolve(scope, channel)?;
	let binding_state = Rc::new(Cell::new(BindingState::Computing));
	let checks = options.dev_mode_checks.unwrap_or(context.settings.dev_mode_checks);
	let equality = options.equality_fn;

	let (initial, warnings) = {
		let state = context.store.get_state();
		let initial = selector(&state);
		let warnings = run_checks(checks, true, &*selector, &state, &initial, &*equality);
		(initial, Rc::new(RefCell::new(warnings)))
	};
	let signal = Signal::new(initial);

	let nested = Subscription::nested(&context.subscription);
	let listener = {
		let store = context.store.clone();
		let signal = signal.clone();
		let binding_state = binding_state.clone();
		let warnings = warnings.clone();
		Rc::new(move || {
			binding_state.set(BindingState::Recomputing);
			let state = store.get_state();
			let next = selector(&state);
			let failed = run_checks(checks, false, &*selector, &state, &next, &*equality);
			if !failed.is_empty() {
				warnings.borrow_mut().extend(failed);
			}

			let changed = signal.with(|previous| !equality(previous, &next));
			if changed {
				signal.set(next);
			}
			binding_state.set(BindingState::Subscribed);
		})
	};
	let handle = nested.add_nested_sub(listener);
	nested.try_subscribe();
	binding_state.set(BindingState::Subscribed);

	if !scope.provides(channel) {
		scope.provide(
			channel,
			ReduxContextValue {
				store: context.store.clone(),
				subscription: nested.clone(),
				settings: context.settings,
			},
		);
	}

	let subscription = nested.id();
	scope.on_dispose({
		let binding_state = binding_state.clone();
		move || {
			handle.unsubscribe();
			nested.try_unsubscribe();
			binding_state.set(BindingState::Unsubscribed);
			tracing::trace!(subscription = %nested.id(), "selector binding unmounted");
		}
	});

	tracing::trace!(
		scope = %scope.id(),
		channel = %channel.id(),
		subscription = %subscription,
		"selector binding mounted"
	);

	Ok(Selected {
		value: signal.read_only(),
		state: binding_state,
		subscription,
		warnings,
	})
}

/// Selects a value from the store on the default channel.
///
/// The result is compared with [`ref_equality`]: shared values by pointer,
/// scalars by value. Use [`use_selector_with`] for a different equality
/// function, such as [`value_equality`](crate::value_equality) for a deep
/// comparison.
///
/// # Type Parameters
///
/// * `S` - The root state type
/// * `A` - The action type of the store
/// * `T` - The selected value type
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
/// use sluice_hooks::{ProviderProps, provide_store, use_selector};
///
/// #[derive(Clone)]
/// struct Todos {
///     items: Vec<String>,
/// }
///
/// let store = ReducerStore::shared(
///     |todos: &Todos, item: &String| {
///         let mut items = todos.items.clone();
///         items.push(item.clone());
///         Todos { items }
///     },
///     Todos { items: Vec::new() },
/// );
/// let provider = Scope::root().child();
/// provide_store::<Todos, String>(&provider, ProviderProps::new(store.clone()));
///
/// let component = provider.child();
/// let count = use_selector::<Todos, String, _>(&component, |todos| todos.items.len()).unwrap();
///
/// store.dispatch("write docs".to_string()).unwrap();
/// assert_eq!(count.get(), 1);
///
/// component.dispose();
/// assert!(!count.is_active());
/// ```
pub fn use_selector<S, A, T>(
	scope: &Scope,
	selector: impl Fn(&S) -> T + 'static,
) -> HookResult<Selected<T>>
where
	S: 'static,
	A: 'static,
	T: Clone + RefEq + 'static,
{
	mount(scope, &default_channel::<S, A>(), Rc::new(selector), SelectorOptions::default())
}

/// Selects a value using an explicit equality function or options record.
///
/// # Errors
///
/// [`HookError::MissingStore`](crate::HookError::MissingStore) when no
/// provider is above `scope`.
pub fn use_selector_with<S, A, T>(
	scope: &Scope,
	selector: impl Fn(&S) -> T + 'static,
	options: impl Into<SelectorOptions<T>>,
) -> HookResult<Selected<T>>
where
	S: 'static,
	A: 'static,
	T: Clone + 'static,
{
	mount(scope, &default_channel::<S, A>(), Rc::new(selector), options.into())
}

/// `use_selector` bound to one channel.
///
/// The type parameters fix the state and action types once, so call sites
/// need no annotations.
///
/// ```
/// use sluice_core::{ReducerStore, Scope};
/// use sluice_hooks::{ProviderProps, ReduxChannel, SelectorHook, create_selector_hook, provide_store};
///
/// let channel = ReduxChannel::<u8, u8>::new();
/// let use_counter: SelectorHook<u8, u8> = create_selector_hook(channel);
///
/// let store = ReducerStore::shared(|count: &u8, delta: &u8| count + delta, 2);
/// let provider = Scope::root().child();
/// provide_store(&provider, ProviderProps::new(store).with_context(channel));
///
/// let doubled = use_counter.use_selector(&provider.child(), |count| count * 2).unwrap();
/// assert_eq!(doubled.get(), 4);
/// ```
pub struct SelectorHook<S: 'static, A: 'static> {
	channel: ReduxChannel<S, A>,
}

/// Creates a selector hook reading from `channel`.
pub fn create_selector_hook<S, A>(channel: ReduxChannel<S, A>) -> SelectorHook<S, A>
where
	S: 'static,
	A: 'static,
{
	SelectorHook { channel }
}

impl<S: 'static, A: 'static> SelectorHook<S, A> {
	/// The channel this hook reads from.
	pub fn channel(&self) -> ReduxChannel<S, A> {
		self.channel
	}

	/// [`use_selector`] on this hook's channel.
	pub fn use_selector<T>(
		&self,
		scope: &Scope,
		selector: impl Fn(&S) -> T + 'static,
	) -> HookResult<Selected<T>>
	where
		T: Clone + RefEq + 'static,
	{
		mount(scope, &self.channel, Rc::new(selector), SelectorOptions::default())
	}

	/// [`use_selector_with`] on this hook's channel.
	pub fn use_selector_with<T>(
		&self,
		scope: &Scope,
		selector: impl Fn(&S) -> T + 'static,
		options: impl Into<SelectorOptions<T>>,
	) -> HookResult<Selected<T>>
	where
		T: Clone + 'static,
	{
		mount(scope, &self.channel, Rc::new(selector), options.into())
	}
}

impl<S: 'static, A: 'static> Default for SelectorHook<S, A> {
	fn default() -> Self {
		create_selector_hook(default_channel())
	}
}

impl<S: 'static, A: 'static> Clone for SelectorHook<S, A> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<S: 'static, A: 'static> Copy for SelectorHook<S, A> {}

impl<S: 'static, A: 'static> fmt::Debug for SelectorHook<S, A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SelectorHook")
			.field("channel", &self.channel.id())
			.finish()
	}
}
