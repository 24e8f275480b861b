//! Provider and channel integration tests
//!
//! Success Criteria:
//! 1. Hooks outside every provider fail with `MissingStore`
//! 2. Independent stores on distinct channels never notify each other
//! 3. An alternate channel deeper in the tree does not shadow the default one
//! 4. A binding never replaces a provider installed on its own scope
//! 5. Provider disposal releases the store subscription exactly once
//! 6. Provider settings reach bindings and load from TOML
//!
//! Test Categories:
//! - Error Path: 2 tests
//! - Isolation: 3 tests
//! - Lifecycle: 2 tests
//! - Configuration: 2 tests

use std::cell::Cell;
use std::rc::Rc;

use rstest::*;
use sluice_core::{ContextId, ReducerStore, Scope, Store};
use sluice_hooks::{
	BindingSettings, CheckFrequency, HookError, ProviderProps, ReduxChannel, SelectorHook,
	create_dispatch_hook, create_redux_context_hook, create_selector_hook, create_store_hook,
	provide_store, provide_store_to_app, use_dispatch, use_redux_context, use_selector, use_store,
};

type Counter = Rc<ReducerStore<i32, i32>>;

#[fixture]
fn counter() -> Counter {
	ReducerStore::shared(|count: &i32, delta: &i32| count + delta, 0)
}

// ============================================================================
// Error Path Tests
// ============================================================================

/// Every default hook fails loudly outside a provider
#[rstest]
fn test_all_hooks_require_a_provider() {
	let orphan = Scope::root().child();

	assert!(matches!(
		use_selector::<i32, i32, _>(&orphan, |count| *count),
		Err(HookError::MissingStore { channel }) if channel == ContextId::DEFAULT
	));
	assert!(matches!(
		use_dispatch::<i32, i32>(&orphan),
		Err(HookError::MissingStore { .. })
	));
	assert!(matches!(
		use_store::<i32, i32>(&orphan),
		Err(HookError::MissingStore { .. })
	));
	assert!(matches!(
		use_redux_context::<i32, i32>(&orphan),
		Err(HookError::MissingStore { .. })
	));
}

/// A provider's own scope cannot see it; only descendants can
#[rstest]
fn test_provider_scope_does_not_see_itself(counter: Counter) {
	let provider = Scope::root().child();
	provide_store::<i32, i32>(&provider, ProviderProps::new(counter));

	assert!(use_store::<i32, i32>(&provider).is_err());
	assert!(use_store::<i32, i32>(&provider.child()).is_ok());
}

// ============================================================================
// Isolation Tests
// ============================================================================

/// Two stores on two channels: a dispatch on one never reaches the other
#[rstest]
fn test_independent_channels_are_isolated() {
	let first_store: Counter = ReducerStore::shared(|count: &i32, delta: &i32| count + delta, 0);
	let second_store: Counter = ReducerStore::shared(|count: &i32, delta: &i32| count + delta, 100);
	let first_channel = ReduxChannel::<i32, i32>::new();
	let second_channel = ReduxChannel::<i32, i32>::new();
	let use_first = create_selector_hook(first_channel);
	let use_second = create_selector_hook(second_channel);

	let app = Scope::root();
	let outer = app.child();
	provide_store(&outer, ProviderProps::new(first_store.clone()).with_context(first_channel));
	let inner = outer.child();
	provide_store(&inner, ProviderProps::new(second_store.clone()).with_context(second_channel));
	let component = inner.child();

	let first_calls = Rc::new(Cell::new(0));
	let first = use_first
		.use_selector(&component, {
			let first_calls = first_calls.clone();
			move |count: &i32| {
				first_calls.set(first_calls.get() + 1);
				*count
			}
		})
		.unwrap();
	let second = use_second.use_selector(&component, |count: &i32| *count).unwrap();
	let first_calls_after_mount = first_calls.get();

	second_store.dispatch(1).unwrap();

	assert_eq!(first_calls.get(), first_calls_after_mount);
	assert_eq!(first.get(), 0);
	assert_eq!(second.get(), 101);
}

/// An alternate channel below the default provider leaves the default intact
#[rstest]
fn test_alternate_channel_does_not_shadow_default(counter: Counter) {
	let other: Counter = ReducerStore::shared(|count: &i32, delta: &i32| count * delta, 1);
	let alternate = ReduxChannel::<i32, i32>::new();

	let outer = Scope::root().child();
	provide_store::<i32, i32>(&outer, ProviderProps::new(counter.clone()));
	let inner = outer.child();
	provide_store(&inner, ProviderProps::new(other.clone()).with_context(alternate));
	let component = inner.child();

	let dispatch_default = use_dispatch::<i32, i32>(&component).unwrap();
	let dispatch_alternate = create_dispatch_hook(alternate).use_dispatch(&component).unwrap();
	dispatch_default.dispatch(5).unwrap();
	dispatch_alternate.dispatch(7).unwrap();

	assert_eq!(*counter.get_state(), 5);
	assert_eq!(*other.get_state(), 7);
	let store = create_store_hook(alternate).use_store(&component).unwrap();
	assert_eq!(*store.get_state(), 7);
	let context = create_redux_context_hook(alternate)
		.use_redux_context(&component)
		.unwrap();
	assert!(context.subscription.is_subscribed());
}

/// A component that provides a store and selects from the outer one keeps
/// its own provider visible to descendants
#[rstest]
fn test_binding_does_not_shadow_provider_on_same_scope(counter: Counter) {
	let inner: Counter = ReducerStore::shared(|count: &i32, delta: &i32| count + delta, 100);
	let outer = Scope::root().child();
	provide_store::<i32, i32>(&outer, ProviderProps::new(counter.clone()));
	let component = outer.child();
	let inner_value = provide_store::<i32, i32>(&component, ProviderProps::new(inner.clone()));

	let from_outer = use_selector::<i32, i32, _>(&component, |count| *count).unwrap();
	let leaf = component.child();

	assert_eq!(from_outer.get(), 0);
	assert_eq!(*use_store::<i32, i32>(&leaf).unwrap().get_state(), 100);
	let context = use_redux_context::<i32, i32>(&leaf).unwrap();
	assert_eq!(context.subscription.id(), inner_value.subscription.id());

	let from_inner = use_selector::<i32, i32, _>(&leaf, |count| *count).unwrap();
	inner.dispatch(5).unwrap();
	assert_eq!(from_inner.get(), 105);
	assert_eq!(from_outer.get(), 0);
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

/// Disposing a provider twice releases the store listener once
#[rstest]
fn test_provider_disposal_is_idempotent(counter: Counter) {
	let app = Scope::root();
	let provider = app.child();
	let value = provide_store::<i32, i32>(&provider, ProviderProps::new(counter.clone()));
	let selected = use_selector::<i32, i32, _>(&provider.child(), |count| *count).unwrap();

	provider.dispose();
	provider.dispose();
	counter.dispatch(1).unwrap();

	assert!(!value.subscription.is_subscribed());
	assert!(!selected.is_active());
	assert_eq!(counter.listener_count(), 0);
}

/// The app-level provider serves every component until the app goes away
#[rstest]
fn test_app_provider_serves_whole_tree(counter: Counter) {
	let app = Scope::root();
	provide_store_to_app::<i32, i32>(&app, ProviderProps::new(counter.clone()));
	let deep = app.child().child().child();

	let selected = SelectorHook::<i32, i32>::default()
		.use_selector(&deep, |count| count * 3)
		.unwrap();
	counter.dispatch(2).unwrap();
	assert_eq!(selected.get(), 6);

	app.dispose();
	assert_eq!(counter.listener_count(), 0);
	assert!(!selected.is_active());
}

// ============================================================================
// Configuration Tests
// ============================================================================

/// Settings given to a provider are visible through the context value
#[rstest]
fn test_provider_settings_reach_context(counter: Counter) {
	let settings = BindingSettings::from_toml(
		"[dev_mode_checks]\nstability_check = \"always\"\nidentity_function_check = \"never\"\n",
	)
	.unwrap();
	let provider = Scope::root().child();
	provide_store::<i32, i32>(&provider, ProviderProps::new(counter).with_settings(settings));

	let context = use_redux_context::<i32, i32>(&provider.child()).unwrap();

	assert_eq!(context.settings.dev_mode_checks.stability_check, CheckFrequency::Always);
	assert_eq!(
		context.settings.dev_mode_checks.identity_function_check,
		CheckFrequency::Never
	);
}

/// Bindings re-publish their subscription with the provider's settings
#[rstest]
fn test_binding_republishes_for_descendants(counter: Counter) {
	let provider = Scope::root().child();
	let root = provide_store::<i32, i32>(&provider, ProviderProps::new(counter));
	let component = provider.child();
	let selected = use_selector::<i32, i32, _>(&component, |count| *count).unwrap();

	let below = use_redux_context::<i32, i32>(&component.child()).unwrap();

	assert_eq!(below.subscription.id(), selected.subscription_id());
	assert_eq!(below.subscription.parent_id(), Some(root.subscription.id()));
	assert_eq!(below.settings, root.settings);
}
