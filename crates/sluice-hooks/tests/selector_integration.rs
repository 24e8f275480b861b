//! Selector binding integration tests
//!
//! Success Criteria:
//! 1. A binding's value equals the selection at the last effective change
//! 2. Bindings update only when their equality function reports a change
//! 3. The default equality never walks a selection
//! 4. Sibling bindings register in mount order and run once per dispatch
//! 5. Parents recompute before children, level by level
//! 6. Unmounting detaches exactly one entry and silences the binding
//!
//! Test Categories:
//! - Happy Path: 2 tests
//! - Equality: 4 tests
//! - Ordering: 2 tests
//! - State Transitions: 2 tests
//! - Property-based: 1 test

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use proptest::prelude::*;
use rstest::*;
use sluice_core::{ReducerStore, Scope, Store};
use sluice_hooks::{
	BindingSettings, BindingState, DevModeChecks, ProviderProps, ReduxChannel, default_channel,
	identity_equality, provide_store, shallow_equal, use_selector, use_selector_with,
	value_equality,
};

// ============================================================================
// Fixtures
// ============================================================================

type Counter = Rc<ReducerStore<i64, i64>>;

#[fixture]
fn counter() -> Counter {
	ReducerStore::shared(|count: &i64, delta: &i64| count + delta, 0)
}

fn quiet() -> BindingSettings {
	BindingSettings::default().with_dev_mode_checks(DevModeChecks::disabled())
}

/// Mounts a provider below a fresh application scope and returns both.
fn mount_provider<S: 'static, A: 'static>(store: Rc<ReducerStore<S, A>>) -> (Scope, Scope) {
	let app = Scope::root();
	let provider = app.child();
	provide_store::<S, A>(&provider, ProviderProps::new(store).with_settings(quiet()));
	(app, provider)
}

// ============================================================================
// Happy Path Tests
// ============================================================================

/// Integer store, identity selector, one increment: one change
#[rstest]
fn test_integer_selection_flips_once(counter: Counter) {
	let (_app, provider) = mount_provider(counter.clone());
	let selected = use_selector::<i64, i64, _>(&provider.child(), |count| *count).unwrap();
	let notifications = Rc::new(Cell::new(0));
	let _watch = selected.subscribe({
		let notifications = notifications.clone();
		move |_: &i64| notifications.set(notifications.get() + 1)
	});
	assert_eq!(selected.get(), 0);

	counter.dispatch(1).unwrap();

	assert_eq!(selected.get(), 1);
	assert_eq!(notifications.get(), 1);
}

/// A binding mounted after dispatches starts from the current state
#[rstest]
fn test_binding_reads_state_at_mount(counter: Counter) {
	let (_app, provider) = mount_provider(counter.clone());
	counter.dispatch(41).unwrap();

	let selected = use_selector::<i64, i64, _>(&provider.child(), |count| count + 1).unwrap();

	assert_eq!(selected.get(), 42);
	assert_eq!(selected.state(), BindingState::Subscribed);
}

// ============================================================================
// Equality Tests
// ============================================================================

/// Key list compared shallowly stays put when only a value changes
#[rstest]
fn test_shallow_key_selection_is_stable() {
	let initial: BTreeMap<&'static str, i64> = [("count", 0), ("stable", 1)].into_iter().collect();
	let store = ReducerStore::shared(
		|state: &BTreeMap<&'static str, i64>, delta: &i64| {
			let mut next = state.clone();
			*next.entry("count").or_default() += delta;
			next
		},
		initial,
	);
	let (_app, provider) = mount_provider(store.clone());

	let keys = use_selector_with::<BTreeMap<&'static str, i64>, i64, _>(
		&provider.child(),
		|state| state.keys().copied().collect::<Vec<_>>(),
		shallow_equal::<Vec<&'static str>>,
	)
	.unwrap();

	store.dispatch(5).unwrap();

	assert_eq!(keys.get(), vec!["count", "stable"]);
	assert_eq!(keys.version(), 0);
}

#[derive(Clone)]
struct Todos {
	items: Rc<Vec<String>>,
	filter: u8,
}

enum TodoAction {
	Add(String),
	SetFilter(u8),
}

fn todo_store() -> Rc<ReducerStore<Todos, TodoAction>> {
	ReducerStore::shared(
		|state: &Todos, action: &TodoAction| match action {
			TodoAction::Add(item) => {
				let mut items = (*state.items).clone();
				items.push(item.clone());
				Todos {
					items: Rc::new(items),
					filter: state.filter,
				}
			}
			TodoAction::SetFilter(filter) => Todos {
				items: state.items.clone(),
				filter: *filter,
			},
		},
		Todos {
			items: Rc::new(Vec::new()),
			filter: 0,
		},
	)
}

/// Selecting an untouched shared field of a new root state is not a change
#[rstest]
fn test_identity_equality_ignores_new_root() {
	let store = todo_store();
	let (_app, provider) = mount_provider(store.clone());
	let selector_calls = Rc::new(Cell::new(0));

	let items = use_selector_with::<Todos, TodoAction, _>(
		&provider.child(),
		{
			let selector_calls = selector_calls.clone();
			move |state: &Todos| {
				selector_calls.set(selector_calls.get() + 1);
				state.items.clone()
			}
		},
		identity_equality::<Vec<String>>,
	)
	.unwrap();
	let before = items.get();

	store.dispatch(TodoAction::SetFilter(2)).unwrap();
	assert!(Rc::ptr_eq(&before, &items.get()));
	assert_eq!(items.version(), 0);

	store.dispatch(TodoAction::Add("ship".to_string())).unwrap();
	assert_eq!(items.version(), 1);
	assert_eq!(*items.get(), vec!["ship".to_string()]);
	assert_eq!(selector_calls.get(), 3);
}

/// Equality is consulted with the stored value and the new selection
#[rstest]
fn test_equality_receives_previous_and_next(counter: Counter) {
	let (_app, provider) = mount_provider(counter.clone());
	let pairs = Rc::new(RefCell::new(Vec::new()));

	let _selected = use_selector_with::<i64, i64, _>(&provider.child(), |count| *count, {
		let pairs = pairs.clone();
		move |previous: &i64, next: &i64| {
			pairs.borrow_mut().push((*previous, *next));
			previous == next
		}
	})
	.unwrap();

	counter.dispatch(2).unwrap();
	counter.dispatch(0).unwrap();
	counter.dispatch(3).unwrap();

	assert_eq!(*pairs.borrow(), vec![(0, 2), (2, 2), (2, 5)]);
}

#[derive(Clone)]
struct Tracked {
	comparisons: Rc<Cell<usize>>,
}

impl PartialEq for Tracked {
	fn eq(&self, _other: &Self) -> bool {
		self.comparisons.set(self.comparisons.get() + 1);
		true
	}
}

/// A fresh shared selection is a change under the default equality and is
/// never compared element by element; deep comparison is opt-in
#[rstest]
fn test_default_equality_does_not_walk_selection(counter: Counter) {
	let (_app, provider) = mount_provider(counter.clone());
	let comparisons = Rc::new(Cell::new(0));
	let rows = {
		let comparisons = comparisons.clone();
		move |_: &i64| {
			let row = Tracked {
				comparisons: comparisons.clone(),
			};
			Rc::new(vec![row; 1000])
		}
	};

	let by_reference = use_selector::<i64, i64, _>(&provider.child(), rows.clone()).unwrap();
	let by_value = use_selector_with::<i64, i64, _>(
		&provider.child(),
		rows,
		value_equality::<Rc<Vec<Tracked>>>,
	)
	.unwrap();
	counter.dispatch(1).unwrap();

	assert_eq!(by_reference.version(), 1);
	assert_eq!(by_value.version(), 0);
	assert_eq!(comparisons.get(), 1000);
}

// ============================================================================
// Ordering Tests
// ============================================================================

/// N siblings: N children in mount order, each selector once per dispatch
#[rstest]
fn test_sibling_bindings_run_once_in_mount_order(counter: Counter) {
	let (_app, provider) = mount_provider(counter.clone());
	let root = provider
		.child()
		.inject(&default_channel::<i64, i64>())
		.unwrap()
		.subscription;
	let log = Rc::new(RefCell::new(Vec::new()));

	let siblings: Vec<_> = (0..3)
		.map(|index| {
			let component = provider.child();
			let log = log.clone();
			let selected = use_selector::<i64, i64, _>(&component, move |count| {
				log.borrow_mut().push(index);
				*count
			})
			.unwrap();
			(component, selected)
		})
		.collect();
	assert_eq!(root.child_count(), 3);
	log.borrow_mut().clear();

	counter.dispatch(1).unwrap();

	assert_eq!(*log.borrow(), vec![0, 1, 2]);
	assert!(siblings.iter().all(|(_, selected)| selected.get() == 1));
}

/// Level order: parent, its sibling, then the parent's child
#[rstest]
fn test_parent_recomputes_before_children(counter: Counter) {
	let (_app, provider) = mount_provider(counter.clone());
	let log = Rc::new(RefCell::new(Vec::new()));
	let logging = |name: &'static str| {
		let log = log.clone();
		move |count: &i64| {
			log.borrow_mut().push(name);
			*count
		}
	};

	let parent = provider.child();
	let _parent = use_selector::<i64, i64, _>(&parent, logging("parent")).unwrap();
	let child = parent.child();
	let _child = use_selector::<i64, i64, _>(&child, logging("child")).unwrap();
	let grandchild = child.child();
	let _grandchild = use_selector::<i64, i64, _>(&grandchild, logging("grandchild")).unwrap();
	let uncle = provider.child();
	let _uncle = use_selector::<i64, i64, _>(&uncle, logging("uncle")).unwrap();
	log.borrow_mut().clear();

	counter.dispatch(1).unwrap();

	assert_eq!(*log.borrow(), vec!["parent", "uncle", "child", "grandchild"]);
}

// ============================================================================
// State Transition Tests
// ============================================================================

/// Unmount removes exactly one entry from the parent and stops updates
#[rstest]
fn test_unmount_detaches_one_binding(counter: Counter) {
	let (_app, provider) = mount_provider(counter.clone());
	let root = provider
		.child()
		.inject(&default_channel::<i64, i64>())
		.unwrap()
		.subscription;

	let first = provider.child();
	let second = provider.child();
	let a = use_selector::<i64, i64, _>(&first, |count| *count).unwrap();
	let b = use_selector::<i64, i64, _>(&second, |count| *count).unwrap();
	let before = root.nested_count();

	first.dispose();
	counter.dispatch(3).unwrap();

	assert_eq!(root.nested_count(), before - 1);
	assert_eq!(a.get(), 0);
	assert_eq!(a.state(), BindingState::Unsubscribed);
	assert_eq!(b.get(), 3);
}

/// Disposing a parent component tears down its descendants' bindings
#[rstest]
fn test_parent_disposal_unmounts_descendants(counter: Counter) {
	let (_app, provider) = mount_provider(counter.clone());
	let parent = provider.child();
	let outer = use_selector::<i64, i64, _>(&parent, |count| *count).unwrap();
	let inner = use_selector::<i64, i64, _>(&parent.child(), |count| count * 2).unwrap();

	parent.dispose();
	counter.dispatch(1).unwrap();

	assert!(!outer.is_active());
	assert!(!inner.is_active());
	assert_eq!(inner.get(), 0);
	assert_eq!(counter.listener_count(), 1);
}

// ============================================================================
// Property-based Tests
// ============================================================================

proptest! {
	/// Test: the held value tracks the last effective change
	///
	/// Category: Property
	#[test]
	fn prop_selection_is_never_stale(deltas in prop::collection::vec(-5i64..=5, 0..40)) {
		let store: Counter = ReducerStore::shared(|count: &i64, delta: &i64| count + delta, 0);
		let (_app, provider) = mount_provider(store.clone());
		let channel: ReduxChannel<i64, i64> = default_channel();
		prop_assert!(provider.child().inject(&channel).is_some());

		let bucket = use_selector::<i64, i64, _>(&provider.child(), |count| count.div_euclid(3)).unwrap();
		let mut expected_version = 0;
		let mut last = 0;

		for delta in deltas {
			store.dispatch(delta).unwrap();
			let current = store.get_state().div_euclid(3);
			if current != last {
				expected_version += 1;
				last = current;
			}
			prop_assert_eq!(bucket.get(), current);
			prop_assert_eq!(bucket.version(), expected_version);
		}
	}
}
