//! Subscription tree
//!
//! A [`Subscription`] is a node in a tree of listener registries that mirrors
//! the component hierarchy. The root node listens to a [`Store`]; every other
//! node hangs off a parent node. A notification entering a node is delivered
//! to that node's listeners and then to its descendants.
//!
//! ## Architecture
//!
//! All nodes of one tree live in a single arena ([`BTreeMap`] keyed by
//! [`SubscriptionId`]). Children refer to their parent by id only, so the
//! tree holds no reference cycles and a node can be detached while a
//! notification pass is walking its siblings.
//!
//! [`Subscription`] values are cheap handles into that arena. When the last
//! handle for a node is dropped the node is unsubscribed and its arena slot
//! is reclaimed.
//!
//! ## Ordering
//!
//! [`Subscription::notify_nested_subs`] walks the tree in level order: every
//! listener at depth *k* completes before any listener at depth *k + 1*
//! starts. Within a node, listeners run in registration order; within a
//! level, nodes run in the order they were attached.
//!
//! Listeners and children are snapshotted per node, and each listener is
//! checked for liveness immediately before it runs. A listener removed during
//! a pass is therefore never called afterwards, and a node detached during a
//! pass is not visited.
//!
//! ## Reentrancy
//!
//! If a listener causes another notification on the same tree (usually by
//! dispatching to the store), the request is queued and replayed after the
//! current pass completes instead of running inline.

use core::cell::{Cell, RefCell};
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::VecDeque;

extern crate alloc;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;

use crate::store::{Listener, Store, Unsubscribe};

/// Unique identifier of a subscription node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(usize);

impl SubscriptionId {
	fn next() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for SubscriptionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "sub#{}", self.0)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListenerId(usize);

type StoreSubscribe = Rc<dyn Fn(Listener) -> Unsubscribe>;

struct ListenerEntry {
	id: ListenerId,
	callback: Listener,
}

struct SubscriptionNode {
	parent: Option<SubscriptionId>,
	listeners: Vec<ListenerEntry>,
	children: Vec<SubscriptionId>,
	on_state_change: Option<Listener>,
	active: bool,
	store_link: Option<Unsubscribe>,
}

impl SubscriptionNode {
	fn new(parent: Option<SubscriptionId>) -> Self {
		Self {
			parent,
			listeners: Vec::new(),
			children: Vec::new(),
			on_state_change: None,
			active: false,
			store_link: None,
		}
	}
}

/// Arena shared by every node of one tree.
struct SubscriptionTree {
	nodes: RefCell<BTreeMap<SubscriptionId, SubscriptionNode>>,
	subscribe_to_store: StoreSubscribe,
	next_listener: Cell<usize>,
	notifying: Cell<bool>,
	pending: RefCell<Vec<SubscriptionId>>,
}

/// Resets the notification guard even if a listener panics.
struct NotifyGuard<'a>(&'a SubscriptionTree);

impl Drop for NotifyGuard<'_> {
	fn drop(&mut self) {
		self.0.notifying.set(false);
		self.0.pending.borrow_mut().clear();
	}
}

impl SubscriptionTree {
	fn new(subscribe_to_store: StoreSubscribe) -> Self {
		Self {
			nodes: RefCell::new(BTreeMap::new()),
			subscribe_to_store,
			next_listener: Cell::new(0),
			notifying: Cell::new(false),
			pending: RefCell::new(Vec::new()),
		}
	}

	fn insert(&self, parent: Option<SubscriptionId>) -> SubscriptionId {
		let id = SubscriptionId::next();
		self.nodes.borrow_mut().insert(id, SubscriptionNode::new(parent));
		tracing::trace!(subscription = %id, parent = ?parent, "subscription created");
		id
	}

	fn is_active(&self, id: SubscriptionId) -> bool {
		self.nodes.borrow().get(&id).is_some_and(|node| node.active)
	}

	fn try_subscribe(self: &Rc<Self>, id: SubscriptionId) {
		let parent = match self.nodes.borrow().get(&id) {
			Some(node) if !node.active => node.parent,
			_ => return,
		};

		match parent {
			None => {
				let tree = Rc::downgrade(self);
				let listener: Listener = Rc::new(move || {
					if let Some(tree) = tree.upgrade() {
						tree.handle_change(id);
					}
				});
				// The store may call back into this tree, so no borrow is held here.
				let link = (self.subscribe_to_store)(listener);

				let unused = {
					let mut nodes = self.nodes.borrow_mut();
					match nodes.get_mut(&id) {
						Some(node) if !node.active => {
							node.active = true;
							node.store_link = Some(link);
							None
						}
						_ => Some(link),
					}
				};
				if let Some(link) = unused {
					link.unsubscribe();
					return;
				}
			}
			Some(parent_id) => {
				self.try_subscribe(parent_id);

				let mut nodes = self.nodes.borrow_mut();
				match nodes.get_mut(&parent_id) {
					Some(parent) if parent.active => {
						if !parent.children.contains(&id) {
							parent.children.push(id);
						}
					}
					_ => {
						tracing::trace!(subscription = %id, parent = %parent_id, "parent unavailable, staying inactive");
						return;
					}
				}
				if let Some(node) = nodes.get_mut(&id) {
					node.active = true;
				}
			}
		}

		tracing::trace!(subscription = %id, "subscription activated");
	}

	fn try_unsubscribe(&self, id: SubscriptionId) {
		let (link, listeners, children) = {
			let mut nodes = self.nodes.borrow_mut();
			let Some(node) = nodes.get_mut(&id) else {
				return;
			};
			if !node.active {
				return;
			}
			node.active = false;
			let link = node.store_link.take();
			let listeners = core::mem::take(&mut node.listeners);
			let children = core::mem::take(&mut node.children);
			let parent = node.parent;

			if let Some(parent) = parent.and_then(|parent| nodes.get_mut(&parent)) {
				parent.children.retain(|child| *child != id);
			}
			(link, listeners, children)
		};

		if let Some(link) = link {
			link.unsubscribe();
		}
		// Listeners may own handles into this tree; release them unborrowed.
		drop(listeners);
		for child in children {
			self.try_unsubscribe(child);
		}

		tracing::trace!(subscription = %id, "subscription deactivated");
	}

	fn add_listener(self: &Rc<Self>, id: SubscriptionId, listener: Listener) -> ListenerHandle {
		self.try_subscribe(id);

		let mut nodes = self.nodes.borrow_mut();
		let Some(node) = nodes.get_mut(&id).filter(|node| node.active) else {
			return ListenerHandle::detached(id);
		};

		let existing = node
			.listeners
			.iter()
			.find(|entry| core::ptr::addr_eq(Rc::as_ptr(&entry.callback), Rc::as_ptr(&listener)))
			.map(|entry| entry.id);
		let listener_id = match existing {
			Some(listener_id) => listener_id,
			None => {
				let listener_id = ListenerId(self.next_listener.get());
				self.next_listener.set(listener_id.0 + 1);
				node.listeners.push(ListenerEntry {
					id: listener_id,
					callback: listener,
				});
				listener_id
			}
		};

		ListenerHandle {
			tree: Rc::downgrade(self),
			node: id,
			listener: Some(listener_id),
			released: Cell::new(false),
		}
	}

	fn remove_listener(&self, id: SubscriptionId, listener: ListenerId) {
		let removed = {
			let mut nodes = self.nodes.borrow_mut();
			nodes.get_mut(&id).and_then(|node| {
				node.listeners
					.iter()
					.position(|entry| entry.id == listener)
					.map(|index| node.listeners.remove(index))
			})
		};
		drop(removed);
	}

	fn has_listener(&self, id: SubscriptionId, listener: ListenerId) -> bool {
		self.nodes.borrow().get(&id).is_some_and(|node| {
			node.active && node.listeners.iter().any(|entry| entry.id == listener)
		})
	}

	fn handle_change(&self, id: SubscriptionId) {
		let callback = self
			.nodes
			.borrow()
			.get(&id)
			.and_then(|node| node.on_state_change.clone());
		if let Some(callback) = callback {
			callback();
		}
	}

	fn notify(&self, id: SubscriptionId) {
		if self.notifying.get() {
			let mut pending = self.pending.borrow_mut();
			if !pending.contains(&id) {
				pending.push(id);
			}
			tracing::debug!(subscription = %id, "notification queued behind running pass");
			return;
		}

		self.notifying.set(true);
		let _guard = NotifyGuard(self);

		let mut next = Some(id);
		while let Some(start) = next {
			self.notify_pass(start);
			let mut pending = self.pending.borrow_mut();
			next = if pending.is_empty() {
				None
			} else {
				Some(pending.remove(0))
			};
		}
	}

	fn notify_pass(&self, start: SubscriptionId) {
		let mut queue = VecDeque::from([start]);

		while let Some(id) = queue.pop_front() {
			let listeners: Vec<(ListenerId, Listener)> = match self.nodes.borrow().get(&id) {
				Some(node) if node.active => node
					.listeners
					.iter()
					.map(|entry| (entry.id, entry.callback.clone()))
					.collect(),
				_ => continue,
			};

			for (listener_id, callback) in listeners {
				if self.has_listener(id, listener_id) {
					callback();
				}
			}

			if let Some(node) = self.nodes.borrow().get(&id).filter(|node| node.active) {
				queue.extend(node.children.iter().copied());
			}
		}
	}

	fn set_on_state_change(&self, id: SubscriptionId, callback: Option<Listener>) {
		let previous = {
			let mut nodes = self.nodes.borrow_mut();
			match nodes.get_mut(&id) {
				Some(node) => core::mem::replace(&mut node.on_state_change, callback),
				None => callback,
			}
		};
		drop(previous);
	}

	fn release(&self, id: SubscriptionId) {
		self.try_unsubscribe(id);
		let removed = self.nodes.borrow_mut().remove(&id);
		drop(removed);
		tracing::trace!(subscription = %id, "subscription released");
	}

	fn with_node<R>(&self, id: SubscriptionId, f: impl FnOnce(&SubscriptionNode) -> R) -> Option<R> {
		self.nodes.borrow().get(&id).map(f)
	}
}

struct SubscriptionHandle {
	id: SubscriptionId,
	tree: Rc<SubscriptionTree>,
}

impl Drop for SubscriptionHandle {
	fn drop(&mut self) {
		self.tree.release(self.id);
	}
}

/// Handle to a node in a subscription tree.
///
/// Cloning yields another handle to the same node. When the last handle is
/// dropped the node is unsubscribed and removed from its tree.
#[derive(Clone)]
pub struct Subscription {
	handle: Rc<SubscriptionHandle>,
}

/// Creates a subscription bound to `store`.
///
/// With a `parent` the new node becomes a child of that node and never
/// talks to the store directly; otherwise it is the root of a new tree.
pub fn create_subscription<St>(store: Rc<St>, parent: Option<&Subscription>) -> Subscription
where
	St: Store + ?Sized + 'static,
{
	match parent {
		Some(parent) => Subscription::nested(parent),
		None => Subscription::root(store),
	}
}

impl Subscription {
	/// Creates the root of a new tree listening to `store`.
	pub fn root<St>(store: Rc<St>) -> Self
	where
		St: Store + ?Sized + 'static,
	{
		let subscribe: StoreSubscribe = Rc::new(move |listener| store.subscribe(listener));
		let tree = Rc::new(SubscriptionTree::new(subscribe));
		let id = tree.insert(None);
		Self {
			handle: Rc::new(SubscriptionHandle { id, tree }),
		}
	}

	/// Creates a child of `parent` in the same tree.
	///
	/// The child is inactive until [`try_subscribe`](Self::try_subscribe) or
	/// [`add_nested_sub`](Self::add_nested_sub) is called.
	pub fn nested(parent: &Subscription) -> Self {
		let tree = parent.handle.tree.clone();
		let id = tree.insert(Some(parent.id()));
		Self {
			handle: Rc::new(SubscriptionHandle { id, tree }),
		}
	}

	/// This node's id.
	pub fn id(&self) -> SubscriptionId {
		self.handle.id
	}

	/// The parent node's id, `None` for a root.
	pub fn parent_id(&self) -> Option<SubscriptionId> {
		self.tree().with_node(self.id(), |node| node.parent).flatten()
	}

	fn tree(&self) -> &Rc<SubscriptionTree> {
		&self.handle.tree
	}

	/// Starts receiving upstream notifications. Does nothing if already
	/// active.
	///
	/// A root registers with the store. A nested node attaches itself to its
	/// parent, activating the parent first if needed.
	pub fn try_subscribe(&self) {
		self.tree().try_subscribe(self.id());
	}

	/// Stops receiving notifications. Does nothing if already inactive.
	///
	/// Clears the listener set, detaches from the store or parent, and
	/// deactivates every descendant. Safe to call from inside a listener.
	pub fn try_unsubscribe(&self) {
		self.tree().try_unsubscribe(self.id());
	}

	/// Registers `listener`, activating this node first if necessary.
	///
	/// Registering the same `Rc` twice keeps a single entry.
	pub fn add_nested_sub(&self, listener: Listener) -> ListenerHandle {
		self.tree().add_listener(self.id(), listener)
	}

	/// Delivers a notification to this node's listeners and then to every
	/// descendant in level order.
	pub fn notify_nested_subs(&self) {
		self.tree().notify(self.id());
	}

	/// Invokes the `on_state_change` callback, if one is set.
	pub fn handle_change_wrapper(&self) {
		self.tree().handle_change(self.id());
	}

	/// Sets the callback run when the upstream source reports a change.
	pub fn set_on_state_change<F>(&self, callback: F)
	where
		F: Fn() + 'static,
	{
		self.tree()
			.set_on_state_change(self.id(), Some(Rc::new(callback)));
	}

	/// Removes the `on_state_change` callback.
	pub fn clear_on_state_change(&self) {
		self.tree().set_on_state_change(self.id(), None);
	}

	/// Whether this node currently receives notifications.
	pub fn is_subscribed(&self) -> bool {
		self.tree().is_active(self.id())
	}

	/// Number of listeners registered on this node.
	pub fn listener_count(&self) -> usize {
		self.tree()
			.with_node(self.id(), |node| node.listeners.len())
			.unwrap_or(0)
	}

	/// Number of active children attached to this node.
	pub fn child_count(&self) -> usize {
		self.tree()
			.with_node(self.id(), |node| node.children.len())
			.unwrap_or(0)
	}

	/// Listeners plus attached children.
	pub fn nested_count(&self) -> usize {
		self.listener_count() + self.child_count()
	}

	/// Whether a notification pass is running anywhere in this tree.
	pub fn is_notifying(&self) -> bool {
		self.tree().notifying.get()
	}

	/// Number of nodes currently held by this tree's arena.
	pub fn tree_size(&self) -> usize {
		self.tree().nodes.borrow().len()
	}

	/// Returns a handle that does not keep the node alive.
	pub fn downgrade(&self) -> WeakSubscription {
		WeakSubscription {
			handle: Rc::downgrade(&self.handle),
		}
	}
}

impl PartialEq for Subscription {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.handle, &other.handle)
	}
}

impl Eq for Subscription {}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id())
			.field("parent", &self.parent_id())
			.field("subscribed", &self.is_subscribed())
			.field("listeners", &self.listener_count())
			.field("children", &self.child_count())
			.finish()
	}
}

/// Non-owning reference to a [`Subscription`].
#[derive(Clone)]
pub struct WeakSubscription {
	handle: Weak<SubscriptionHandle>,
}

impl WeakSubscription {
	/// Returns the subscription if any strong handle is still alive.
	pub fn upgrade(&self) -> Option<Subscription> {
		self.handle
			.upgrade()
			.map(|handle| Subscription { handle })
	}
}

impl fmt::Debug for WeakSubscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WeakSubscription")
			.field("alive", &(self.handle.strong_count() > 0))
			.finish()
	}
}

/// Removes one listener registered with [`Subscription::add_nested_sub`].
///
/// Dropping the handle leaves the listener registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
pub struct ListenerHandle {
	tree: Weak<SubscriptionTree>,
	node: SubscriptionId,
	listener: Option<ListenerId>,
	released: Cell<bool>,
}

impl ListenerHandle {
	fn detached(node: SubscriptionId) -> Self {
		Self {
			tree: Weak::new(),
			node,
			listener: None,
			released: Cell::new(true),
		}
	}

	/// Removes the listener. Subsequent calls do nothing.
	pub fn unsubscribe(&self) {
		if self.released.replace(true) {
			return;
		}
		if let (Some(tree), Some(listener)) = (self.tree.upgrade(), self.listener) {
			tree.remove_listener(self.node, listener);
		}
	}

	/// Whether the listener is still registered on an active node.
	pub fn is_active(&self) -> bool {
		if self.released.get() {
			return false;
		}
		match (self.tree.upgrade(), self.listener) {
			(Some(tree), Some(listener)) => tree.has_listener(self.node, listener),
			_ => false,
		}
	}

	/// The node the listener was registered on.
	pub fn subscription_id(&self) -> SubscriptionId {
		self.node
	}
}

impl fmt::Debug for ListenerHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ListenerHandle")
			.field("subscription", &self.node)
			.field("active", &self.is_active())
			.finish()
	}
}
