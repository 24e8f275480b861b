//! Component scopes
//!
//! A [`Scope`] stands in for a mounted component: it carries provided
//! values, resolves injected ones through its ancestors, and runs cleanup
//! callbacks when it is disposed.
//!
//! ## Resolution rules
//!
//! - [`Scope::inject`] starts at the *parent* scope and walks upward, so a
//!   component never observes what it provided itself.
//! - A root scope has no parent and resolves against its own provides. This
//!   is how application-level values are installed.
//!
//! ## Disposal
//!
//! [`Scope::dispose`] disposes child scopes first (most recently created
//! first), then runs the scope's own cleanups in reverse registration order,
//! then detaches the scope from its parent. Disposing twice is a no-op.
//! Dropping a scope without disposing it runs no cleanups.

use core::any::{Any, TypeId};
use core::cell::{Cell, RefCell};
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::HashMap;

extern crate alloc;
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;

use super::context::{Context, ContextId};

/// Unique identifier of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
	fn next() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for ScopeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "scope#{}", self.0)
	}
}

type ProvideKey = (ContextId, TypeId);
type Cleanup = Box<dyn FnOnce()>;

struct ScopeInner {
	id: ScopeId,
	parent: Option<Weak<ScopeInner>>,
	children: RefCell<Vec<Rc<ScopeInner>>>,
	provides: RefCell<HashMap<ProvideKey, Rc<dyn Any>>>,
	cleanups: RefCell<Vec<Cleanup>>,
	disposed: Cell<bool>,
}

impl ScopeInner {
	fn new(parent: Option<Weak<ScopeInner>>) -> Self {
		Self {
			id: ScopeId::next(),
			parent,
			children: RefCell::new(Vec::new()),
			provides: RefCell::new(HashMap::new()),
			cleanups: RefCell::new(Vec::new()),
			disposed: Cell::new(false),
		}
	}

	fn lookup(&self, key: &ProvideKey) -> Option<Rc<dyn Any>> {
		self.provides.borrow().get(key).cloned()
	}
}

/// A node in the component tree.
///
/// Cloning a `Scope` yields another handle to the same node.
#[derive(Clone)]
pub struct Scope {
	inner: Rc<ScopeInner>,
}

impl Scope {
	/// Creates an application-level scope.
	pub fn root() -> Self {
		let scope = Self {
			inner: Rc::new(ScopeInner::new(None)),
		};
		tracing::trace!(scope = %scope.id(), "root scope created");
		scope
	}

	/// Creates a child scope, the equivalent of mounting a component below
	/// this one.
	pub fn child(&self) -> Self {
		let inner = Rc::new(ScopeInner::new(Some(Rc::downgrade(&self.inner))));
		self.inner.children.borrow_mut().push(inner.clone());
		tracing::trace!(scope = %inner.id, parent = %self.id(), "child scope created");
		Self { inner }
	}

	/// Returns this scope's id.
	pub fn id(&self) -> ScopeId {
		self.inner.id
	}

	/// Returns the parent scope, if it is still alive.
	pub fn parent(&self) -> Option<Scope> {
		self.inner
			.parent
			.as_ref()
			.and_then(Weak::upgrade)
			.map(|inner| Scope { inner })
	}

	/// Whether this scope has no parent.
	pub fn is_root(&self) -> bool {
		self.inner.parent.is_none()
	}

	/// Whether [`dispose`](Self::dispose) has run.
	pub fn is_disposed(&self) -> bool {
		self.inner.disposed.get()
	}

	/// Number of live child scopes.
	pub fn child_count(&self) -> usize {
		self.inner.children.borrow().len()
	}

	/// Makes `value` available to descendants under `ctx`.
	///
	/// Providing twice on the same scope replaces the earlier value.
	pub fn provide<T: 'static>(&self, ctx: &Context<T>, value: T) {
		let key = (ctx.id(), TypeId::of::<T>());
		let previous = self
			.inner
			.provides
			.borrow_mut()
			.insert(key, Rc::new(value) as Rc<dyn Any>);
		drop(previous);
	}

	/// Resolves the nearest value provided under `ctx`.
	///
	/// See the module documentation for the resolution rules.
	pub fn inject<T: Clone + 'static>(&self, ctx: &Context<T>) -> Option<T> {
		let key = (ctx.id(), TypeId::of::<T>());

		let mut current = match &self.inner.parent {
			Some(parent) => parent.upgrade(),
			None => Some(self.inner.clone()),
		};
		while let Some(scope) = current {
			if let Some(value) = scope.lookup(&key) {
				return value.downcast_ref::<T>().cloned();
			}
			current = scope.parent.as_ref().and_then(Weak::upgrade);
		}
		None
	}

	/// Whether this scope itself provides a value under `ctx`.
	pub fn provides<T: 'static>(&self, ctx: &Context<T>) -> bool {
		let key = (ctx.id(), TypeId::of::<T>());
		self.inner.provides.borrow().contains_key(&key)
	}

	/// Registers a callback to run when the scope is disposed.
	///
	/// On an already-disposed scope the callback runs immediately.
	pub fn on_dispose<F>(&self, cleanup: F)
	where
		F: FnOnce() + 'static,
	{
		if self.is_disposed() {
			cleanup();
			return;
		}
		self.inner.cleanups.borrow_mut().push(Box::new(cleanup));
	}

	/// Tears the scope down. See the module documentation for ordering.
	pub fn dispose(&self) {
		if self.inner.disposed.replace(true) {
			return;
		}
		tracing::trace!(scope = %self.id(), "disposing scope");

		let children = core::mem::take(&mut *self.inner.children.borrow_mut());
		for child in children.into_iter().rev() {
			Scope { inner: child }.dispose();
		}

		let cleanups = core::mem::take(&mut *self.inner.cleanups.borrow_mut());
		for cleanup in cleanups.into_iter().rev() {
			cleanup();
		}

		let provides = core::mem::take(&mut *self.inner.provides.borrow_mut());
		drop(provides);

		if let Some(parent) = self.inner.parent.as_ref().and_then(Weak::upgrade) {
			let detached = {
				let mut siblings = parent.children.borrow_mut();
				siblings
					.iter()
					.position(|child| Rc::ptr_eq(child, &self.inner))
					.map(|index| siblings.remove(index))
			};
			drop(detached);
		}
	}
}

impl PartialEq for Scope {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Scope {}

impl fmt::Debug for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Scope")
			.field("id", &self.inner.id)
			.field("children", &self.child_count())
			.field("provides", &self.inner.provides.borrow().len())
			.field("disposed", &self.is_disposed())
			.finish()
	}
}
