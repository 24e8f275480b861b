//! Reactive primitives
//!
//! - [`subscription`]: the propagation tree that fans store notifications out
//!   to nested listeners in level order.
//! - [`signal`]: a single-threaded observable cell holding a derived value.
//! - [`context`] and [`scope`]: typed provide/inject channels resolved
//!   through a tree of scopes with disposal hooks.

pub mod context;
pub mod scope;
pub mod signal;
pub mod subscription;

pub use context::{Context, ContextId};
pub use scope::{Scope, ScopeId};
pub use signal::{ReadSignal, Signal, SignalSubscription};
pub use subscription::{
	ListenerHandle, Subscription, SubscriptionId, WeakSubscription, create_subscription,
};
