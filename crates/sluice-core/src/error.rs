//! Error types for store interaction.

/// Errors raised by a [`Store`](crate::Store) while dispatching.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
	/// An action was dispatched while the reducer was still running.
	#[error("Reducers may not dispatch actions")]
	ReducerDispatch,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
