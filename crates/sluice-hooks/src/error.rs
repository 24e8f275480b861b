//! Error types for the hooks layer.

use std::path::PathBuf;

use sluice_core::ContextId;

/// Errors raised by providers, hooks and settings loading.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum HookError {
	/// A hook ran outside every provider of its channel.
	#[error(
		"could not find a store on {channel}; mount the component below a store provider"
	)]
	MissingStore {
		/// Channel the hook looked up.
		channel: ContextId,
	},

	/// Binding settings could not be parsed.
	#[error("invalid binding settings: {message}")]
	SettingsParse {
		/// Parser error message.
		message: String,
	},

	/// A settings file could not be read.
	#[error("failed to read binding settings from {path}: {source}")]
	SettingsIo {
		/// File that was being read.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},
}

/// Result alias for hook operations.
pub type HookResult<T> = Result<T, HookError>;
