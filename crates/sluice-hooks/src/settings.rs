//! Provider-level binding settings
//!
//! Settings are attached to a store provider and inherited by every selector
//! binding below it. A binding may override them per call through
//! [`SelectorOptions`](crate::SelectorOptions).
//!
//! Settings can be built in code or loaded from TOML:
//!
//! ```toml
//! [dev_mode_checks]
//! stability_check = "always"
//! identity_function_check = "never"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dev_mode::DevModeChecks;
use crate::error::{HookError, HookResult};

/// Configuration shared by all bindings below one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingSettings {
	/// Development-mode selector checks.
	pub dev_mode_checks: DevModeChecks,
}

impl BindingSettings {
	/// Replaces the development-mode checks.
	pub fn with_dev_mode_checks(mut self, checks: DevModeChecks) -> Self {
		self.dev_mode_checks = checks;
		self
	}

	/// Load settings from a TOML file.
	///
	/// # Errors
	///
	/// Returns error if the file cannot be read or parsed.
	pub fn from_file(path: impl AsRef<Path>) -> HookResult<Self> {
		let content =
			std::fs::read_to_string(path.as_ref()).map_err(|e| HookError::SettingsIo {
				path: path.as_ref().to_path_buf(),
				source: e,
			})?;

		Self::from_toml(&content)
	}

	/// Parse settings from a TOML string. Missing keys keep their defaults.
	pub fn from_toml(content: &str) -> HookResult<Self> {
		toml::from_str(content).map_err(|e| HookError::SettingsParse {
			message: e.to_string(),
		})
	}
}
