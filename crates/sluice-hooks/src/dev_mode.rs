//! Development-mode selector checks
//!
//! Two checks catch common selector mistakes while developing:
//!
//! - **stability**: the selector is run a second time against the same
//!   state. If the equality function says the two results differ, the
//!   selector allocates a fresh value on every call and every dispatch will
//!   look like a change.
//! - **identity function**: the selector returns a value of the root state
//!   type, which usually means it returns the whole state and the binding
//!   will update on every dispatch.
//!
//! Checks only run in builds with `debug_assertions` enabled. Failures are
//! logged with `tracing::warn!` and returned to the caller; they never
//! abort the selector.

use core::any::{TypeId, type_name};

use serde::{Deserialize, Serialize};

/// How often a check runs for one selector binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckFrequency {
	/// Never run.
	Never,
	/// Run on the first computation only.
	#[default]
	Once,
	/// Run on every computation.
	Always,
}

impl CheckFrequency {
	/// Whether the check applies to a computation.
	pub fn applies(self, first_run: bool) -> bool {
		match self {
			Self::Never => false,
			Self::Once => first_run,
			Self::Always => true,
		}
	}
}

/// Per-binding check configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DevModeChecks {
	/// Frequency of the selector stability check.
	pub stability_check: CheckFrequency,
	/// Frequency of the identity function check.
	pub identity_function_check: CheckFrequency,
}

impl DevModeChecks {
	/// Disables both checks.
	pub const fn disabled() -> Self {
		Self {
			stability_check: CheckFrequency::Never,
			identity_function_check: CheckFrequency::Never,
		}
	}

	/// Sets the stability check frequency.
	pub fn with_stability_check(mut self, frequency: CheckFrequency) -> Self {
		self.stability_check = frequency;
		self
	}

	/// Sets the identity function check frequency.
	pub fn with_identity_function_check(mut self, frequency: CheckFrequency) -> Self {
		self.identity_function_check = frequency;
		self
	}
}

/// A failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevModeWarning {
	/// Two runs against the same state produced unequal results.
	UnstableSelector,
	/// The selector returns the root state type.
	IdentitySelector,
}

/// Runs the enabled checks for one computation of `selector`.
pub(crate) fn run_checks<S, T>(
	checks: DevModeChecks,
	first_run: bool,
	selector: &dyn Fn(&S) -> T,
	state: &S,
	selected: &T,
	equality: &dyn Fn(&T, &T) -> bool,
) -> Vec<DevModeWarning>
where
	S: 'static,
	T: 'static,
{
	let mut warnings = Vec::new();
	if !cfg!(debug_assertions) {
		return warnings;
	}

	if checks.stability_check.applies(first_run) {
		let again = selector(state);
		if !equality(selected, &again) {
			tracing::warn!(
				selected = type_name::<T>(),
				"selector returned a different result when called with the same state; \
				 this can lead to unnecessary updates, memoize derived values"
			);
			warnings.push(DevModeWarning::UnstableSelector);
		}
	}

	if checks.identity_function_check.applies(first_run) && TypeId::of::<T>() == TypeId::of::<S>() {
		tracing::warn!(
			state = type_name::<S>(),
			"selector returned the root state; it will update on every dispatch, \
			 select only the fields the component needs"
		);
		warnings.push(DevModeWarning::IdentitySelector);
	}

	warnings
}
