//! Container settings.
//!
//! Settings derive serde so applications can keep them in whatever
//! configuration file they already load. Missing fields take their
//! defaults.

use serde::{Deserialize, Serialize};

/// Tunables for a [`Container`](crate::container::Container).
///
/// # Examples
/// ```
/// use rabt_container::settings::ContainerSettings;
///
/// let settings = ContainerSettings::default();
/// assert!(!settings.warn_on_override);
/// assert_eq!(settings.max_suggestions, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Log replaced bindings at `warn` rather than `debug`.
    pub warn_on_override: bool,

    /// Upper bound on "did you mean" entries in `NotRegistered` errors.
    pub max_suggestions: usize,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            warn_on_override: false,
            max_suggestions: 3,
        }
    }
}
