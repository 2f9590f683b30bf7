//! Error types for container operations.
//!
//! Every failure names the service key involved, and the message says
//! what to change rather than just what went wrong.

use std::fmt;

use rabt_support::rendering::{render_chain, shorten_type_name, suggest_similar};

use crate::key::ServiceKey;

/// Main error type for all rabt operations.
#[derive(Debug, thiserror::Error)]
pub enum RabtError {
    /// Requested service was never registered.
    #[error("{}", .0)]
    NotRegistered(NotRegisteredError),

    /// A resolution chain re-entered a service it was already building.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A resolver produced a value of a different type than requested.
    #[error("{}", .0)]
    TypeMismatch(TypeMismatchError),

    /// A user resolver returned its own error.
    #[error("Failed to construct {key}: {source}")]
    ConstructionFailed {
        key: ServiceKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RabtError {
    /// Wraps an error raised while building `T`.
    ///
    /// ```
    /// use rabt_container::error::RabtError;
    ///
    /// let err = RabtError::construction::<u16>("port out of range");
    /// assert!(err.to_string().contains("u16"));
    /// ```
    pub fn construction<T: ?Sized + 'static>(
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        RabtError::ConstructionFailed {
            key: ServiceKey::of::<T>(),
            source: source.into(),
        }
    }

    /// The key the error is about.
    pub fn key(&self) -> &ServiceKey {
        match self {
            RabtError::NotRegistered(e) => &e.requested,
            RabtError::CircularDependency(e) => e.key(),
            RabtError::TypeMismatch(e) => &e.key,
            RabtError::ConstructionFailed { key, .. } => key,
        }
    }
}

/// A service was requested that has no registration.
#[derive(Debug)]
pub struct NotRegisteredError {
    /// The service that was requested
    pub requested: ServiceKey,
    /// The service whose resolver asked for it, if any
    pub required_by: Option<ServiceKey>,
    /// Registered keys with similar names
    pub suggestions: Vec<ServiceKey>,
}

impl NotRegisteredError {
    /// Builds the error, picking suggestions among `registered`.
    pub(crate) fn new(
        requested: ServiceKey,
        required_by: Option<ServiceKey>,
        registered: &[ServiceKey],
        max_suggestions: usize,
    ) -> Self {
        let rendered: Vec<String> = registered.iter().map(ToString::to_string).collect();
        let candidates: Vec<&str> = rendered.iter().map(String::as_str).collect();

        let suggestions = suggest_similar(&requested.to_string(), &candidates, max_suggestions)
            .into_iter()
            .filter_map(|s| registered.iter().find(|k| k.to_string() == s).cloned())
            .collect();

        Self {
            requested,
            required_by,
            suggestions,
        }
    }
}

impl fmt::Display for NotRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service not registered: {}", self.requested)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        let ty = shorten_type_name(self.requested.type_name());
        match self.requested.name() {
            Some(name) => write!(f, "\n  Hint: register it with .register_named::<{ty}>({name:?}, ..)"),
            None => write!(f, "\n  Hint: register it with .register::<{ty}>(..)"),
        }
    }
}

/// A resolution chain entered the same service twice.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// The key that was re-entered.
    pub key: ServiceKey,
    /// The cycle, first and last entries being `key`.
    /// Example: `[ServiceA, ServiceB, ServiceA]`
    pub chain: Vec<ServiceKey>,
}

impl CircularDependencyError {
    pub fn key(&self) -> &ServiceKey {
        &self.key
    }
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected while resolving {}:\n  ", self.key())?;

        let links: Vec<String> = self.chain.iter().map(ServiceKey::short_name).collect();
        write!(f, "{}", render_chain(&links))?;

        write!(
            f,
            "\n  Hint: inject a factory instead of the service to break the cycle"
        )
    }
}

/// The value a resolver produced is not of the requested type.
#[derive(Debug)]
pub struct TypeMismatchError {
    pub key: ServiceKey,
    pub expected: &'static str,
    pub found: &'static str,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type mismatch resolving {}: expected {}, resolver produced {}",
            self.key, self.expected, self.found,
        )
    }
}

/// Convenient Result type for rabt operations.
pub type Result<T> = std::result::Result<T, RabtError>;
