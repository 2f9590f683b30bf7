//! Binding kinds.
//!
//! Every registration remembers which helper created it. The kind
//! decides nothing at resolve time (the resolver closure already
//! encodes the behaviour) but it shows up in logs, `Debug` output and
//! [`Container::binding_of`](crate::container::Container::binding_of).
use std::fmt;

/// How a service was bound.
///
/// # Examples
/// ```
/// use rabt_container::binding::Binding;
///
/// assert!(Binding::Instance.is_singleton());
/// assert!(!Binding::Shared.is_singleton());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// A raw resolver closure. Runs on every resolve.
    Resolver,

    /// Interface bound to an implementation built from its declared
    /// dependencies. A fresh instance on every resolve.
    Shared,

    /// A pre-built instance. Every resolve hands out the same `Arc`.
    Instance,

    /// Built by its resolver on first resolve, then reused.
    Singleton,

    /// The service is a callable that builds values on demand.
    Factory,
}

impl Binding {
    /// Returns `true` if every resolve yields the same instance.
    #[inline]
    pub fn is_singleton(&self) -> bool {
        matches!(self, Binding::Instance | Binding::Singleton)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Binding::Resolver => "resolver",
            Binding::Shared => "shared",
            Binding::Instance => "instance",
            Binding::Singleton => "singleton",
            Binding::Factory => "factory",
        })
    }
}
