//! Type-erased registrations.
//!
//! A [`Registration`] owns one resolver closure that produces an
//! [`ErasedValue`]. The typed API narrows it back with
//! [`Registration::resolve_as`], which fails with
//! [`RabtError::TypeMismatch`] instead of coercing.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::binding::Binding;
use crate::error::{RabtError, Result, TypeMismatchError};
use crate::key::ServiceKey;

/// A resolved value with its concrete type hidden.
///
/// Remembers the name of the type it was built from so a failed
/// narrowing can report what was actually produced.
pub struct ErasedValue {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl ErasedValue {
    pub fn new<T: 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the type stored inside.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Narrows to `T`, or reports a mismatch for `key`.
    pub fn downcast<T: 'static>(self, key: &ServiceKey) -> Result<T> {
        let found = self.type_name;
        self.value.downcast::<T>().map(|b| *b).map_err(|_| {
            RabtError::TypeMismatch(TypeMismatchError {
                key: key.clone(),
                expected: type_name::<T>(),
                found,
            })
        })
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErasedValue({})", self.type_name)
    }
}

/// Type alias for stored resolver closures.
///
/// `Arc` because the container is shared between threads and
/// registrations are handed out of the registrar by clone.
pub type ResolverFn = Arc<dyn Fn(&dyn Resolver) -> Result<ErasedValue> + Send + Sync>;

/// What resolver closures receive to resolve their own dependencies.
///
/// The container passes a resolver bound to the current resolution
/// chain, so nested lookups take part in cycle detection. Use the
/// typed helpers from [`ResolverApi`].
pub trait Resolver {
    fn resolve_key(&self, key: &ServiceKey) -> Result<ErasedValue>;
}

/// Typed resolution on top of any [`Resolver`].
///
/// ```rust
/// use rabt_container::prelude::*;
///
/// let container = Container::new();
/// container.register_named::<u16>("port", |_| Ok(8080));
/// container.register::<String>(|r| {
///     let port: u16 = r.resolve_named("port")?;
///     Ok(format!("localhost:{port}"))
/// });
///
/// assert_eq!(container.resolve::<String>().unwrap(), "localhost:8080");
/// ```
pub trait ResolverApi: Resolver {
    /// Resolve the default binding of `T`.
    fn resolve<T: 'static>(&self) -> Result<T> {
        self.resolve_named::<T>("")
    }

    /// Resolve the binding of `T` registered under `name`.
    fn resolve_named<T: 'static>(&self, name: &str) -> Result<T> {
        let key = ServiceKey::create::<T>(name);
        self.resolve_key(&key)?.downcast(&key)
    }
}

impl<R: Resolver + ?Sized> ResolverApi for R {}

/// One stored binding.
#[derive(Clone)]
pub struct Registration {
    key: ServiceKey,
    binding: Binding,
    resolver: ResolverFn,
    dependencies: Vec<ServiceKey>,
}

impl Registration {
    pub fn new(key: ServiceKey, binding: Binding, resolver: ResolverFn) -> Self {
        Self {
            key,
            binding,
            resolver,
            dependencies: Vec::new(),
        }
    }

    /// Wraps a typed resolver.
    pub fn typed<T: 'static>(
        key: ServiceKey,
        binding: Binding,
        resolver: impl Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            key,
            binding,
            Arc::new(move |r: &dyn Resolver| resolver(r).map(ErasedValue::new)),
        )
    }

    /// Records the keys this binding resolves when it runs.
    pub fn with_dependencies(mut self, dependencies: Vec<ServiceKey>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// Declared dependencies, empty when the binding did not declare any.
    pub fn dependencies(&self) -> &[ServiceKey] {
        &self.dependencies
    }

    /// Runs the resolver.
    pub fn resolve(&self, resolver: &dyn Resolver) -> Result<ErasedValue> {
        (self.resolver)(resolver)
    }

    /// Runs the resolver and narrows the result to `T`.
    ///
    /// # Errors
    /// Whatever the resolver returns, or [`RabtError::TypeMismatch`]
    /// when it produced something other than `T`.
    pub fn resolve_as<T: 'static>(&self, resolver: &dyn Resolver) -> Result<T> {
        self.resolve(resolver)?.downcast(&self.key)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("binding", &self.binding)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
