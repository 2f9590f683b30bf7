//! Compile-time capability contracts used by the registration helpers.
//!
//! - [`Implements`]: an implementation may be bound under an interface.
//!   Written with the [`implements!`](crate::implements) macro, whose
//!   body only type-checks when the type really implements the trait.
//! - [`Inject`]: a type can be built from a tuple of dependencies.
//! - [`Dependencies`]: a tuple of services resolvable from a container.
//!
//! Misuse of any of these is a compile error, never a failed `resolve`.

use std::sync::Arc;

use crate::error::Result;
use crate::key::ServiceKey;
use crate::registration::{Resolver, ResolverApi};

/// A callable bound as a service, for deferred construction.
pub type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// A callable bound as a service that takes a runtime argument.
///
/// Use a tuple for several arguments.
pub type ArgFactory<A, T> = Arc<dyn Fn(A) -> T + Send + Sync>;

/// `Self` can stand in for the interface `I`.
///
/// Implemented for every type as its own interface. For trait objects
/// use [`implements!`](crate::implements):
///
/// ```rust
/// use rabt_container::implements;
/// use rabt_container::inject::Implements;
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct FixedClock;
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 { 7 }
/// }
///
/// implements!(FixedClock => dyn Clock);
///
/// let clock: Arc<dyn Clock> = Arc::new(FixedClock).into_interface();
/// assert_eq!(clock.now(), 7);
/// ```
pub trait Implements<I: ?Sized> {
    fn into_interface(self: Arc<Self>) -> Arc<I>;
}

impl<T> Implements<T> for T {
    fn into_interface(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declares that a type may be bound under one or more trait objects.
///
/// Expands to [`Implements`] impls whose bodies are plain unsizing
/// coercions, so naming a trait the type does not implement fails to
/// compile.
///
/// ```compile_fail
/// use rabt_container::implements;
///
/// trait Clock {}
/// struct NotAClock;
///
/// implements!(NotAClock => dyn Clock);
/// ```
#[macro_export]
macro_rules! implements {
    ($implementation:ty => $($interface:ty),+ $(,)?) => {
        $(
            impl $crate::inject::Implements<$interface> for $implementation {
                fn into_interface(
                    self: ::std::sync::Arc<Self>,
                ) -> ::std::sync::Arc<$interface> {
                    self
                }
            }
        )+
    };
}

/// Builds `Self` from resolved dependencies.
///
/// Types with a [`Default`] impl can be built from no dependencies.
///
/// ```rust
/// use rabt_container::inject::Inject;
/// use std::sync::Arc;
///
/// struct Config { timeout: u32 }
/// struct Client { timeout: u32 }
///
/// impl Inject<(Arc<Config>,)> for Client {
///     fn inject((config,): (Arc<Config>,)) -> Self {
///         Client { timeout: config.timeout }
///     }
/// }
///
/// let client = Client::inject((Arc::new(Config { timeout: 30 }),));
/// assert_eq!(client.timeout, 30);
/// ```
pub trait Inject<Deps>: Sized {
    fn inject(deps: Deps) -> Self;
}

impl<T: Default> Inject<()> for T {
    fn inject(_: ()) -> Self {
        T::default()
    }
}

/// A tuple of services resolved by their default bindings.
pub trait Dependencies: Sized {
    /// Resolves every element, left to right.
    fn resolve_all(resolver: &dyn Resolver) -> Result<Self>;

    /// Keys of the elements, for dependency validation.
    fn keys() -> Vec<ServiceKey>;
}

impl Dependencies for () {
    fn resolve_all(_: &dyn Resolver) -> Result<Self> {
        Ok(())
    }

    fn keys() -> Vec<ServiceKey> {
        Vec::new()
    }
}

macro_rules! impl_dependencies_tuple {
    ($($T:ident),+) => {
        impl<$($T: 'static),+> Dependencies for ($($T,)+) {
            fn resolve_all(resolver: &dyn Resolver) -> Result<Self> {
                Ok(($(resolver.resolve::<$T>()?,)+))
            }

            fn keys() -> Vec<ServiceKey> {
                vec![$(ServiceKey::of::<$T>()),+]
            }
        }
    };
}

impl_dependencies_tuple!(A);
impl_dependencies_tuple!(A, B);
impl_dependencies_tuple!(A, B, C);
impl_dependencies_tuple!(A, B, C, D);
impl_dependencies_tuple!(A, B, C, D, E);
impl_dependencies_tuple!(A, B, C, D, E, F);
impl_dependencies_tuple!(A, B, C, D, E, F, G);
impl_dependencies_tuple!(A, B, C, D, E, F, G, H);
