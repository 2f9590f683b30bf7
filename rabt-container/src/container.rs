//! # The rabt container
//!
//! Registers construction recipes under [`ServiceKey`]s and resolves
//! them on demand, rejecting circular dependency chains.
//!
//! # Architecture
//! ```text
//! register_*  ──>  Registrar  (ServiceKey -> Registration)
//!                       │
//! resolve::<T>()        │ get(key)
//!   │                   ▼
//!   └─ DependencyChainTracker ─> Registration::resolve_as::<T>(ChainResolver)
//!                                         │
//!                          nested r.resolve::<U>() on the same chain
//! ```
//!
//! # Examples
//! ```rust
//! use rabt_container::prelude::*;
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, msg: &str) -> String;
//! }
//!
//! #[derive(Default)]
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, msg: &str) -> String { format!("[log] {msg}") }
//! }
//! implements!(ConsoleLogger => dyn Logger);
//!
//! struct UserService {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! let container = Container::new();
//! container
//!     .register_shared::<dyn Logger, ConsoleLogger, ()>()
//!     .register::<UserService>(|r| {
//!         let logger: Arc<dyn Logger> = r.resolve()?;
//!         Ok(UserService { logger })
//!     });
//!
//! let service: UserService = container.resolve().expect("Failed to resolve");
//! assert_eq!(service.logger.log("hi"), "[log] hi");
//! ```

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, instrument, trace};

use crate::binding::Binding;
use crate::chain::{ChainGuard, DependencyChainTracker};
use crate::error::{NotRegisteredError, RabtError, Result};
use crate::graph::GraphValidator;
use crate::inject::{ArgFactory, Dependencies, Factory, Implements, Inject};
use crate::key::ServiceKey;
use crate::module::Module;
use crate::registrar::Registrar;
use crate::registration::{ErasedValue, Registration, Resolver};
use crate::settings::ContainerSettings;

/// Thread-safe dependency injection container.
///
/// Registration takes `&self`, so a container can be shared (for
/// example in an `Arc`) and still accept bindings. Every `register_*`
/// helper returns `&Self` for chaining. Registering a key twice keeps
/// the later binding.
pub struct Container {
    registrar: Registrar,
    settings: ContainerSettings,
}

impl Container {
    pub fn new() -> Self {
        Self::with_settings(ContainerSettings::default())
    }

    pub fn with_settings(settings: ContainerSettings) -> Self {
        Self {
            registrar: Registrar::new().warn_on_override(settings.warn_on_override),
            settings,
        }
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    // ── Raw resolvers ──

    /// Register a resolver for `T`. It runs on every resolve.
    ///
    /// The resolver receives a [`Resolver`] for its own dependencies;
    /// lookups made through it take part in cycle detection.
    pub fn register<T: 'static>(
        &self,
        resolver: impl Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
    ) -> &Self {
        self.register_named("", resolver)
    }

    /// Register a resolver for `T` under `name`.
    pub fn register_named<T: 'static>(
        &self,
        name: &str,
        resolver: impl Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
    ) -> &Self {
        self.add_registration(Registration::typed(
            ServiceKey::create::<T>(name),
            Binding::Resolver,
            resolver,
        ))
    }

    /// Store a prepared [`Registration`] as is.
    pub fn add_registration(&self, registration: Registration) -> &Self {
        self.registrar.register(registration);
        self
    }

    // ── Interface -> implementation ──

    /// Bind `Arc<I>` to a resolver producing `Arc<Impl>`.
    ///
    /// `Impl: Implements<I>` is checked at compile time; see
    /// [`implements!`](crate::implements).
    pub fn register_as<I, Impl>(
        &self,
        resolver: impl Fn(&dyn Resolver) -> Result<Arc<Impl>> + Send + Sync + 'static,
    ) -> &Self
    where
        I: ?Sized + 'static,
        Impl: Implements<I> + 'static,
    {
        self.register_as_named::<I, Impl>("", resolver)
    }

    pub fn register_as_named<I, Impl>(
        &self,
        name: &str,
        resolver: impl Fn(&dyn Resolver) -> Result<Arc<Impl>> + Send + Sync + 'static,
    ) -> &Self
    where
        I: ?Sized + 'static,
        Impl: Implements<I> + 'static,
    {
        self.add_registration(Registration::typed::<Arc<I>>(
            ServiceKey::create::<Arc<I>>(name),
            Binding::Resolver,
            move |r| resolver(r).map(<Impl as Implements<I>>::into_interface),
        ))
    }

    /// Bind `Arc<I>` to a fresh `Impl` built from `Deps` on every resolve.
    ///
    /// Each element of the `Deps` tuple is resolved by its default
    /// binding. Not a singleton: two resolves build two instances.
    pub fn register_shared<I, Impl, Deps>(&self) -> &Self
    where
        I: ?Sized + 'static,
        Impl: Inject<Deps> + Implements<I> + 'static,
        Deps: Dependencies + 'static,
    {
        self.register_shared_named::<I, Impl, Deps>("")
    }

    pub fn register_shared_named<I, Impl, Deps>(&self, name: &str) -> &Self
    where
        I: ?Sized + 'static,
        Impl: Inject<Deps> + Implements<I> + 'static,
        Deps: Dependencies + 'static,
    {
        let registration = Registration::typed::<Arc<I>>(
            ServiceKey::create::<Arc<I>>(name),
            Binding::Shared,
            |r| {
                let deps = Deps::resolve_all(r)?;
                let instance = Arc::new(<Impl as Inject<Deps>>::inject(deps));
                Ok(<Impl as Implements<I>>::into_interface(instance))
            },
        )
        .with_dependencies(Deps::keys());

        self.add_registration(registration)
    }

    // ── Singletons ──

    /// Bind a pre-built instance. Every resolve of `Arc<T>` returns a
    /// handle to this same instance.
    pub fn register_instance<T>(&self, instance: Arc<T>) -> &Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.register_instance_named("", instance)
    }

    pub fn register_instance_named<T>(&self, name: &str, instance: Arc<T>) -> &Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add_registration(Registration::typed(
            ServiceKey::create::<Arc<T>>(name),
            Binding::Instance,
            move |_| Ok(Arc::clone(&instance)),
        ))
    }

    /// Bind `Arc<T>` to a resolver that runs once, on first resolve.
    ///
    /// A failed first run is not cached; the next resolve retries.
    ///
    /// # Deadlocks
    /// Concurrent first resolves block on the one initialization in
    /// progress. Two lazy singletons that resolve each other therefore
    /// deadlock when two threads start building them at the same time:
    /// each thread waits inside the other's initialization, and neither
    /// chain contains the other key. On a single thread the same
    /// bindings fail with [`RabtError::CircularDependency`].
    /// [`Container::validate`] does not see these edges because
    /// singleton resolvers declare no dependencies; keep such pairs
    /// acyclic or break them with a [`Factory`].
    pub fn register_singleton<T: Send + Sync + 'static>(
        &self,
        resolver: impl Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
    ) -> &Self {
        self.register_singleton_named("", resolver)
    }

    /// Named form of [`Container::register_singleton`], with the same
    /// deadlock caveat for mutually dependent singletons.
    pub fn register_singleton_named<T: Send + Sync + 'static>(
        &self,
        name: &str,
        resolver: impl Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
    ) -> &Self {
        let cell: OnceCell<Arc<T>> = OnceCell::new();

        self.add_registration(Registration::typed(
            ServiceKey::create::<Arc<T>>(name),
            Binding::Singleton,
            move |r| cell.get_or_try_init(|| resolver(r).map(Arc::new)).cloned(),
        ))
    }

    // ── Factories ──

    /// Bind the callable itself, resolved as [`Factory<T>`].
    ///
    /// ```rust
    /// use rabt_container::prelude::*;
    ///
    /// let container = Container::new();
    /// container.register_factory(|| vec![0u8; 4]);
    ///
    /// let make: Factory<Vec<u8>> = container.resolve().unwrap();
    /// assert_eq!(make().len(), 4);
    /// ```
    pub fn register_factory<T: 'static>(&self, factory: impl Fn() -> T + Send + Sync + 'static) -> &Self {
        self.register_factory_named("", factory)
    }

    pub fn register_factory_named<T: 'static>(
        &self,
        name: &str,
        factory: impl Fn() -> T + Send + Sync + 'static,
    ) -> &Self {
        let factory: Factory<T> = Arc::new(factory);

        self.add_registration(Registration::typed(
            ServiceKey::create::<Factory<T>>(name),
            Binding::Factory,
            move |_| Ok(Arc::clone(&factory)),
        ))
    }

    /// Bind a callable taking a runtime argument, resolved as
    /// [`ArgFactory<A, T>`].
    pub fn register_arg_factory<A: 'static, T: 'static>(
        &self,
        factory: impl Fn(A) -> T + Send + Sync + 'static,
    ) -> &Self {
        self.register_arg_factory_named("", factory)
    }

    pub fn register_arg_factory_named<A: 'static, T: 'static>(
        &self,
        name: &str,
        factory: impl Fn(A) -> T + Send + Sync + 'static,
    ) -> &Self {
        let factory: ArgFactory<A, T> = Arc::new(factory);

        self.add_registration(Registration::typed(
            ServiceKey::create::<ArgFactory<A, T>>(name),
            Binding::Factory,
            move |_| Ok(Arc::clone(&factory)),
        ))
    }

    // ── Modules ──

    /// Build `M` with [`Default`] and load it.
    #[instrument(skip(self), fields(module = std::any::type_name::<M>()))]
    pub fn register_module<M: Module + Default>(&self) -> &Self {
        self.add_module(&M::default())
    }

    /// Load an existing module.
    pub fn add_module(&self, module: &dyn Module) -> &Self {
        module.load(self);
        debug!(module = module.name(), registered = self.len(), "Loaded module");
        self
    }

    // ── Resolution ──

    /// Resolve the default binding of `T`.
    ///
    /// # Errors
    /// - [`RabtError::NotRegistered`]: no binding for `T`, or for
    ///   something its resolver asked for
    /// - [`RabtError::CircularDependency`]: the chain re-entered a key
    /// - [`RabtError::TypeMismatch`]: a resolver produced the wrong type
    /// - [`RabtError::ConstructionFailed`]: a resolver's own error
    pub fn resolve<T: 'static>(&self) -> Result<T> {
        self.resolve_named("")
    }

    /// Resolve the binding of `T` registered under `name`.
    pub fn resolve_named<T: 'static>(&self, name: &str) -> Result<T> {
        let key = ServiceKey::create::<T>(name);
        self.resolve_root(&key, |registration, resolver| registration.resolve_as::<T>(resolver))
    }

    // ── Introspection ──

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.registrar.contains(&ServiceKey::of::<T>())
    }

    pub fn contains_named<T: ?Sized + 'static>(&self, name: &str) -> bool {
        self.registrar.contains(&ServiceKey::create::<T>(name))
    }

    /// How the binding of `T` under `name` was registered.
    pub fn binding_of<T: ?Sized + 'static>(&self, name: &str) -> Option<Binding> {
        self.registrar
            .get(&ServiceKey::create::<T>(name))
            .ok()
            .map(|registration| registration.binding())
    }

    pub fn len(&self) -> usize {
        self.registrar.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrar.is_empty()
    }

    pub fn registered_keys(&self) -> Vec<ServiceKey> {
        self.registrar.keys()
    }

    /// Check declared dependencies without running any resolver.
    ///
    /// Only `register_shared` bindings declare dependencies; everything
    /// else counts as a leaf.
    pub fn validate(&self) -> Result<()> {
        let graph = self
            .registrar
            .registrations()
            .into_iter()
            .map(|registration| (registration.key().clone(), registration.dependencies().to_vec()))
            .collect();

        GraphValidator::new(&graph, self.settings.max_suggestions).validate()
    }

    // ── Internal ──

    /// Starts a fresh resolution chain for `key`.
    fn resolve_root<R>(
        &self,
        key: &ServiceKey,
        run: impl FnOnce(&Registration, &dyn Resolver) -> Result<R>,
    ) -> Result<R> {
        let tracker = DependencyChainTracker::new();
        let (_entry, registration) = self.enter(key, &tracker)?;
        let resolver = ChainResolver {
            container: self,
            tracker: &tracker,
        };
        run(registration.as_ref(), &resolver as &dyn Resolver)
    }

    /// Puts `key` on the chain and finds its registration.
    fn enter<'t>(
        &self,
        key: &ServiceKey,
        tracker: &'t DependencyChainTracker,
    ) -> Result<(ChainGuard<'t>, Arc<Registration>)> {
        let required_by = tracker.current();
        trace!(key = %key, depth = tracker.depth(), "Resolving");

        let entry = tracker.track(key)?;
        let registration = self.registrar.get(key).map_err(|err| match err {
            RabtError::NotRegistered(e) => RabtError::NotRegistered(NotRegisteredError::new(
                e.requested,
                required_by,
                &self.registrar.keys(),
                self.settings.max_suggestions,
            )),
            other => other,
        })?;

        Ok((entry, registration))
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for Container {
    /// Resolves `key` on a fresh chain.
    fn resolve_key(&self, key: &ServiceKey) -> Result<ErasedValue> {
        self.resolve_root(key, |registration, resolver| registration.resolve(resolver))
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.registrar.len())
            .field("settings", &self.settings)
            .finish()
    }
}

// ═══════════════════════════════════════════
// ChainResolver (internal bridge)
// ═══════════════════════════════════════════

/// The resolver handed to registrations: the container plus the chain
/// of the resolve call in progress.
struct ChainResolver<'a> {
    container: &'a Container,
    tracker: &'a DependencyChainTracker,
}

impl Resolver for ChainResolver<'_> {
    fn resolve_key(&self, key: &ServiceKey) -> Result<ErasedValue> {
        let (_entry, registration) = self.container.enter(key, self.tracker)?;
        registration.resolve(self)
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::Container;
    pub use crate::binding::Binding;
    pub use crate::error::{RabtError, Result};
    pub use crate::implements;
    pub use crate::inject::{ArgFactory, Dependencies, Factory, Implements, Inject};
    pub use crate::key::ServiceKey;
    pub use crate::module::Module;
    pub use crate::registration::{Resolver, ResolverApi};
    pub use crate::settings::ContainerSettings;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
