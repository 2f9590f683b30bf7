//! Batches of related registrations.
//!
//! A module keeps the registrations for one area of an application
//! next to that area's code instead of in one central setup function.
//!
//! # Examples
//! ```rust
//! use rabt_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Settings { dsn: String }
//!
//! #[derive(Default)]
//! struct StorageModule;
//!
//! impl Module for StorageModule {
//!     fn load(&self, container: &Container) {
//!         container.register_instance(Arc::new(Settings { dsn: "sqlite::memory:".into() }));
//!         container.register_named::<String>("dsn", |r| {
//!             let settings: Arc<Settings> = r.resolve()?;
//!             Ok(settings.dsn.clone())
//!         });
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_module::<StorageModule>();
//!
//! let dsn: String = container.resolve_named("dsn").unwrap();
//! assert_eq!(dsn, "sqlite::memory:");
//! ```

use crate::container::Container;

/// A unit of registration logic.
///
/// Use [`Container::register_module`] for modules with a [`Default`]
/// impl, or [`Container::add_module`] for modules that carry state.
/// Loading is infallible because registration is: a later binding for
/// the same key simply replaces an earlier one.
pub trait Module {
    /// Register this module's services into `container`.
    fn load(&self, container: &Container);

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
