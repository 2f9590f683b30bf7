//! Core container implementation for rabt DI.

pub mod binding;
pub mod chain;
pub mod container;
pub mod error;
mod graph;
pub mod inject;
pub mod key;
pub mod module;
pub mod registrar;
pub mod registration;
pub mod settings;

pub use binding::Binding;
pub use container::{Container, prelude};
pub use error::{RabtError, Result};
pub use key::ServiceKey;
pub use module::Module;
pub use registration::{Resolver, ResolverApi};
