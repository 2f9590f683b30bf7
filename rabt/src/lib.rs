//! # rabt: a small dependency injection container
//!
//! Bind services under a type and an optional name, resolve them on
//! demand, and get a clear error instead of a stack overflow when the
//! bindings form a cycle.
//!
//! ```rust
//! use rabt::prelude::*;
//! use std::sync::Arc;
//!
//! struct Config { timeout: u32 }
//!
//! let container = Container::new();
//! container.register_instance(Arc::new(Config { timeout: 30 }));
//!
//! let config: Arc<Config> = container.resolve().unwrap();
//! assert_eq!(config.timeout, 30);
//! ```

pub use rabt_container::*;
pub use rabt_support::*;
