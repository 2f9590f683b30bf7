//! # Rabt Support
//!
//! Shared helpers for the rabt DI crates.
//!
//! Currently this is the text rendering used by container diagnostics:
//! resolution chains, shortened type names and "did you mean?" hints.

pub mod rendering;
