//! Owns every registration of a container.
//!
//! Maps [`ServiceKey`] to [`Registration`]. Writes replace, lookups of
//! unknown keys fail. The map sits behind a read-write lock and
//! lookups hand out `Arc` clones, so no lock is held while a resolver
//! runs and resolvers are free to register more services.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{NotRegisteredError, RabtError};
use crate::key::ServiceKey;
use crate::registration::Registration;

#[derive(Debug, Default)]
pub struct Registrar {
    registrations: RwLock<HashMap<ServiceKey, Arc<Registration>>>,
    warn_on_override: bool,
}

impl Registrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides are logged at `warn` instead of `debug`.
    pub fn warn_on_override(mut self, warn: bool) -> Self {
        self.warn_on_override = warn;
        self
    }

    /// Stores `registration`, replacing any binding for the same key.
    ///
    /// Returns `true` when an earlier binding was replaced.
    pub fn register(&self, registration: Registration) -> bool {
        let key = registration.key().clone();
        let binding = registration.binding();

        let previous = self
            .registrations
            .write()
            .insert(key.clone(), Arc::new(registration));

        match &previous {
            Some(old) if self.warn_on_override => {
                warn!(key = %key, binding = %binding, replaced = %old.binding(), "Overrode registration");
            }
            Some(old) => {
                debug!(key = %key, binding = %binding, replaced = %old.binding(), "Overrode registration");
            }
            None => debug!(key = %key, binding = %binding, "Registered service"),
        }

        previous.is_some()
    }

    /// Looks up the registration for `key`.
    ///
    /// # Errors
    /// [`RabtError::NotRegistered`] if nothing is bound to `key`. The
    /// caller fills in context such as `required_by`.
    pub fn get(&self, key: &ServiceKey) -> Result<Arc<Registration>, RabtError> {
        self.registrations.read().get(key).cloned().ok_or_else(|| {
            RabtError::NotRegistered(NotRegisteredError {
                requested: key.clone(),
                required_by: None,
                suggestions: Vec::new(),
            })
        })
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.registrations.read().contains_key(key)
    }

    /// Returns the number of registered services.
    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    /// Snapshot of all registered keys, in no particular order.
    pub fn keys(&self) -> Vec<ServiceKey> {
        self.registrations.read().keys().cloned().collect()
    }

    /// Snapshot of all registrations, in no particular order.
    pub fn registrations(&self) -> Vec<Arc<Registration>> {
        self.registrations.read().values().cloned().collect()
    }
}
