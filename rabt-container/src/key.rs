//! Service identification keys.
//!
//! [`ServiceKey`] identifies one binding in the container. It pairs the
//! [`TypeId`] of the resolved type with an optional name, so the same
//! type can be bound several times under different names.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rabt_support::rendering::shorten_type_name;

/// Uniquely identifies a service binding.
///
/// Two keys are equal iff they were built for the same type and the
/// same name. The empty name is the default name, so
/// `ServiceKey::create::<T>("")` equals `ServiceKey::of::<T>()`.
///
/// # Examples
/// ```
/// use rabt_container::key::ServiceKey;
///
/// let key = ServiceKey::of::<String>();
/// assert_eq!(key.type_name(), "alloc::string::String");
/// assert_eq!(key.name(), None);
///
/// let primary = ServiceKey::named::<String>("primary_db");
/// let replica = ServiceKey::named::<String>("replica_db");
/// assert_ne!(primary, replica);
/// assert_eq!(ServiceKey::create::<String>(""), key);
/// ```
#[derive(Clone)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<Arc<str>>,
}

impl ServiceKey {
    /// Key for the default (unnamed) binding of `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name: None,
        }
    }

    /// Key for the binding of `T` registered under `name`.
    ///
    /// An empty `name` yields the default binding.
    #[inline]
    pub fn named<T: ?Sized + 'static>(name: &str) -> Self {
        Self::create::<T>(name)
    }

    /// Derives the key for `T` and `name`.
    ///
    /// Deterministic and infallible; this is the only place keys are
    /// built, so registration and resolution always agree.
    pub fn create<T: ?Sized + 'static>(name: &str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name: (!name.is_empty()).then(|| Arc::from(name)),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified name of the bound type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Binding name, `None` for the default binding.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The key with module paths stripped, for compact messages.
    pub fn short_name(&self) -> String {
        let short = shorten_type_name(self.type_name);
        match self.name() {
            Some(name) => format!("{short}[{name}]"),
            None => short,
        }
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "ServiceKey({}, name={name:?})", self.type_name),
            None => write!(f, "ServiceKey({})", self.type_name),
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (name={name:?})", self.type_name),
            None => f.write_str(self.type_name),
        }
    }
}
