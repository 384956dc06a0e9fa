//! # Adapter Registry
//!
//! Maps remote type names to the local adapter types that wrap them. The
//! registry is populated during start-up, before the remote interface handle
//! exists, and is read-only afterwards; lookups are safe from any number of
//! threads (DashMap).

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::adapter::{Adapted, Adapter, AdapterObject};

#[derive(Clone, Debug)]
pub enum Error {
    /// The remote type name is already registered. Raised at registration
    /// time; the existing entry is left untouched.
    Duplicate(&'static str),
    /// The adapter type declares an empty remote type name.
    MissingRemoteType(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate(name) => write!(f, "'{}' is already registered", name),
            Self::MissingRemoteType(local) => {
                write!(f, "{} declares no remote type name", local)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// Wraps an existing reference into a shared adapter object without issuing
/// any remote call. This is the factory-only construction path.
pub type WrapFn = fn(Adapter) -> Arc<dyn AdapterObject>;

/// Remote type name → adapter wrap function.
pub struct Registry {
    entries: DashMap<String, WrapFn>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Registers `T` under its declared remote type name.
    ///
    /// Fails if the name is empty or already taken; a failed registration
    /// has no observable side effect.
    pub fn register<T: Adapted>(&self) -> Result<()> {
        let name = T::REMOTE_TYPE;
        if name.is_empty() {
            return Err(Error::MissingRemoteType(std::any::type_name::<T>()));
        }
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::Duplicate(name)),
            Entry::Vacant(vacant) => {
                tracing::debug!(remote_type = name, "registered adapter type");
                vacant.insert(wrap_into::<T>);
                Ok(())
            }
        }
    }

    /// Pure lookup: the wrap function for `name`, or `None` when no adapter
    /// is known. Never fails.
    pub fn resolve(&self, name: &str) -> Option<WrapFn> {
        self.entries.get(name).map(|entry| *entry.value())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn wrap_into<T: Adapted>(base: Adapter) -> Arc<dyn AdapterObject> {
    Arc::new(T::wrap(base))
}
