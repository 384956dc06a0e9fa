//! # Remote Interface Handle
//!
//! The connection object used to issue construct/invoke requests to the
//! remote host. Exactly one exists per [`crate::service::Service`], created
//! lazily on first access with the configuration merged in, and it carries
//! the factory: every reference arriving in a call result is looked up in
//! the registry and either wrapped into a typed adapter or passed through
//! raw.
//!
//! ## Invariants
//!
//! - The factory never fails; an unresolvable type yields the raw reference.
//! - A reference's result wrapping happens on the calling thread, before the
//!   result reaches the caller.
//! - The identity cache guarantees at most one live adapter per remote
//!   identity handed out by the factory.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::adapter::{Adapted, Adapter, AdapterObject, Bridged};
use crate::cache::IdentityCache;
use crate::config;
use crate::error::{Error, Result};
use crate::reference::Reference;
use crate::registry::Registry;
use crate::remote::{self, Connector, RemoteInterface};
use crate::value::{RemoteRef, Value};

pub struct Interface {
    link: Arc<dyn RemoteInterface>,
    target: String,
    options: BTreeMap<String, Value>,
    registry: Arc<Registry>,
    cache: IdentityCache,
}

impl Interface {
    /// Dials the remote host and assembles the handle. Called once per
    /// service, under the first-access guard in
    /// [`crate::service::Service::interface`].
    pub(crate) fn connect(
        connector: &dyn Connector,
        target: String,
        options: BTreeMap<String, Value>,
        registry: Arc<Registry>,
    ) -> Result<Self> {
        let link = connector.connect(&target, &options)?;
        debug!(remote = %target, options = options.len(), "remote interface created");
        Ok(Self {
            link,
            target,
            options,
            registry,
            cache: IdentityCache::new(),
        })
    }

    /// The connection target this handle was created with.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Inspects one merged option (canonical key form).
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(&config::canonical_key(key))
    }

    /// The full merged option bag, frozen at creation.
    pub fn options(&self) -> &BTreeMap<String, Value> {
        &self.options
    }

    /// Constructs a new remote object of `T`'s declared type and wraps the
    /// resulting reference. The host receives the short segment of the
    /// declared name plus the arguments unchanged.
    pub fn instantiate<T: Adapted>(self: &Arc<Self>, args: &[Value]) -> Result<Arc<T>> {
        if T::REMOTE_TYPE.is_empty() {
            return Err(Error::Configuration(format!(
                "{} declares no remote type name",
                std::any::type_name::<T>()
            )));
        }
        trace!(remote_type = T::REMOTE_TYPE, "constructing remote instance");
        let result = self.link.construct(short_name(T::REMOTE_TYPE), args)?;
        let Value::Remote(rref) = result else {
            return Err(Error::Connection(remote::Error::Protocol(format!(
                "constructor for '{}' returned a non-reference result",
                T::REMOTE_TYPE
            ))));
        };
        // The host may hand back an identity it already issued (interned
        // objects); at most one live adapter may wrap it.
        let shared = self.cache.lookup_or_wrap(rref.id, || {
            let fresh: Arc<dyn AdapterObject> = Arc::new(T::wrap(Adapter::bind(
                Reference::new(rref.clone(), Arc::clone(self)),
            )));
            fresh
        });
        shared.as_any().downcast::<T>().map_err(|_| {
            Error::Configuration(format!(
                "remote identity {} is already wrapped by a different adapter type",
                rref.id
            ))
        })
    }

    /// Invokes `method` on the object named by `target`, blocking until the
    /// host answers, and applies the factory-wrapping rule to the result.
    pub fn invoke(
        self: &Arc<Self>,
        target: &RemoteRef,
        method: &str,
        args: &[Value],
    ) -> Result<Bridged> {
        let result = self.link.invoke(target, method, args)?;
        Ok(self.absorb(result))
    }

    /// Invokes a static operation on `T`'s remote type.
    pub fn invoke_static<T: Adapted>(
        self: &Arc<Self>,
        method: &str,
        args: &[Value],
    ) -> Result<Bridged> {
        if T::REMOTE_TYPE.is_empty() {
            return Err(Error::Configuration(format!(
                "{} declares no remote type name",
                std::any::type_name::<T>()
            )));
        }
        let result = self
            .link
            .invoke_static(short_name(T::REMOTE_TYPE), method, args)?;
        Ok(self.absorb(result))
    }

    /// Lifts a bare descriptor (for example one found nested inside a list
    /// or map result) through the factory-wrapping rule.
    pub fn lift(self: &Arc<Self>, rref: RemoteRef) -> Bridged {
        self.absorb(Value::Remote(rref))
    }

    /// The installed factory. References of registered types become
    /// adapters, consulting the identity cache first so a still-reachable
    /// adapter for the same identity is reused; unknown types pass through
    /// raw. Plain data is returned unchanged. Never fails.
    pub(crate) fn absorb(self: &Arc<Self>, value: Value) -> Bridged {
        let rref = match value {
            Value::Remote(rref) => rref,
            other => return Bridged::Value(other),
        };
        match self.registry.resolve(&rref.type_name) {
            None => {
                trace!(remote_type = %rref.type_name, "no adapter registered, passing reference through");
                Bridged::Reference(Reference::new(rref, Arc::clone(self)))
            }
            Some(wrap) => {
                let adapter = self.cache.lookup_or_wrap(rref.id, || {
                    trace!(remote_type = %rref.type_name, id = %rref.id, "wrapping reference");
                    wrap(Adapter::bind(Reference::new(rref.clone(), Arc::clone(self))))
                });
                Bridged::Adapter(adapter)
            }
        }
    }

    /// Number of identities whose adapter is still reachable.
    pub fn live_adapters(&self) -> usize {
        self.cache.live()
    }

    /// Drops identity-cache entries whose adapter has been collected.
    pub fn prune(&self) {
        self.cache.prune();
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Interface:{}:{}>", self.target, self.options.len())
    }
}

fn short_name(full: &str) -> &str {
    match full.rsplit('.').next() {
        Some(last) if !last.is_empty() => last,
        _ => full,
    }
}
