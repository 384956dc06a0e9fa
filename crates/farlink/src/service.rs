//! # Service
//!
//! Owns the bridge lifecycle for one process: the configuration bag, the
//! adapter registry, and the lazily-created remote interface handle. The
//! handle is constructed exactly once even under concurrent first access
//! (mutex-guarded check-and-initialize over a single-assignment cell); after
//! that, reads are lock-free.
//!
//! A process-wide instance is available through [`install`]/[`global`], but
//! the type itself stays constructible so tests get fresh, independent
//! bridges instead of resetting shared state.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::info;

use crate::adapter::{Adapted, Bridged};
use crate::adapters::{Contract, KeyAddress, PrivateKey, PublicKey};
use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::interface::Interface;
use crate::registry::Registry;
use crate::remote::Connector;
use crate::value::Value;

pub struct Service {
    connector: Arc<dyn Connector>,
    registry: Arc<Registry>,
    config: Mutex<Config>,
    init: Mutex<()>,
    interface: OnceLock<Arc<Interface>>,
}

impl Service {
    /// Creates a service with the built-in adapter types registered.
    pub fn new(connector: Arc<dyn Connector>) -> Result<Self> {
        let registry = Registry::new();
        registry.register::<Contract>()?;
        registry.register::<PrivateKey>()?;
        registry.register::<PublicKey>()?;
        registry.register::<KeyAddress>()?;
        Ok(Self {
            connector,
            registry: Arc::new(registry),
            config: Mutex::new(Config::new()),
            init: Mutex::new(()),
            interface: OnceLock::new(),
        })
    }

    /// Creates a service with an empty registry, for callers that want full
    /// control over which adapter types exist.
    pub fn bare(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            registry: Arc::new(Registry::new()),
            config: Mutex::new(Config::new()),
            init: Mutex::new(()),
            interface: OnceLock::new(),
        }
    }

    /// Scoped configuration mutation. Fails once the remote interface
    /// handle exists, leaving the prior configuration unchanged.
    pub fn configure<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Config),
    {
        if self.interface.get().is_some() {
            return Err(config::Error::Frozen.into());
        }
        let mut config = self.config.lock();
        mutate(&mut config);
        Ok(())
    }

    /// Registers an additional adapter type. Registration is a
    /// configuration-time write: it must complete before the handle exists.
    pub fn register<T: Adapted>(&self) -> Result<()> {
        if self.interface.get().is_some() {
            return Err(Error::Configuration(
                "adapter registration must happen before the remote interface is created".into(),
            ));
        }
        self.registry.register::<T>()?;
        Ok(())
    }

    /// Returns the process-wide handle, creating it on first call.
    ///
    /// Creation consumes the configuration: the connection target is
    /// extracted and passed positionally, the rest of the bag goes to the
    /// connector as-is. A failed creation is returned to the caller and
    /// nothing is published, so a later call may try again.
    pub fn interface(&self) -> Result<Arc<Interface>> {
        if let Some(existing) = self.interface.get() {
            return Ok(Arc::clone(existing));
        }
        let _guard = self.init.lock();
        if let Some(existing) = self.interface.get() {
            return Ok(Arc::clone(existing));
        }
        let (target, options) = self.config.lock().split_target()?;
        let interface = Arc::new(Interface::connect(
            self.connector.as_ref(),
            target,
            options,
            Arc::clone(&self.registry),
        )?);
        let _ = self.interface.set(Arc::clone(&interface));
        info!(remote = interface.target(), "remote interface handle ready");
        Ok(interface)
    }

    /// True once the handle exists and configuration is frozen.
    pub fn is_connected(&self) -> bool {
        self.interface.get().is_some()
    }

    /// Convenience: construct a remote object of `T`'s declared type.
    pub fn instantiate<T: Adapted>(&self, args: &[Value]) -> Result<Arc<T>> {
        self.interface()?.instantiate(args)
    }

    /// Convenience: invoke a static operation on `T`'s remote type.
    pub fn invoke_static<T: Adapted>(&self, method: &str, args: &[Value]) -> Result<Bridged> {
        self.interface()?.invoke_static::<T>(method, args)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

static GLOBAL: OnceLock<Service> = OnceLock::new();

/// Installs the process-wide service. Fails if one is already installed.
pub fn install(connector: Arc<dyn Connector>) -> Result<()> {
    let service = Service::new(connector)?;
    GLOBAL
        .set(service)
        .map_err(|_| Error::Configuration("process-wide service is already installed".into()))
}

/// The process-wide service installed by [`install`].
pub fn global() -> Result<&'static Service> {
    GLOBAL
        .get()
        .ok_or_else(|| Error::Configuration("no process-wide service is installed".into()))
}

/// Configures the process-wide service. Call before first use of
/// [`interface`].
pub fn configure<F>(mutate: F) -> Result<()>
where
    F: FnOnce(&mut Config),
{
    global()?.configure(mutate)
}

/// The process-wide remote interface handle, created on first call.
pub fn interface() -> Result<Arc<Interface>> {
    global()?.interface()
}
