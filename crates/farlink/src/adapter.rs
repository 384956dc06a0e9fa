//! # Adapter Base
//!
//! The base contract for every typed wrapper around a remote object. An
//! adapter owns exactly one [`Reference`], binds it once at construction,
//! and forwards operations it does not define locally to the reference by
//! name. Results of forwarded calls are re-wrapped by the factory, so a
//! remote call returning a known type yields an adapter, not a raw handle.
//!
//! ## Invariants
//!
//! - One reference per adapter, bound exactly once; there is no rebind.
//! - Delegation is expressed through a closed primitive set (construct,
//!   invoke-by-name, type name, identity), never open-ended reflection.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::reference::Reference;
use crate::remote;
use crate::value::{RemoteId, Value};

/// Owns the bound reference and carries the delegation machinery shared by
/// all typed adapters.
pub struct Adapter {
    reference: Reference,
}

impl Adapter {
    /// Binds the reference. Both construction paths end here, exactly once.
    pub(crate) fn bind(reference: Reference) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn remote_type_name(&self) -> &str {
        self.reference.remote_type_name()
    }

    pub fn remote_id(&self) -> RemoteId {
        self.reference.remote_id()
    }

    /// The argument form of the wrapped object, for passing it back to the
    /// remote host.
    pub fn to_value(&self) -> Value {
        self.reference.to_value()
    }

    /// Forwards `method` with `args` to the wrapped reference. This is the
    /// fall-through path for every operation the adapter does not define
    /// locally.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Bridged> {
        self.reference.invoke(method, args)
    }

    /// Calls the remote object's `toString()`. Not cached.
    pub fn remote_string(&self) -> Result<String> {
        match self.invoke("toString", &[])? {
            Bridged::Value(Value::Str(s)) => Ok(s),
            other => Err(Error::Connection(remote::Error::Protocol(format!(
                "toString returned {:?}",
                other
            )))),
        }
    }

    /// Changing the wrapped reference is not supported; an adapter is bound
    /// for life. Always fails.
    pub fn rebind(&self, _replacement: Reference) -> Result<()> {
        Err(Error::Configuration(
            "adapter is already bound; changing the wrapped reference is not supported".into(),
        ))
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Adapter:{:p}:{}:{}>",
            self,
            self.reference.remote_type_name(),
            self.reference.remote_id()
        )
    }
}

/// Implemented by every typed adapter. Declares the remote type name at
/// type-definition time and provides the wrap-only construction path the
/// factory uses; user-facing construction goes through
/// [`crate::interface::Interface::instantiate`] instead, which issues a
/// remote constructor call first.
pub trait Adapted: Send + Sync + Sized + 'static {
    /// Fully-qualified remote type name, fixed for the life of the type.
    const REMOTE_TYPE: &'static str;

    /// Wraps an existing reference without any remote call.
    fn wrap(base: Adapter) -> Self;

    fn base(&self) -> &Adapter;

    /// Forwards an operation the adapter does not define locally.
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Bridged> {
        self.base().invoke(method, args)
    }

    /// The argument form of the wrapped object.
    fn to_value(&self) -> Value {
        self.base().to_value()
    }
}

/// Object-safe view of any typed adapter, used by the registry, the
/// identity cache and [`Bridged`].
pub trait AdapterObject: Send + Sync + 'static {
    fn delegate(&self) -> &Adapter;

    /// Local adapter type name, for diagnostics.
    fn local_type(&self) -> &'static str;

    /// Declared remote type name.
    fn remote_type(&self) -> &'static str;

    /// Diagnostic string: local type, identity token, remote type name and
    /// remote identity. For logging only, never for equality.
    fn inspect(&self) -> String {
        let reference = self.delegate().reference();
        format!(
            "<{}:{:p}:{}:{}>",
            self.local_type(),
            self,
            reference.remote_type_name(),
            reference.remote_id()
        )
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Adapted> AdapterObject for T {
    fn delegate(&self) -> &Adapter {
        self.base()
    }

    fn local_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn remote_type(&self) -> &'static str {
        T::REMOTE_TYPE
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A call result after the factory-wrapping rule has been applied: plain
/// data unchanged, references of unregistered types passed through raw, and
/// references of registered types wrapped into adapters.
pub enum Bridged {
    Value(Value),
    Reference(Reference),
    Adapter(Arc<dyn AdapterObject>),
}

impl Bridged {
    /// Recovers the concrete adapter type the registry produced.
    pub fn downcast<T: Adapted>(&self) -> Option<Arc<T>> {
        match self {
            Bridged::Adapter(adapter) => Arc::clone(adapter).as_any().downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Forwards an operation to the object behind this result, whether it
    /// came back raw or wrapped. Invoking on plain data is a local mistake.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Bridged> {
        match self {
            Bridged::Reference(reference) => reference.invoke(method, args),
            Bridged::Adapter(adapter) => adapter.delegate().invoke(method, args),
            Bridged::Value(value) => Err(Error::Configuration(format!(
                "cannot invoke '{}' on a plain value: {:?}",
                method, value
            ))),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Bridged::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Bridged::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn as_adapter(&self) -> Option<&Arc<dyn AdapterObject>> {
        match self {
            Bridged::Adapter(adapter) => Some(adapter),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Bridged::Value(Value::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.as_value().and_then(Value::as_bytes)
    }

    /// The argument form of this result, for passing it back across the
    /// boundary in a later call.
    pub fn to_value(&self) -> Value {
        match self {
            Bridged::Value(value) => value.clone(),
            Bridged::Reference(reference) => reference.to_value(),
            Bridged::Adapter(adapter) => adapter.delegate().to_value(),
        }
    }
}

impl fmt::Debug for Bridged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bridged::Value(value) => write!(f, "Bridged::Value({:?})", value),
            Bridged::Reference(reference) => write!(f, "Bridged::Reference({:?})", reference),
            Bridged::Adapter(adapter) => write!(f, "Bridged::Adapter({})", adapter.inspect()),
        }
    }
}
