//! # Reference
//!
//! An opaque handle to one object living in the remote host: the descriptor
//! the host issued plus the invocation capability. Local code never builds
//! one from scratch; references arrive as call results or are wrapped into
//! adapters at construction time.

use std::fmt;
use std::sync::Arc;

use crate::adapter::Bridged;
use crate::error::Result;
use crate::interface::Interface;
use crate::value::{RemoteId, RemoteRef, Value};

#[derive(Clone)]
pub struct Reference {
    rref: RemoteRef,
    interface: Arc<Interface>,
}

impl Reference {
    pub(crate) fn new(rref: RemoteRef, interface: Arc<Interface>) -> Self {
        Self { rref, interface }
    }

    pub fn remote_type_name(&self) -> &str {
        &self.rref.type_name
    }

    pub fn remote_id(&self) -> RemoteId {
        self.rref.id
    }

    pub fn descriptor(&self) -> &RemoteRef {
        &self.rref
    }

    /// The argument form of this reference, for handing the object back
    /// across the boundary.
    pub fn to_value(&self) -> Value {
        Value::Remote(self.rref.clone())
    }

    /// Invokes `method` on the remote object, blocking until the host
    /// answers. Object-typed results come back wrapped per the registry.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Bridged> {
        self.interface.invoke(&self.rref, method, args)
    }

    /// True when both handles name the same object in the remote host.
    pub fn same_identity(&self, other: &Reference) -> bool {
        self.rref.id == other.rref.id
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Ref:{}:{}>", self.rref.type_name, self.rref.id)
    }
}
