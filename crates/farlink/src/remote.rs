//! # Remote Interface Capability
//!
//! The opaque capability the bridge depends on but does not implement:
//! something that can construct objects in the remote host and invoke
//! methods on them. Implementations own the wire encoding, the process or
//! socket underneath, and the remote host's threading.
//!
//! ## Philosophy
//!
//! - **Value-Oriented**: the capability speaks [`Value`], never bytes.
//!   Serialization lives entirely inside the implementation.
//! - **Request-Response**: every operation blocks the calling thread until
//!   the host answers or the connection fails. Callers layer their own
//!   cancellation if they need it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::value::{RemoteRef, Value};

/// A failure reported by the remote host for a specific operation.
///
/// The bridge relays these uninterpreted: `kind` and `message` are whatever
/// the host supplied, `detail` is an optional diagnostic payload.
#[derive(Clone, Debug)]
pub struct RemoteFailure {
    pub kind: String,
    pub message: String,
    pub detail: Option<Value>,
}

impl RemoteFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Errors raised by the remote interface layer.
#[derive(Clone, Debug)]
pub enum Error {
    /// The host could not be reached when dialing.
    Unreachable(String),
    /// An established connection dropped mid-call.
    ConnectionLost(String),
    /// The host answered with something the bridge cannot make sense of.
    Protocol(String),
    /// Generic I/O failure inside the connector.
    Io(String),
    /// The host executed the operation and reported a failure.
    Remote(RemoteFailure),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(msg) => write!(f, "Remote host unreachable: {}", msg),
            Self::ConnectionLost(msg) => write!(f, "Connection lost: {}", msg),
            Self::Protocol(msg) => write!(f, "Protocol violation: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Remote(failure) => write!(f, "Remote failure: {}", failure),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// A live connection to the remote host.
///
/// This trait is designed to be object-safe (`Arc<dyn RemoteInterface>`).
/// Every method is synchronous: it returns once the host has answered.
/// The host is assumed internally concurrent, so simultaneous calls from
/// several threads need no local serialization.
pub trait RemoteInterface: Send + Sync + 'static {
    /// Constructs a new object of `type_name` in the remote host.
    ///
    /// `type_name` is the short class name (the last dot-separated segment
    /// of the declared remote type name). On success the result is normally
    /// a [`Value::Remote`] descriptor for the new object.
    fn construct(&self, type_name: &str, args: &[Value]) -> Result<Value>;

    /// Invokes `method` on the object named by `target` with `args`.
    ///
    /// The result may be plain data or a [`Value::Remote`] descriptor.
    fn invoke(&self, target: &RemoteRef, method: &str, args: &[Value]) -> Result<Value>;

    /// Invokes a static operation on the remote type itself.
    ///
    /// Hosts that have no notion of static operations keep the default,
    /// which reports a protocol error.
    fn invoke_static(&self, type_name: &str, method: &str, args: &[Value]) -> Result<Value> {
        let _ = (method, args);
        Err(Error::Protocol(format!(
            "host does not support static invocation (requested on '{}')",
            type_name
        )))
    }
}

/// Dials the remote host.
///
/// The connector receives the connection target positionally and the whole
/// remaining option bag as-is; option keys the bridge does not recognize are
/// passed through untouched, since the set of host options is not owned by
/// this layer.
pub trait Connector: Send + Sync + 'static {
    fn connect(
        &self,
        target: &str,
        options: &BTreeMap<String, Value>,
    ) -> Result<Arc<dyn RemoteInterface>>;
}
