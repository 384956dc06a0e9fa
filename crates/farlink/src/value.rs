//! # Boundary Values
//!
//! The data that crosses the bridge in both directions: primitive values,
//! containers of them, and descriptors of objects that live in the remote
//! host. How these are encoded on the wire is the connector's business;
//! this module only fixes the in-process shape.

use std::collections::BTreeMap;
use std::fmt;

/// Opaque identity token for one remote object.
///
/// Two references with the same id name the same object in the remote host.
/// The token is comparable and hashable but carries no other meaning locally.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RemoteId(pub u64);

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Descriptor of a remote object as delivered inside call results: the
/// remote type name plus the identity token. The invocation capability is
/// attached when this is lifted into a [`crate::reference::Reference`].
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteRef {
    pub type_name: String,
    pub id: RemoteId,
}

impl RemoteRef {
    pub fn new(type_name: impl Into<String>, id: RemoteId) -> Self {
        Self {
            type_name: type_name.into(),
            id,
        }
    }
}

impl fmt::Display for RemoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.type_name, self.id)
    }
}

/// A value crossing the bridge boundary.
///
/// Object-typed results arrive as [`Value::Remote`] descriptors; everything
/// else is plain data. Arguments going out use the same shape, so a caller
/// can hand a remote object back to the host by passing its descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Remote(RemoteRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_remote(&self) -> Option<&RemoteRef> {
        match self {
            Value::Remote(rref) => Some(rref),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<RemoteRef> for Value {
    fn from(rref: RemoteRef) -> Self {
        Value::Remote(rref)
    }
}
