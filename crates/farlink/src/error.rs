//! # Bridge Error Taxonomy
//!
//! Three kinds surface to callers and are never collapsed into one another:
//! local configuration mistakes, connection-level failures, and failures the
//! remote host reported for a specific operation. A call either fully
//! succeeds or fails with exactly one of these.

use std::fmt;

use crate::remote::{self, RemoteFailure};
use crate::{config, registry};

#[derive(Debug)]
pub enum Error {
    /// Local misuse of the bridge: configuring too late, duplicate
    /// registration, a missing remote type name, a rebind attempt.
    /// Always raised synchronously and never retried.
    Configuration(String),
    /// The remote host could not be reached or the connection failed
    /// mid-call. No automatic retry; callers decide retry policy.
    Connection(remote::Error),
    /// The remote host executed the operation and reported a failure.
    /// Relayed with whatever diagnostics the host supplied.
    Remote(RemoteFailure),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Self::Connection(e) => write!(f, "Connection error: {}", e),
            Self::Remote(failure) => write!(f, "Remote failure: {}", failure),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connection(e) => Some(e),
            _ => None,
        }
    }
}

impl From<remote::Error> for Error {
    fn from(e: remote::Error) -> Self {
        match e {
            remote::Error::Remote(failure) => Self::Remote(failure),
            other => Self::Connection(other),
        }
    }
}

impl From<registry::Error> for Error {
    fn from(e: registry::Error) -> Self {
        Self::Configuration(e.to_string())
    }
}

impl From<config::Error> for Error {
    fn from(e: config::Error) -> Self {
        Self::Configuration(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
