//! # farlink
//!
//! Bridges a local process to objects living in a foreign runtime. Remote
//! objects surface as ordinary local values: references of known types are
//! wrapped into typed adapters by a process-wide factory, unknown types pass
//! through as raw references, and the same remote identity keeps resolving
//! to the same adapter instance while one is reachable.
//!
//! The connection to the remote host is an injected capability
//! ([`remote::Connector`]); the bridge owns configuration, registration,
//! the lazy handle lifecycle and identity discipline, never the wire.

pub mod adapter;
pub mod adapters;
pub mod config;
pub mod error;
pub mod interface;
pub mod reference;
pub mod registry;
pub mod remote;
pub mod service;
pub mod value;

mod cache;

pub use adapter::{Adapted, Adapter, AdapterObject, Bridged};
pub use config::Config;
pub use error::{Error, Result};
pub use interface::Interface;
pub use reference::Reference;
pub use registry::Registry;
pub use remote::{Connector, RemoteFailure, RemoteInterface};
pub use service::Service;
pub use value::{RemoteId, RemoteRef, Value};
