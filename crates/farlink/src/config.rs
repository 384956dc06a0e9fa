//! # Process Configuration
//!
//! A mutable option bag consumed exactly once, when the remote interface
//! handle is first created. Keys are free-form and normalized to one
//! canonical form (snake_case), so `logLevel`, `log-level` and `log_level`
//! all name the same option. Keys the bridge does not recognize are passed
//! through to the connector untouched.
//!
//! One option is reserved: [`TARGET_KEY`], the connection target, which is
//! extracted from the bag and handed to the connector positionally.

use std::collections::BTreeMap;
use std::fmt;

use crate::value::Value;

/// Reserved option naming the connection target (an address or path).
pub const TARGET_KEY: &str = "target";

#[derive(Clone, Debug)]
pub enum Error {
    /// Mutation attempted after the remote interface handle exists.
    Frozen,
    /// First handle creation found no connection target.
    MissingTarget,
    /// The connection target option is present but not a string.
    InvalidTarget,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frozen => {
                write!(f, "configuration must happen before the remote interface is created")
            }
            Self::MissingTarget => write!(f, "connection target is not set"),
            Self::InvalidTarget => write!(f, "connection target must be a string"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// The option bag. Mutated only through [`crate::service::Service::configure`],
/// which enforces the consume-once lifecycle.
#[derive(Clone, Debug, Default)]
pub struct Config {
    options: BTreeMap<String, Value>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option under its canonical key.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<Value>) {
        self.options
            .insert(canonical_key(key.as_ref()), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(&canonical_key(key))
    }

    /// Sets the reserved connection target option.
    pub fn set_target(&mut self, target: impl Into<String>) {
        self.set(TARGET_KEY, Value::Str(target.into()));
    }

    pub fn target(&self) -> Option<&str> {
        self.options.get(TARGET_KEY).and_then(Value::as_str)
    }

    /// Splits the bag into the positional target and the remaining options,
    /// the shape the connector consumes.
    pub(crate) fn split_target(&self) -> Result<(String, BTreeMap<String, Value>)> {
        let mut options = self.options.clone();
        match options.remove(TARGET_KEY) {
            Some(Value::Str(target)) => Ok((target, options)),
            Some(_) => Err(Error::InvalidTarget),
            None => Err(Error::MissingTarget),
        }
    }
}

/// Normalizes a free-form option key: ASCII camelCase becomes snake_case,
/// dashes and spaces become underscores.
pub(crate) fn canonical_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut prev_lower = false;
    for ch in raw.trim().chars() {
        if ch == '-' || ch == ' ' {
            key.push('_');
            prev_lower = false;
        } else if ch.is_ascii_uppercase() {
            if prev_lower {
                key.push('_');
            }
            key.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            key.push(ch);
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    key
}
