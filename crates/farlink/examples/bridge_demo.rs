//! Bridges to an in-process mock host and drives a remote counter object.
//!
//! Run with: `cargo run --example bridge_demo`

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use farlink::remote::{self, Connector, RemoteInterface};
use farlink::{Adapted, Adapter, AdapterObject, RemoteId, RemoteRef, Service, Value};

/// A tiny "remote runtime" living in this process: it owns counter objects
/// and answers construct/invoke requests for them.
struct CounterHost {
    next_id: AtomicU64,
    counters: Mutex<BTreeMap<RemoteId, Arc<AtomicI64>>>,
}

impl CounterHost {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            counters: Mutex::new(BTreeMap::new()),
        })
    }

    fn counter(&self, id: RemoteId) -> remote::Result<Arc<AtomicI64>> {
        self.counters
            .lock()
            .expect("host state poisoned")
            .get(&id)
            .cloned()
            .ok_or_else(|| remote::Error::Protocol(format!("unknown object {}", id)))
    }
}

impl RemoteInterface for CounterHost {
    fn construct(&self, type_name: &str, args: &[Value]) -> remote::Result<Value> {
        if type_name != "Counter" {
            return Err(remote::Error::Remote(remote::RemoteFailure::new(
                "ClassNotFoundException",
                type_name,
            )));
        }
        let start = args.first().and_then(Value::as_i64).unwrap_or(0);
        let id = RemoteId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.counters
            .lock()
            .expect("host state poisoned")
            .insert(id, Arc::new(AtomicI64::new(start)));
        Ok(Value::Remote(RemoteRef::new("demo.Counter", id)))
    }

    fn invoke(&self, target: &RemoteRef, method: &str, args: &[Value]) -> remote::Result<Value> {
        let counter = self.counter(target.id)?;
        match method {
            "increment" => {
                let by = args.first().and_then(Value::as_i64).unwrap_or(1);
                Ok(Value::Int(counter.fetch_add(by, Ordering::Relaxed) + by))
            }
            "value" => Ok(Value::Int(counter.load(Ordering::Relaxed))),
            "toString" => Ok(Value::Str(format!(
                "Counter({})",
                counter.load(Ordering::Relaxed)
            ))),
            other => Err(remote::Error::Remote(remote::RemoteFailure::new(
                "NoSuchMethodException",
                other,
            ))),
        }
    }
}

struct CounterConnector {
    host: Arc<CounterHost>,
}

impl Connector for CounterConnector {
    fn connect(
        &self,
        _target: &str,
        _options: &BTreeMap<String, Value>,
    ) -> remote::Result<Arc<dyn RemoteInterface>> {
        Ok(self.host.clone())
    }
}

/// Local adapter for the host's counter objects.
struct Counter {
    base: Adapter,
}

impl Adapted for Counter {
    const REMOTE_TYPE: &'static str = "demo.Counter";

    fn wrap(base: Adapter) -> Self {
        Self { base }
    }

    fn base(&self) -> &Adapter {
        &self.base
    }
}

impl Counter {
    fn increment(&self, by: i64) -> anyhow::Result<i64> {
        self.invoke("increment", &[Value::from(by)])?
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("increment did not return an integer"))
    }

    fn value(&self) -> anyhow::Result<i64> {
        self.invoke("value", &[])?
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("value did not return an integer"))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let host = CounterHost::new();
    let service = Service::bare(Arc::new(CounterConnector { host }));
    service.register::<Counter>()?;
    service.configure(|config| {
        config.set_target("local:counters");
        config.set("logLevel", "debug");
    })?;

    let counter = service.instantiate::<Counter>(&[Value::from(10)])?;
    println!("created {}", counter.inspect());

    counter.increment(5)?;
    counter.increment(1)?;
    println!("value is now {}", counter.value()?);
    println!("remote says: {}", counter.base().remote_string()?);

    Ok(())
}
