//! End-to-end tests for the farlink bridge against a scripted remote host.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use farlink::adapters::{Contract, PrivateKey};
use farlink::remote::{self, Connector, RemoteInterface};
use farlink::{Adapted, Adapter, AdapterObject, RemoteFailure, RemoteId, RemoteRef, Service, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

type Handler = Box<dyn Fn(&RemoteRef, &[Value]) -> remote::Result<Value> + Send + Sync>;

/// Scripted remote host: class table, per-method handlers, full call log.
struct UniHost {
    classes: Mutex<Vec<String>>,
    next_id: AtomicU64,
    handlers: Mutex<BTreeMap<String, Handler>>,
    constructs: Mutex<Vec<(String, Vec<Value>)>>,
    invokes: Mutex<Vec<(RemoteId, String, Vec<Value>)>>,
}

impl UniHost {
    fn new(classes: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            classes: Mutex::new(classes.iter().map(|s| s.to_string()).collect()),
            next_id: AtomicU64::new(1),
            handlers: Mutex::new(BTreeMap::new()),
            constructs: Mutex::new(Vec::new()),
            invokes: Mutex::new(Vec::new()),
        })
    }

    fn on(
        &self,
        method: &str,
        handler: impl Fn(&RemoteRef, &[Value]) -> remote::Result<Value> + Send + Sync + 'static,
    ) {
        self.handlers
            .lock()
            .unwrap()
            .insert(method.to_string(), Box::new(handler));
    }

    fn fresh_ref(&self, full_name: &str) -> RemoteRef {
        RemoteRef::new(full_name, RemoteId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }
}

impl RemoteInterface for UniHost {
    fn construct(&self, type_name: &str, args: &[Value]) -> remote::Result<Value> {
        self.constructs
            .lock()
            .unwrap()
            .push((type_name.to_string(), args.to_vec()));
        let classes = self.classes.lock().unwrap();
        let full = classes
            .iter()
            .find(|full| full.rsplit('.').next() == Some(type_name))
            .cloned();
        drop(classes);
        match full {
            Some(full) => Ok(Value::Remote(self.fresh_ref(&full))),
            None => Err(remote::Error::Remote(RemoteFailure::new(
                "ClassNotFoundException",
                type_name,
            ))),
        }
    }

    fn invoke(&self, target: &RemoteRef, method: &str, args: &[Value]) -> remote::Result<Value> {
        self.invokes
            .lock()
            .unwrap()
            .push((target.id, method.to_string(), args.to_vec()));
        let handlers = self.handlers.lock().unwrap();
        match handlers.get(method) {
            Some(handler) => handler(target, args),
            None => Ok(Value::Null),
        }
    }

    fn invoke_static(
        &self,
        type_name: &str,
        method: &str,
        args: &[Value],
    ) -> remote::Result<Value> {
        let key = format!("static:{}", method);
        let handlers = self.handlers.lock().unwrap();
        match handlers.get(&key) {
            Some(handler) => {
                let pseudo = RemoteRef::new(type_name, RemoteId(0));
                handler(&pseudo, args)
            }
            None => Err(remote::Error::Protocol(format!(
                "no static handler for '{}'",
                method
            ))),
        }
    }
}

struct UniConnector {
    host: Arc<UniHost>,
}

impl Connector for UniConnector {
    fn connect(
        &self,
        _target: &str,
        _options: &BTreeMap<String, Value>,
    ) -> remote::Result<Arc<dyn RemoteInterface>> {
        Ok(self.host.clone())
    }
}

fn connected(host: &Arc<UniHost>) -> Service {
    let service = Service::new(Arc::new(UniConnector { host: host.clone() })).unwrap();
    service
        .configure(|config| config.set_target("mock://uni"))
        .unwrap();
    service
}

struct FooAdapter {
    base: Adapter,
}

impl Adapted for FooAdapter {
    const REMOTE_TYPE: &'static str = "pkg.Foo";

    fn wrap(base: Adapter) -> Self {
        Self { base }
    }

    fn base(&self) -> &Adapter {
        &self.base
    }
}

// --- Scenario 1: register, construct, inspect ---

#[test]
fn test_register_construct_and_inspect() {
    init_tracing();
    let host = UniHost::new(&["pkg.Foo"]);
    let service = connected(&host);
    service.register::<FooAdapter>().unwrap();

    let foo = service.instantiate::<FooAdapter>(&[Value::from(42)]).unwrap();

    assert_eq!(foo.remote_type(), "pkg.Foo");
    assert_eq!(foo.base().remote_type_name(), "pkg.Foo");
    assert!(foo.inspect().contains("pkg.Foo"));
    assert!(foo.inspect().contains("FooAdapter"));

    // The remote constructor received the short type name and the argument.
    let constructs = host.constructs.lock().unwrap().clone();
    assert_eq!(constructs, vec![("Foo".to_string(), vec![Value::Int(42)])]);
}

// --- Scenario 2: delegation with identical arguments, result re-wrapped ---

#[test]
fn test_delegated_call_reaches_reference_and_rewraps() {
    init_tracing();
    let host = UniHost::new(&["pkg.Foo"]);
    host.on("combine", |target, _| {
        Ok(Value::Remote(RemoteRef::new(
            target.type_name.as_str(),
            RemoteId(4242),
        )))
    });
    let service = connected(&host);
    service.register::<FooAdapter>().unwrap();

    let foo = service.instantiate::<FooAdapter>(&[]).unwrap();
    let args = [Value::from("other"), Value::from(3)];
    let result = foo.invoke("combine", &args).unwrap();

    // Identical arguments reached the underlying reference.
    let invokes = host.invokes.lock().unwrap().clone();
    let (id, method, seen) = invokes.last().unwrap().clone();
    assert_eq!(id, foo.base().remote_id());
    assert_eq!(method, "combine");
    assert_eq!(seen, args.to_vec());

    // The raw result was re-wrapped according to the registry.
    let peer = result.downcast::<FooAdapter>().expect("expected FooAdapter");
    assert_eq!(peer.base().remote_id(), RemoteId(4242));
}

// --- Scenario 3: configuring after first use fails, configuration intact ---

#[test]
fn test_configure_after_first_use_fails() {
    init_tracing();
    let host = UniHost::new(&[]);
    let service = connected(&host);
    service
        .configure(|config| config.set("sessionName", "primary"))
        .unwrap();

    let interface = service.interface().unwrap();
    let err = service
        .configure(|config| config.set("sessionName", "hijacked"))
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(
        interface.option("sessionName").and_then(Value::as_str),
        Some("primary")
    );
}

// --- Scenario 4: built-in contract flow ---

#[test]
fn test_contract_create_seal_and_check() {
    init_tracing();
    let host = UniHost::new(&[
        "com.icodici.universa.contract.Contract",
        "com.icodici.crypto.PrivateKey",
        "com.icodici.universa.contract.permissions.ChangeOwnerPermission",
    ]);
    host.on("getLongAddress", |_, _| {
        Ok(Value::Remote(RemoteRef::new(
            "com.icodici.crypto.KeyAddress",
            RemoteId(9000),
        )))
    });
    host.on("getIssuer", |_, _| {
        Ok(Value::Remote(RemoteRef::new(
            "com.icodici.universa.contract.roles.Role",
            RemoteId(9001),
        )))
    });
    host.on("getOwner", |_, _| {
        Ok(Value::Remote(RemoteRef::new(
            "com.icodici.universa.contract.roles.Role",
            RemoteId(9002),
        )))
    });
    host.on("linkAs", |target, _| {
        Ok(Value::Remote(RemoteRef::new(
            target.type_name.as_str(),
            RemoteId(9003),
        )))
    });
    host.on("seal", |_, _| Ok(Value::Bytes(vec![0xCA, 0xFE])));
    host.on("isOk", |_, _| Ok(Value::Bool(true)));
    host.on("getKeysToSignWith", |_, _| {
        Ok(Value::List(vec![Value::Remote(RemoteRef::new(
            "com.icodici.crypto.PrivateKey",
            RemoteId(9004),
        ))]))
    });

    let service = connected(&host);
    let key = service
        .instantiate::<PrivateKey>(&[Value::from(2048)])
        .unwrap();
    let contract = Contract::create(&service, &key, Value::from("+90d"), false).unwrap();

    assert_eq!(contract.seal().unwrap(), vec![0xCA, 0xFE]);
    assert!(contract.is_ok().unwrap());

    let signers = contract.keys_to_sign_with().unwrap();
    let signers = signers
        .as_value()
        .and_then(Value::as_list)
        .expect("expected a key list");
    assert_eq!(signers.len(), 1);

    // The issuer key was handed back across the boundary by identity.
    let invokes = host.invokes.lock().unwrap().clone();
    let signer = invokes
        .iter()
        .find(|(_, method, _)| method == "addSignerKey")
        .expect("addSignerKey never reached the host");
    assert_eq!(
        signer.2,
        vec![Value::Remote(key.base().reference().descriptor().clone())]
    );
}

// --- Scenario 5: static invocation through a built-in adapter ---

#[test]
fn test_contract_from_packed_uses_static_invocation() {
    init_tracing();
    let host = UniHost::new(&["com.icodici.universa.contract.Contract"]);
    host.on("static:fromPackedTransaction", |_, args| {
        assert_eq!(args.len(), 1);
        Ok(Value::Remote(RemoteRef::new(
            "com.icodici.universa.contract.Contract",
            RemoteId(77),
        )))
    });

    let service = connected(&host);
    let loaded = Contract::from_packed(&service, &[1, 2, 3]).unwrap();
    let contract = loaded.downcast::<Contract>().expect("expected a Contract");
    assert_eq!(contract.base().remote_id(), RemoteId(77));
}

// --- Scenario 6: remote string form ---

#[test]
fn test_remote_string_calls_to_string() {
    init_tracing();
    let host = UniHost::new(&["pkg.Foo"]);
    host.on("toString", |target, _| {
        Ok(Value::Str(format!("Foo@{}", target.id)))
    });
    let service = connected(&host);
    service.register::<FooAdapter>().unwrap();

    let foo = service.instantiate::<FooAdapter>(&[]).unwrap();
    let text = foo.base().remote_string().unwrap();
    assert!(text.starts_with("Foo@"));
}
