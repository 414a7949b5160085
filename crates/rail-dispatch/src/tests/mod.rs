//! Crate-level integration and BDD tests.

use std::sync::Arc;

use crate::catalog::{Catalog, Signature};
use crate::dispatch::Dispatcher;
use crate::instance::Invocable;
use crate::manifest::Manifest;
use crate::registry::InstanceRegistry;
use crate::value::ValueType;


struct Lamp {
    lit: std::sync::atomic::AtomicBool,
}

impl Invocable for Lamp {}

#[test]
fn manifest_and_dispatch_share_the_catalog() {
    let mut builder = Catalog::builder();
    builder.class::<Lamp>("Lamp").method(
        Signature::new("Toggle").returns(ValueType::Bool),
        |this: &Lamp, _args| {
            Ok(!this
                .lit
                .fetch_xor(true, std::sync::atomic::Ordering::SeqCst))
        },
    );
    let catalog = Arc::new(builder.build().expect("class names are unique"));
    let registry = Arc::new(InstanceRegistry::new());
    registry.register(
        "Lamp",
        Arc::new(Lamp {
            lit: std::sync::atomic::AtomicBool::new(false),
        }),
    );
    let dispatcher = Dispatcher::new(registry, Arc::clone(&catalog));

    let manifest = Manifest::generate("Lights", &catalog);
    for entry in &manifest.functions {
        let response = dispatcher.dispatch(&format!(r#"{{"method":"{}"}}"#, entry.name));
        assert_eq!(response, r#"{"result":"true"}"#);
    }
    assert_eq!(manifest.functions.len(), 1);
}
