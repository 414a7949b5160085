//! Unit tests for the instance registry.

use std::sync::Arc;
use std::thread;

use rstest::{fixture, rstest};

use super::*;
use crate::instance::TypeKey;

struct Widget;
impl Invocable for Widget {}

struct Gadget;
impl Invocable for Gadget {}

#[fixture]
fn registry() -> InstanceRegistry {
    InstanceRegistry::new()
}

#[rstest]
fn new_registry_is_empty(registry: InstanceRegistry) {
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
    assert!(registry.ids().is_empty());
}

#[rstest]
fn registered_instances_are_found(registry: InstanceRegistry) {
    registry.register("widget", Arc::new(Widget));
    let found = registry.get("widget").expect("widget is registered");
    assert_eq!(found.type_key(), TypeKey::of::<Widget>());
}

#[rstest]
fn unknown_identifiers_miss(registry: InstanceRegistry) {
    registry.register("widget", Arc::new(Widget));
    assert!(registry.get("gadget").is_none());
    assert!(registry.get("Widget").is_none());
    assert!(!registry.contains(""));
}

#[rstest]
fn last_registration_wins(registry: InstanceRegistry) {
    registry.register("device", Arc::new(Widget));
    registry.register("device", Arc::new(Gadget));
    assert_eq!(registry.len(), 1);
    let found = registry.get("device").expect("device is registered");
    assert_eq!(found.type_key(), TypeKey::of::<Gadget>());
}

#[rstest]
fn unregister_reports_whether_entry_existed(registry: InstanceRegistry) {
    registry.register("widget", Arc::new(Widget));
    assert!(registry.unregister("widget"));
    assert!(!registry.unregister("widget"));
    assert!(registry.get("widget").is_none());
}

#[rstest]
fn ids_are_sorted(registry: InstanceRegistry) {
    registry.register("zeta", Arc::new(Widget));
    registry.register("alpha", Arc::new(Widget));
    registry.register("mid", Arc::new(Gadget));
    assert_eq!(registry.ids(), vec!["alpha", "mid", "zeta"]);
}

#[rstest]
fn shutdown_clears_every_entry(registry: InstanceRegistry) {
    registry.register("a", Arc::new(Widget));
    registry.register("b", Arc::new(Gadget));
    assert_eq!(registry.shutdown(), 2);
    assert!(registry.is_empty());
    assert_eq!(registry.shutdown(), 0);
}

#[rstest]
fn shared_registration_leaves_caller_handle_intact(registry: InstanceRegistry) {
    let widget = Arc::new(Widget);
    registry.register_shared("widget", &widget);
    assert_eq!(Arc::strong_count(&widget), 2);
    assert!(registry.unregister("widget"));
    assert_eq!(Arc::strong_count(&widget), 1);
}

#[rstest]
fn lookups_hand_out_additional_handles(registry: InstanceRegistry) {
    let widget = Arc::new(Widget);
    registry.register_shared("widget", &widget);
    let found = registry.get("widget").expect("widget is registered");
    registry.shutdown();
    assert_eq!(found.type_key(), TypeKey::of::<Widget>());
    assert_eq!(Arc::strong_count(&widget), 2);
}

#[rstest]
fn concurrent_registration_and_lookup(registry: InstanceRegistry) {
    thread::scope(|scope| {
        for worker in 0..4 {
            let shared = &registry;
            scope.spawn(move || {
                for item in 0..25 {
                    let id = format!("w{worker}-{item}");
                    shared.register(id.clone(), Arc::new(Widget));
                    assert!(shared.get(&id).is_some());
                }
            });
        }
    });
    assert_eq!(registry.len(), 100);
}
