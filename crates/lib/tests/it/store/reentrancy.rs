//! Updaters and observers calling back into the store.

use std::sync::{Arc, Mutex};

use pathstore::{
    Doc, Observer, PathStore, StoreConfig, Value,
    store::DispatchPolicy,
};

use crate::helpers::*;

#[test]
fn test_updater_can_read_the_store() {
    let store = menu_store();
    let reader = store.clone();

    store.update("drink.kind", |_| {
        let beer = reader.read("drink.beer").and_then(|v| v.as_bool());
        Value::from(if beer == Some(true) { "ale" } else { "water" })
    });

    assert_eq!(store.read("drink.kind"), Some(Value::from("ale")));
}

#[test]
fn test_updater_can_update_another_path() {
    let store = menu_store();
    let (pizza_observer, pizza_log) = recording_observer();
    store.observe("food.pizza", &pizza_observer);
    let nested = store.clone();

    store.update("food.pasta", |_| {
        nested.set("food.pizza", false);
        Value::Bool(true)
    });

    assert_eq!(store.read("food.pasta"), Some(Value::Bool(true)));
    assert_eq!(store.read("food.pizza"), Some(Value::Bool(false)));
    assert_eq!(pizza_log.len(), 1);
}

#[test]
fn test_updater_removing_its_container_skips_the_write() {
    let store = menu_store();
    let (observer, log) = recording_observer();
    store.observe("drink.kind", &observer);
    let nested = store.clone();

    let applied = store.update("drink.kind", |_| {
        nested.set("drink", Value::Null);
        Value::from("ghost")
    });

    assert!(!applied);
    assert_eq!(store.read("drink"), Some(Value::Null));
    assert!(log.is_empty());
}

#[test]
fn test_observer_chains_update_to_derived_path() {
    let store = PathStore::new(Doc::new().with_int("celsius", 0).with_int("fahrenheit", 32));
    let weak = store.downgrade();
    store.subscribe("celsius", move |new, _, _| {
        if let (Some(store), Some(celsius)) = (weak.upgrade(), new.as_int()) {
            store.set("fahrenheit", celsius * 9 / 5 + 32);
        }
    });

    store.set("celsius", 100_i64);

    assert_eq!(store.read("fahrenheit"), Some(Value::Int(212)));
}

#[test]
fn test_unobserve_during_dispatch_does_not_affect_that_dispatch() {
    let store = menu_store();
    let (second, second_log) = recording_observer();

    let weak = store.downgrade();
    let victim = second.clone();
    let first = store.subscribe("drink.kind", move |_, _, path| {
        if let Some(store) = weak.upgrade() {
            store.unobserve(path, &victim);
        }
    });
    store.observe("drink.kind", &second);

    store.set("drink.kind", "stout");
    assert_eq!(second_log.len(), 1);

    store.set("drink.kind", "porter");
    assert_eq!(second_log.len(), 1);
    assert_eq!(store.observer_count("drink.kind"), 1);

    store.unobserve("drink.kind", &first);
}

#[test]
fn test_observer_registered_by_updater_sees_that_update() {
    let store = menu_store();
    let (late, late_log) = recording_observer();
    let nested = store.clone();

    store.update("drink.kind", |_| {
        nested.observe("drink.kind", &late);
        Value::from("mild")
    });

    assert_eq!(late_log.len(), 1);
}

#[test]
fn test_depth_limit_skips_runaway_recursion() {
    let store = PathStore::with_config(
        Doc::new().with_int("counter", 0),
        StoreConfig::default().with_max_update_depth(10),
    );
    let weak = store.downgrade();
    store.subscribe("counter", move |new, _, _| {
        if let Some(store) = weak.upgrade() {
            let next = new.as_int().unwrap_or(0) + 1;
            store.set("counter", next);
        }
    });

    assert!(store.set("counter", 1_i64));

    assert_eq!(store.read("counter"), Some(Value::Int(11)));
}

#[test]
fn test_depth_counter_resets_between_updates() {
    let store = PathStore::with_config(
        Doc::new().with_int("counter", 0),
        StoreConfig::default().with_max_update_depth(0),
    );

    for i in 1..=5_i64 {
        assert!(store.set("counter", i));
    }
    assert_eq!(store.read("counter"), Some(Value::Int(5)));
}

#[test]
fn test_isolate_policy_logs_and_continues() {
    let store = PathStore::with_config(
        menu_state(),
        StoreConfig::default().with_dispatch(DispatchPolicy::Isolate),
    );
    let reached = Arc::new(Mutex::new(Vec::new()));

    let before = Arc::clone(&reached);
    store.subscribe("food.pasta", move |_, _, _| before.lock().unwrap().push("before"));
    store.subscribe("food.pasta", |_, _, _| panic!("observer exploded"));
    let after = Arc::clone(&reached);
    store.subscribe("food.pasta", move |_, _, _| after.lock().unwrap().push("after"));

    assert!(store.set("food.pasta", true));
    assert!(store.set("food.pasta", false));

    assert_eq!(
        *reached.lock().unwrap(),
        vec!["before", "after", "before", "after"]
    );
}

#[test]
fn test_propagate_policy_stops_at_panicking_observer() {
    let store = menu_store();
    let (later, later_log) = recording_observer();
    store.subscribe("food.pasta", |_, _, _| panic!("observer exploded"));
    store.observe("food.pasta", &later);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        store.set("food.pasta", true)
    }));

    assert!(outcome.is_err());
    assert!(later_log.is_empty());
    // The assignment happened before dispatch
    assert_eq!(store.read("food.pasta"), Some(Value::Bool(true)));

    // The store stays usable afterwards
    let survivor = Observer::new(|_, _, _| {});
    store.unobserve("food.pasta", &survivor);
    assert!(store.set("food.pizza", false));
}
