use pathstore::{Doc, PathStore, TypedPath, Value, state_paths};

use crate::helpers::*;

state_paths! {
    mod menu {
        animals: Vec<Value>,
        drink {
            beer: bool,
            kind: String,
        },
        food {
            pasta: bool,
            pizza: bool,
        },
    }
}

state_paths! {
    mod ultra {
        meta {
            system_name: String,
            version: String,
        },
        zdeep_settings {
            level1 {
                level2 {
                    level3 {
                        current_value: String,
                    },
                },
            },
        },
    }
}

#[test]
fn test_generated_paths_mirror_the_shape() {
    assert_eq!(menu::animals.as_str(), "animals");
    assert_eq!(menu::drink.as_str(), "drink");
    assert_eq!(menu::drink::kind.as_str(), "drink.kind");
    assert_eq!(menu::food::pizza.as_str(), "food.pizza");
    assert_eq!(
        ultra::zdeep_settings::level1::level2::level3::current_value.as_str(),
        "zdeep_settings.level1.level2.level3.current_value"
    );
}

#[test]
fn test_generated_paths_carry_value_types() {
    let _: TypedPath<Doc> = menu::drink;
    let _: TypedPath<bool> = menu::drink::beer;
    let _: TypedPath<String> = menu::drink::kind;
    let _: TypedPath<Vec<Value>> = menu::animals;
}

#[test]
fn test_typed_reads_and_writes() {
    let store = menu_store();

    assert_eq!(store.get(menu::drink::kind), Some("guiness".to_string()));
    assert_eq!(store.get(menu::food::pizza), Some(true));
    assert_eq!(store.get(menu::animals), Some(Vec::new()));

    assert!(store.put(menu::food::pasta, true));
    assert_eq!(store.read("food.pasta"), Some(Value::Bool(true)));

    store.update_as(menu::food::pizza, |prev| !prev.unwrap_or(false));
    assert_eq!(store.get(menu::food::pizza), Some(false));
}

#[test]
fn test_typed_paths_work_with_untyped_operations() {
    let store = menu_store();
    let (observer, log) = recording_observer();
    store.observe(menu::drink::kind, &observer);

    store.set(menu::drink::kind, "bitter");

    assert_eq!(log.len(), 1);
    assert_eq!(log.calls()[0].2, "drink.kind");
}

#[test]
fn test_runtime_does_not_trust_the_type_layer() {
    // Declared shape disagrees with the runtime state
    let store = PathStore::new(Doc::new().with_int("meta", 3));

    assert_eq!(store.get(ultra::meta::version), None);
    assert!(!store.put(ultra::meta::version, "4.0.0".to_string()));
    assert_eq!(store.get(ultra::meta), None);
}
