use pathstore::{Doc, PathStore, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Drink {
    beer: bool,
    kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Food {
    pasta: bool,
    pizza: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Menu {
    animals: Vec<String>,
    drink: Drink,
    food: Food,
}

fn menu() -> Menu {
    Menu {
        animals: vec![],
        drink: Drink {
            beer: true,
            kind: "guiness".to_string(),
        },
        food: Food {
            pasta: false,
            pizza: true,
        },
    }
}

#[test]
fn test_store_from_user_struct() {
    let store = PathStore::from_serialize(&menu()).expect("struct is a record");

    assert_eq!(store.read("drink.kind"), Some(Value::from("guiness")));
    assert_eq!(store.read("food.pizza"), Some(Value::Bool(true)));
    assert_eq!(store.read("animals"), Some(Value::List(Vec::new())));
}

#[test]
fn test_snapshot_back_into_user_struct() {
    let store = PathStore::from_serialize(&menu()).unwrap();
    store.set("drink.kind", "old speckled hen");
    store.set("animals", vec![Value::from("dogs")]);

    let snapshot: Menu = store.snapshot_as().expect("shape is unchanged");

    let mut expected = menu();
    expected.drink.kind = "old speckled hen".to_string();
    expected.animals = vec!["dogs".to_string()];
    assert_eq!(snapshot, expected);
}

#[test]
fn test_snapshot_into_mismatched_struct_fails() {
    let store = PathStore::from_serialize(&menu()).unwrap();
    store.set("drink.beer", "not a bool");

    let err = store.snapshot_as::<Menu>().unwrap_err();

    assert!(err.is_serialization_error());
    assert_eq!(err.module(), "doc");
}

#[test]
fn test_non_record_root_is_rejected() {
    let err = PathStore::from_serialize(&vec![1, 2, 3]).unwrap_err();

    assert!(err.is_type_error());
}

#[test]
fn test_doc_json_round_trip() {
    let doc = PathStore::from_serialize(&menu()).unwrap().snapshot();

    let json = serde_json::to_string(&doc).unwrap();
    let back: Doc = serde_json::from_str(&json).unwrap();

    assert_eq!(back, doc);
}
