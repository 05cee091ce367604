use pathstore::{Doc, PathStore, Value};

use crate::helpers::*;

#[test]
fn test_read_descends_records() {
    let store = menu_store();

    assert_eq!(store.read("drink.beer"), Some(Value::Bool(true)));
    assert_eq!(store.read("food.pasta"), Some(Value::Bool(false)));
    assert!(store.read("drink").unwrap().is_record());
}

#[test]
fn test_read_returns_falsy_values() {
    let store = PathStore::new(
        Doc::new()
            .with_bool("off", false)
            .with_int("zero", 0)
            .with_text("empty", "")
            .with("nothing", Value::Null),
    );

    assert_eq!(store.read("off"), Some(Value::Bool(false)));
    assert_eq!(store.read("zero"), Some(Value::Int(0)));
    assert_eq!(store.read("empty"), Some(Value::from("")));
    assert_eq!(store.read("nothing"), Some(Value::Null));
}

#[test]
fn test_read_short_circuits() {
    let store = menu_store();

    assert_eq!(store.read("drink.missing"), None);
    assert_eq!(store.read("drink.kind.length"), None);
    assert_eq!(store.read("animals.0"), None);
    assert_eq!(store.read(""), None);
    assert_eq!(store.read("drink."), None);
}

#[test]
fn test_read_is_idempotent() {
    let store = menu_store();
    let first = store.read("drink.kind");
    let second = store.read("drink.kind");
    assert_eq!(first, second);
}

#[test]
fn test_inspect_borrows_without_cloning() {
    let store = menu_store();
    let len = store.inspect("drink.kind", |value| value.and_then(Value::as_text).map(str::len));
    assert_eq!(len, Some("guiness".len()));
}

#[test]
fn test_with_state_and_snapshot() {
    let store = menu_store();

    let top_level = store.with_state(|state| state.len());
    assert_eq!(top_level, 3);

    assert_eq!(store.snapshot(), menu_state());
}
