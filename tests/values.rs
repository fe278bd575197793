use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use im_rc::Vector;
use ordered_float::OrderedFloat;
use tinsel::interpreter::value::{
    core::Value,
    dict::{DictValue, SetValue},
    range::RangeValue,
};

fn hash_of(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn assert_equal_and_same_hash(a: &Value, b: &Value) {
    assert_eq!(a, b);
    assert_eq!(hash_of(a), hash_of(b), "equal values must hash alike: {}", a.inspect());
}

#[test]
fn scalar_equality() {
    assert_eq!(Value::from(42), Value::from(42));
    assert_ne!(Value::from(42), Value::from(43));
    assert_eq!(Value::from(3.25), Value::from(3.25));
    assert_eq!(Value::from("hi"), Value::from("hi"));
    assert_eq!(Value::Nil, Value::Nil);
    assert_eq!(Value::from(true), Value::from(true));
}

#[test]
fn integers_and_decimals_never_compare_equal() {
    assert_ne!(Value::from(3), Value::from(3.0));
    assert_ne!(Value::Nil, Value::from(0));
    assert_ne!(Value::from(false), Value::from(0));
}

#[test]
fn equal_values_hash_alike() {
    assert_equal_and_same_hash(&Value::from(7), &Value::from(7));
    assert_equal_and_same_hash(&Value::from("x"), &Value::from("x"));
    assert_equal_and_same_hash(&Value::from(2.5), &Value::from(2.5));
    assert_equal_and_same_hash(&Value::from(vec![Value::from(1), Value::from("a")]),
                               &Value::from(vec![Value::from(1), Value::from("a")]));
}

#[test]
fn list_equality_is_structural() {
    let a = Value::from(vec![Value::from(1), Value::from(vec![Value::from(2)])]);
    let b = Value::from(vec![Value::from(1), Value::from(vec![Value::from(2)])]);
    assert_equal_and_same_hash(&a, &b);

    let c = Value::from(vec![Value::from(1), Value::from(vec![Value::from(3)])]);
    assert_ne!(a, c);
}

#[test]
fn set_equality_ignores_insertion_order() {
    let mut forwards = SetValue::new();
    forwards.insert_mut(Value::from(1));
    forwards.insert_mut(Value::from(2));

    let mut backwards = SetValue::new();
    backwards.insert_mut(Value::from(2));
    backwards.insert_mut(Value::from(1));

    assert_equal_and_same_hash(&Value::Set(forwards.clone()), &Value::Set(backwards));

    // But iteration still reports insertion order.
    let order: Vec<String> = forwards.iter().map(Value::inspect).collect();
    assert_eq!(order, vec!["1", "2"]);
}

#[test]
fn dict_equality_ignores_insertion_order() {
    let mut forwards = DictValue::new();
    forwards.insert_mut(Value::from("a"), Value::from(1));
    forwards.insert_mut(Value::from("b"), Value::from(2));

    let mut backwards = DictValue::new();
    backwards.insert_mut(Value::from("b"), Value::from(2));
    backwards.insert_mut(Value::from("a"), Value::from(1));

    assert_equal_and_same_hash(&Value::Dict(forwards.clone()), &Value::Dict(backwards));

    let keys: Vec<String> = forwards.keys().map(Value::inspect).collect();
    assert_eq!(keys, vec!["\"a\"", "\"b\""]);
}

#[test]
fn dict_insert_is_persistent() {
    let original = DictValue::new().insert(Value::from("k"), Value::from(1));
    let derived = original.insert(Value::from("k2"), Value::from(2));

    assert_eq!(original.len(), 1);
    assert_eq!(derived.len(), 2);
    assert_eq!(original.get(&Value::from("k2")), None);
}

#[test]
fn set_remove_preserves_the_original() {
    let mut set = SetValue::new();
    set.insert_mut(Value::from(1));
    set.insert_mut(Value::from(2));

    let removed = set.remove(&Value::from(1));
    assert_eq!(set.len(), 2);
    assert_eq!(removed.len(), 1);
    assert!(!removed.contains(&Value::from(1)));
}

#[test]
fn hashability_tiers() {
    assert!(Value::from(1).is_hashable());
    assert!(Value::from("s").is_hashable());
    assert!(Value::from(vec![Value::from(1)]).is_hashable());
    assert!(Value::Set(SetValue::new()).is_hashable());
    assert!(!Value::Placeholder.is_hashable());

    let with_placeholder = Value::from(vec![Value::Placeholder]);
    assert!(!with_placeholder.is_hashable());
}

#[test]
fn truthiness() {
    assert!(!Value::Nil.is_truthy());
    assert!(!Value::from(0).is_truthy());
    assert!(!Value::from(0.0).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(!Value::List(Vector::new()).is_truthy());
    assert!(!Value::Dict(DictValue::new()).is_truthy());

    assert!(Value::from(-1).is_truthy());
    assert!(Value::from(" ").is_truthy());
    assert!(Value::from(true).is_truthy());
}

#[test]
fn inspect_is_canonical() {
    assert_eq!(Value::from(42).inspect(), "42");
    assert_eq!(Value::from(2.0).inspect(), "2.0");
    assert_eq!(Value::from(2.5).inspect(), "2.5");
    assert_eq!(Value::from("a\nb").inspect(), "\"a\\nb\"");
    assert_eq!(Value::Nil.inspect(), "nil");
    assert_eq!(Value::from(vec![Value::from(1), Value::from("x")]).inspect(), "[1, \"x\"]");
}

#[test]
fn range_lengths() {
    let bounded = RangeValue::new(1.into(), Some(5.into()), false);
    assert_eq!(bounded.len(), Some(4.into()));

    let inclusive = RangeValue::new(1.into(), Some(5.into()), true);
    assert_eq!(inclusive.len(), Some(5.into()));

    let descending = RangeValue::new(5.into(), Some(1.into()), false);
    assert_eq!(descending.len(), Some(4.into()));

    let unbounded = RangeValue::new(1.into(), None, false);
    assert_eq!(unbounded.len(), None);
    assert!(unbounded.is_unbounded());
    assert!(!unbounded.is_empty());

    let empty = RangeValue::new(3.into(), Some(3.into()), false);
    assert!(empty.is_empty());
}

#[test]
fn range_iteration() {
    let descending = RangeValue::new(3.into(), Some(0.into()), false);
    let values: Vec<String> = descending.iter().map(|n| n.to_string()).collect();
    assert_eq!(values, vec!["3", "2", "1"]);

    let stepped = RangeValue::with_step(0.into(), 10.into(), false, 4.into());
    let values: Vec<String> = stepped.iter().map(|n| n.to_string()).collect();
    assert_eq!(values, vec!["0", "4", "8"]);
}

#[test]
fn decimal_ordering_is_total() {
    let small = Value::Decimal(OrderedFloat(1.0));
    let big = Value::Decimal(OrderedFloat(2.0));
    assert_eq!(small.compare(&big), Some(std::cmp::Ordering::Less));

    // Mixed comparison promotes the integer side.
    assert_eq!(Value::from(1).compare(&Value::from(1.5)), Some(std::cmp::Ordering::Less));
    assert_eq!(Value::from(2).compare(&Value::from(1.5)), Some(std::cmp::Ordering::Greater));
}
