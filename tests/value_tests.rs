// tests/value_tests.rs

use std::cmp::Ordering;

use selector_lang::{Type, Value, ValueError};
use serde_json::json;

fn ints(values: &[i64]) -> Value {
    Value::slice(values.iter().copied().map(Value::int).collect())
}

// ============================================================================
// Equality and Ordering
// ============================================================================

#[test]
fn test_equality() {
    let test_cases = vec![
        (Value::int(1), Value::float(1.0), true),
        (Value::int(1), Value::string("1"), false),
        (Value::null(), Value::null(), true),
        (Value::null(), Value::bool(false), false),
        (ints(&[1, 2]), ints(&[1, 2]), true),
        (ints(&[1, 2]), ints(&[2, 1]), false),
        (
            Value::from(json!({"a": 1, "b": [true]})),
            Value::from(json!({"b": [true], "a": 1})),
            true,
        ),
        (
            Value::from(json!({"a": 1})),
            Value::from(json!({"a": 1, "b": 2})),
            false,
        ),
    ];

    for (left, right, expected) in test_cases {
        assert_eq!(left == right, expected, "Failed for {:?} == {:?}", left, right);
        assert_eq!(right == left, expected, "Failed for {:?} == {:?}", right, left);
    }
}

#[test]
fn test_flags_do_not_affect_equality() {
    let plain = ints(&[1]);
    let branch = ints(&[1]);
    branch.mark_as_branch();
    branch.set_metadata("origin", Value::string("test"));
    assert_eq!(plain, branch);
}

#[test]
fn test_compare_is_total() {
    let values = vec![
        Value::null(),
        Value::bool(false),
        Value::bool(true),
        Value::int(-1),
        Value::float(0.5),
        Value::int(2),
        Value::string("a"),
        Value::string("b"),
        ints(&[1]),
        ints(&[1, 0]),
        Value::from(json!({"a": 1})),
    ];

    for (i, a) in values.iter().enumerate() {
        assert_eq!(a.compare(a), Ordering::Equal);
        for (j, b) in values.iter().enumerate() {
            assert_eq!(a.compare(b), i.cmp(&j), "Failed for {:?} vs {:?}", a, b);
            assert_eq!(a.compare(b), b.compare(a).reverse());
        }
    }
}

#[test]
fn test_map_ordering_ignores_key_order() {
    let ab = Value::from(json!({"a": 1, "b": 2}));
    let ba = Value::from(json!({"b": 2, "a": 1}));
    assert_eq!(ab, ba);
    assert_eq!(ab.compare(&ba), Ordering::Equal);
    assert_eq!(ba.compare(&ab), Ordering::Equal);

    let a = Value::from(json!({"a": 9}));
    let b = Value::from(json!({"b": 0}));
    assert_eq!(a.compare(&b), Ordering::Less);
    assert_eq!(
        Value::from(json!({"b": 1, "a": 1})).compare(&Value::from(json!({"a": 2, "b": 0}))),
        Ordering::Less
    );
}

#[test]
fn test_relational_requires_matching_kinds() {
    assert!(Value::int(1).less_than(&Value::float(1.5)).unwrap());
    assert!(Value::string("a").less_than_or_equal(&Value::string("a")).unwrap());
    assert!(Value::int(3).greater_than_or_equal(&Value::int(3)).unwrap());
    assert_eq!(
        Value::bool(true).greater_than(&Value::bool(false)).unwrap_err(),
        ValueError::IncompatibleTypes {
            left: Type::Bool,
            right: Type::Bool
        }
    );
}

// ============================================================================
// Aliasing
// ============================================================================

#[test]
fn test_lookups_alias_the_document() {
    let doc = Value::from(json!({"user": {"name": "Tom"}, "list": [1, 2]}));

    let name = doc.get_map_key("user").unwrap().get_map_key("name").unwrap();
    name.set(&Value::string("Jim"));
    assert_eq!(doc.to_json(), json!({"user": {"name": "Jim"}, "list": [1, 2]}));

    let second = doc.get_map_key("list").unwrap().get_slice_index(-1).unwrap();
    second.set(&Value::from(json!({"x": true})));
    assert_eq!(doc.to_json()["list"], json!([1, {"x": true}]));
}

#[test]
fn test_clone_is_alias_and_deep_copy_is_not() {
    let original = Value::from(json!({"a": [1]}));
    let alias = original.clone();
    let copy = original.deep_copy();

    original.get_map_key("a").unwrap().append(Value::int(2)).unwrap();

    assert!(alias.ptr_eq(&original));
    assert_eq!(alias.get_map_key("a").unwrap(), ints(&[1, 2]));
    assert_eq!(copy.get_map_key("a").unwrap(), ints(&[1]));
}

#[test]
fn test_set_copies_source() {
    let target = Value::null();
    let source = ints(&[1, 2]);
    target.set(&source);
    source.append(Value::int(3)).unwrap();

    assert_eq!(target, ints(&[1, 2]));
    assert_eq!(target.kind(), Type::Slice);
}

#[test]
fn test_set_keeps_target_flags() {
    let target = ints(&[1]);
    target.mark_as_branch();
    target.set(&ints(&[2, 3]));
    assert!(target.is_branch());
    assert_eq!(target, ints(&[2, 3]));
}

#[test]
fn test_deep_copy_keeps_flags() {
    let value = ints(&[1]);
    value.mark_as_spread();
    value.set_metadata("k", Value::int(1));
    let copy = value.deep_copy();
    assert!(copy.is_spread());
    assert_eq!(copy.metadata("k"), Some(Value::int(1)));
    assert!(!copy.ptr_eq(&value));
}

// ============================================================================
// Maps
// ============================================================================

#[test]
fn test_map_keeps_insertion_order() {
    let map = Value::new_map();
    map.set_map_key("b", Value::int(1)).unwrap();
    map.set_map_key("a", Value::int(2)).unwrap();
    map.set_map_key("b", Value::int(3)).unwrap();

    assert_eq!(map.map_keys().unwrap(), ["b", "a"]);
    assert_eq!(map.get_map_key("b").unwrap(), Value::int(3));
}

#[test]
fn test_map_delete_and_exists() {
    let map = Value::from(json!({"a": 1, "b": 2, "c": 3}));
    assert!(map.map_key_exists("b").unwrap());
    assert_eq!(map.delete_map_key("b").unwrap(), Some(Value::int(2)));
    assert!(!map.map_key_exists("b").unwrap());
    assert_eq!(map.map_keys().unwrap(), ["a", "c"]);
    assert_eq!(map.delete_map_key("zz").unwrap(), None);
}

#[test]
fn test_map_errors() {
    let map = Value::new_map();
    assert_eq!(
        map.get_map_key("x").unwrap_err(),
        ValueError::MapKeyNotFound("x".to_string())
    );
    assert_eq!(
        Value::int(1).get_map_key("x").unwrap_err(),
        ValueError::UnexpectedType {
            expected: Type::Map,
            actual: Type::Int
        }
    );
}

// ============================================================================
// Slices and Ranges
// ============================================================================

#[test]
fn test_slice_index() {
    let list = ints(&[10, 20, 30]);
    assert_eq!(list.get_slice_index(0).unwrap(), Value::int(10));
    assert_eq!(list.get_slice_index(-3).unwrap(), Value::int(10));
    assert_eq!(
        list.get_slice_index(3).unwrap_err(),
        ValueError::SliceIndexOutOfRange { index: 3, len: 3 }
    );
    assert_eq!(
        list.get_slice_index(-4).unwrap_err(),
        ValueError::SliceIndexOutOfRange { index: -4, len: 3 }
    );

    list.set_slice_index(1, Value::int(0)).unwrap();
    assert_eq!(list, ints(&[10, 0, 30]));
}

#[test]
fn test_index_range() {
    let list = ints(&[1, 2, 3, 4]);
    let test_cases = vec![
        (Some(1), Some(2), vec![2, 3]),
        (Some(2), Some(0), vec![3, 2, 1]),
        (None, Some(1), vec![1, 2]),
        (Some(2), None, vec![3, 4]),
        (None, None, vec![1, 2, 3, 4]),
        (Some(-1), Some(0), vec![4, 3, 2, 1]),
        (Some(3), Some(3), vec![4]),
    ];

    for (start, end, expected) in test_cases {
        assert_eq!(
            list.index_range(start, end).unwrap(),
            ints(&expected),
            "Failed for {:?}:{:?}",
            start,
            end
        );
    }

    assert!(list.index_range(Some(0), Some(4)).is_err());
    assert_eq!(Value::new_slice().index_range(None, None).unwrap(), Value::new_slice());
}

#[test]
fn test_index_range_on_strings() {
    let s = Value::string("héllo");
    assert_eq!(s.index_range(Some(1), Some(2)).unwrap(), Value::string("él"));
    assert_eq!(s.index_range(Some(-1), Some(0)).unwrap(), Value::string("olléh"));
    assert!(Value::int(5).index_range(None, None).is_err());
}

#[test]
fn test_range_elements_alias() {
    let list = Value::from(json!([{"a": 1}, {"a": 2}]));
    let range = list.index_range(Some(1), None).unwrap();
    range.get_slice_index(0).unwrap().set_map_key("a", Value::int(9)).unwrap();
    assert_eq!(list.to_json(), json!([{"a": 1}, {"a": 9}]));
}

#[test]
fn test_append_flattens_branches() {
    let list = ints(&[1]);
    let branch = ints(&[2, 3]);
    branch.mark_as_branch();
    list.append(branch).unwrap();
    list.append(ints(&[4])).unwrap();

    assert_eq!(list.len().unwrap(), 4);
    assert_eq!(list.get_slice_index(3).unwrap(), ints(&[4]));
}

#[test]
fn test_len() {
    assert_eq!(Value::string("héllo").len().unwrap(), 5);
    assert_eq!(Value::from(json!({"a": 1})).len().unwrap(), 1);
    assert!(Value::new_slice().is_empty().unwrap());
    assert!(Value::null().len().is_err());
}

// ============================================================================
// JSON Conversion
// ============================================================================

#[test]
fn test_from_json_kinds() {
    let value = Value::from(json!({
        "n": null, "b": true, "i": 3, "f": 2.5, "s": "x", "l": [], "m": {}
    }));
    let kinds: Vec<Type> = value
        .map_entries()
        .unwrap()
        .into_iter()
        .map(|(_, v)| v.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            Type::Null,
            Type::Bool,
            Type::Int,
            Type::Float,
            Type::String,
            Type::Slice,
            Type::Map
        ]
    );
}

#[test]
fn test_to_json_preserves_order() {
    let value = Value::from(json!({"z": 1, "a": [1.5, "s", null]}));
    let text = serde_json::to_string(&value.to_json()).unwrap();
    assert_eq!(text, r#"{"z":1,"a":[1.5,"s",null]}"#);
}
