//! Integration tests for reflective (untyped) serialization
//!
//! Blind serialization is driven by the value's own shape. For values whose
//! shape a type expression could describe, it must agree with the compiled
//! path on the wire form.

use chrono::{TimeZone, Utc};
use serde_json::json;
use typewire::{serialize, TypeExpr, Value};

#[test]
fn test_scalars() {
    assert_eq!(serialize(&Value::Null, None).unwrap(), json!(null));
    assert_eq!(serialize(&Value::Int(5), None).unwrap(), json!(5));
    assert_eq!(serialize(&Value::str("hi"), None).unwrap(), json!("hi"));
}

#[test]
fn test_bytes_and_timestamps_lower_to_text() {
    assert_eq!(
        serialize(&Value::Bytes(b"ab".to_vec()), None).unwrap(),
        json!("YWI=")
    );
    let ts = Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap();
    assert_eq!(
        serialize(&Value::Timestamp(ts), None).unwrap(),
        json!("2024-05-17T12:30:00+00:00")
    );
}

#[test]
fn test_agrees_with_compiled_path_on_typed_shapes() {
    let cases: Vec<(TypeExpr, Value)> = vec![
        (
            TypeExpr::sequence(TypeExpr::int()),
            Value::array(vec![Value::Int(1), Value::Int(2)]),
        ),
        (
            TypeExpr::mapping(TypeExpr::string(), TypeExpr::Bytes),
            Value::map(vec![(Value::str("k"), Value::Bytes(b"ab".to_vec()))]),
        ),
        (
            TypeExpr::tuple([TypeExpr::int(), TypeExpr::string()]),
            Value::tuple(vec![Value::Int(1), Value::str("a")]),
        ),
    ];

    for (ty, value) in cases {
        let typed = serialize(&value, Some(&ty)).unwrap();
        let blind = serialize(&value, None).unwrap();
        assert_eq!(typed, blind, "divergence for {}", ty);
    }
}

#[test]
fn test_non_text_map_keys_degrade_to_json_text() {
    // The compiled path keeps such keys as pair rows; without a type the
    // key collapses to its JSON rendering so the result stays an object.
    let value = Value::map(vec![(Value::Int(7), Value::str("seven"))]);
    assert_eq!(serialize(&value, None).unwrap(), json!({"7": "seven"}));
}

#[test]
fn test_nested_untyped_structure() {
    let value = Value::map(vec![(
        Value::str("blob"),
        Value::array(vec![
            Value::Bytes(b"ab".to_vec()),
            Value::map(vec![(Value::str("n"), Value::Int(1))]),
        ]),
    )]);
    assert_eq!(
        serialize(&value, None).unwrap(),
        json!({"blob": ["YWI=", {"n": 1}]})
    );
}
