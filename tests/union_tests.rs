//! Integration tests for union encoding and decoding
//!
//! Unions encode as `[member_index, payload]` pairs. Encoding dispatches on
//! the value's runtime classification; decoding dispatches on the wire tag.

use serde_json::json;
use typewire::{
    compile_serializer, deserialize, serialize, Error, ErrorKind, TypeExpr, Value,
};

fn int_or_str() -> TypeExpr {
    TypeExpr::union([TypeExpr::int(), TypeExpr::string()])
}

// =============================================================================
// Tagging
// =============================================================================

#[test]
fn test_member_index_follows_declaration_order() {
    let ty = int_or_str();
    assert_eq!(serialize(&Value::Int(5), Some(&ty)).unwrap(), json!([0, 5]));
    assert_eq!(
        serialize(&Value::str("hi"), Some(&ty)).unwrap(),
        json!([1, "hi"])
    );
}

#[test]
fn test_decode_dispatches_on_wire_tag() {
    let ty = int_or_str();
    assert_eq!(deserialize(&json!([0, 5]), &ty).unwrap(), Value::Int(5));
    assert_eq!(
        deserialize(&json!([1, "hi"]), &ty).unwrap(),
        Value::str("hi")
    );
}

#[test]
fn test_payload_encodes_under_member_type() {
    let ty = TypeExpr::union([TypeExpr::Bytes, TypeExpr::int()]);
    let value = Value::Bytes(b"ab".to_vec());
    assert_eq!(serialize(&value, Some(&ty)).unwrap(), json!([0, "YWI="]));
    assert_eq!(deserialize(&json!([0, "YWI="]), &ty).unwrap(), value);
}

#[test]
fn test_union_members_with_distinct_container_kinds() {
    // tuple vs list is a valid distinction at runtime
    let ty = TypeExpr::union([
        TypeExpr::tuple([TypeExpr::int(), TypeExpr::int()]),
        TypeExpr::sequence(TypeExpr::int()),
    ]);
    let t = Value::tuple(vec![Value::Int(1), Value::Int(2)]);
    let s = Value::array(vec![Value::Int(1), Value::Int(2)]);

    assert_eq!(serialize(&t, Some(&ty)).unwrap(), json!([0, [1, 2]]));
    assert_eq!(serialize(&s, Some(&ty)).unwrap(), json!([1, [1, 2]]));

    assert_eq!(deserialize(&json!([0, [1, 2]]), &ty).unwrap(), t);
    assert_eq!(deserialize(&json!([1, [1, 2]]), &ty).unwrap(), s);
}

// =============================================================================
// Null stripping and degenerate unions
// =============================================================================

#[test]
fn test_null_members_are_dropped_from_dispatch() {
    // int | null | str keeps tags 0 and 1 for int and str
    let ty = TypeExpr::union([TypeExpr::int(), TypeExpr::null(), TypeExpr::string()]);
    assert_eq!(serialize(&Value::Int(5), Some(&ty)).unwrap(), json!([0, 5]));
    assert_eq!(
        serialize(&Value::str("x"), Some(&ty)).unwrap(),
        json!([1, "x"])
    );
}

#[test]
fn test_single_member_union_collapses() {
    // No pair wrapper when only one member remains after null stripping
    let ty = TypeExpr::union([TypeExpr::int(), TypeExpr::null()]);
    assert_eq!(serialize(&Value::Int(5), Some(&ty)).unwrap(), json!(5));
    assert_eq!(deserialize(&json!(5), &ty).unwrap(), Value::Int(5));
}

#[test]
fn test_all_null_union_is_a_schema_error() {
    let ty = TypeExpr::union([TypeExpr::null(), TypeExpr::null()]);
    let err = serialize(&Value::Null, Some(&ty)).unwrap_err();
    assert!(matches!(err, Error::EmptyUnion));
    assert_eq!(err.classify(), ErrorKind::Schema);
}

// =============================================================================
// Build-time rejection
// =============================================================================

#[test]
fn test_ambiguous_union_rejected_at_build_time() {
    let ty = TypeExpr::union([
        TypeExpr::sequence(TypeExpr::int()),
        TypeExpr::sequence(TypeExpr::string()),
    ]);
    let err = compile_serializer(&ty).unwrap_err();
    assert!(matches!(err, Error::AmbiguousUnion { .. }));
    assert_eq!(err.classify(), ErrorKind::Schema);
}

#[test]
fn test_nested_union_member_is_unsupported() {
    // A member with no single runtime classification cannot be dispatched
    let ty = TypeExpr::union([TypeExpr::int(), int_or_str()]);
    let err = compile_serializer(&ty).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType { .. }));
}

#[test]
fn test_unmatched_value_fails_at_run_time() {
    // The union compiles; a value matching no member leaves the routine's
    // output unbound.
    let ty = int_or_str();
    let err = serialize(&Value::Bool(true), Some(&ty)).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        Error::UndefinedVariable { .. }
    ));
    assert_eq!(err.classify(), ErrorKind::Value);
}
