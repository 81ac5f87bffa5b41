//! Property-based fuzzing tests for the compilers and generated routines
//!
//! These tests use proptest to generate random type expressions, matching
//! values, and arbitrary wire JSON, and verify that:
//! 1. Typed serialization round-trips exactly
//! 2. Blind serialization agrees with the compiled path
//! 3. Compilation and decoding return errors instead of panicking

use proptest::prelude::*;
use serde_json::json;
use typewire::{
    compile_deserializer, compile_serializer, deserialize, serialize, Primitive, TypeExpr, Value,
};

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Generate type expressions (no unions or hooks; those have directed tests)
fn arb_type() -> impl Strategy<Value = TypeExpr> {
    let leaf = prop_oneof![
        Just(TypeExpr::int()),
        Just(TypeExpr::string()),
        Just(TypeExpr::boolean()),
        Just(TypeExpr::Bytes),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(TypeExpr::sequence),
            inner
                .clone()
                .prop_map(|t| TypeExpr::mapping(TypeExpr::string(), t)),
            prop::collection::vec(inner.clone(), 1..3).prop_map(TypeExpr::tuple),
            inner.prop_map(TypeExpr::optional),
        ]
    })
}

/// Generate a value inhabiting the given type
fn value_for(ty: &TypeExpr) -> BoxedStrategy<Value> {
    match ty {
        TypeExpr::Primitive(Primitive::Int) => any::<i64>().prop_map(Value::Int).boxed(),
        TypeExpr::Primitive(Primitive::Str) => "[a-z]{0,8}".prop_map(Value::str).boxed(),
        TypeExpr::Primitive(Primitive::Bool) => any::<bool>().prop_map(Value::Bool).boxed(),
        TypeExpr::Bytes => prop::collection::vec(any::<u8>(), 0..16)
            .prop_map(Value::Bytes)
            .boxed(),
        TypeExpr::Optional(inner) => value_for(inner),
        TypeExpr::Sequence(elem) => prop::collection::vec(value_for(elem), 0..4)
            .prop_map(Value::array)
            .boxed(),
        TypeExpr::Tuple(elems) => {
            let mut parts: BoxedStrategy<Vec<Value>> = Just(Vec::new()).boxed();
            for elem in elems {
                parts = (parts, value_for(elem))
                    .prop_map(|(mut vs, v)| {
                        vs.push(v);
                        vs
                    })
                    .boxed();
            }
            parts.prop_map(Value::Tuple).boxed()
        }
        TypeExpr::Mapping(_, value) => {
            // Keys from a hash map, so they are unique within one mapping
            prop::collection::hash_map("[a-z]{1,6}", value_for(value), 0..4)
                .prop_map(|m| {
                    Value::Map(m.into_iter().map(|(k, v)| (Value::str(k), v)).collect())
                })
                .boxed()
        }
        _ => Just(Value::Null).boxed(),
    }
}

fn arb_typed_value() -> impl Strategy<Value = (TypeExpr, Value)> {
    arb_type().prop_flat_map(|ty| {
        let values = value_for(&ty);
        values.prop_map(move |v| (ty.clone(), v))
    })
}

/// Generate arbitrary wire JSON, mostly shaped wrongly for any given type
fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(json!(null)),
        any::<bool>().prop_map(|b| json!(b)),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9+/=]{0,12}".prop_map(|s| json!(s)),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
            prop::collection::hash_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_typed_round_trip((ty, value) in arb_typed_value()) {
        let wire = serialize(&value, Some(&ty)).unwrap();
        let back = deserialize(&wire, &ty).unwrap();
        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_blind_agrees_with_compiled((ty, value) in arb_typed_value()) {
        let typed = serialize(&value, Some(&ty)).unwrap();
        let blind = serialize(&value, None).unwrap();
        prop_assert_eq!(typed, blind);
    }

    #[test]
    fn prop_compile_never_panics(ty in arb_type()) {
        let _ = compile_serializer(&ty);
        let _ = compile_deserializer(&ty);
    }

    #[test]
    fn prop_decode_returns_errors_not_panics(wire in arb_json(), ty in arb_type()) {
        // Most generated wire trees do not match the type; both outcomes
        // are acceptable, panics are not.
        let _ = deserialize(&wire, &ty);
    }

    #[test]
    fn prop_serialization_is_deterministic((ty, value) in arb_typed_value()) {
        let first = serialize(&value, Some(&ty)).unwrap();
        let second = serialize(&value, Some(&ty)).unwrap();
        prop_assert_eq!(first, second);
    }
}
