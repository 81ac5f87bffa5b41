//! Integration tests for generated program texture and diagnostics
//!
//! These tests inspect rendered program text and the errors routines
//! raise, rather than conversion results.

use serde_json::json;
use typewire::{
    compile_deserializer, compile_serializer, deserialize, Error, ErrorKind, TypeExpr, Value,
};

// =============================================================================
// Program texture
// =============================================================================

#[test]
fn test_primitive_serializer_is_a_single_assignment() {
    let routine = compile_serializer(&TypeExpr::int()).unwrap();
    assert_eq!(routine.source(), "out = inp");
}

#[test]
fn test_sequence_serializer_loops_over_a_copy() {
    let routine = compile_serializer(&TypeExpr::sequence(TypeExpr::Bytes)).unwrap();
    let source = routine.source();
    assert!(source.contains("out = list(inp)"));
    assert!(source.contains("in enumerate(out):"));
    assert!(source.contains("b64encode"));
}

#[test]
fn test_self_assignments_render_as_comments() {
    // Serializing a list of ints would assign each element to itself; the
    // builder elides that to a comment line.
    let routine = compile_serializer(&TypeExpr::sequence(TypeExpr::int())).unwrap();
    let source = routine.source();
    assert!(!source.contains("var1 = var1"));
    assert!(source.contains("# var1"));
}

#[test]
fn test_union_serializer_branches_on_classification() {
    let ty = TypeExpr::union([TypeExpr::int(), TypeExpr::string()]);
    let routine = compile_serializer(&ty).unwrap();
    let source = routine.source();
    assert!(source.contains("if isinstance(inp,"));
    assert!(source.contains("elif isinstance(inp,"));
}

#[test]
fn test_union_deserializer_branches_on_wire_tag() {
    let ty = TypeExpr::union([TypeExpr::int(), TypeExpr::string()]);
    let routine = compile_deserializer(&ty).unwrap();
    let source = routine.source();
    assert!(source.contains("if inp[0] == 0:"));
    assert!(source.contains("elif inp[0] == 1:"));
}

#[test]
fn test_variable_names_are_unique_across_nesting() {
    let ty = TypeExpr::sequence(TypeExpr::sequence(TypeExpr::sequence(TypeExpr::Bytes)));
    let routine = compile_serializer(&ty).unwrap();

    // Every name allocated for a loop header appears exactly once as an
    // enumerate target.
    let mut targets: Vec<&str> = routine
        .source()
        .lines()
        .filter_map(|l| l.trim().strip_prefix("for "))
        .filter_map(|l| l.split(" in ").next())
        .collect();
    let total = targets.len();
    targets.sort();
    targets.dedup();
    assert_eq!(targets.len(), total);
}

#[test]
fn test_routine_name_mentions_the_type() {
    let ty = TypeExpr::sequence(TypeExpr::int());
    let ser = compile_serializer(&ty).unwrap();
    let de = compile_deserializer(&ty).unwrap();
    assert_eq!(ser.name(), "<serializer for list[int]>");
    assert_eq!(de.name(), "<deserializer for list[int]>");
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn test_runtime_error_carries_generated_line_and_source() {
    let err = deserialize(&json!(["%bad%"]), &TypeExpr::sequence(TypeExpr::Bytes)).unwrap_err();
    match err {
        Error::InGeneratedCode { line, source, cause } => {
            assert!(line.contains("b64decode"), "failing line was `{}`", line);
            assert!(source.contains("out = list(inp)"));
            assert!(matches!(*cause, Error::InvalidBase64 { .. }));
        }
        other => panic!("expected InGeneratedCode, got {:?}", other),
    }
}

#[test]
fn test_error_display_includes_full_source() {
    let err = deserialize(&json!("nope"), &TypeExpr::Timestamp).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("Full source:"));
    assert!(text.contains("fromisoformat"));
}

#[test]
fn test_schema_and_value_errors_are_distinguishable() {
    let schema = compile_serializer(&TypeExpr::Opaque("Socket")).unwrap_err();
    assert_eq!(schema.classify(), ErrorKind::Schema);

    let value = deserialize(&json!("x"), &TypeExpr::Bytes).unwrap_err();
    assert_eq!(value.classify(), ErrorKind::Value);
}

#[test]
fn test_type_mismatch_surfaces_through_wrapper() {
    // Feeding a scalar where the program indexes a pair
    let ty = TypeExpr::union([TypeExpr::int(), TypeExpr::string()]);
    let err = deserialize(&json!(5), &ty).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        Error::TypeMismatch { .. } | Error::IndexOutOfBounds { .. }
    ));
}

// =============================================================================
// Routine reuse
// =============================================================================

#[test]
fn test_compiled_routine_is_reusable_and_cloneable() {
    let routine = compile_serializer(&TypeExpr::sequence(TypeExpr::int())).unwrap();
    let clone = routine.clone();

    let input = Value::array(vec![Value::Int(1)]);
    assert_eq!(routine.invoke(input.clone()).unwrap(), input);
    assert_eq!(clone.invoke(input.clone()).unwrap(), input);
    assert_eq!(routine.invoke(input.clone()).unwrap(), input);
}
