#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Error codes and context surfaced through the public API

use smartcompare_core::{
    ExError, ExErrorKind, Graph, SmartCompareError, TypeDef, TypeId, Value,
};

#[test]
fn test_duplicate_type() {
    let mut graph = Graph::new();
    graph.define(TypeDef::new("Bean")).unwrap();

    let err = graph.define(TypeDef::new("Bean")).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::DuplicateType);
    assert_eq!(err.code(), "ERR_DUPLICATE_TYPE");
    assert_eq!(err.type_name(), Some("Bean"));
}

#[test]
fn test_unknown_type_lookup() {
    let graph = Graph::new();
    let err = graph.types().lookup("Nope").unwrap_err();
    assert_eq!(err.code(), "ERR_UNKNOWN_TYPE");
}

#[test]
fn test_duplicate_member() {
    let mut graph = Graph::new();
    let err = graph
        .define(
            TypeDef::new("Twice")
                .member("x", TypeId::INT)
                .member("x", TypeId::STRING),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::DuplicateMember);
}

#[test]
fn test_member_errors() {
    // GIVEN a type with one instance member and one static member
    let mut graph = Graph::new();
    let ty = graph
        .define(
            TypeDef::new("Counter")
                .member("value", TypeId::INT)
                .static_member("TOTAL", TypeId::INT),
        )
        .unwrap();
    let node = graph.new_record(ty).unwrap();

    // WHEN assigning an undeclared member
    let err = graph.set(node, "other", 1).unwrap_err();
    // THEN it is rejected as unknown
    assert_eq!(err.kind(), ExErrorKind::UnknownMember);
    assert_eq!(err.type_name(), Some("Counter"));

    // AND assigning the static member is rejected too
    let err = graph.set(node, "TOTAL", 1).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::StaticMember);
}

#[test]
fn test_shape_mismatch() {
    let mut graph = Graph::new();
    let map = graph.hash_map().unwrap();
    let err = graph.push(map, "x").unwrap_err();
    assert_eq!(err.code(), "ERR_SHAPE_MISMATCH");

    let err = graph.new_record(TypeId::LIST).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ShapeMismatch);
}

#[test]
fn test_malformed_json() {
    let mut graph = Graph::new();
    let err = graph.import_json_str("{not json").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Serialization);
}

#[test]
fn test_display_includes_context() {
    let err = ExError::from(SmartCompareError::IntrospectionFailure {
        path: "a.b".to_string(),
        reason: "broken".to_string(),
    })
    .with_op("compare");

    assert_eq!(
        err.to_string(),
        "[ERR_INTROSPECTION_FAILURE] in operation 'compare': \
         Introspection failed at 'a.b': broken (path: a.b)"
    );
}

#[test]
fn test_source_chain() {
    let inner = ExError::from(SmartCompareError::NodeNotFound { node_id: 9 });
    let outer = ExError::new(ExErrorKind::Internal)
        .with_message("wrapped")
        .with_source(inner);

    assert_eq!(outer.source_error().unwrap().kind(), ExErrorKind::NotFound);
    assert!(std::error::Error::source(&outer).is_some());
}

#[test]
fn test_data_differences_are_not_errors() {
    let graph = Graph::new();
    let diffs = smartcompare_core::SmartCompare::new()
        .compare(&graph, &Value::from("a"), &Value::from(1))
        .unwrap();
    assert_eq!(diffs.len(), 1);
}
