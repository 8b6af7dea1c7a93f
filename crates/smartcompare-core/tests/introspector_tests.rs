#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Custom introspectors bound by pattern or at the root

mod common;

use std::sync::Arc;

use common::{define_category, new_category, node};
use smartcompare_core::introspect::{MapIntrospector, UnorderedSetIntrospector};
use smartcompare_core::{
    ExErrorKind, Field, FieldIntrospector, Graph, Result, SmartCompare, TypeId, Value,
};

/// Lists only the `name` member of the common type
struct NameOnly;

impl FieldIntrospector for NameOnly {
    fn name(&self) -> &str {
        "name_only"
    }

    fn fields(
        &self,
        _graph: &Graph,
        path_prefix: &str,
        common: TypeId,
        _o1: &Value,
        _o2: &Value,
    ) -> Result<Vec<Field>> {
        Ok(vec![Field::member(path_prefix, common, "name", TypeId::STRING)])
    }
}

fn golf_and_fiesta() -> (Graph, Value, Value) {
    let mut graph = Graph::new();
    let category = define_category(&mut graph);
    let vw = new_category(&mut graph, category, "vw", 1, None);
    let ford = new_category(&mut graph, category, "ford", 2, None);
    let golf = new_category(&mut graph, category, "golf", 2, Some(vw));
    let fiesta = new_category(&mut graph, category, "fiesta", 1, Some(ford));
    (graph, node(golf), node(fiesta))
}

#[test]
fn test_custom_introspector_bound_to_path() {
    // GIVEN parent is walked with an introspector exposing only the name
    let (graph, golf, fiesta) = golf_and_fiesta();
    let mut sc = SmartCompare::new();
    sc.introspect_paths_with(Arc::new(NameOnly), ["parent"])
        .unwrap();

    // WHEN comparing
    let diffs = sc.compare(&graph, &golf, &fiesta).unwrap();

    // THEN parent.priority is never visited
    let paths: Vec<_> = diffs.iter().map(|d| d.full_path()).collect();
    assert_eq!(paths, vec!["name", "priority", "parent.name"]);
}

#[test]
fn test_root_introspector() {
    let (graph, golf, fiesta) = golf_and_fiesta();
    let mut sc = SmartCompare::with_root_introspector(Arc::new(NameOnly));

    let diffs = sc.compare(&graph, &golf, &fiesta).unwrap();

    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].full_path(), "name");
}

#[test]
fn test_empty_pattern_binds_root_introspector() {
    let (graph, golf, fiesta) = golf_and_fiesta();
    let mut sc = SmartCompare::new();
    sc.introspect_paths_with(Arc::new(NameOnly), [""]).unwrap();

    let diffs = sc.compare(&graph, &golf, &fiesta).unwrap();

    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].full_path(), "name");
}

#[test]
fn test_mismatched_introspector_fails_comparison() {
    // GIVEN a map introspector bound to a record-valued path
    let (graph, golf, fiesta) = golf_and_fiesta();
    let mut sc = SmartCompare::new();
    sc.introspect_paths_with(Arc::new(MapIntrospector), ["parent"])
        .unwrap();

    // WHEN comparing
    let err = sc.compare(&graph, &golf, &fiesta).unwrap_err();

    // THEN the comparison fails with the offending path
    assert_eq!(err.kind(), ExErrorKind::IntrospectionFailure);
    assert_eq!(err.code(), "ERR_INTROSPECTION_FAILURE");
    assert_eq!(err.path(), Some("parent"));
    assert!(err.comparison_id().is_some());
    assert!(err.message().contains("map"));
}

#[test]
fn test_set_introspector_on_list() {
    // a list walked as an unordered set ignores element order
    let mut graph = Graph::new();
    let a = graph.import_json_str(r#"["x", "y", "z"]"#).unwrap();
    let b = graph.import_json_str(r#"["z", "x", "y"]"#).unwrap();
    let mut sc = SmartCompare::with_root_introspector(Arc::new(UnorderedSetIntrospector));

    assert!(sc.compare(&graph, &a, &b).unwrap().is_empty());
}
