//! Recursive comparison engine
//!
//! A comparison walks both graphs in lockstep, depth first. Each level:
//!
//! 1. absent values short-circuit (both absent: nothing; one absent: VALUE)
//! 2. a pair already on the current branch stops the descent, reporting a
//!    CYCLE when the two sides close their cycles at different depths
//! 3. differing runtime types add a CLASS difference, then descent continues
//!    on the common supertype
//! 4. the classifier's introspector lists fields; compared fields are tested
//!    for equality, introspected fields recurse
//!
//! Differences of one level are ordered class first, then compared fields,
//! then everything found below introspected fields.

use std::cmp::Ordering;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use smartcompare_core_types::ComparisonId;

use crate::classify::{Classifier, DefaultClassifier, FieldType};
use crate::difference::{Difference, DifferenceKind};
use crate::errors::Result;
use crate::field::{Field, Side};
use crate::introspect::FieldIntrospector;
use crate::model::{Graph, NodeId, Shape, TypeId, Value};
use crate::{log_op_end, log_op_error, log_op_start};

pub const DEFAULT_LABEL1: &str = "object1";
pub const DEFAULT_LABEL2: &str = "object2";

/// Structural comparator for object graphs
///
/// Holds the classifier and the labels used in descriptions. `compare`
/// takes `&mut self`, so a comparator (and its classifier caches) serves one
/// comparison at a time.
///
/// ```
/// use smartcompare_core::engine::SmartCompare;
/// use smartcompare_core::model::Graph;
///
/// let mut graph = Graph::new();
/// let left = graph.import_json_str(r#"{"a": 1, "b": [1, 2]}"#).unwrap();
/// let right = graph.import_json_str(r#"{"a": 2, "b": [1, 2]}"#).unwrap();
///
/// let mut sc = SmartCompare::new();
/// let diffs = sc.compare(&graph, &left, &right).unwrap();
/// assert_eq!(diffs.len(), 1);
/// assert_eq!(diffs[0].to_string(), "a->object1:[1] object2:[2]");
/// ```
#[derive(Debug)]
pub struct SmartCompare<C: Classifier = DefaultClassifier> {
    classifier: C,
    label1: String,
    label2: String,
}

impl SmartCompare<DefaultClassifier> {
    pub fn new() -> Self {
        Self::with_classifier(DefaultClassifier::new())
    }

    pub fn with_labels(label1: impl Into<String>, label2: impl Into<String>) -> Self {
        let mut sc = Self::new();
        sc.set_labels(label1, label2);
        sc
    }

    /// Compare the roots with `introspector` instead of the shape default
    pub fn with_root_introspector(introspector: Arc<dyn FieldIntrospector>) -> Self {
        Self::with_classifier(DefaultClassifier::new().with_root_introspector(introspector))
    }
}

impl Default for SmartCompare<DefaultClassifier> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Classifier> SmartCompare<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self {
            classifier,
            label1: DEFAULT_LABEL1.to_string(),
            label2: DEFAULT_LABEL2.to_string(),
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut C {
        &mut self.classifier
    }

    pub fn label1(&self) -> &str {
        &self.label1
    }

    pub fn label2(&self) -> &str {
        &self.label2
    }

    pub fn set_label1(&mut self, label: impl Into<String>) -> &mut Self {
        self.label1 = label.into();
        self
    }

    pub fn set_label2(&mut self, label: impl Into<String>) -> &mut Self {
        self.label2 = label.into();
        self
    }

    pub fn set_labels(&mut self, label1: impl Into<String>, label2: impl Into<String>) -> &mut Self {
        self.set_label1(label1).set_label2(label2)
    }

    /// # Errors
    ///
    /// Returns `InvalidPattern` if a pattern fails to compile.
    pub fn ignore_paths<I, S>(&mut self, patterns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.classifier.ignore_paths(patterns)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `InvalidPattern` if a pattern fails to compile.
    pub fn introspect_paths<I, S>(&mut self, patterns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.classifier.introspect_paths(patterns)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `InvalidPattern` if a pattern fails to compile.
    pub fn introspect_paths_with<I, S>(
        &mut self,
        introspector: Arc<dyn FieldIntrospector>,
        patterns: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.classifier.introspect_paths_with(introspector, patterns)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `InvalidPattern` if a pattern fails to compile.
    pub fn bind_comparator<I, S>(
        &mut self,
        comparator: Arc<dyn crate::classify::FieldComparator>,
        patterns: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.classifier.bind_comparator(comparator, patterns)?;
        Ok(self)
    }

    /// Compare `o1` against `o2`
    ///
    /// # Errors
    ///
    /// Data differences are never errors. Fails with `IntrospectionFailure`
    /// when an introspector's fields cannot be read.
    pub fn compare(&mut self, graph: &Graph, o1: &Value, o2: &Value) -> Result<Vec<Difference>> {
        let comparison_id = ComparisonId::new();
        let start = Instant::now();
        log_op_start!("compare", comparison_id = %comparison_id);

        let mut walk = Walk {
            graph,
            classifier: &mut self.classifier,
            label1: &self.label1,
            label2: &self.label2,
            comparison_id: &comparison_id,
        };
        let result = walk.compare(&Frame::default(), o1, o2);
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(diffs) => {
                log_op_end!(
                    "compare",
                    duration_ms = duration_ms,
                    comparison_id = %comparison_id,
                    diff_count = diffs.len()
                );
                Ok(diffs)
            }
            Err(err) => {
                log_op_error!(
                    "compare",
                    err.clone(),
                    duration_ms = duration_ms,
                    comparison_id = %comparison_id
                );
                Err(err.with_comparison_id(comparison_id))
            }
        }
    }

    /// Write each difference on its own line, without a trailing newline
    ///
    /// # Errors
    ///
    /// Propagates comparison failures, and `Io` if writing fails.
    pub fn print_differences<W: io::Write>(
        &mut self,
        graph: &Graph,
        o1: &Value,
        o2: &Value,
        out: &mut W,
    ) -> Result<()> {
        let diffs = self.compare(graph, o1, o2)?;
        for (i, diff) in diffs.iter().enumerate() {
            if i > 0 {
                out.write_all(b"\n")?;
            }
            write!(out, "{}", diff)?;
        }
        Ok(())
    }

    /// The text `print_differences` would write
    ///
    /// # Errors
    ///
    /// Propagates comparison failures.
    pub fn difference_report(&mut self, graph: &Graph, o1: &Value, o2: &Value) -> Result<String> {
        let diffs = self.compare(graph, o1, o2)?;
        Ok(diffs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Position of the pair being compared
///
/// Both visited stacks grow by one entry per level, in lockstep. Children get
/// their own extended copies so sibling branches never see each other.
#[derive(Debug, Clone, Default)]
struct Frame {
    path: Vec<String>,
    visited1: Vec<Option<NodeId>>,
    visited2: Vec<Option<NodeId>>,
}

impl Frame {
    fn path_string(&self) -> String {
        self.path.join(".")
    }

    fn depth(&self) -> usize {
        self.path.len()
    }

    /// Frame for recursing into `field` of the pair `(o1, o2)`
    fn child(&self, field: &Field, o1: &Value, o2: &Value) -> Frame {
        let mut child = self.clone();
        child.path.push(field.name().to_string());
        child.visited1.push(o1.as_node());
        child.visited2.push(o2.as_node());
        child
    }
}

enum CycleCheck {
    Proceed,
    /// Both sides return to the same depth; nothing to report
    Isomorphic,
    Divergent(Difference),
}

struct Walk<'a, C: Classifier> {
    graph: &'a Graph,
    classifier: &'a mut C,
    label1: &'a str,
    label2: &'a str,
    comparison_id: &'a ComparisonId,
}

impl<C: Classifier> Walk<'_, C> {
    fn describe(&self, v1: &Value, v2: &Value) -> String {
        format!(
            "{}:[{}] {}:[{}]",
            self.label1,
            self.graph.render(v1),
            self.label2,
            self.graph.render(v2)
        )
    }

    fn difference(
        &self,
        kind: DifferenceKind,
        frame: &Frame,
        field_name: &str,
        v1: Value,
        v2: Value,
    ) -> Difference {
        let description = self.describe(&v1, &v2);
        Difference::new(kind, frame.path.clone(), field_name, description, v1, v2)
    }

    fn compare(&mut self, frame: &Frame, o1: &Value, o2: &Value) -> Result<Vec<Difference>> {
        let mut diffs = Vec::new();

        if o1.is_absent() && o2.is_absent() {
            return Ok(diffs);
        }
        if o1.is_absent() || o2.is_absent() {
            diffs.push(self.difference(DifferenceKind::Value, frame, "", o1.clone(), o2.clone()));
            return Ok(diffs);
        }

        match self.check_cycle(frame, o1, o2) {
            CycleCheck::Proceed => {}
            CycleCheck::Isomorphic => return Ok(diffs),
            CycleCheck::Divergent(diff) => {
                diffs.push(diff);
                return Ok(diffs);
            }
        }

        let graph = self.graph;
        let types = graph.types();
        let t1 = graph.type_of(o1);
        let t2 = graph.type_of(o2);
        if t1 != t2 {
            let name = |t: Option<TypeId>| Value::from(t.map(|t| types.name(t)).unwrap_or("null"));
            tracing::debug!(
                comparison_id = %self.comparison_id,
                path = %frame.path_string(),
                type1 = ?t1.map(|t| types.name(t)),
                type2 = ?t2.map(|t| types.name(t)),
                "class mismatch"
            );
            diffs.push(self.difference(DifferenceKind::Class, frame, "", name(t1), name(t2)));
        }

        let common = types.common_supertype(t1, t2);
        if types.shape(common) == Shape::Scalar {
            if !self.leaf_equal(&frame.path_string(), common, o1, o2) {
                diffs.push(self.difference(DifferenceKind::Value, frame, "", o1.clone(), o2.clone()));
            }
            return Ok(diffs);
        }

        diffs.extend(self.field_differences(frame, common, o1, o2)?);
        Ok(diffs)
    }

    fn check_cycle(&self, frame: &Frame, o1: &Value, o2: &Value) -> CycleCheck {
        let position = |visited: &[Option<NodeId>], o: &Value| {
            o.as_node()
                .and_then(|id| visited.iter().position(|v| *v == Some(id)))
        };
        match (
            position(&frame.visited1, o1),
            position(&frame.visited2, o2),
        ) {
            (Some(depth1), Some(depth2)) if depth1 == depth2 => {
                tracing::trace!(
                    comparison_id = %self.comparison_id,
                    path = %frame.path_string(),
                    depth = depth1,
                    "isomorphic cycle"
                );
                CycleCheck::Isomorphic
            }
            (Some(depth1), Some(depth2)) => {
                let close1 = frame.path[..depth1].join(".");
                let close2 = frame.path[..depth2].join(".");
                tracing::debug!(
                    comparison_id = %self.comparison_id,
                    path = %frame.path_string(),
                    close1 = %close1,
                    close2 = %close2,
                    "divergent cycle"
                );
                CycleCheck::Divergent(self.difference(
                    DifferenceKind::Cycle,
                    frame,
                    "",
                    Value::Str(close1),
                    Value::Str(close2),
                ))
            }
            _ => CycleCheck::Proceed,
        }
    }

    fn field_differences(
        &mut self,
        frame: &Frame,
        common: TypeId,
        o1: &Value,
        o2: &Value,
    ) -> Result<Vec<Difference>> {
        let path = frame.path_string();
        let introspector = self
            .classifier
            .introspector_for(self.graph, &path, common, o1, o2);
        let fields = introspector.fields(self.graph, &path, common, o1, o2)?;
        tracing::trace!(
            comparison_id = %self.comparison_id,
            path = %path,
            depth = frame.depth(),
            introspector = introspector.name(),
            field_count = fields.len(),
            "fields listed"
        );

        let mut compared = Vec::new();
        let mut introspected = Vec::new();
        for field in fields {
            match self.classifier.classify(self.graph, &field) {
                FieldType::Compare => compared.push(field),
                FieldType::Introspect => introspected.push(field),
                FieldType::Ignore => {}
            }
        }

        let mut diffs = Vec::new();
        for field in &compared {
            diffs.extend(self.field_difference(frame, field, FieldType::Compare, o1, o2)?);
        }
        for field in &introspected {
            diffs.extend(self.field_difference(frame, field, FieldType::Introspect, o1, o2)?);
        }
        Ok(diffs)
    }

    fn field_difference(
        &mut self,
        frame: &Frame,
        field: &Field,
        field_type: FieldType,
        o1: &Value,
        o2: &Value,
    ) -> Result<Vec<Difference>> {
        let v1 = field.value(self.graph, Side::One, o1)?;
        let v2 = field.value(self.graph, Side::Two, o2)?;

        if v1.is_same(&v2) {
            return Ok(Vec::new());
        }
        if v1.is_missing() || v2.is_missing() {
            return Ok(vec![self.difference(DifferenceKind::Field, frame, field.name(), v1, v2)]);
        }
        if v1.is_null() != v2.is_null() {
            return Ok(vec![self.difference(DifferenceKind::Value, frame, field.name(), v1, v2)]);
        }

        match field_type {
            FieldType::Introspect => self.compare(&frame.child(field, o1, o2), &v1, &v2),
            FieldType::Compare | FieldType::Ignore => {
                if self.leaf_equal(field.path(), field.declared_type(), &v1, &v2) {
                    Ok(Vec::new())
                } else {
                    Ok(vec![self.difference(DifferenceKind::Value, frame, field.name(), v1, v2)])
                }
            }
        }
    }

    /// Bound comparator, else natural ordering, else structural equality
    fn leaf_equal(&mut self, path: &str, declared: TypeId, v1: &Value, v2: &Value) -> bool {
        match self.classifier.comparator_for(self.graph, path, declared) {
            Some(comparator) => comparator.is_equal(self.graph, v1, v2),
            None => match v1.natural_cmp(v2) {
                Some(ordering) => ordering == Ordering::Equal,
                None => self.graph.structural_eq(v1, v2),
            },
        }
    }
}
