//! Field classification
//!
//! The classifier decides, per field path, whether a field is compared,
//! recursed into, or skipped, and which introspector and comparator apply.
//! Path patterns are regular expressions that must match the whole path.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::errors::{Result, SmartCompareError};
use crate::field::Field;
use crate::introspect::{
    FieldIntrospector, MapIntrospector, MemberIntrospector, MemberPolicy, SequenceIntrospector,
    UnorderedSetIntrospector,
};
use crate::model::{Graph, Shape, TypeId, Value};

/// What the engine does with a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Test the two values for equality
    Compare,
    /// Recurse into the two values
    Introspect,
    /// Skip the field entirely
    Ignore,
}

/// Custom equality for compared values
pub trait FieldComparator: Send + Sync {
    fn is_equal(&self, graph: &Graph, v1: &Value, v2: &Value) -> bool;
}

/// Compares arrays element by element
///
/// Default comparator for array-typed fields that are compared rather than
/// introspected. Also accepts any other collection on either side.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayAsListComparator;

impl FieldComparator for ArrayAsListComparator {
    fn is_equal(&self, graph: &Graph, v1: &Value, v2: &Value) -> bool {
        if v1.is_same(v2) {
            return true;
        }
        match (graph.elements(v1), graph.elements(v2)) {
            (Ok(a), Ok(b)) => {
                a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| graph.structural_eq(x, y))
            }
            _ => graph.structural_eq(v1, v2),
        }
    }
}

struct ClosureComparator<F>(F);

impl<F> FieldComparator for ClosureComparator<F>
where
    F: Fn(&Graph, &Value, &Value) -> bool + Send + Sync,
{
    fn is_equal(&self, graph: &Graph, v1: &Value, v2: &Value) -> bool {
        (self.0)(graph, v1, v2)
    }
}

/// Wrap a closure as a comparator
///
/// ```
/// use smartcompare_core::classify::value_comparator;
/// use smartcompare_core::model::Value;
///
/// let case_insensitive = value_comparator(|_, a, b| match (a, b) {
///     (Value::Str(a), Value::Str(b)) => a.eq_ignore_ascii_case(b),
///     _ => a == b,
/// });
/// # let _ = case_insensitive;
/// ```
pub fn value_comparator<F>(f: F) -> Arc<dyn FieldComparator>
where
    F: Fn(&Graph, &Value, &Value) -> bool + Send + Sync + 'static,
{
    Arc::new(ClosureComparator(f))
}

/// Classification policy consulted by the engine
///
/// Registration calls may change answers for paths that were already
/// queried, so implementations must drop any memoised decisions on every
/// registration. Queries take `&mut self` so caches can be filled in place.
pub trait Classifier {
    fn classify(&mut self, graph: &Graph, field: &Field) -> FieldType;

    /// Introspector for the pair at `path` whose common supertype is `common`
    fn introspector_for(
        &mut self,
        graph: &Graph,
        path: &str,
        common: TypeId,
        o1: &Value,
        o2: &Value,
    ) -> Arc<dyn FieldIntrospector>;

    /// Comparator for a compared value at `path`; `None` means natural
    /// ordering, then equality
    fn comparator_for(
        &mut self,
        graph: &Graph,
        path: &str,
        declared: TypeId,
    ) -> Option<Arc<dyn FieldComparator>>;

    /// # Errors
    ///
    /// Returns `InvalidPattern` if any pattern fails to compile; nothing is
    /// registered in that case.
    fn ignore_paths<I, S>(&mut self, patterns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;

    /// # Errors
    ///
    /// Returns `InvalidPattern` if any pattern fails to compile.
    fn introspect_paths<I, S>(&mut self, patterns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;

    /// Recurse into matching paths using `introspector`
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if any pattern fails to compile.
    fn introspect_paths_with<I, S>(
        &mut self,
        introspector: Arc<dyn FieldIntrospector>,
        patterns: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;

    /// # Errors
    ///
    /// Returns `InvalidPattern` if any pattern fails to compile.
    fn bind_comparator<I, S>(
        &mut self,
        comparator: Arc<dyn FieldComparator>,
        patterns: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;
}

/// A compiled whole-path pattern
#[derive(Debug, Clone)]
struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    fn compile(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
            SmartCompareError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    fn compile_all<I, S>(patterns: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patterns
            .into_iter()
            .map(|p| Self::compile(p.as_ref()))
            .collect()
    }

    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

#[derive(Clone)]
enum IntrospectBinding {
    Unbound,
    Default,
    Custom(Arc<dyn FieldIntrospector>),
}

/// Pattern-driven classifier with per-path memoisation
///
/// Defaults when no pattern matches: maps, iterables and arrays of scalars
/// are introspected, everything else is compared. Ignore patterns win over
/// introspect patterns. Among introspect or comparator patterns the first
/// registered match wins.
pub struct DefaultClassifier {
    ignore: Vec<PathPattern>,
    introspect: Vec<(PathPattern, Option<Arc<dyn FieldIntrospector>>)>,
    comparators: Vec<(PathPattern, Arc<dyn FieldComparator>)>,
    root_introspector: Option<Arc<dyn FieldIntrospector>>,

    member: Arc<dyn FieldIntrospector>,
    map: Arc<dyn FieldIntrospector>,
    sequence: Arc<dyn FieldIntrospector>,
    unordered_set: Arc<dyn FieldIntrospector>,
    array_comparator: Arc<dyn FieldComparator>,

    ignore_cache: HashMap<String, bool>,
    introspect_cache: HashMap<String, IntrospectBinding>,
    comparator_cache: HashMap<String, Option<Arc<dyn FieldComparator>>>,
}

impl DefaultClassifier {
    pub fn new() -> Self {
        Self {
            ignore: Vec::new(),
            introspect: Vec::new(),
            comparators: Vec::new(),
            root_introspector: None,
            member: Arc::new(MemberIntrospector::new(MemberPolicy::default())),
            map: Arc::new(MapIntrospector),
            sequence: Arc::new(SequenceIntrospector::new()),
            unordered_set: Arc::new(UnorderedSetIntrospector),
            array_comparator: Arc::new(ArrayAsListComparator),
            ignore_cache: HashMap::new(),
            introspect_cache: HashMap::new(),
            comparator_cache: HashMap::new(),
        }
    }

    /// Use `introspector` for the comparison roots
    pub fn with_root_introspector(mut self, introspector: Arc<dyn FieldIntrospector>) -> Self {
        self.root_introspector = Some(introspector);
        self
    }

    /// Policy of the default introspector for record-shaped pairs
    pub fn with_member_policy(mut self, policy: MemberPolicy) -> Self {
        self.member = Arc::new(MemberIntrospector::new(policy));
        self.invalidate();
        self
    }

    /// Number of memoised per-path decisions across all caches
    pub fn cached_decisions(&self) -> usize {
        self.ignore_cache.len() + self.introspect_cache.len() + self.comparator_cache.len()
    }

    fn invalidate(&mut self) {
        if self.cached_decisions() > 0 {
            tracing::debug!(
                op = "invalidate_caches",
                ignore = self.ignore_cache.len(),
                introspect = self.introspect_cache.len(),
                comparator = self.comparator_cache.len(),
                "classifier caches invalidated"
            );
        }
        self.ignore_cache.clear();
        self.introspect_cache.clear();
        self.comparator_cache.clear();
    }

    fn is_ignored(&mut self, path: &str) -> bool {
        if let Some(hit) = self.ignore_cache.get(path) {
            return *hit;
        }
        let ignored = self.ignore.iter().any(|p| p.matches(path));
        self.ignore_cache.insert(path.to_string(), ignored);
        ignored
    }

    fn introspect_binding(&mut self, path: &str) -> IntrospectBinding {
        if let Some(hit) = self.introspect_cache.get(path) {
            return hit.clone();
        }
        let binding = self
            .introspect
            .iter()
            .find(|(p, _)| p.matches(path))
            .map(|(_, custom)| match custom {
                Some(i) => IntrospectBinding::Custom(Arc::clone(i)),
                None => IntrospectBinding::Default,
            })
            .unwrap_or(IntrospectBinding::Unbound);
        self.introspect_cache
            .insert(path.to_string(), binding.clone());
        binding
    }

    fn bound_comparator(&mut self, path: &str) -> Option<Arc<dyn FieldComparator>> {
        if let Some(hit) = self.comparator_cache.get(path) {
            return hit.clone();
        }
        let bound = self
            .comparators
            .iter()
            .find(|(p, _)| p.matches(path))
            .map(|(_, c)| Arc::clone(c));
        self.comparator_cache.insert(path.to_string(), bound.clone());
        bound
    }

    fn introspect_by_default(graph: &Graph, declared: TypeId) -> bool {
        let types = graph.types();
        types.is_primitive_like_array(declared)
            || types.is_map_like(declared)
            || types.is_iterable(declared)
    }

    fn default_introspector(&self, graph: &Graph, common: TypeId) -> Arc<dyn FieldIntrospector> {
        match graph.types().shape(common) {
            Shape::Map => Arc::clone(&self.map),
            Shape::Set => Arc::clone(&self.unordered_set),
            Shape::Sequence | Shape::SortedSet | Shape::Array => Arc::clone(&self.sequence),
            Shape::Object | Shape::Scalar | Shape::Record => Arc::clone(&self.member),
        }
    }
}

impl Default for DefaultClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DefaultClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources = |patterns: Vec<&PathPattern>| -> Vec<String> {
            patterns.into_iter().map(|p| p.source.clone()).collect()
        };
        f.debug_struct("DefaultClassifier")
            .field("ignore", &sources(self.ignore.iter().collect()))
            .field(
                "introspect",
                &sources(self.introspect.iter().map(|(p, _)| p).collect()),
            )
            .field(
                "comparators",
                &sources(self.comparators.iter().map(|(p, _)| p).collect()),
            )
            .field("member", &self.member.name())
            .field(
                "root_introspector",
                &self.root_introspector.as_ref().map(|i| i.name().to_string()),
            )
            .field("cached_decisions", &self.cached_decisions())
            .finish()
    }
}

impl Classifier for DefaultClassifier {
    fn classify(&mut self, graph: &Graph, field: &Field) -> FieldType {
        if self.is_ignored(field.path()) {
            return FieldType::Ignore;
        }
        match self.introspect_binding(field.path()) {
            IntrospectBinding::Default | IntrospectBinding::Custom(_) => FieldType::Introspect,
            IntrospectBinding::Unbound if Self::introspect_by_default(graph, field.declared_type()) => {
                FieldType::Introspect
            }
            IntrospectBinding::Unbound => FieldType::Compare,
        }
    }

    fn introspector_for(
        &mut self,
        graph: &Graph,
        path: &str,
        common: TypeId,
        _o1: &Value,
        _o2: &Value,
    ) -> Arc<dyn FieldIntrospector> {
        if path.is_empty() {
            if let Some(root) = &self.root_introspector {
                return Arc::clone(root);
            }
        }
        match self.introspect_binding(path) {
            IntrospectBinding::Custom(custom) => custom,
            IntrospectBinding::Default | IntrospectBinding::Unbound => {
                self.default_introspector(graph, common)
            }
        }
    }

    fn comparator_for(
        &mut self,
        graph: &Graph,
        path: &str,
        declared: TypeId,
    ) -> Option<Arc<dyn FieldComparator>> {
        self.bound_comparator(path).or_else(|| {
            (graph.types().shape(declared) == Shape::Array)
                .then(|| Arc::clone(&self.array_comparator))
        })
    }

    fn ignore_paths<I, S>(&mut self, patterns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = PathPattern::compile_all(patterns)?;
        self.invalidate();
        self.ignore.extend(compiled);
        Ok(self)
    }

    fn introspect_paths<I, S>(&mut self, patterns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = PathPattern::compile_all(patterns)?;
        self.invalidate();
        self.introspect.extend(compiled.into_iter().map(|p| (p, None)));
        Ok(self)
    }

    fn introspect_paths_with<I, S>(
        &mut self,
        introspector: Arc<dyn FieldIntrospector>,
        patterns: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = PathPattern::compile_all(patterns)?;
        self.invalidate();
        for pattern in compiled {
            // the empty pattern addresses the comparison roots
            if pattern.source.is_empty() {
                self.root_introspector = Some(Arc::clone(&introspector));
            } else {
                self.introspect
                    .push((pattern, Some(Arc::clone(&introspector))));
            }
        }
        Ok(self)
    }

    fn bind_comparator<I, S>(
        &mut self,
        comparator: Arc<dyn FieldComparator>,
        patterns: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = PathPattern::compile_all(patterns)?;
        self.invalidate();
        self.comparators
            .extend(compiled.into_iter().map(|p| (p, Arc::clone(&comparator))));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::model::TypeDef;

    fn string_field(path: &str) -> Field {
        let (prefix, name) = path.rsplit_once('.').unwrap_or(("", path));
        Field::slot(prefix, name, TypeId::STRING, Value::Null, Value::Null)
    }

    #[test]
    fn test_defaults_by_declared_type() {
        let graph = Graph::new();
        let mut classifier = DefaultClassifier::new();
        let cases = [
            (TypeId::STRING, FieldType::Compare),
            (TypeId::INT, FieldType::Compare),
            (TypeId::LIST, FieldType::Introspect),
            (TypeId::HASH_MAP, FieldType::Introspect),
            (TypeId::SORTED_SET, FieldType::Introspect),
            (TypeId::INT_ARRAY, FieldType::Introspect),
            (TypeId::OBJECT_ARRAY, FieldType::Compare),
        ];
        for (declared, expected) in cases {
            let field = Field::slot("", "f", declared, Value::Null, Value::Null);
            assert_eq!(classifier.classify(&graph, &field), expected, "{:?}", declared);
        }
    }

    #[test]
    fn test_patterns_match_whole_path() {
        let graph = Graph::new();
        let mut classifier = DefaultClassifier::new();
        classifier.ignore_paths(["name"]).unwrap();

        assert_eq!(
            classifier.classify(&graph, &string_field("name")),
            FieldType::Ignore
        );
        assert_eq!(
            classifier.classify(&graph, &string_field("parent.name")),
            FieldType::Compare
        );
    }

    #[test]
    fn test_ignore_wins_over_introspect() {
        let graph = Graph::new();
        let mut classifier = DefaultClassifier::new();
        classifier
            .introspect_paths([".*parent"])
            .unwrap()
            .ignore_paths(["parent"])
            .unwrap();
        assert_eq!(
            classifier.classify(&graph, &string_field("parent")),
            FieldType::Ignore
        );
        assert_eq!(
            classifier.classify(&graph, &string_field("a.parent")),
            FieldType::Introspect
        );
    }

    #[test]
    fn test_registration_invalidates_caches() {
        let graph = Graph::new();
        let mut classifier = DefaultClassifier::new();
        let field = string_field("beanField.stringField");

        assert_eq!(classifier.classify(&graph, &field), FieldType::Compare);
        assert!(classifier.cached_decisions() > 0);

        classifier.ignore_paths([".*stringField"]).unwrap();
        assert_eq!(classifier.cached_decisions(), 0);
        assert_eq!(classifier.classify(&graph, &field), FieldType::Ignore);
    }

    #[test]
    fn test_invalid_pattern_registers_nothing() {
        let graph = Graph::new();
        let mut classifier = DefaultClassifier::new();
        let err = classifier.ignore_paths(["ok", "(unclosed"]).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidPattern);
        assert_eq!(
            classifier.classify(&graph, &string_field("ok")),
            FieldType::Compare
        );
    }

    #[test]
    fn test_default_introspector_by_shape() {
        let mut graph = Graph::new();
        let bean = graph.define(TypeDef::new("Bean")).unwrap();
        let mut classifier = DefaultClassifier::new();
        let mut name_for = |common: TypeId| {
            classifier
                .introspector_for(&graph, "x", common, &Value::Null, &Value::Null)
                .name()
                .to_string()
        };
        assert_eq!(name_for(TypeId::HASH_MAP), "map");
        assert_eq!(name_for(TypeId::HASH_SET), "unordered_set");
        assert_eq!(name_for(TypeId::SORTED_SET), "sequence");
        assert_eq!(name_for(TypeId::LIST), "sequence");
        assert_eq!(name_for(TypeId::INT_ARRAY), "sequence");
        assert_eq!(name_for(bean), "member_subclass");
    }

    #[test]
    fn test_bound_introspector_and_root() {
        let graph = Graph::new();
        let mut classifier = DefaultClassifier::new();
        classifier
            .introspect_paths_with(Arc::new(SequenceIntrospector::positional()), ["", "list.*"])
            .unwrap();

        let root = classifier.introspector_for(&graph, "", TypeId::LIST, &Value::Null, &Value::Null);
        assert_eq!(root.name(), "sequence_positional");
        let bound =
            classifier.introspector_for(&graph, "listField", TypeId::LIST, &Value::Null, &Value::Null);
        assert_eq!(bound.name(), "sequence_positional");

        // root binding survives later registrations
        classifier.ignore_paths(["x"]).unwrap();
        let root = classifier.introspector_for(&graph, "", TypeId::LIST, &Value::Null, &Value::Null);
        assert_eq!(root.name(), "sequence_positional");
    }

    #[test]
    fn test_comparators() {
        let mut graph = Graph::new();
        let a1 = graph.new_array(TypeId::OBJECT_ARRAY, ["a", "b"]).unwrap();
        let a2 = graph.new_array(TypeId::OBJECT_ARRAY, ["a", "b"]).unwrap();
        let mut classifier = DefaultClassifier::new();

        let array = classifier
            .comparator_for(&graph, "arr", TypeId::OBJECT_ARRAY)
            .unwrap();
        assert!(array.is_equal(&graph, &Value::Node(a1), &Value::Node(a2)));
        assert!(classifier.comparator_for(&graph, "s", TypeId::STRING).is_none());

        classifier
            .bind_comparator(value_comparator(|_, _, _| true), ["s"])
            .unwrap();
        let bound = classifier.comparator_for(&graph, "s", TypeId::STRING).unwrap();
        assert!(bound.is_equal(&graph, &Value::from("x"), &Value::from("y")));
    }
}
