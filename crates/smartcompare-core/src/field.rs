//! Uniform view of a comparable slot
//!
//! A [`Field`] is produced fresh by an introspector for one pair of objects
//! and dropped once that pair's differences are computed.

use crate::errors::{ExError, Result, SmartCompareError};
use crate::model::{Graph, TypeId, Value};

/// Which of the two compared objects a read targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    One,
    Two,
}

/// How a field's value is obtained
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAccess {
    /// A record member, read from the object when requested
    Member { owner: TypeId, name: String },
    /// Values already resolved by the introspector, one per side
    Slot { value1: Value, value2: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    path: String,
    declared_type: TypeId,
    access: FieldAccess,
}

impl Field {
    pub fn new(
        path_prefix: &str,
        name: impl Into<String>,
        declared_type: TypeId,
        access: FieldAccess,
    ) -> Self {
        let name = name.into();
        Self {
            path: child_path(path_prefix, &name),
            name,
            declared_type,
            access,
        }
    }

    /// Field for a record member declared on `owner`
    pub fn member(path_prefix: &str, owner: TypeId, name: &str, declared_type: TypeId) -> Self {
        Self::new(
            path_prefix,
            name,
            declared_type,
            FieldAccess::Member {
                owner,
                name: name.to_string(),
            },
        )
    }

    /// Field whose two values are already known
    pub fn slot(
        path_prefix: &str,
        name: impl Into<String>,
        declared_type: TypeId,
        value1: Value,
        value2: Value,
    ) -> Self {
        Self::new(
            path_prefix,
            name,
            declared_type,
            FieldAccess::Slot { value1, value2 },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dot-joined names from the comparison root down to this field
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn declared_type(&self) -> TypeId {
        self.declared_type
    }

    pub fn access(&self) -> &FieldAccess {
        &self.access
    }

    /// Read this field from `object`, the compared object on `side`
    ///
    /// Objects whose type does not descend from the member's declaring type
    /// read as `Missing`.
    ///
    /// # Errors
    ///
    /// Returns `IntrospectionFailure` when a member of a matching type cannot
    /// be read, which means the introspector handed out a broken field.
    pub fn value(&self, graph: &Graph, side: Side, object: &Value) -> Result<Value> {
        match &self.access {
            FieldAccess::Slot { value1, value2 } => Ok(match side {
                Side::One => value1.clone(),
                Side::Two => value2.clone(),
            }),
            FieldAccess::Member { owner, name } => {
                let declares = graph
                    .type_of(object)
                    .is_some_and(|t| graph.types().is_subtype(t, *owner));
                if !declares {
                    return Ok(Value::Missing);
                }
                let node = object.as_node().ok_or_else(|| {
                    self.failure(format!("{} value has no members", graph.render(object)))
                })?;
                graph
                    .get_declared(node, *owner, name)
                    .map_err(|e| self.failure(e.message().to_string()).with_source(e))
            }
        }
    }

    fn failure(&self, reason: String) -> ExError {
        ExError::from(SmartCompareError::IntrospectionFailure {
            path: self.path.clone(),
            reason,
        })
        .with_op("field_value")
    }
}

/// Path of `name` below `prefix`
pub fn child_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::model::TypeDef;

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("", "beanField"), "beanField");
        assert_eq!(child_path("beanField", "stringField"), "beanField.stringField");
    }

    #[test]
    fn test_member_reads_and_missing() {
        let mut graph = Graph::new();
        let base = graph
            .define(TypeDef::new("Base").member("s", TypeId::STRING))
            .unwrap();
        let sub = graph
            .define(TypeDef::new("Sub").extends(base).member("i", TypeId::INT))
            .unwrap();
        let b = graph.new_record(base).unwrap();
        let s = graph.new_record(sub).unwrap();
        graph.set(s, "i", 7).unwrap();

        let field = Field::member("root", sub, "i", TypeId::INT);
        assert_eq!(field.path(), "root.i");
        assert_eq!(
            field.value(&graph, Side::One, &Value::Node(s)).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            field.value(&graph, Side::Two, &Value::Node(b)).unwrap(),
            Value::Missing
        );
        assert_eq!(
            field.value(&graph, Side::Two, &Value::from("x")).unwrap(),
            Value::Missing
        );
    }

    #[test]
    fn test_slot_reads_by_side() {
        let graph = Graph::new();
        let field = Field::slot("", "0", TypeId::STRING, Value::from("a"), Value::Missing);
        assert_eq!(
            field.value(&graph, Side::One, &Value::Null).unwrap(),
            Value::from("a")
        );
        assert_eq!(
            field.value(&graph, Side::Two, &Value::Null).unwrap(),
            Value::Missing
        );
    }

    #[test]
    fn test_member_of_non_record_is_failure() {
        let mut graph = Graph::new();
        let seq = graph
            .define(TypeDef::new("Tagged").extends(TypeId::LIST))
            .unwrap();
        let list = graph.new_sequence(seq).unwrap();
        // a field claiming List declares a member is a broken contract
        let field = Field::member("", TypeId::LIST, "size", TypeId::INT);
        let err = field
            .value(&graph, Side::One, &Value::Node(list))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::IntrospectionFailure);
        assert_eq!(err.path(), Some("size"));
    }
}
