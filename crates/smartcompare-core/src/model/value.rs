use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use super::graph::NodeId;
use super::types::TypeId;

/// A single compared datum
///
/// Scalars are held inline. Records and collections live in a `Graph` and are
/// referenced by `NodeId`, which is also their identity for cycle detection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// The side being read does not define the field at all
    Missing,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    Node(NodeId),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null or missing
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Null | Value::Missing)
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    /// Identity check used to skip work before any comparison
    ///
    /// Scalars never share an identity; two nodes do when they are the same node.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Missing, Value::Missing) => true,
            (Value::Node(a), Value::Node(b)) => a == b,
            _ => false,
        }
    }

    /// Built-in type of a scalar, `None` for nodes and absent values
    pub fn scalar_type(&self) -> Option<TypeId> {
        match self {
            Value::Bool(_) => Some(TypeId::BOOL),
            Value::Int(_) => Some(TypeId::INT),
            Value::Float(_) => Some(TypeId::FLOAT),
            Value::Char(_) => Some(TypeId::CHAR),
            Value::Str(_) => Some(TypeId::STRING),
            Value::Missing | Value::Null | Value::Node(_) => None,
        }
    }

    /// Ordering between two scalars of the same kind
    pub fn natural_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => Some(a.total_cmp(b)),
            (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order over all values, used to keep sorted maps and sets sorted
    pub(crate) fn sort_cmp(&self, other: &Value) -> Ordering {
        self.natural_cmp(other).unwrap_or_else(|| match (self, other) {
            (Value::Node(a), Value::Node(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        })
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Missing => 0,
            Value::Null => 1,
            Value::Bool(_) => 2,
            Value::Int(_) => 3,
            Value::Float(_) => 4,
            Value::Char(_) => 5,
            Value::Str(_) => 6,
            Value::Node(_) => 7,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Missing | Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Char(c) => c.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Node(id) => id.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NodeId> for Value {
    fn from(v: NodeId) -> Self {
        Value::Node(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_equality_by_bits() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(Value::Float(10.0), Value::from(10.0));
    }

    #[test]
    fn test_natural_cmp_same_kind_only() {
        assert_eq!(
            Value::from(1).natural_cmp(&Value::from(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::from("b").natural_cmp(&Value::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::from(1).natural_cmp(&Value::from(1.0)), None);
        assert_eq!(Value::Null.natural_cmp(&Value::Null), None);
    }

    #[test]
    fn test_is_same_only_for_identities() {
        assert!(Value::Null.is_same(&Value::Null));
        assert!(Value::Missing.is_same(&Value::Missing));
        assert!(!Value::Null.is_same(&Value::Missing));
        assert!(!Value::from("a").is_same(&Value::from("a")));
    }

    #[test]
    fn test_absent_values() {
        assert!(Value::Null.is_absent());
        assert!(Value::Missing.is_absent());
        assert!(!Value::from(0).is_absent());
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_sort_cmp_orders_mixed_kinds() {
        let mut values = vec![
            Value::from("b"),
            Value::from(2),
            Value::Null,
            Value::from("a"),
            Value::from(1),
        ];
        values.sort_by(Value::sort_cmp);
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::from(1),
                Value::from(2),
                Value::from("a"),
                Value::from("b"),
            ]
        );
    }
}
