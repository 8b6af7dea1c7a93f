//! Difference records produced by the engine

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::model::Value;

/// Category of a difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifferenceKind {
    /// Values differ, or exactly one of them is null
    Value,
    /// Only one side defines the field
    Field,
    /// The two objects have different runtime types
    Class,
    /// The two graphs close a reference cycle at different depths
    Cycle,
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DifferenceKind::Value => "VALUE",
            DifferenceKind::Field => "FIELD",
            DifferenceKind::Class => "CLASS",
            DifferenceKind::Cycle => "CYCLE",
        };
        f.write_str(s)
    }
}

/// One discrepancy between the compared graphs
///
/// Two differences are equal when kind, full path, description and both
/// values agree; how the path splits into ancestors and field name does not
/// matter.
#[derive(Debug, Clone, Serialize)]
pub struct Difference {
    kind: DifferenceKind,
    path: Vec<String>,
    field_name: String,
    full_path: String,
    description: String,
    value1: Value,
    value2: Value,
}

impl Difference {
    pub fn new(
        kind: DifferenceKind,
        path: Vec<String>,
        field_name: impl Into<String>,
        description: impl Into<String>,
        value1: Value,
        value2: Value,
    ) -> Self {
        let field_name = field_name.into();
        let full_path = match (path.is_empty(), field_name.is_empty()) {
            (true, _) => field_name.clone(),
            (false, true) => path.join("."),
            (false, false) => format!("{}.{}", path.join("."), field_name),
        };
        Self {
            kind,
            path,
            field_name,
            full_path,
            description: description.into(),
            value1,
            value2,
        }
    }

    pub fn kind(&self) -> DifferenceKind {
        self.kind
    }

    /// Names of the ancestors of the differing field
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Empty for differences reported on the compared pair itself
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn value1(&self) -> &Value {
        &self.value1
    }

    pub fn value2(&self) -> &Value {
        &self.value2
    }
}

impl PartialEq for Difference {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.full_path == other.full_path
            && self.description == other.description
            && self.value1 == other.value1
            && self.value2 == other.value2
    }
}

impl Eq for Difference {}

impl Hash for Difference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.full_path.hash(state);
        self.description.hash(state);
        self.value1.hash(state);
        self.value2.hash(state);
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.full_path, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_full_path() {
        let root = Difference::new(DifferenceKind::Value, vec![], "", "d", Value::Null, Value::from(1));
        assert_eq!(root.full_path(), "");

        let top = Difference::new(DifferenceKind::Value, vec![], "name", "d", Value::Null, Value::Null);
        assert_eq!(top.full_path(), "name");

        let nested = Difference::new(
            DifferenceKind::Value,
            path(&["beanField"]),
            "stringField",
            "d",
            Value::Null,
            Value::Null,
        );
        assert_eq!(nested.full_path(), "beanField.stringField");

        let cycle = Difference::new(
            DifferenceKind::Cycle,
            path(&["beanField", "beanField"]),
            "",
            "d",
            Value::Null,
            Value::Null,
        );
        assert_eq!(cycle.full_path(), "beanField.beanField");
    }

    #[test]
    fn test_equality_ignores_path_split() {
        let a = Difference::new(
            DifferenceKind::Value,
            path(&["a"]),
            "b",
            "x",
            Value::from(1),
            Value::from(2),
        );
        let b = Difference::new(
            DifferenceKind::Value,
            path(&["a", "b"]),
            "",
            "x",
            Value::from(1),
            Value::from(2),
        );
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_display() {
        let d = Difference::new(
            DifferenceKind::Value,
            vec![],
            "name",
            "car1:[golf] car2:[fiesta]",
            Value::from("golf"),
            Value::from("fiesta"),
        );
        assert_eq!(d.to_string(), "name->car1:[golf] car2:[fiesta]");
        assert_eq!(d.kind().to_string(), "VALUE");
    }

    #[test]
    fn test_serialize() {
        let d = Difference::new(
            DifferenceKind::Field,
            vec![],
            "key3",
            "object1:[test] object2:[Undefined]",
            Value::from("test"),
            Value::Missing,
        );
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "FIELD");
        assert_eq!(json["full_path"], "key3");
        assert_eq!(json["value2"]["kind"], "missing");
    }
}
