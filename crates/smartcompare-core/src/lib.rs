//! SmartCompare Core - structural comparison of object graphs
//!
//! Compares two values held in a [`Graph`] and reports every discrepancy as a
//! path-qualified [`Difference`]:
//! - explicit type registry with ancestor chains in place of reflection
//! - pluggable field introspectors for records, maps, sequences and sets
//! - pattern-driven classification into compare / introspect / ignore
//! - cycle-safe recursive engine with per-branch visited stacks
//!
//! ```
//! use smartcompare_core::{Graph, SmartCompare, TypeDef, TypeId, Value};
//!
//! let mut graph = Graph::new();
//! let bean = graph
//!     .define(TypeDef::new("Bean").member("name", TypeId::STRING))
//!     .unwrap();
//! let a = graph.new_record(bean).unwrap();
//! let b = graph.new_record(bean).unwrap();
//! graph.set(a, "name", "golf").unwrap();
//! graph.set(b, "name", "fiesta").unwrap();
//!
//! let mut sc = SmartCompare::with_labels("car1", "car2");
//! let report = sc
//!     .difference_report(&graph, &Value::Node(a), &Value::Node(b))
//!     .unwrap();
//! assert_eq!(report, "name->car1:[golf] car2:[fiesta]");
//! ```

pub mod classify;
pub mod difference;
pub mod engine;
pub mod errors;
pub mod field;
pub mod introspect;
pub mod logging_facility;
pub mod model;
pub mod profile;

/// Structured logging schema, re-exported for the logging macros
pub use smartcompare_core_types::schema;

// Re-export commonly used types
pub use classify::{Classifier, DefaultClassifier, FieldComparator, FieldType};
pub use difference::{Difference, DifferenceKind};
pub use engine::SmartCompare;
pub use errors::{ExError, ExErrorKind, Result, SmartCompareError};
pub use field::{Field, Side};
pub use introspect::{FieldIntrospector, MemberPolicy};
pub use model::{Graph, NodeId, TypeDef, TypeId, Value};
pub use profile::CompareProfile;
