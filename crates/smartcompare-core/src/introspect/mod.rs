//! Field introspectors
//!
//! An introspector looks at a pair of objects and their common supertype and
//! lists the [`Field`]s the engine should visit. The classifier picks one per
//! path: a bound override if any, otherwise a default chosen by shape.

mod map;
mod member;
mod sequence;
mod set;

pub use map::MapIntrospector;
pub use member::{MemberIntrospector, MemberPolicy};
pub use sequence::SequenceIntrospector;
pub use set::UnorderedSetIntrospector;

use crate::errors::{ExError, Result, SmartCompareError};
use crate::field::Field;
use crate::model::{Graph, TypeId, Value};

/// Strategy enumerating the fields of a compared pair
pub trait FieldIntrospector: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// List the fields of `o1` and `o2`, whose common supertype is `common`
    ///
    /// `path_prefix` is the path of the pair itself (empty at the root). Field
    /// order only matters for reproducible output.
    ///
    /// # Errors
    ///
    /// Returns `IntrospectionFailure` if the objects do not have the shape
    /// this introspector handles.
    fn fields(
        &self,
        graph: &Graph,
        path_prefix: &str,
        common: TypeId,
        o1: &Value,
        o2: &Value,
    ) -> Result<Vec<Field>>;
}

/// Wrap a graph error raised while introspecting `path`
pub(crate) fn contract_violation(path: &str, introspector: &str, err: ExError) -> ExError {
    ExError::from(SmartCompareError::IntrospectionFailure {
        path: path.to_string(),
        reason: format!("{} introspector: {}", introspector, err.message()),
    })
    .with_op("introspect")
    .with_source(err)
}

/// Declared type for a slot holding `v1` and `v2`
pub(crate) fn slot_type(graph: &Graph, v1: &Value, v2: &Value) -> TypeId {
    graph
        .types()
        .common_supertype(graph.type_of(v1), graph.type_of(v2))
}
