use indexmap::IndexSet;

use crate::errors::Result;
use crate::field::Field;
use crate::model::{Graph, TypeId, Value};

use super::{contract_violation, slot_type, FieldIntrospector};

/// One field per key in either map
///
/// Keys of map 1 come first in map order, then keys only map 2 has. A key
/// absent from one map reads as `Missing` on that side.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapIntrospector;

impl FieldIntrospector for MapIntrospector {
    fn name(&self) -> &str {
        "map"
    }

    fn fields(
        &self,
        graph: &Graph,
        path_prefix: &str,
        _common: TypeId,
        o1: &Value,
        o2: &Value,
    ) -> Result<Vec<Field>> {
        let map1 = graph
            .map_entries(o1)
            .map_err(|e| contract_violation(path_prefix, self.name(), e))?;
        let map2 = graph
            .map_entries(o2)
            .map_err(|e| contract_violation(path_prefix, self.name(), e))?;

        let keys: IndexSet<&Value> = map1.keys().chain(map2.keys()).collect();
        Ok(keys
            .into_iter()
            .map(|key| {
                let v1 = map1.get(key).cloned().unwrap_or(Value::Missing);
                let v2 = map2.get(key).cloned().unwrap_or(Value::Missing);
                let declared = slot_type(graph, &v1, &v2);
                Field::slot(path_prefix, graph.render(key), declared, v1, v2)
            })
            .collect())
    }
}
