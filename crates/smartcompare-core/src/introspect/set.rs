use crate::errors::Result;
use crate::field::Field;
use crate::model::{Graph, TypeId, Value};

use super::{contract_violation, slot_type, FieldIntrospector};

/// Introspector for unordered sets
///
/// Elements present in both sets come first, paired with themselves. Then
/// come elements only set 1 holds (`Missing` on side 2), then elements only
/// set 2 holds (`Missing` on side 1). Field names are running indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnorderedSetIntrospector;

impl FieldIntrospector for UnorderedSetIntrospector {
    fn name(&self) -> &str {
        "unordered_set"
    }

    fn fields(
        &self,
        graph: &Graph,
        path_prefix: &str,
        _common: TypeId,
        o1: &Value,
        o2: &Value,
    ) -> Result<Vec<Field>> {
        let items1 = graph
            .elements(o1)
            .map_err(|e| contract_violation(path_prefix, self.name(), e))?;
        let items2 = graph
            .elements(o2)
            .map_err(|e| contract_violation(path_prefix, self.name(), e))?;

        let mut taken = vec![false; items2.len()];
        let mut shared = Vec::new();
        let mut only1 = Vec::new();
        for item in items1 {
            let partner = (0..items2.len())
                .find(|&j| !taken[j] && graph.structural_eq(&item, &items2[j]));
            match partner {
                Some(j) => {
                    taken[j] = true;
                    shared.push((item.clone(), item));
                }
                None => only1.push((item, Value::Missing)),
            }
        }
        let only2 = items2
            .into_iter()
            .zip(taken)
            .filter(|(_, taken)| !taken)
            .map(|(item, _)| (Value::Missing, item));

        Ok(shared
            .into_iter()
            .chain(only1)
            .chain(only2)
            .enumerate()
            .map(|(i, (v1, v2))| {
                let declared = slot_type(graph, &v1, &v2);
                Field::slot(path_prefix, i.to_string(), declared, v1, v2)
            })
            .collect())
    }
}
