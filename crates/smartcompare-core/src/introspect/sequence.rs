use crate::errors::Result;
use crate::field::Field;
use crate::model::{Graph, TypeId, Value};

use super::{contract_violation, slot_type, FieldIntrospector};

/// One field per index of two sequences, arrays or sorted sets
///
/// With intelligent matching on, the two sequences are first aligned so that
/// a single inserted or removed element shows up as one `Missing` slot rather
/// than shifting every later index.
#[derive(Debug, Clone, Copy)]
pub struct SequenceIntrospector {
    intelligent_matching: bool,
}

impl SequenceIntrospector {
    pub fn new() -> Self {
        Self {
            intelligent_matching: true,
        }
    }

    /// Strict index-by-index comparison
    pub fn positional() -> Self {
        Self {
            intelligent_matching: false,
        }
    }

    pub fn intelligent_matching(&self) -> bool {
        self.intelligent_matching
    }
}

impl Default for SequenceIntrospector {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldIntrospector for SequenceIntrospector {
    fn name(&self) -> &str {
        if self.intelligent_matching {
            "sequence"
        } else {
            "sequence_positional"
        }
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

        let (items1, items2) = if self.intelligent_matching {
            align(graph, &items1, &items2)
        } else {
            (items1, items2)
        };

        let len = items1.len().max(items2.len());
        Ok((0..len)
            .map(|i| {
                let v1 = items1.get(i).cloned().unwrap_or(Value::Missing);
                let v2 = items2.get(i).cloned().unwrap_or(Value::Missing);
                let declared = slot_type(graph, &v1, &v2);
                Field::slot(path_prefix, i.to_string(), declared, v1, v2)
            })
            .collect())
    }
}

/// Pad two sequences with `Missing` so that equal elements share an index
///
/// Repeatedly takes the first equal pair by increasing index sum (ties by
/// lower side-1 index), copies both prefixes, pads the shorter prefix and
/// then the matched pair. Unmatched tails are copied and padded at the end.
pub(crate) fn align(graph: &Graph, a: &[Value], b: &[Value]) -> (Vec<Value>, Vec<Value>) {
    let mut out1 = Vec::with_capacity(a.len().max(b.len()));
    let mut out2 = Vec::with_capacity(a.len().max(b.len()));
    let (mut start1, mut start2) = (0, 0);

    while let Some((i, j)) = first_match(graph, &a[start1..], &b[start2..]) {
        let (i, j) = (start1 + i, start2 + j);
        out1.extend_from_slice(&a[start1..i]);
        out2.extend_from_slice(&b[start2..j]);
        pad(&mut out1, &mut out2);
        out1.push(a[i].clone());
        out2.push(b[j].clone());
        start1 = i + 1;
        start2 = j + 1;
    }

    out1.extend_from_slice(&a[start1..]);
    out2.extend_from_slice(&b[start2..]);
    pad(&mut out1, &mut out2);
    (out1, out2)
}

fn first_match(graph: &Graph, a: &[Value], b: &[Value]) -> Option<(usize, usize)> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    for sum in 0..=(a.len() + b.len() - 2) {
        let lowest = sum.saturating_sub(b.len() - 1);
        let highest = sum.min(a.len() - 1);
        for i in lowest..=highest {
            let j = sum - i;
            if graph.structural_eq(&a[i], &b[j]) {
                return Some((i, j));
            }
        }
    }
    None
}

fn pad(out1: &mut Vec<Value>, out2: &mut Vec<Value>) {
    let len = out1.len().max(out2.len());
    out1.resize(len, Value::Missing);
    out2.resize(len, Value::Missing);
}
