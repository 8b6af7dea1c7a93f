use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use super::types::{Shape, TypeDef, TypeId, TypeRegistry};
use super::value::Value;
use crate::errors::{ExError, Result, SmartCompareError};

/// Stable identity of a node inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Payload {
    /// Member slots keyed by declaring type, so shadowed members stay distinct
    Record(IndexMap<(TypeId, String), Value>),
    Map(IndexMap<Value, Value>),
    Sequence(Vec<Value>),
    Array(Vec<Value>),
    Set(IndexSet<Value>),
}

#[derive(Debug, Clone)]
pub struct Node {
    ty: TypeId,
    pub(crate) payload: Payload,
}

impl Node {
    pub fn type_id(&self) -> TypeId {
        self.ty
    }
}

/// Arena holding every node of both compared object graphs
///
/// All node access is encapsulated here. Getters return typed errors instead
/// of panicking on dangling ids or wrong shapes. Not thread-safe for mutation;
/// comparisons only borrow the graph immutably.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    types: TypeRegistry,
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(types: TypeRegistry) -> Self {
        Self {
            types,
            nodes: Vec::new(),
        }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Register a user type
    ///
    /// # Errors
    ///
    /// See [`TypeRegistry::define`].
    pub fn define(&mut self, def: TypeDef) -> Result<TypeId> {
        self.types.define(def)
    }

    /// # Errors
    ///
    /// Returns `NodeNotFound` for an id that was not issued by this graph
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| SmartCompareError::NodeNotFound { node_id: id.0 }.into())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or_else(|| SmartCompareError::NodeNotFound { node_id: id.0 }.into())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Runtime type of a value; `None` for null and missing
    pub fn type_of(&self, value: &Value) -> Option<TypeId> {
        match value {
            Value::Node(id) => self.node(*id).ok().map(|n| n.ty),
            other => other.scalar_type(),
        }
    }

    /// # Errors
    ///
    /// Returns `Internal` once the arena holds `u32::MAX` nodes
    fn alloc(&mut self, ty: TypeId, payload: Payload) -> Result<NodeId> {
        let index = u32::try_from(self.nodes.len()).map_err(|_| SmartCompareError::Internal {
            message: format!("node arena exhausted at {} nodes", self.nodes.len()),
        })?;
        self.nodes.push(Node { ty, payload });
        Ok(NodeId(index))
    }

    fn shape_mismatch(&self, ty: TypeId, expected: &str) -> ExError {
        SmartCompareError::ShapeMismatch {
            type_name: self.types.name(ty).to_string(),
            expected: expected.to_string(),
        }
        .into()
    }

    fn require_shape(&self, ty: TypeId, allowed: &[Shape], expected: &str) -> Result<()> {
        self.types.get(ty)?;
        if allowed.contains(&self.types.shape(ty)) {
            Ok(())
        } else {
            Err(self.shape_mismatch(ty, expected))
        }
    }

    fn check_value(&self, value: &Value) -> Result<()> {
        if let Value::Node(id) = value {
            self.node(*id)?;
        }
        Ok(())
    }

    // ===== Records =====

    /// # Errors
    ///
    /// Returns `UnknownType`, or `ShapeMismatch` when `ty` is not a record type
    pub fn new_record(&mut self, ty: TypeId) -> Result<NodeId> {
        self.require_shape(ty, &[Shape::Record], "record")?;
        self.alloc(ty, Payload::Record(IndexMap::new()))
    }

    /// Assign the most specific member called `member`
    ///
    /// # Errors
    ///
    /// Returns `UnknownMember` if no ancestor declares it, `StaticMember` for a
    /// static member, `ShapeMismatch` if the node is not a record.
    pub fn set(&mut self, node: NodeId, member: &str, value: impl Into<Value>) -> Result<()> {
        let ty = self.node(node)?.ty;
        let (owner, is_static) = self
            .types
            .find_member(ty, member)
            .map(|(owner, def)| (owner, def.is_static()))
            .ok_or_else(|| SmartCompareError::UnknownMember {
                type_name: self.types.name(ty).to_string(),
                member: member.to_string(),
            })?;
        if is_static {
            return Err(SmartCompareError::StaticMember {
                type_name: self.types.name(owner).to_string(),
                member: member.to_string(),
            }
            .into());
        }
        self.write_slot(node, owner, member, value.into())
    }

    /// Assign the member declared on `owner`, even if a subtype shadows the name
    ///
    /// # Errors
    ///
    /// Returns `UnknownMember` unless `owner` is an ancestor of the node's type
    /// declaring `member`, and `StaticMember` for a static member.
    pub fn set_declared(
        &mut self,
        node: NodeId,
        owner: TypeId,
        member: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let ty = self.node(node)?.ty;
        let declared = self
            .types
            .get(owner)?
            .members()
            .iter()
            .find(|m| m.name() == member)
            .map(|m| m.is_static());
        match declared {
            Some(_) if !self.types.is_subtype(ty, owner) => {
                Err(SmartCompareError::UnknownMember {
                    type_name: self.types.name(ty).to_string(),
                    member: member.to_string(),
                }
                .into())
            }
            Some(true) => Err(SmartCompareError::StaticMember {
                type_name: self.types.name(owner).to_string(),
                member: member.to_string(),
            }
            .into()),
            Some(false) => self.write_slot(node, owner, member, value.into()),
            None => Err(SmartCompareError::UnknownMember {
                type_name: self.types.name(owner).to_string(),
                member: member.to_string(),
            }
            .into()),
        }
    }

    fn write_slot(&mut self, node: NodeId, owner: TypeId, member: &str, value: Value) -> Result<()> {
        self.check_value(&value)?;
        let ty = self.node(node)?.ty;
        let mismatch = self.shape_mismatch(ty, "record");
        match &mut self.node_mut(node)?.payload {
            Payload::Record(slots) => {
                slots.insert((owner, member.to_string()), value);
                Ok(())
            }
            _ => Err(mismatch),
        }
    }

    /// Read the most specific member called `member`; unset members read as `Null`
    ///
    /// # Errors
    ///
    /// Returns `UnknownMember` if no ancestor declares it.
    pub fn get(&self, node: NodeId, member: &str) -> Result<Value> {
        let ty = self.node(node)?.ty;
        let (owner, _) = self.types.find_member(ty, member).ok_or_else(|| {
            SmartCompareError::UnknownMember {
                type_name: self.types.name(ty).to_string(),
                member: member.to_string(),
            }
        })?;
        self.get_declared(node, owner, member)
    }

    /// Read the slot of `member` as declared on `owner`
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the node is not a record.
    pub fn get_declared(&self, node: NodeId, owner: TypeId, member: &str) -> Result<Value> {
        let n = self.node(node)?;
        match &n.payload {
            Payload::Record(slots) => Ok(slots
                .get(&(owner, member.to_string()))
                .cloned()
                .unwrap_or(Value::Null)),
            _ => Err(self.shape_mismatch(n.ty, "record")),
        }
    }

    // ===== Sequences and arrays =====

    /// # Errors
    ///
    /// Returns `Internal` when the node arena is exhausted, as does every
    /// node constructor
    pub fn new_list(&mut self) -> Result<NodeId> {
        self.alloc(TypeId::LIST, Payload::Sequence(Vec::new()))
    }

    /// # Errors
    ///
    /// Returns `ShapeMismatch` when `ty` is not a sequence type
    pub fn new_sequence(&mut self, ty: TypeId) -> Result<NodeId> {
        self.require_shape(ty, &[Shape::Sequence], "sequence")?;
        self.alloc(ty, Payload::Sequence(Vec::new()))
    }

    /// Build a fixed-length array
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` when `ty` is not an array type
    pub fn new_array<I, V>(&mut self, ty: TypeId, values: I) -> Result<NodeId>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.require_shape(ty, &[Shape::Array], "array")?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        for value in &values {
            self.check_value(value)?;
        }
        self.alloc(ty, Payload::Array(values))
    }

    /// Append to a sequence, or add to a set
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` for any other node.
    pub fn push(&mut self, node: NodeId, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.check_value(&value)?;
        let ty = self.node(node)?.ty;
        let sorted = self.types.shape(ty) == Shape::SortedSet;
        let mismatch = self.shape_mismatch(ty, "sequence or set");
        match &mut self.node_mut(node)?.payload {
            Payload::Sequence(items) => items.push(value),
            Payload::Set(items) => {
                items.insert(value);
                if sorted {
                    items.sort_by(Value::sort_cmp);
                }
            }
            _ => return Err(mismatch),
        }
        Ok(())
    }

    // ===== Maps =====

    /// # Errors
    ///
    /// Returns `ShapeMismatch` when `ty` is not a map type
    pub fn new_map(&mut self, ty: TypeId) -> Result<NodeId> {
        self.require_shape(ty, &[Shape::Map], "map")?;
        self.alloc(ty, Payload::Map(IndexMap::new()))
    }

    pub fn hash_map(&mut self) -> Result<NodeId> {
        self.alloc(TypeId::HASH_MAP, Payload::Map(IndexMap::new()))
    }

    pub fn sorted_map(&mut self) -> Result<NodeId> {
        self.alloc(TypeId::SORTED_MAP, Payload::Map(IndexMap::new()))
    }

    /// Insert a map entry, returning the previous value for the key
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the node is not a map.
    pub fn insert(
        &mut self,
        node: NodeId,
        key: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        let (key, value) = (key.into(), value.into());
        self.check_value(&key)?;
        self.check_value(&value)?;
        let ty = self.node(node)?.ty;
        let sorted = self.types.is_subtype(ty, TypeId::SORTED_MAP);
        let mismatch = self.shape_mismatch(ty, "map");
        match &mut self.node_mut(node)?.payload {
            Payload::Map(entries) => {
                let previous = entries.insert(key, value);
                if sorted {
                    entries.sort_by(|k1, _, k2, _| k1.sort_cmp(k2));
                }
                Ok(previous)
            }
            _ => Err(mismatch),
        }
    }

    /// Remove a map key or a set element
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` for any other node.
    pub fn remove(&mut self, node: NodeId, key: &Value) -> Result<Option<Value>> {
        let ty = self.node(node)?.ty;
        let mismatch = self.shape_mismatch(ty, "map or set");
        match &mut self.node_mut(node)?.payload {
            Payload::Map(entries) => Ok(entries.shift_remove(key)),
            Payload::Set(items) => Ok(items.shift_take(key)),
            _ => Err(mismatch),
        }
    }

    // ===== Sets =====

    /// # Errors
    ///
    /// Returns `ShapeMismatch` when `ty` is not a set type
    pub fn new_set(&mut self, ty: TypeId) -> Result<NodeId> {
        self.require_shape(ty, &[Shape::Set, Shape::SortedSet], "set")?;
        self.alloc(ty, Payload::Set(IndexSet::new()))
    }

    pub fn hash_set(&mut self) -> Result<NodeId> {
        self.alloc(TypeId::HASH_SET, Payload::Set(IndexSet::new()))
    }

    pub fn sorted_set(&mut self) -> Result<NodeId> {
        self.alloc(TypeId::SORTED_SET, Payload::Set(IndexSet::new()))
    }

    // ===== Queries =====

    /// Ordered contents of a sequence, array or set
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` for scalars, records and maps.
    pub fn elements(&self, value: &Value) -> Result<Vec<Value>> {
        let node = self.expect_node(value, "collection")?;
        match &node.payload {
            Payload::Sequence(items) | Payload::Array(items) => Ok(items.clone()),
            Payload::Set(items) => Ok(items.iter().cloned().collect()),
            _ => Err(self.shape_mismatch(node.ty, "collection")),
        }
    }

    /// Entries of a map, in map order
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` for anything but a map.
    pub fn entries(&self, value: &Value) -> Result<Vec<(Value, Value)>> {
        Ok(self
            .map_entries(value)?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    pub(crate) fn map_entries(&self, value: &Value) -> Result<&IndexMap<Value, Value>> {
        let node = self.expect_node(value, "map")?;
        match &node.payload {
            Payload::Map(entries) => Ok(entries),
            _ => Err(self.shape_mismatch(node.ty, "map")),
        }
    }

    fn expect_node(&self, value: &Value, expected: &str) -> Result<&Node> {
        match value {
            Value::Node(id) => self.node(*id),
            other => Err(SmartCompareError::ShapeMismatch {
                type_name: other
                    .scalar_type()
                    .map(|t| self.types.name(t).to_string())
                    .unwrap_or_else(|| "null".to_string()),
                expected: expected.to_string(),
            }
            .into()),
        }
    }

    /// Equality as the values' own `equals` would define it
    ///
    /// Scalars compare by value and records by identity. Sequences, arrays,
    /// sets and maps compare by content, recursively.
    pub fn structural_eq(&self, a: &Value, b: &Value) -> bool {
        self.structural_eq_inner(a, b, &mut Vec::new())
    }

    fn structural_eq_inner(&self, a: &Value, b: &Value, assumed: &mut Vec<(NodeId, NodeId)>) -> bool {
        if a == b {
            return true;
        }
        let (Value::Node(x), Value::Node(y)) = (a, b) else {
            return false;
        };
        // a pair still under comparison higher up is taken as equal so cyclic containers terminate
        if assumed.contains(&(*x, *y)) {
            return true;
        }
        let (Ok(left), Ok(right)) = (self.node(*x), self.node(*y)) else {
            return false;
        };
        let mark = assumed.len();
        assumed.push((*x, *y));
        let equal = match (&left.payload, &right.payload) {
            (Payload::Sequence(l), Payload::Sequence(r)) | (Payload::Array(l), Payload::Array(r)) => {
                l.len() == r.len()
                    && l.iter()
                        .zip(r)
                        .all(|(e, f)| self.structural_eq_inner(e, f, assumed))
            }
            (Payload::Set(l), Payload::Set(r)) => {
                l.len() == r.len()
                    && l.iter()
                        .all(|e| r.iter().any(|f| self.structural_eq_inner(e, f, assumed)))
            }
            (Payload::Map(l), Payload::Map(r)) => {
                l.len() == r.len()
                    && l.iter().all(|(k, v)| {
                        r.get(k)
                            .is_some_and(|w| self.structural_eq_inner(v, w, assumed))
                    })
            }
            _ => false,
        };
        // the assumption only holds for the branch that made it
        assumed.truncate(mark);
        equal
    }
}
