//! Type registry
//!
//! Compared nodes carry an explicit type tag. Each type names its parent, so
//! ancestor chains and common supertypes are table lookups rather than
//! runtime reflection. `TypeRegistry::new()` pre-registers a fixed built-in
//! hierarchy; user record types are added with [`TypeRegistry::define`].

use std::collections::HashMap;

use crate::errors::{Result, SmartCompareError};

/// Index of a type inside its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub const OBJECT: TypeId = TypeId(0);
    pub const NUMBER: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const CHAR: TypeId = TypeId(3);
    pub const STRING: TypeId = TypeId(4);
    pub const INT: TypeId = TypeId(5);
    pub const FLOAT: TypeId = TypeId(6);
    pub const MAP: TypeId = TypeId(7);
    pub const HASH_MAP: TypeId = TypeId(8);
    pub const SORTED_MAP: TypeId = TypeId(9);
    pub const COLLECTION: TypeId = TypeId(10);
    pub const LIST: TypeId = TypeId(11);
    pub const SET: TypeId = TypeId(12);
    pub const HASH_SET: TypeId = TypeId(13);
    pub const SORTED_SET: TypeId = TypeId(14);
    pub const BOOL_ARRAY: TypeId = TypeId(15);
    pub const INT_ARRAY: TypeId = TypeId(16);
    pub const FLOAT_ARRAY: TypeId = TypeId(17);
    pub const CHAR_ARRAY: TypeId = TypeId(18);
    pub const STRING_ARRAY: TypeId = TypeId(19);
    pub const OBJECT_ARRAY: TypeId = TypeId(20);

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Structural category of a type, used to pick a default introspector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// No specific shape (`Object`, `Number`)
    Object,
    Scalar,
    Record,
    Map,
    Sequence,
    Set,
    SortedSet,
    Array,
}

impl Shape {
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Shape::Sequence | Shape::Set | Shape::SortedSet | Shape::Array
        )
    }
}

/// A named member slot declared on a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDef {
    name: String,
    declared: TypeId,
    is_static: bool,
    self_typed: bool,
}

impl MemberDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared(&self) -> TypeId {
        self.declared
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }
}

/// Definition of a type, doubling as the builder passed to `define`
///
/// ```
/// use smartcompare_core::model::{TypeDef, TypeId, TypeRegistry};
///
/// let mut types = TypeRegistry::new();
/// let category = types
///     .define(
///         TypeDef::new("Category")
///             .member("name", TypeId::STRING)
///             .member("priority", TypeId::INT)
///             .self_member("parent")
///             .display_member("name"),
///     )
///     .unwrap();
/// assert_eq!(types.name(category), "Category");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    name: String,
    parent: Option<TypeId>,
    shape: Shape,
    members: Vec<MemberDef>,
    display: Option<String>,
}

impl TypeDef {
    /// Start a definition; the parent defaults to `Object`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            shape: Shape::Record,
            members: Vec::new(),
            display: None,
        }
    }

    pub fn extends(mut self, parent: TypeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn member(mut self, name: impl Into<String>, declared: TypeId) -> Self {
        self.members.push(MemberDef {
            name: name.into(),
            declared,
            is_static: false,
            self_typed: false,
        });
        self
    }

    /// A member whose declared type is the type being defined
    pub fn self_member(mut self, name: impl Into<String>) -> Self {
        self.members.push(MemberDef {
            name: name.into(),
            declared: TypeId::OBJECT,
            is_static: false,
            self_typed: true,
        });
        self
    }

    pub fn static_member(mut self, name: impl Into<String>, declared: TypeId) -> Self {
        self.members.push(MemberDef {
            name: name.into(),
            declared,
            is_static: true,
            self_typed: false,
        });
        self
    }

    /// Render records of this type as the value of `member`
    pub fn display_member(mut self, member: impl Into<String>) -> Self {
        self.display = Some(member.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<TypeId> {
        self.parent
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn members(&self) -> &[MemberDef] {
        &self.members
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    fn builtin(name: &str, parent: Option<TypeId>, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            parent,
            shape,
            members: Vec::new(),
            display: None,
        }
    }
}

/// Registry of every type known to a graph
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<TypeDef>,
    by_name: HashMap<String, TypeId>,
}

impl TypeRegistry {
    /// Create a registry holding the built-in hierarchy
    pub fn new() -> Self {
        let object = Some(TypeId::OBJECT);
        let builtins = [
            TypeDef::builtin("Object", None, Shape::Object),
            TypeDef::builtin("Number", object, Shape::Object),
            TypeDef::builtin("Bool", object, Shape::Scalar),
            TypeDef::builtin("Char", object, Shape::Scalar),
            TypeDef::builtin("String", object, Shape::Scalar),
            TypeDef::builtin("Int", Some(TypeId::NUMBER), Shape::Scalar),
            TypeDef::builtin("Float", Some(TypeId::NUMBER), Shape::Scalar),
            TypeDef::builtin("Map", object, Shape::Map),
            TypeDef::builtin("HashMap", Some(TypeId::MAP), Shape::Map),
            TypeDef::builtin("SortedMap", Some(TypeId::MAP), Shape::Map),
            TypeDef::builtin("Collection", object, Shape::Sequence),
            TypeDef::builtin("List", Some(TypeId::COLLECTION), Shape::Sequence),
            TypeDef::builtin("Set", Some(TypeId::COLLECTION), Shape::Set),
            TypeDef::builtin("HashSet", Some(TypeId::SET), Shape::Set),
            TypeDef::builtin("SortedSet", Some(TypeId::SET), Shape::SortedSet),
            TypeDef::builtin("BoolArray", object, Shape::Array),
            TypeDef::builtin("IntArray", object, Shape::Array),
            TypeDef::builtin("FloatArray", object, Shape::Array),
            TypeDef::builtin("CharArray", object, Shape::Array),
            TypeDef::builtin("StringArray", object, Shape::Array),
            TypeDef::builtin("ObjectArray", object, Shape::Array),
        ];

        let mut registry = Self {
            types: Vec::with_capacity(builtins.len()),
            by_name: HashMap::new(),
        };
        for def in builtins {
            let id = TypeId(registry.types.len() as u32);
            registry.by_name.insert(def.name.clone(), id);
            registry.types.push(def);
        }
        registry
    }

    /// Register a user type
    ///
    /// # Errors
    ///
    /// - `DuplicateType` if the name is taken
    /// - `UnknownType` if the parent or a member's declared type is not registered
    /// - `DuplicateMember` if a member name repeats within the definition
    /// - `UnknownMember` if the display member is not declared on the type or an ancestor
    pub fn define(&mut self, mut def: TypeDef) -> Result<TypeId> {
        if self.by_name.contains_key(&def.name) {
            return Err(SmartCompareError::DuplicateType {
                type_name: def.name,
            }
            .into());
        }

        let parent = def.parent.unwrap_or(TypeId::OBJECT);
        let parent_shape = self.get(parent)?.shape;
        def.parent = Some(parent);
        def.shape = match parent_shape {
            Shape::Object => Shape::Record,
            inherited => inherited,
        };

        let id = TypeId(self.types.len() as u32);
        for (i, member) in def.members.iter().enumerate() {
            if def.members[..i].iter().any(|m| m.name == member.name) {
                return Err(SmartCompareError::DuplicateMember {
                    type_name: def.name.clone(),
                    member: member.name.clone(),
                }
                .into());
            }
            if !member.self_typed {
                self.get(member.declared)?;
            }
        }
        for member in def.members.iter_mut().filter(|m| m.self_typed) {
            member.declared = id;
        }

        if let Some(display) = &def.display {
            let declared_here = def.members.iter().any(|m| &m.name == display);
            if !declared_here && self.find_member(parent, display).is_none() {
                return Err(SmartCompareError::UnknownMember {
                    type_name: def.name.clone(),
                    member: display.clone(),
                }
                .into());
            }
        }

        self.by_name.insert(def.name.clone(), id);
        self.types.push(def);
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `UnknownType` if the id was not issued by this registry
    pub fn get(&self, id: TypeId) -> Result<&TypeDef> {
        self.types.get(id.index()).ok_or_else(|| {
            SmartCompareError::UnknownType {
                type_name: format!("#{}", id.0),
            }
            .into()
        })
    }

    /// # Errors
    ///
    /// Returns `UnknownType` if no type has this name
    pub fn lookup(&self, name: &str) -> Result<TypeId> {
        self.by_name.get(name).copied().ok_or_else(|| {
            SmartCompareError::UnknownType {
                type_name: name.to_string(),
            }
            .into()
        })
    }

    pub fn name(&self, id: TypeId) -> &str {
        self.types
            .get(id.index())
            .map(|def| def.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn shape(&self, id: TypeId) -> Shape {
        self.types
            .get(id.index())
            .map(|def| def.shape)
            .unwrap_or(Shape::Object)
    }

    pub fn parent(&self, id: TypeId) -> Option<TypeId> {
        self.types.get(id.index()).and_then(|def| def.parent)
    }

    /// Ancestor chain from `Object` down to and including `id`
    pub fn ancestors(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(t) = current {
            chain.push(t);
            current = self.parent(t);
        }
        chain.reverse();
        chain
    }

    pub fn is_subtype(&self, id: TypeId, ancestor: TypeId) -> bool {
        let mut current = Some(id);
        while let Some(t) = current {
            if t == ancestor {
                return true;
            }
            current = self.parent(t);
        }
        false
    }

    /// Most specific type that both `a` and `b` descend from
    ///
    /// An absent side yields the other side's type; both absent yields `Object`.
    pub fn common_supertype(&self, a: Option<TypeId>, b: Option<TypeId>) -> TypeId {
        match (a, b) {
            (None, None) => TypeId::OBJECT,
            (Some(t), None) | (None, Some(t)) => t,
            (Some(a), Some(b)) if a == b => a,
            (Some(a), Some(b)) => self
                .ancestors(a)
                .into_iter()
                .zip(self.ancestors(b))
                .take_while(|(x, y)| x == y)
                .last()
                .map(|(t, _)| t)
                .unwrap_or(TypeId::OBJECT),
        }
    }

    /// Find the most specific declaration of `member` visible from `id`
    pub fn find_member(&self, id: TypeId, member: &str) -> Option<(TypeId, &MemberDef)> {
        self.ancestors(id).into_iter().rev().find_map(|t| {
            self.types
                .get(t.index())
                .and_then(|def| def.members.iter().find(|m| m.name == member))
                .map(|m| (t, m))
        })
    }

    /// Arrays of scalars or strings
    pub fn is_primitive_like_array(&self, id: TypeId) -> bool {
        [
            TypeId::BOOL_ARRAY,
            TypeId::INT_ARRAY,
            TypeId::FLOAT_ARRAY,
            TypeId::CHAR_ARRAY,
            TypeId::STRING_ARRAY,
        ]
        .iter()
        .any(|array| self.is_subtype(id, *array))
    }

    pub fn is_map_like(&self, id: TypeId) -> bool {
        self.shape(id) == Shape::Map
    }

    pub fn is_iterable(&self, id: TypeId) -> bool {
        matches!(
            self.shape(id),
            Shape::Sequence | Shape::Set | Shape::SortedSet
        )
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
