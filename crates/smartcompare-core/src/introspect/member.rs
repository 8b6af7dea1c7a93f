use crate::errors::Result;
use crate::field::Field;
use crate::model::{Graph, TypeId, TypeRegistry, Value};

use super::FieldIntrospector;

/// Which record members the member introspector surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberPolicy {
    /// Members declared on the common supertype and its ancestors
    SharedOnly,
    /// Shared members, then members only side 1's type declares, then side 2's
    #[default]
    SubclassInclusive,
    /// Shared members, but only when both objects are exactly the common type
    IdenticalClassOnly,
}

/// Introspector for record-shaped objects
///
/// Members come most specific declaring type first, each type's members in
/// declaration order. Static members are never listed.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberIntrospector {
    policy: MemberPolicy,
}

impl MemberIntrospector {
    pub fn new(policy: MemberPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MemberPolicy {
        self.policy
    }
}

/// Members declared from `from` up the ancestor chain, stopping before `stop`
fn members_up_to(
    types: &TypeRegistry,
    path_prefix: &str,
    from: TypeId,
    stop: Option<TypeId>,
    out: &mut Vec<Field>,
) {
    let mut current = Some(from);
    while let Some(t) = current {
        if Some(t) == stop {
            break;
        }
        if let Ok(def) = types.get(t) {
            out.extend(
                def.members()
                    .iter()
                    .filter(|m| !m.is_static())
                    .map(|m| Field::member(path_prefix, t, m.name(), m.declared())),
            );
        }
        current = types.parent(t);
    }
}

impl FieldIntrospector for MemberIntrospector {
    fn name(&self) -> &str {
        match self.policy {
            MemberPolicy::SharedOnly => "member_shared",
            MemberPolicy::SubclassInclusive => "member_subclass",
            MemberPolicy::IdenticalClassOnly => "member_identical",
        }
    }

    fn fields(
        &self,
        graph: &Graph,
        path_prefix: &str,
        common: TypeId,
        o1: &Value,
        o2: &Value,
    ) -> Result<Vec<Field>> {
        let types = graph.types();
        let t1 = graph.type_of(o1);
        let t2 = graph.type_of(o2);
        let mut fields = Vec::new();

        match self.policy {
            MemberPolicy::SharedOnly => {
                members_up_to(types, path_prefix, common, None, &mut fields);
            }
            MemberPolicy::IdenticalClassOnly => {
                if t1 == Some(common) && t2 == Some(common) {
                    members_up_to(types, path_prefix, common, None, &mut fields);
                }
            }
            MemberPolicy::SubclassInclusive => {
                members_up_to(types, path_prefix, common, None, &mut fields);
                if let Some(own) = t1.filter(|t| *t != common) {
                    members_up_to(types, path_prefix, own, Some(common), &mut fields);
                }
                if let Some(own) = t2.filter(|t| *t != common && Some(*t) != t1) {
                    members_up_to(types, path_prefix, own, Some(common), &mut fields);
                }
            }
        }
        Ok(fields)
    }
}
