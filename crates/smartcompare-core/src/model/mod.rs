//! Object-graph model
//!
//! Compared values live in a single [`Graph`] arena. Records, maps and
//! collections are nodes addressed by [`NodeId`]; their types come from the
//! graph's [`TypeRegistry`].

pub mod graph;
pub mod json;
pub mod render;
pub mod types;
pub mod value;

pub use graph::{Graph, Node, NodeId};
pub use types::{MemberDef, Shape, TypeDef, TypeId, TypeRegistry};
pub use value::Value;
