//! The per-node type table and the oracle seam consumers query.

use crate::types::TypeInfo;
use csharp_parser::NodeId;
use rustc_hash::FxHashMap;

/// Answers "what is the type of this node?" for one parse.
pub trait TypeOracle {
    /// Returns the resolved type of an expression, type syntax or variable
    /// declaration, or `None` if it could not be resolved.
    fn type_of(&self, node: NodeId) -> Option<&TypeInfo>;
}

impl<T: TypeOracle + ?Sized> TypeOracle for &T {
    fn type_of(&self, node: NodeId) -> Option<&TypeInfo> {
        (**self).type_of(node)
    }
}

/// Resolved types keyed by node id.
///
/// Built by [`crate::bind`]; tests can also fill one by hand with
/// [`SemanticModel::insert`].
#[derive(Debug, Clone, Default)]
pub struct SemanticModel {
    types: FxHashMap<NodeId, TypeInfo>,
}

impl SemanticModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the type of a node, replacing any earlier entry.
    pub fn insert(&mut self, node: NodeId, ty: TypeInfo) -> Option<TypeInfo> {
        self.types.insert(node, ty)
    }

    /// Returns the number of typed nodes.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no node has a type.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeOracle for SemanticModel {
    fn type_of(&self, node: NodeId) -> Option<&TypeInfo> {
        self.types.get(&node)
    }
}
