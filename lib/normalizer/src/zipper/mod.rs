//! Immutable tree rewriting: edits are recorded as zippers and folded back into a new root.

mod breadcrumb;
mod multi_zipper;
mod node_zipper;
pub mod parallel;
pub mod transformer;

use indexmap::IndexMap;

pub use breadcrumb::{Breadcrumb, NodeLocation};
pub use multi_zipper::NodeMultiZipper;
pub use node_zipper::{ModificationType, NodeZipper};
pub use parallel::TreeParallelTransformer;
pub use transformer::{TraversalAction, TraversalPhase, TraverserContext, TreeTransformer};

use crate::ast::Node;

/// What the zipper machinery needs to know about a tree.
pub trait TreeNode: Clone {
    fn named_children(&self) -> IndexMap<&'static str, Vec<Self>>;

    fn with_new_children(&self, children: IndexMap<&'static str, Vec<Self>>) -> Self;

    /// Identity of the node, stable for as long as the node is alive.
    fn node_id(&self) -> usize;
}

impl TreeNode for Node {
    fn named_children(&self) -> IndexMap<&'static str, Vec<Self>> {
        Node::named_children(self)
    }

    fn with_new_children(&self, children: IndexMap<&'static str, Vec<Self>>) -> Self {
        Node::with_new_children(self, children)
    }

    fn node_id(&self) -> usize {
        Node::node_id(self)
    }
}
