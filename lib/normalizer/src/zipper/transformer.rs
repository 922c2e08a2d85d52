use tracing::{instrument, trace};

use super::breadcrumb::{Breadcrumb, NodeLocation};
use super::multi_zipper::NodeMultiZipper;
use super::node_zipper::{ModificationType, NodeZipper};
use crate::ast::visitor::NodeVisitor;
use crate::ast::Node;

/// What a visitor asks the transformer to do with the node it was handed.
#[derive(Debug, Clone)]
pub enum TraversalAction {
    Continue,
    /// Skip the children of this node. Siblings and ancestors are unaffected.
    Abort,
    Delete,
    /// Replace the node. On enter, traversal continues into the replacement's children.
    Replace(Node),
    InsertBefore(Node),
    InsertAfter(Node),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalPhase {
    Enter,
    Leave,
}

/// Handed to the visitor together with every node.
#[derive(Debug, Clone)]
pub struct TraverserContext {
    node: Node,
    breadcrumbs: Vec<Breadcrumb<Node>>,
    phase: TraversalPhase,
}

impl TraverserContext {
    pub(crate) fn new(node: Node, breadcrumbs: Vec<Breadcrumb<Node>>) -> Self {
        Self {
            node,
            breadcrumbs,
            phase: TraversalPhase::Enter,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Path to the root, nearest ancestor first.
    pub fn breadcrumbs(&self) -> &[Breadcrumb<Node>] {
        &self.breadcrumbs
    }

    pub fn parent(&self) -> Option<&Node> {
        self.breadcrumbs.first().map(|b| &b.node)
    }

    pub fn location(&self) -> Option<NodeLocation> {
        self.breadcrumbs.first().map(|b| b.location)
    }

    pub fn phase(&self) -> TraversalPhase {
        self.phase
    }

    pub fn depth(&self) -> usize {
        self.breadcrumbs.len()
    }

    pub(crate) fn into_breadcrumbs(self) -> Vec<Breadcrumb<Node>> {
        self.breadcrumbs
    }
}

pub(crate) fn zipper_for_action(
    action: &TraversalAction,
    node: &Node,
    breadcrumbs: &[Breadcrumb<Node>],
) -> Option<NodeZipper<Node>> {
    let zipper = match action {
        TraversalAction::Continue | TraversalAction::Abort => return None,
        // the root has no parent to remove it from or insert next to it
        TraversalAction::Delete
        | TraversalAction::InsertBefore(_)
        | TraversalAction::InsertAfter(_)
            if breadcrumbs.is_empty() =>
        {
            trace!("ignoring a delete or insert on the root node");
            return None;
        }
        TraversalAction::Delete => NodeZipper::new(node.clone(), breadcrumbs.to_vec())
            .with_modification_type(ModificationType::Delete),
        TraversalAction::Replace(new_node) => {
            NodeZipper::new(new_node.clone(), breadcrumbs.to_vec())
        }
        TraversalAction::InsertBefore(new_node) => {
            NodeZipper::new(new_node.clone(), breadcrumbs.to_vec())
                .with_modification_type(ModificationType::InsertBefore)
        }
        TraversalAction::InsertAfter(new_node) => {
            NodeZipper::new(new_node.clone(), breadcrumbs.to_vec())
                .with_modification_type(ModificationType::InsertAfter)
        }
    };
    Some(zipper)
}

/// Depth first enter/leave traversal that collects the visitor's edits and
/// folds them into a new tree. Unchanged subtrees are shared with the input.
///
/// The root can only be replaced. Deleting it or inserting next to it leaves
/// the root as it is.
pub struct TreeTransformer;

impl TreeTransformer {
    #[instrument(level = "trace", skip_all, fields(root = root.kind_name()))]
    pub fn transform<V>(root: &Node, visitor: &mut V) -> Node
    where
        V: NodeVisitor<TraverserContext, Output = TraversalAction> + ?Sized,
    {
        let mut zippers = vec![];
        let mut path = vec![];
        Self::visit(root.clone(), &mut path, visitor, &mut zippers);

        trace!(edits = zippers.len(), "traversal finished");

        NodeMultiZipper::new(root.clone(), zippers).to_root_node()
    }

    /// `path` holds the breadcrumbs root first.
    fn visit<V>(
        node: Node,
        path: &mut Vec<Breadcrumb<Node>>,
        visitor: &mut V,
        zippers: &mut Vec<NodeZipper<Node>>,
    ) where
        V: NodeVisitor<TraverserContext, Output = TraversalAction> + ?Sized,
    {
        let mark = zippers.len();
        let mut ctx = TraverserContext::new(node.clone(), path.iter().rev().cloned().collect());
        let action = node.accept(visitor, &mut ctx);

        if let Some(zipper) = zipper_for_action(&action, &node, ctx.breadcrumbs()) {
            zippers.push(zipper);
        }

        let current = match action {
            TraversalAction::Delete => return,
            TraversalAction::Abort => None,
            TraversalAction::Replace(new_node) => Some(new_node),
            TraversalAction::Continue
            | TraversalAction::InsertBefore(_)
            | TraversalAction::InsertAfter(_) => Some(node.clone()),
        };

        if let Some(current) = &current {
            for (name, children) in current.named_children() {
                for (index, child) in children.into_iter().enumerate() {
                    path.push(Breadcrumb::new(
                        current.clone(),
                        NodeLocation::new(name, index),
                    ));
                    Self::visit(child, path, visitor, zippers);
                    path.pop();
                }
            }
        }

        ctx.node = current.unwrap_or(node);
        ctx.phase = TraversalPhase::Leave;
        let leave_node = ctx.node.clone();
        let action = leave_node.accept(visitor, &mut ctx);

        if let TraversalAction::Replace(_) | TraversalAction::Delete = action {
            // an edit on leave supersedes whatever was recorded for this node and below it
            let depth = ctx.depth();
            let mut index = mark;
            while index < zippers.len() {
                let zipper = &zippers[index];
                let sibling_insert = zipper.breadcrumbs().len() == depth
                    && matches!(
                        zipper.modification_type(),
                        ModificationType::InsertBefore | ModificationType::InsertAfter
                    );
                if sibling_insert {
                    index += 1;
                } else {
                    zippers.remove(index);
                }
            }
        }

        if let Some(zipper) = zipper_for_action(&action, &leave_node, ctx.breadcrumbs()) {
            zippers.push(zipper);
        }
    }
}
