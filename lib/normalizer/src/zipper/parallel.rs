use rayon::prelude::*;
use tracing::instrument;

use super::breadcrumb::{Breadcrumb, NodeLocation};
use super::multi_zipper::NodeMultiZipper;
use super::node_zipper::{move_up, NodeZipper};
use super::transformer::{zipper_for_action, TraversalAction, TraverserContext};
use crate::ast::visitor::NodeVisitor;
use crate::ast::Node;

/// Enter-only variant of [`super::TreeTransformer`] that visits sibling subtrees
/// on the rayon pool.
///
/// Every subtree gets its own clone of the visitor, so sibling subtrees never
/// observe each other's state. Each subtree folds its own edits into a single
/// zipper before handing it to its parent.
pub struct TreeParallelTransformer;

impl TreeParallelTransformer {
    #[instrument(level = "trace", skip_all, fields(root = root.kind_name()))]
    pub fn transform<V>(root: &Node, visitor: &V) -> Node
    where
        V: NodeVisitor<TraverserContext, Output = TraversalAction> + Clone + Send + Sync,
    {
        let zippers = Self::visit(root.clone(), vec![], visitor.clone());
        NodeMultiZipper::new(root.clone(), zippers).to_root_node()
    }

    /// Returns the edits of this subtree, already folded up to this node's level.
    fn visit<V>(node: Node, breadcrumbs: Vec<Breadcrumb<Node>>, mut visitor: V) -> Vec<NodeZipper<Node>>
    where
        V: NodeVisitor<TraverserContext, Output = TraversalAction> + Clone + Send + Sync,
    {
        let mut ctx = TraverserContext::new(node.clone(), breadcrumbs);
        let action = node.accept(&mut visitor, &mut ctx);
        let breadcrumbs = ctx.into_breadcrumbs();

        let mut result = vec![];
        let (current, changed) = match &action {
            TraversalAction::Abort => return result,
            TraversalAction::Delete => {
                result.extend(zipper_for_action(&action, &node, &breadcrumbs));
                return result;
            }
            TraversalAction::Replace(new_node) => (new_node.clone(), true),
            TraversalAction::InsertBefore(_) | TraversalAction::InsertAfter(_) => {
                result.extend(zipper_for_action(&action, &node, &breadcrumbs));
                (node, false)
            }
            TraversalAction::Continue => (node, false),
        };

        let tasks: Vec<(NodeLocation, Node)> = current
            .named_children()
            .into_iter()
            .flat_map(|(name, children)| {
                children
                    .into_iter()
                    .enumerate()
                    .map(move |(index, child)| (NodeLocation::new(name, index), child))
            })
            .collect();

        let child_zippers: Vec<NodeZipper<Node>> = tasks
            .into_par_iter()
            .flat_map_iter(|(location, child)| {
                let mut child_breadcrumbs = Vec::with_capacity(breadcrumbs.len() + 1);
                child_breadcrumbs.push(Breadcrumb::new(current.clone(), location));
                child_breadcrumbs.extend(breadcrumbs.iter().cloned());
                Self::visit(child, child_breadcrumbs, visitor.clone())
            })
            .collect();

        if !child_zippers.is_empty() {
            result.push(move_up(&current, child_zippers));
        } else if changed {
            result.push(NodeZipper::new(current, breadcrumbs));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use crate::ast::visitor::NodeVisitor;
    use crate::ast::{Field, Node};
    use crate::utils::parsing::parse_operation;
    use crate::zipper::{
        TraversalAction, TraversalPhase, TraverserContext, TreeParallelTransformer, TreeTransformer,
    };

    #[derive(Clone, Default)]
    struct Uppercase {
        visited: Arc<AtomicUsize>,
    }

    impl NodeVisitor<TraverserContext> for Uppercase {
        type Output = TraversalAction;

        fn visit_node(&mut self, _node: &Node, _ctx: &mut TraverserContext) -> TraversalAction {
            TraversalAction::Continue
        }

        fn visit_field(&mut self, node: &Arc<Field>, ctx: &mut TraverserContext) -> TraversalAction {
            if ctx.phase() == TraversalPhase::Leave {
                return TraversalAction::Continue;
            }
            self.visited.fetch_add(1, Ordering::Relaxed);

            match node.name.as_str() {
                "drop" => TraversalAction::Delete,
                "stop" => TraversalAction::Abort,
                name if name.starts_with('_') => TraversalAction::Continue,
                name => TraversalAction::Replace(Node::Field(Arc::new(Field {
                    name: name.to_uppercase(),
                    ..node.as_ref().clone()
                }))),
            }
        }
    }

    #[test]
    fn matches_sequential_transformer() {
        let root = Node::from(parse_operation(
            r#"
            {
              a { b { c d } drop { e } }
              stop { f }
              _keep { g _h { drop i } }
              j(arg: [1, 2]) @include(if: true)
            }
            "#,
        ));

        let parallel_visitor = Uppercase::default();
        let parallel = TreeParallelTransformer::transform(&root, &parallel_visitor);
        let sequential = TreeTransformer::transform(&root, &mut Uppercase::default());

        assert_eq!(parallel, sequential);
        // drop's and stop's children are never visited
        assert_eq!(parallel_visitor.visited.load(Ordering::Relaxed), 12);
        insta::assert_snapshot!(parallel, @r"
        query {
          A {
            B {
              C
              D
            }
          }
          stop {
            f
          }
          _keep {
            G
            _h {
              I
            }
          }
          J(arg: [1, 2]) @include(if: true)
        }
        ");
    }

    #[test]
    fn untouched_tree_is_returned_as_is() {
        #[derive(Clone)]
        struct Noop;

        impl NodeVisitor<TraverserContext> for Noop {
            type Output = TraversalAction;

            fn visit_node(&mut self, _node: &Node, _ctx: &mut TraverserContext) -> TraversalAction {
                TraversalAction::Continue
            }
        }

        let root = Node::from(parse_operation("{ a { b } c }"));
        assert!(TreeParallelTransformer::transform(&root, &Noop).same_node(&root));
    }

    #[test]
    fn deleting_or_inserting_at_the_root_keeps_the_root() {
        #[derive(Clone)]
        struct RootEdit {
            delete: bool,
        }

        impl NodeVisitor<TraverserContext> for RootEdit {
            type Output = TraversalAction;

            fn visit_node(&mut self, node: &Node, ctx: &mut TraverserContext) -> TraversalAction {
                match (ctx.depth(), self.delete) {
                    (0, true) => TraversalAction::Delete,
                    (0, false) => TraversalAction::InsertAfter(node.clone()),
                    _ => TraversalAction::Continue,
                }
            }
        }

        let root = Node::from(parse_operation("{ a { b } c }"));
        for delete in [true, false] {
            let mut visitor = RootEdit { delete };
            assert!(TreeTransformer::transform(&root, &mut visitor).same_node(&root));
            assert!(TreeParallelTransformer::transform(&root, &visitor).same_node(&root));
        }
    }
}
