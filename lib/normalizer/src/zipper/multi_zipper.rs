use indexmap::IndexMap;
use tracing::trace;

use super::node_zipper::{move_up, NodeZipper};
use super::TreeNode;

/// A batch of edits against one root, not yet reconciled.
#[derive(Debug, Clone)]
pub struct NodeMultiZipper<T> {
    common_root: T,
    zippers: Vec<NodeZipper<T>>,
}

impl<T: TreeNode> NodeMultiZipper<T> {
    pub fn new(common_root: T, zippers: Vec<NodeZipper<T>>) -> Self {
        Self {
            common_root,
            zippers,
        }
    }

    pub fn empty(common_root: T) -> Self {
        Self::new(common_root, vec![])
    }

    pub fn common_root(&self) -> &T {
        &self.common_root
    }

    pub fn zippers(&self) -> &[NodeZipper<T>] {
        &self.zippers
    }

    pub fn size(&self) -> usize {
        self.zippers.len()
    }

    pub fn push(&mut self, zipper: NodeZipper<T>) {
        self.zippers.push(zipper);
    }

    pub fn zipper_for_node(&self, node: &T) -> Option<&NodeZipper<T>> {
        self.zippers
            .iter()
            .find(|z| z.cur_node().node_id() == node.node_id())
    }

    pub fn with_new_zipper(&self, zipper: NodeZipper<T>) -> Self {
        let mut zippers = self.zippers.clone();
        zippers.push(zipper);
        Self::new(self.common_root.clone(), zippers)
    }

    pub fn with_replaced_zippers(&self, zippers: Vec<NodeZipper<T>>) -> Self {
        Self::new(self.common_root.clone(), zippers)
    }

    pub fn with_replaced_zipper(&self, old: &NodeZipper<T>, new: NodeZipper<T>) -> Self {
        let old_id = old.cur_node().node_id();
        let zippers = self
            .zippers
            .iter()
            .map(|z| {
                if z.cur_node().node_id() == old_id {
                    new.clone()
                } else {
                    z.clone()
                }
            })
            .collect();
        Self::new(self.common_root.clone(), zippers)
    }

    /// Replaces the node of the zipper currently focused on `node`.
    pub fn with_replaced_zipper_for_node(&self, node: &T, new_node: T) -> Self {
        match self.zipper_for_node(node) {
            Some(zipper) => self.with_replaced_zipper(zipper, zipper.with_new_node(new_node)),
            None => panic!("no zipper is focused on the given node"),
        }
    }

    /// Folds every edit into one new root. Without edits the common root is returned as is.
    pub fn to_root_node(&self) -> T {
        if self.zippers.is_empty() {
            return self.common_root.clone();
        }

        let mut cur_zippers = self.zippers.clone();
        while cur_zippers.len() > 1 {
            let max_depth = cur_zippers
                .iter()
                .map(|z| z.breadcrumbs().len())
                .max()
                .unwrap_or_default();
            assert!(max_depth > 0, "several edits target the root node");

            let (deepest, mut remaining): (Vec<_>, Vec<_>) = cur_zippers
                .into_iter()
                .partition(|z| z.breadcrumbs().len() == max_depth);

            let mut same_parent: IndexMap<usize, Vec<NodeZipper<T>>> = IndexMap::new();
            for zipper in deepest {
                let parent_id = zipper.breadcrumbs()[0].node.node_id();
                same_parent.entry(parent_id).or_default().push(zipper);
            }

            trace!(
                depth = max_depth,
                parents = same_parent.len(),
                "folding deepest zippers"
            );

            for (parent_id, group) in same_parent {
                let parent = group[0].breadcrumbs()[0].node.clone();
                // an edit of the parent itself is superseded by the rebuilt parent
                remaining.retain(|z| z.cur_node().node_id() != parent_id);
                remaining.push(move_up(&parent, group));
            }
            cur_zippers = remaining;
        }

        cur_zippers[0].to_root()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::ast::{slots, Field, Node};
    use crate::utils::parsing::parse_operation;
    use crate::zipper::{Breadcrumb, NodeLocation, NodeMultiZipper, NodeZipper};

    /// Zipper focused on the `index`-th selection of the operation's root selection set.
    fn root_field_zipper(root: &Node, index: usize) -> NodeZipper<Node> {
        let definition = root.named_children()[slots::DEFINITIONS][0].clone();
        let selection_set = definition.named_children()[slots::SELECTION_SET][0].clone();
        let field = selection_set.named_children()[slots::SELECTIONS][index].clone();

        NodeZipper::new(
            field,
            vec![
                Breadcrumb::new(selection_set, NodeLocation::new(slots::SELECTIONS, index)),
                Breadcrumb::new(definition, NodeLocation::new(slots::SELECTION_SET, 0)),
                Breadcrumb::new(root.clone(), NodeLocation::new(slots::DEFINITIONS, 0)),
            ],
        )
    }

    fn field(name: &str) -> Node {
        Node::Field(Arc::new(Field::new(name)))
    }

    #[test]
    fn no_edits_return_the_same_root() {
        let root = Node::from(parse_operation("{ a b }"));
        let multi = NodeMultiZipper::empty(root.clone());

        assert!(multi.to_root_node().same_node(&root));
    }

    #[test]
    fn single_replacement_keeps_everything_else() {
        let root = Node::from(parse_operation("{ a b { c } d }"));
        let zipper = root_field_zipper(&root, 1).with_new_node(field("x"));
        let new_root = NodeMultiZipper::new(root.clone(), vec![zipper]).to_root_node();

        insta::assert_snapshot!(new_root, @r"
        query {
          a
          x
          d
        }
        ");
        insta::assert_snapshot!(root, @r"
        query {
          a
          b {
            c
          }
          d
        }
        ");
    }

    #[test]
    fn combines_sibling_edits() {
        let root = Node::from(parse_operation("{ a b c }"));
        let multi = NodeMultiZipper::new(
            root.clone(),
            vec![
                root_field_zipper(&root, 0).delete_node(),
                root_field_zipper(&root, 1).insert_before(field("before_b")),
                root_field_zipper(&root, 1).insert_after(field("after_b")),
                root_field_zipper(&root, 2).with_new_node(field("z")),
                root_field_zipper(&root, 2).insert_after(field("last")),
            ],
        );

        insta::assert_snapshot!(multi.to_root_node(), @r"
        query {
          before_b
          b
          after_b
          z
          last
        }
        ");
    }

    #[test]
    fn delete_then_insert_after_on_first_index() {
        let root = Node::from(parse_operation("{ a b }"));
        let multi = NodeMultiZipper::new(
            root.clone(),
            vec![
                root_field_zipper(&root, 0).insert_after(field("x")),
                root_field_zipper(&root, 0).delete_node(),
            ],
        );

        insta::assert_snapshot!(multi.to_root_node(), @r"
        query {
          x
          b
        }
        ");
    }

    #[test]
    fn single_zipper_delete_is_applied() {
        let root = Node::from(parse_operation("{ a b }"));
        let zipper = root_field_zipper(&root, 0).delete_node();

        insta::assert_snapshot!(zipper.to_root(), @r"
        query {
          b
        }
        ");
    }

    #[test]
    fn replaced_zipper_for_node() {
        let root = Node::from(parse_operation("{ a b }"));
        let zipper = root_field_zipper(&root, 0);
        let focused = zipper.cur_node().clone();
        let multi = NodeMultiZipper::new(root.clone(), vec![zipper])
            .with_replaced_zipper_for_node(&focused, field("y"));

        assert_eq!(multi.size(), 1);
        insta::assert_snapshot!(multi.to_root_node(), @r"
        query {
          y
          b
        }
        ");
    }
}
