use std::collections::HashMap;

use super::breadcrumb::{Breadcrumb, NodeLocation};
use super::TreeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModificationType {
    Replace,
    Delete,
    InsertBefore,
    InsertAfter,
}

impl ModificationType {
    /// Order in which edits sharing one index are applied to a parent.
    fn apply_order(self) -> u8 {
        match self {
            ModificationType::InsertBefore => 0,
            ModificationType::Replace | ModificationType::Delete => 1,
            ModificationType::InsertAfter => 2,
        }
    }
}

/// A focused node plus the path back to the root, nearest ancestor first.
#[derive(Debug, Clone)]
pub struct NodeZipper<T> {
    cur_node: T,
    breadcrumbs: Vec<Breadcrumb<T>>,
    modification_type: ModificationType,
}

impl<T: TreeNode> NodeZipper<T> {
    pub fn new(cur_node: T, breadcrumbs: Vec<Breadcrumb<T>>) -> Self {
        Self {
            cur_node,
            breadcrumbs,
            modification_type: ModificationType::Replace,
        }
    }

    pub fn root(node: T) -> Self {
        Self::new(node, vec![])
    }

    pub fn with_modification_type(mut self, modification_type: ModificationType) -> Self {
        self.modification_type = modification_type;
        self
    }

    pub fn cur_node(&self) -> &T {
        &self.cur_node
    }

    pub fn breadcrumbs(&self) -> &[Breadcrumb<T>] {
        &self.breadcrumbs
    }

    pub fn modification_type(&self) -> ModificationType {
        self.modification_type
    }

    pub fn is_root(&self) -> bool {
        self.breadcrumbs.is_empty()
    }

    pub fn parent(&self) -> Option<&T> {
        self.breadcrumbs.first().map(|b| &b.node)
    }

    pub fn location(&self) -> Option<NodeLocation> {
        self.breadcrumbs.first().map(|b| b.location)
    }

    pub fn with_new_node(&self, node: T) -> Self {
        Self::new(node, self.breadcrumbs.clone())
    }

    pub fn modify_node(&self, f: impl FnOnce(&T) -> T) -> Self {
        self.with_new_node(f(&self.cur_node))
    }

    pub fn delete_node(&self) -> Self {
        self.clone()
            .with_modification_type(ModificationType::Delete)
    }

    pub fn insert_before(&self, node: T) -> Self {
        self.with_new_node(node)
            .with_modification_type(ModificationType::InsertBefore)
    }

    pub fn insert_after(&self, node: T) -> Self {
        self.with_new_node(node)
            .with_modification_type(ModificationType::InsertAfter)
    }

    /// Applies this zipper's edit to its parent and focuses the rebuilt parent.
    pub fn move_up(&self) -> NodeZipper<T> {
        match self.parent() {
            Some(parent) => move_up(parent, vec![self.clone()]),
            None => panic!("cannot move up from the root node"),
        }
    }

    /// Threads the edit all the way up and returns the new root.
    ///
    /// # Panics
    /// If this zipper deletes the root or inserts next to it.
    pub fn to_root(&self) -> T {
        if self.is_root() {
            if self.modification_type != ModificationType::Replace {
                panic!(
                    "the root node can only be replaced, got {:?}",
                    self.modification_type
                );
            }
            return self.cur_node.clone();
        }

        let mut zipper = self.move_up();
        while !zipper.is_root() {
            zipper = zipper.move_up();
        }
        zipper.cur_node
    }
}

/// Applies every zipper of `same_parent` to `parent`, which must be the node of
/// their first breadcrumb, and returns a zipper focused on the rebuilt parent.
pub(crate) fn move_up<T: TreeNode>(parent: &T, mut same_parent: Vec<NodeZipper<T>>) -> NodeZipper<T> {
    assert!(
        !same_parent.is_empty(),
        "expected at least one zipper to move up"
    );
    debug_assert!(same_parent
        .iter()
        .all(|z| z.parent().map(|p| p.node_id()) == Some(parent.node_id())));

    let breadcrumbs = same_parent[0].breadcrumbs[1..].to_vec();
    let mut children = parent.named_children();
    let mut index_correction: HashMap<&'static str, isize> = HashMap::new();

    // stable, so edits on the same index and kind keep their recording order
    same_parent.sort_by_key(|z| {
        let location = z.breadcrumbs[0].location;
        (location.index, z.modification_type.apply_order())
    });

    for zipper in same_parent {
        let location = zipper.breadcrumbs[0].location;
        let slot = children.get_mut(location.name).unwrap_or_else(|| {
            panic!(
                "breadcrumb points to slot '{}' which does not exist on its parent",
                location.name
            )
        });
        let correction = index_correction.entry(location.name).or_insert(0);
        let ix = location.index as isize + *correction;

        match zipper.modification_type {
            ModificationType::Replace => {
                let ix = ix as usize;
                match ix.cmp(&slot.len()) {
                    std::cmp::Ordering::Less => slot[ix] = zipper.cur_node,
                    std::cmp::Ordering::Equal => slot.push(zipper.cur_node),
                    std::cmp::Ordering::Greater => {
                        panic!("breadcrumb points past the end of slot {}", location)
                    }
                }
            }
            ModificationType::Delete => {
                let ix = ix as usize;
                assert!(ix < slot.len(), "breadcrumb points nowhere: {}", location);
                slot.remove(ix);
                *correction -= 1;
            }
            ModificationType::InsertBefore => {
                slot.insert((ix as usize).min(slot.len()), zipper.cur_node);
                *correction += 1;
            }
            ModificationType::InsertAfter => {
                slot.insert(((ix + 1) as usize).min(slot.len()), zipper.cur_node);
                *correction += 1;
            }
        }
    }

    NodeZipper::new(parent.with_new_children(children), breadcrumbs)
}
