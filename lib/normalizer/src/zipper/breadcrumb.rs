use std::fmt::Display;

/// Where a child sits inside its parent: the slot name and the index within that slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeLocation {
    pub name: &'static str,
    pub index: usize,
}

impl NodeLocation {
    pub fn new(name: &'static str, index: usize) -> Self {
        Self { name, index }
    }
}

impl Display for NodeLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}

/// One step from a child back to its parent.
#[derive(Debug, Clone)]
pub struct Breadcrumb<T> {
    pub node: T,
    pub location: NodeLocation,
}

impl<T> Breadcrumb<T> {
    pub fn new(node: T, location: NodeLocation) -> Self {
        Self { node, location }
    }
}
