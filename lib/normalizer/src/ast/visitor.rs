use std::sync::Arc;

use indexmap::IndexMap;

use super::node::{
    Argument, Directive, Document, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    Node, OperationDefinition, SelectionSet, VariableDefinition,
};
use super::type_node::TypeNode;
use super::value::{ObjectField, Value};

/// Per node kind callbacks, dispatched through [`Node::accept`].
///
/// Every `visit_*` method falls back to [`NodeVisitor::visit_node`], so an
/// implementation only overrides the kinds it cares about.
pub trait NodeVisitor<Ctx: ?Sized> {
    type Output;

    fn visit_node(&mut self, node: &Node, ctx: &mut Ctx) -> Self::Output;

    fn visit_document(&mut self, node: &Arc<Document>, ctx: &mut Ctx) -> Self::Output {
        self.visit_node(&Node::Document(node.clone()), ctx)
    }

    fn visit_operation_definition(
        &mut self,
        node: &Arc<OperationDefinition>,
        ctx: &mut Ctx,
    ) -> Self::Output {
        self.visit_node(&Node::OperationDefinition(node.clone()), ctx)
    }

    fn visit_fragment_definition(
        &mut self,
        node: &Arc<FragmentDefinition>,
        ctx: &mut Ctx,
    ) -> Self::Output {
        self.visit_node(&Node::FragmentDefinition(node.clone()), ctx)
    }

    fn visit_variable_definition(
        &mut self,
        node: &Arc<VariableDefinition>,
        ctx: &mut Ctx,
    ) -> Self::Output {
        self.visit_node(&Node::VariableDefinition(node.clone()), ctx)
    }

    fn visit_selection_set(&mut self, node: &Arc<SelectionSet>, ctx: &mut Ctx) -> Self::Output {
        self.visit_node(&Node::SelectionSet(node.clone()), ctx)
    }

    fn visit_field(&mut self, node: &Arc<Field>, ctx: &mut Ctx) -> Self::Output {
        self.visit_node(&Node::Field(node.clone()), ctx)
    }

    fn visit_fragment_spread(
        &mut self,
        node: &Arc<FragmentSpread>,
        ctx: &mut Ctx,
    ) -> Self::Output {
        self.visit_node(&Node::FragmentSpread(node.clone()), ctx)
    }

    fn visit_inline_fragment(
        &mut self,
        node: &Arc<InlineFragment>,
        ctx: &mut Ctx,
    ) -> Self::Output {
        self.visit_node(&Node::InlineFragment(node.clone()), ctx)
    }

    fn visit_argument(&mut self, node: &Arc<Argument>, ctx: &mut Ctx) -> Self::Output {
        self.visit_node(&Node::Argument(node.clone()), ctx)
    }

    fn visit_directive(&mut self, node: &Arc<Directive>, ctx: &mut Ctx) -> Self::Output {
        self.visit_node(&Node::Directive(node.clone()), ctx)
    }

    fn visit_type(&mut self, node: &Arc<TypeNode>, ctx: &mut Ctx) -> Self::Output {
        self.visit_node(&Node::Type(node.clone()), ctx)
    }

    fn visit_value(&mut self, node: &Arc<Value>, ctx: &mut Ctx) -> Self::Output {
        self.visit_node(&Node::Value(node.clone()), ctx)
    }

    fn visit_object_field(&mut self, node: &Arc<ObjectField>, ctx: &mut Ctx) -> Self::Output {
        self.visit_node(&Node::ObjectField(node.clone()), ctx)
    }
}

impl Node {
    pub fn accept<Ctx: ?Sized, V: NodeVisitor<Ctx> + ?Sized>(
        &self,
        visitor: &mut V,
        ctx: &mut Ctx,
    ) -> V::Output {
        match self {
            Node::Document(n) => visitor.visit_document(n, ctx),
            Node::OperationDefinition(n) => visitor.visit_operation_definition(n, ctx),
            Node::FragmentDefinition(n) => visitor.visit_fragment_definition(n, ctx),
            Node::VariableDefinition(n) => visitor.visit_variable_definition(n, ctx),
            Node::SelectionSet(n) => visitor.visit_selection_set(n, ctx),
            Node::Field(n) => visitor.visit_field(n, ctx),
            Node::FragmentSpread(n) => visitor.visit_fragment_spread(n, ctx),
            Node::InlineFragment(n) => visitor.visit_inline_fragment(n, ctx),
            Node::Argument(n) => visitor.visit_argument(n, ctx),
            Node::Directive(n) => visitor.visit_directive(n, ctx),
            Node::Type(n) => visitor.visit_type(n, ctx),
            Node::Value(n) => visitor.visit_value(n, ctx),
            Node::ObjectField(n) => visitor.visit_object_field(n, ctx),
        }
    }
}

/// Pre-order walk over `root` and all of its descendants. Read only.
pub fn walk<V: NodeVisitor<(), Output = ()> + ?Sized>(root: &Node, visitor: &mut V) {
    root.accept(visitor, &mut ());
    for child in root.children() {
        walk(&child, visitor);
    }
}

/// Number of nodes of each kind in a tree.
#[derive(Debug, Default)]
pub struct NodeCounter {
    counts: IndexMap<&'static str, usize>,
}

impl NodeCounter {
    pub fn count(root: &Node) -> Self {
        let mut counter = Self::default();
        walk(root, &mut counter);
        counter
    }

    /// Count for a [`Node::kind_name`].
    pub fn get(&self, kind_name: &str) -> usize {
        self.counts.get(kind_name).copied().unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl NodeVisitor<()> for NodeCounter {
    type Output = ();

    fn visit_node(&mut self, node: &Node, _ctx: &mut ()) {
        *self.counts.entry(node.kind_name()).or_default() += 1;
    }
}
