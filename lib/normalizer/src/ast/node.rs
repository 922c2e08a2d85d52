use std::{fmt::Display, sync::Arc};

use indexmap::IndexMap;

use super::{
    type_node::TypeNode,
    value::{ObjectField, Value},
};

/// Children of a node, grouped by the slot they occupy in their parent.
pub type NodeChildren = IndexMap<&'static str, Vec<Node>>;

pub mod slots {
    pub const DEFINITIONS: &str = "definitions";
    pub const VARIABLE_DEFINITIONS: &str = "variableDefinitions";
    pub const DIRECTIVES: &str = "directives";
    pub const SELECTION_SET: &str = "selectionSet";
    pub const SELECTIONS: &str = "selections";
    pub const ARGUMENTS: &str = "arguments";
    pub const VALUE: &str = "value";
    pub const TYPE: &str = "type";
    pub const DEFAULT_VALUE: &str = "defaultValue";
    pub const VALUES: &str = "values";
    pub const OBJECT_FIELDS: &str = "objectFields";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
            OperationKind::Subscription => write!(f, "subscription"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Operation(Arc<OperationDefinition>),
    Fragment(Arc<FragmentDefinition>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationDefinition {
    pub kind: OperationKind,
    pub name: Option<String>,
    pub variable_definitions: Vec<Arc<VariableDefinition>>,
    pub directives: Vec<Arc<Directive>>,
    pub selection_set: Arc<SelectionSet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,
    pub directives: Vec<Arc<Directive>>,
    pub selection_set: Arc<SelectionSet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub name: String,
    pub var_type: TypeNode,
    pub default_value: Option<Value>,
    pub directives: Vec<Arc<Directive>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionSet {
    pub items: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(Arc<Field>),
    FragmentSpread(Arc<FragmentSpread>),
    InlineFragment(Arc<InlineFragment>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<Arc<Argument>>,
    pub directives: Vec<Arc<Directive>>,
    pub selection_set: Option<Arc<SelectionSet>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSpread {
    pub fragment_name: String,
    pub directives: Vec<Arc<Directive>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    pub type_condition: Option<String>,
    pub directives: Vec<Arc<Directive>>,
    pub selection_set: Arc<SelectionSet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<Arc<Argument>>,
}

impl Document {
    pub fn operations(&self) -> impl Iterator<Item = &Arc<OperationDefinition>> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Operation(op) => Some(op),
            Definition::Fragment(_) => None,
        })
    }

    pub fn fragments(&self) -> impl Iterator<Item = &Arc<FragmentDefinition>> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Fragment(fragment) => Some(fragment),
            Definition::Operation(_) => None,
        })
    }
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: vec![],
            directives: vec![],
            selection_set: None,
        }
    }

    /// The key under which the field's value appears in a response.
    pub fn result_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}

impl Directive {
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}

impl Argument {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Any node of an executable document.
///
/// Every variant is reference counted, so cloning a node is cheap and two clones
/// of the same node are recognised as the same node by [`Node::same_node`].
#[derive(Debug, Clone)]
pub enum Node {
    Document(Arc<Document>),
    OperationDefinition(Arc<OperationDefinition>),
    FragmentDefinition(Arc<FragmentDefinition>),
    VariableDefinition(Arc<VariableDefinition>),
    SelectionSet(Arc<SelectionSet>),
    Field(Arc<Field>),
    FragmentSpread(Arc<FragmentSpread>),
    InlineFragment(Arc<InlineFragment>),
    Argument(Arc<Argument>),
    Directive(Arc<Directive>),
    Type(Arc<TypeNode>),
    Value(Arc<Value>),
    ObjectField(Arc<ObjectField>),
}

macro_rules! node_accessors {
    ($($fn_name:ident => $variant:ident($ty:ty)),* $(,)?) => {
        impl Node {
            $(
                pub fn $fn_name(&self) -> Option<&Arc<$ty>> {
                    match self {
                        Node::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            )*
        }
    };
}

node_accessors! {
    as_document => Document(Document),
    as_operation_definition => OperationDefinition(OperationDefinition),
    as_fragment_definition => FragmentDefinition(FragmentDefinition),
    as_variable_definition => VariableDefinition(VariableDefinition),
    as_selection_set => SelectionSet(SelectionSet),
    as_field => Field(Field),
    as_fragment_spread => FragmentSpread(FragmentSpread),
    as_inline_fragment => InlineFragment(InlineFragment),
    as_argument => Argument(Argument),
    as_directive => Directive(Directive),
    as_type => Type(TypeNode),
    as_value => Value(Value),
    as_object_field => ObjectField(ObjectField),
}

impl From<Definition> for Node {
    fn from(definition: Definition) -> Self {
        match definition {
            Definition::Operation(op) => Node::OperationDefinition(op),
            Definition::Fragment(fragment) => Node::FragmentDefinition(fragment),
        }
    }
}

impl From<Selection> for Node {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::Field(field) => Node::Field(field),
            Selection::FragmentSpread(spread) => Node::FragmentSpread(spread),
            Selection::InlineFragment(fragment) => Node::InlineFragment(fragment),
        }
    }
}

impl From<Document> for Node {
    fn from(document: Document) -> Self {
        Node::Document(Arc::new(document))
    }
}

fn directive_nodes(directives: &[Arc<Directive>]) -> Vec<Node> {
    directives.iter().cloned().map(Node::Directive).collect()
}

fn argument_nodes(arguments: &[Arc<Argument>]) -> Vec<Node> {
    arguments.iter().cloned().map(Node::Argument).collect()
}

fn value_node(value: &Value) -> Node {
    Node::Value(Arc::new(value.clone()))
}

fn take_slot(children: &mut NodeChildren, slot: &'static str) -> Option<Vec<Node>> {
    children.swap_remove(slot)
}

fn unexpected(slot: &str, node: &Node) -> ! {
    panic!(
        "unexpected node kind '{}' in slot '{}'",
        node.kind_name(),
        slot
    )
}

fn into_directives(nodes: Vec<Node>) -> Vec<Arc<Directive>> {
    nodes
        .into_iter()
        .map(|n| match n {
            Node::Directive(d) => d,
            other => unexpected(slots::DIRECTIVES, &other),
        })
        .collect()
}

fn into_arguments(nodes: Vec<Node>) -> Vec<Arc<Argument>> {
    nodes
        .into_iter()
        .map(|n| match n {
            Node::Argument(a) => a,
            other => unexpected(slots::ARGUMENTS, &other),
        })
        .collect()
}

fn into_selection_set(nodes: Vec<Node>) -> Option<Arc<SelectionSet>> {
    nodes.into_iter().next().map(|n| match n {
        Node::SelectionSet(s) => s,
        other => unexpected(slots::SELECTION_SET, &other),
    })
}

fn into_value(nodes: Vec<Node>) -> Option<Value> {
    nodes.into_iter().next().map(|n| match n {
        Node::Value(v) => Arc::unwrap_or_clone(v),
        other => unexpected(slots::VALUE, &other),
    })
}

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Document(_) => "Document",
            Node::OperationDefinition(_) => "OperationDefinition",
            Node::FragmentDefinition(_) => "FragmentDefinition",
            Node::VariableDefinition(_) => "VariableDefinition",
            Node::SelectionSet(_) => "SelectionSet",
            Node::Field(_) => "Field",
            Node::FragmentSpread(_) => "FragmentSpread",
            Node::InlineFragment(_) => "InlineFragment",
            Node::Argument(_) => "Argument",
            Node::Directive(_) => "Directive",
            Node::Type(_) => "Type",
            Node::Value(_) => "Value",
            Node::ObjectField(_) => "ObjectField",
        }
    }

    /// Address of the shared allocation behind this node.
    pub fn node_id(&self) -> usize {
        match self {
            Node::Document(n) => Arc::as_ptr(n) as usize,
            Node::OperationDefinition(n) => Arc::as_ptr(n) as usize,
            Node::FragmentDefinition(n) => Arc::as_ptr(n) as usize,
            Node::VariableDefinition(n) => Arc::as_ptr(n) as usize,
            Node::SelectionSet(n) => Arc::as_ptr(n) as usize,
            Node::Field(n) => Arc::as_ptr(n) as usize,
            Node::FragmentSpread(n) => Arc::as_ptr(n) as usize,
            Node::InlineFragment(n) => Arc::as_ptr(n) as usize,
            Node::Argument(n) => Arc::as_ptr(n) as usize,
            Node::Directive(n) => Arc::as_ptr(n) as usize,
            Node::Type(n) => Arc::as_ptr(n) as usize,
            Node::Value(n) => Arc::as_ptr(n) as usize,
            Node::ObjectField(n) => Arc::as_ptr(n) as usize,
        }
    }

    /// Identity comparison: true only for clones of the same node.
    pub fn same_node(&self, other: &Node) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
            && self.node_id() == other.node_id()
    }

    /// Direct children, in slot order.
    pub fn children(&self) -> Vec<Node> {
        self.named_children().into_values().flatten().collect()
    }

    /// Direct children keyed by the slot they live in. Empty slots are still present.
    pub fn named_children(&self) -> NodeChildren {
        let mut children = NodeChildren::new();
        match self {
            Node::Document(doc) => {
                children.insert(
                    slots::DEFINITIONS,
                    doc.definitions.iter().cloned().map(Node::from).collect(),
                );
            }
            Node::OperationDefinition(op) => {
                children.insert(
                    slots::VARIABLE_DEFINITIONS,
                    op.variable_definitions
                        .iter()
                        .cloned()
                        .map(Node::VariableDefinition)
                        .collect(),
                );
                children.insert(slots::DIRECTIVES, directive_nodes(&op.directives));
                children.insert(
                    slots::SELECTION_SET,
                    vec![Node::SelectionSet(op.selection_set.clone())],
                );
            }
            Node::FragmentDefinition(fragment) => {
                children.insert(slots::DIRECTIVES, directive_nodes(&fragment.directives));
                children.insert(
                    slots::SELECTION_SET,
                    vec![Node::SelectionSet(fragment.selection_set.clone())],
                );
            }
            Node::VariableDefinition(var) => {
                children.insert(slots::TYPE, vec![Node::Type(Arc::new(var.var_type.clone()))]);
                children.insert(
                    slots::DEFAULT_VALUE,
                    var.default_value.iter().map(value_node).collect(),
                );
                children.insert(slots::DIRECTIVES, directive_nodes(&var.directives));
            }
            Node::SelectionSet(set) => {
                children.insert(
                    slots::SELECTIONS,
                    set.items.iter().cloned().map(Node::from).collect(),
                );
            }
            Node::Field(field) => {
                children.insert(slots::ARGUMENTS, argument_nodes(&field.arguments));
                children.insert(slots::DIRECTIVES, directive_nodes(&field.directives));
                children.insert(
                    slots::SELECTION_SET,
                    field
                        .selection_set
                        .iter()
                        .cloned()
                        .map(Node::SelectionSet)
                        .collect(),
                );
            }
            Node::FragmentSpread(spread) => {
                children.insert(slots::DIRECTIVES, directive_nodes(&spread.directives));
            }
            Node::InlineFragment(fragment) => {
                children.insert(slots::DIRECTIVES, directive_nodes(&fragment.directives));
                children.insert(
                    slots::SELECTION_SET,
                    vec![Node::SelectionSet(fragment.selection_set.clone())],
                );
            }
            Node::Argument(arg) => {
                children.insert(slots::VALUE, vec![value_node(&arg.value)]);
            }
            Node::Directive(directive) => {
                children.insert(slots::ARGUMENTS, argument_nodes(&directive.arguments));
            }
            Node::Type(_) => {}
            Node::Value(value) => match value.as_ref() {
                Value::List(items) => {
                    children.insert(slots::VALUES, items.iter().map(value_node).collect());
                }
                Value::Object(fields) => {
                    children.insert(
                        slots::OBJECT_FIELDS,
                        fields
                            .iter()
                            .map(|f| Node::ObjectField(Arc::new(f.clone())))
                            .collect(),
                    );
                }
                _ => {}
            },
            Node::ObjectField(field) => {
                children.insert(slots::VALUE, vec![value_node(&field.value)]);
            }
        }
        children
    }

    /// Rebuilds this node with the given children. Slots missing from `children`
    /// keep their current content.
    pub fn with_new_children(&self, mut children: NodeChildren) -> Node {
        match self {
            Node::Document(doc) => {
                let mut doc = doc.as_ref().clone();
                if let Some(nodes) = take_slot(&mut children, slots::DEFINITIONS) {
                    doc.definitions = nodes
                        .into_iter()
                        .map(|n| match n {
                            Node::OperationDefinition(op) => Definition::Operation(op),
                            Node::FragmentDefinition(f) => Definition::Fragment(f),
                            other => unexpected(slots::DEFINITIONS, &other),
                        })
                        .collect();
                }
                Node::Document(Arc::new(doc))
            }
            Node::OperationDefinition(op) => {
                let mut op = op.as_ref().clone();
                if let Some(nodes) = take_slot(&mut children, slots::VARIABLE_DEFINITIONS) {
                    op.variable_definitions = nodes
                        .into_iter()
                        .map(|n| match n {
                            Node::VariableDefinition(v) => v,
                            other => unexpected(slots::VARIABLE_DEFINITIONS, &other),
                        })
                        .collect();
                }
                if let Some(nodes) = take_slot(&mut children, slots::DIRECTIVES) {
                    op.directives = into_directives(nodes);
                }
                if let Some(set) =
                    take_slot(&mut children, slots::SELECTION_SET).and_then(into_selection_set)
                {
                    op.selection_set = set;
                }
                Node::OperationDefinition(Arc::new(op))
            }
            Node::FragmentDefinition(fragment) => {
                let mut fragment = fragment.as_ref().clone();
                if let Some(nodes) = take_slot(&mut children, slots::DIRECTIVES) {
                    fragment.directives = into_directives(nodes);
                }
                if let Some(set) =
                    take_slot(&mut children, slots::SELECTION_SET).and_then(into_selection_set)
                {
                    fragment.selection_set = set;
                }
                Node::FragmentDefinition(Arc::new(fragment))
            }
            Node::VariableDefinition(var) => {
                let mut var = var.as_ref().clone();
                if let Some(nodes) = take_slot(&mut children, slots::TYPE) {
                    if let Some(node) = nodes.into_iter().next() {
                        var.var_type = match node {
                            Node::Type(t) => Arc::unwrap_or_clone(t),
                            other => unexpected(slots::TYPE, &other),
                        };
                    }
                }
                if let Some(nodes) = take_slot(&mut children, slots::DEFAULT_VALUE) {
                    var.default_value = into_value(nodes);
                }
                if let Some(nodes) = take_slot(&mut children, slots::DIRECTIVES) {
                    var.directives = into_directives(nodes);
                }
                Node::VariableDefinition(Arc::new(var))
            }
            Node::SelectionSet(set) => {
                let mut set = set.as_ref().clone();
                if let Some(nodes) = take_slot(&mut children, slots::SELECTIONS) {
                    set.items = nodes
                        .into_iter()
                        .map(|n| match n {
                            Node::Field(f) => Selection::Field(f),
                            Node::FragmentSpread(s) => Selection::FragmentSpread(s),
                            Node::InlineFragment(i) => Selection::InlineFragment(i),
                            other => unexpected(slots::SELECTIONS, &other),
                        })
                        .collect();
                }
                Node::SelectionSet(Arc::new(set))
            }
            Node::Field(field) => {
                let mut field = field.as_ref().clone();
                if let Some(nodes) = take_slot(&mut children, slots::ARGUMENTS) {
                    field.arguments = into_arguments(nodes);
                }
                if let Some(nodes) = take_slot(&mut children, slots::DIRECTIVES) {
                    field.directives = into_directives(nodes);
                }
                if let Some(nodes) = take_slot(&mut children, slots::SELECTION_SET) {
                    field.selection_set = into_selection_set(nodes);
                }
                Node::Field(Arc::new(field))
            }
            Node::FragmentSpread(spread) => {
                let mut spread = spread.as_ref().clone();
                if let Some(nodes) = take_slot(&mut children, slots::DIRECTIVES) {
                    spread.directives = into_directives(nodes);
                }
                Node::FragmentSpread(Arc::new(spread))
            }
            Node::InlineFragment(fragment) => {
                let mut fragment = fragment.as_ref().clone();
                if let Some(nodes) = take_slot(&mut children, slots::DIRECTIVES) {
                    fragment.directives = into_directives(nodes);
                }
                if let Some(set) =
                    take_slot(&mut children, slots::SELECTION_SET).and_then(into_selection_set)
                {
                    fragment.selection_set = set;
                }
                Node::InlineFragment(Arc::new(fragment))
            }
            Node::Argument(arg) => {
                let mut arg = arg.as_ref().clone();
                if let Some(value) = take_slot(&mut children, slots::VALUE).and_then(into_value) {
                    arg.value = value;
                }
                Node::Argument(Arc::new(arg))
            }
            Node::Directive(directive) => {
                let mut directive = directive.as_ref().clone();
                if let Some(nodes) = take_slot(&mut children, slots::ARGUMENTS) {
                    directive.arguments = into_arguments(nodes);
                }
                Node::Directive(Arc::new(directive))
            }
            Node::Type(t) => Node::Type(t.clone()),
            Node::Value(value) => {
                let value = match value.as_ref() {
                    Value::List(items) => match take_slot(&mut children, slots::VALUES) {
                        Some(nodes) => Value::List(
                            nodes
                                .into_iter()
                                .map(|n| match n {
                                    Node::Value(v) => Arc::unwrap_or_clone(v),
                                    other => unexpected(slots::VALUES, &other),
                                })
                                .collect(),
                        ),
                        None => Value::List(items.clone()),
                    },
                    Value::Object(fields) => match take_slot(&mut children, slots::OBJECT_FIELDS)
                    {
                        Some(nodes) => Value::Object(
                            nodes
                                .into_iter()
                                .map(|n| match n {
                                    Node::ObjectField(f) => Arc::unwrap_or_clone(f),
                                    other => unexpected(slots::OBJECT_FIELDS, &other),
                                })
                                .collect(),
                        ),
                        None => Value::Object(fields.clone()),
                    },
                    scalar => scalar.clone(),
                };
                Node::Value(Arc::new(value))
            }
            Node::ObjectField(field) => {
                let mut field = field.as_ref().clone();
                if let Some(value) = take_slot(&mut children, slots::VALUE).and_then(into_value) {
                    field.value = value;
                }
                Node::ObjectField(Arc::new(field))
            }
        }
    }
}

/// Structural equality, independent of node identity.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Document(a), Node::Document(b)) => a == b,
            (Node::OperationDefinition(a), Node::OperationDefinition(b)) => a == b,
            (Node::FragmentDefinition(a), Node::FragmentDefinition(b)) => a == b,
            (Node::VariableDefinition(a), Node::VariableDefinition(b)) => a == b,
            (Node::SelectionSet(a), Node::SelectionSet(b)) => a == b,
            (Node::Field(a), Node::Field(b)) => a == b,
            (Node::FragmentSpread(a), Node::FragmentSpread(b)) => a == b,
            (Node::InlineFragment(a), Node::InlineFragment(b)) => a == b,
            (Node::Argument(a), Node::Argument(b)) => a == b,
            (Node::Directive(a), Node::Directive(b)) => a == b,
            (Node::Type(a), Node::Type(b)) => a == b,
            (Node::Value(a), Node::Value(b)) => a == b,
            (Node::ObjectField(a), Node::ObjectField(b)) => a == b,
            _ => false,
        }
    }
}
