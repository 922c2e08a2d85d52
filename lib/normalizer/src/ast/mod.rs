mod from_parser;
pub mod node;
pub mod printer;
pub mod type_node;
pub mod value;
pub mod visitor;

pub use node::{
    slots, Argument, Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
    InlineFragment, Node, NodeChildren, OperationDefinition, OperationKind, Selection,
    SelectionSet, VariableDefinition,
};
pub use type_node::TypeNode;
pub use value::{ObjectField, Value};
