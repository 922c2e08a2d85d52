use std::sync::Arc;

use graphql_parser::query as parser;
use graphql_parser::query::Text;

use super::node::{
    Argument, Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
    InlineFragment, OperationDefinition, OperationKind, Selection, SelectionSet,
    VariableDefinition,
};
use super::value::Value;

fn convert_arguments<'a, T: Text<'a>>(
    arguments: &[(T::Value, parser::Value<'a, T>)],
) -> Vec<Arc<Argument>> {
    arguments
        .iter()
        .map(|(name, value)| Arc::new(Argument::new(name.as_ref(), Value::from(value))))
        .collect()
}

fn convert_directives<'a, T: Text<'a>>(
    directives: &[parser::Directive<'a, T>],
) -> Vec<Arc<Directive>> {
    directives
        .iter()
        .map(|d| {
            Arc::new(Directive {
                name: d.name.as_ref().to_string(),
                arguments: convert_arguments::<T>(&d.arguments),
            })
        })
        .collect()
}

fn type_condition_name<'a, T: Text<'a>>(condition: &parser::TypeCondition<'a, T>) -> String {
    match condition {
        parser::TypeCondition::On(name) => name.as_ref().to_string(),
    }
}

impl<'a, T: Text<'a>> From<&parser::SelectionSet<'a, T>> for SelectionSet {
    fn from(set: &parser::SelectionSet<'a, T>) -> Self {
        SelectionSet {
            items: set.items.iter().map(Selection::from).collect(),
        }
    }
}

impl<'a, T: Text<'a>> From<&parser::Selection<'a, T>> for Selection {
    fn from(selection: &parser::Selection<'a, T>) -> Self {
        match selection {
            parser::Selection::Field(field) => Selection::Field(Arc::new(Field {
                alias: field.alias.as_ref().map(|a| a.as_ref().to_string()),
                name: field.name.as_ref().to_string(),
                arguments: convert_arguments::<T>(&field.arguments),
                directives: convert_directives(&field.directives),
                selection_set: if field.selection_set.items.is_empty() {
                    None
                } else {
                    Some(Arc::new((&field.selection_set).into()))
                },
            })),
            parser::Selection::FragmentSpread(spread) => {
                Selection::FragmentSpread(Arc::new(FragmentSpread {
                    fragment_name: spread.fragment_name.as_ref().to_string(),
                    directives: convert_directives(&spread.directives),
                }))
            }
            parser::Selection::InlineFragment(fragment) => {
                Selection::InlineFragment(Arc::new(InlineFragment {
                    type_condition: fragment.type_condition.as_ref().map(type_condition_name),
                    directives: convert_directives(&fragment.directives),
                    selection_set: Arc::new((&fragment.selection_set).into()),
                }))
            }
        }
    }
}

fn convert_variable_definitions<'a, T: Text<'a>>(
    definitions: &[parser::VariableDefinition<'a, T>],
) -> Vec<Arc<VariableDefinition>> {
    definitions
        .iter()
        .map(|v| {
            Arc::new(VariableDefinition {
                name: v.name.as_ref().to_string(),
                var_type: (&v.var_type).into(),
                default_value: v.default_value.as_ref().map(Value::from),
                directives: vec![],
            })
        })
        .collect()
}

impl<'a, T: Text<'a>> From<&parser::OperationDefinition<'a, T>> for OperationDefinition {
    fn from(op: &parser::OperationDefinition<'a, T>) -> Self {
        match op {
            parser::OperationDefinition::SelectionSet(set) => OperationDefinition {
                kind: OperationKind::Query,
                name: None,
                variable_definitions: vec![],
                directives: vec![],
                selection_set: Arc::new(set.into()),
            },
            parser::OperationDefinition::Query(q) => OperationDefinition {
                kind: OperationKind::Query,
                name: q.name.as_ref().map(|n| n.as_ref().to_string()),
                variable_definitions: convert_variable_definitions(&q.variable_definitions),
                directives: convert_directives(&q.directives),
                selection_set: Arc::new((&q.selection_set).into()),
            },
            parser::OperationDefinition::Mutation(m) => OperationDefinition {
                kind: OperationKind::Mutation,
                name: m.name.as_ref().map(|n| n.as_ref().to_string()),
                variable_definitions: convert_variable_definitions(&m.variable_definitions),
                directives: convert_directives(&m.directives),
                selection_set: Arc::new((&m.selection_set).into()),
            },
            parser::OperationDefinition::Subscription(s) => OperationDefinition {
                kind: OperationKind::Subscription,
                name: s.name.as_ref().map(|n| n.as_ref().to_string()),
                variable_definitions: convert_variable_definitions(&s.variable_definitions),
                directives: convert_directives(&s.directives),
                selection_set: Arc::new((&s.selection_set).into()),
            },
        }
    }
}

impl<'a, T: Text<'a>> From<&parser::FragmentDefinition<'a, T>> for FragmentDefinition {
    fn from(fragment: &parser::FragmentDefinition<'a, T>) -> Self {
        FragmentDefinition {
            name: fragment.name.as_ref().to_string(),
            type_condition: type_condition_name(&fragment.type_condition),
            directives: convert_directives(&fragment.directives),
            selection_set: Arc::new((&fragment.selection_set).into()),
        }
    }
}

impl<'a, T: Text<'a>> From<&parser::Document<'a, T>> for Document {
    fn from(document: &parser::Document<'a, T>) -> Self {
        Document {
            definitions: document
                .definitions
                .iter()
                .map(|d| match d {
                    parser::Definition::Operation(op) => {
                        Definition::Operation(Arc::new(op.into()))
                    }
                    parser::Definition::Fragment(f) => Definition::Fragment(Arc::new(f.into())),
                })
                .collect(),
        }
    }
}
