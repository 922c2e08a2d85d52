//! Compiles normalized fields back into an operation document.

mod variables;

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::instrument;

use crate::ast::{
    Argument, Definition, Directive, Document, Field, InlineFragment, ObjectField,
    OperationDefinition, OperationKind, Selection, SelectionSet, Value,
};
use crate::normalization::{
    DeferExecution, FieldId, NormalizationError, NormalizedField, NormalizedOperation,
};
use crate::schema::SchemaState;
use crate::values::{NormalizedInputValue, NormalizedValue};

pub use variables::{AllVariables, NoVariables, VariablePredicate};
use variables::VariableAccumulator;

#[derive(Debug, Clone)]
pub struct CompilerResult {
    pub document: Document,
    /// Values of the variables minted while compiling, by name.
    pub variables: IndexMap<String, JsonValue>,
}

/// Compiles `fields` of `operation` into a document with a single operation.
///
/// Fields that only apply to some of their parent's types end up in one inline
/// fragment per object type.
pub fn compile_to_document(
    schema: &SchemaState,
    operation_kind: OperationKind,
    operation_name: Option<&str>,
    operation: &NormalizedOperation,
    fields: &[FieldId],
    variable_predicate: &dyn VariablePredicate,
) -> Result<CompilerResult, NormalizationError> {
    compile(
        schema,
        operation_kind,
        operation_name,
        operation,
        fields,
        variable_predicate,
        false,
    )
}

/// Same as [`compile_to_document`], additionally wrapping deferred fields in
/// `... @defer(label: "…")` fragments.
pub fn compile_to_document_with_defer_support(
    schema: &SchemaState,
    operation_kind: OperationKind,
    operation_name: Option<&str>,
    operation: &NormalizedOperation,
    fields: &[FieldId],
    variable_predicate: &dyn VariablePredicate,
) -> Result<CompilerResult, NormalizationError> {
    compile(
        schema,
        operation_kind,
        operation_name,
        operation,
        fields,
        variable_predicate,
        true,
    )
}

#[instrument(level = "trace", skip(schema, operation, fields, variable_predicate))]
fn compile(
    schema: &SchemaState,
    operation_kind: OperationKind,
    operation_name: Option<&str>,
    operation: &NormalizedOperation,
    fields: &[FieldId],
    variable_predicate: &dyn VariablePredicate,
    defer_support: bool,
) -> Result<CompilerResult, NormalizationError> {
    let root_type = schema
        .root_type_name(operation_kind)
        .ok_or(NormalizationError::MissingRootType { operation_kind })?;

    let mut compiler = Compiler {
        schema,
        operation,
        accumulator: VariableAccumulator::new(variable_predicate),
        defer_support,
    };
    let selections = compiler.subselections(root_type, fields);
    let (variable_definitions, variables) = compiler.accumulator.into_parts();

    let definition = OperationDefinition {
        kind: operation_kind,
        name: operation_name.map(str::to_string),
        variable_definitions,
        directives: vec![],
        selection_set: Arc::new(SelectionSet { items: selections }),
    };

    Ok(CompilerResult {
        document: Document {
            definitions: vec![Definition::Operation(Arc::new(definition))],
        },
        variables,
    })
}

/// Where a field lands in the compiled selection set.
#[derive(PartialEq, Eq, Hash)]
struct FragmentDetails {
    type_condition: Option<String>,
    defer: Option<DeferExecution>,
}

struct Compiler<'a> {
    schema: &'a SchemaState,
    operation: &'a NormalizedOperation,
    accumulator: VariableAccumulator<'a>,
    defer_support: bool,
}

impl Compiler<'_> {
    fn subselections(&mut self, parent_output_type: &str, fields: &[FieldId]) -> Vec<Selection> {
        let mut selections = vec![];
        let mut fragments: IndexMap<FragmentDetails, Vec<Selection>> = IndexMap::new();

        let operation = self.operation;
        for id in fields {
            let field = operation.field(*id);
            let defers: Vec<Option<DeferExecution>> =
                if self.defer_support && !field.defer_executions().is_empty() {
                    field.defer_executions().iter().cloned().map(Some).collect()
                } else {
                    vec![None]
                };

            if operation.is_conditional(*id, self.schema) {
                for object_type in field.object_type_names() {
                    let selection = self.field_selection(object_type, *id);
                    for defer in &defers {
                        fragments
                            .entry(FragmentDetails {
                                type_condition: Some(object_type.clone()),
                                defer: defer.clone(),
                            })
                            .or_default()
                            .push(selection.clone());
                    }
                }
            } else {
                let selection = self.field_selection(parent_output_type, *id);
                if defers[0].is_none() {
                    selections.push(selection);
                    continue;
                }
                for defer in defers {
                    fragments
                        .entry(FragmentDetails {
                            type_condition: None,
                            defer,
                        })
                        .or_default()
                        .push(selection.clone());
                }
            }
        }

        for (details, items) in fragments {
            let directives = match details.defer {
                Some(defer) => vec![defer_directive(&defer)],
                None => vec![],
            };
            selections.push(Selection::InlineFragment(Arc::new(InlineFragment {
                type_condition: details.type_condition,
                directives,
                selection_set: Arc::new(SelectionSet { items }),
            })));
        }

        selections
    }

    /// `id` compiled as a field of `object_type`.
    fn field_selection(&mut self, object_type: &str, id: FieldId) -> Selection {
        let operation = self.operation;
        let field = operation.field(id);

        let selection_set = if field.has_children() {
            let definition = self
                .schema
                .field_definition(object_type, field.field_name())
                .unwrap_or_else(|| {
                    panic!("type '{object_type}' has no field '{}'", field.field_name())
                });
            let items = self.subselections(definition.field_type.inner_type(), field.children());
            Some(Arc::new(SelectionSet { items }))
        } else {
            None
        };

        let arguments = field
            .normalized_arguments()
            .iter()
            .map(|(name, value)| {
                let value = self.argument_value(field, name, value);
                Arc::new(Argument::new(name.clone(), value))
            })
            .collect();

        Selection::Field(Arc::new(Field {
            alias: field.alias().map(str::to_string),
            name: field.field_name().to_string(),
            arguments,
            directives: vec![],
            selection_set,
        }))
    }

    fn argument_value(
        &mut self,
        field: &NormalizedField,
        argument_name: &str,
        value: &NormalizedInputValue,
    ) -> Value {
        if self.accumulator.should_make_variable(field, argument_name, value) {
            return self.accumulator.accumulate(value);
        }

        match &value.value {
            NormalizedValue::Null => Value::Null,
            NormalizedValue::Scalar(literal) => literal.clone(),
            NormalizedValue::List(items) => Value::List(
                items
                    .iter()
                    .map(|item| self.argument_value(field, argument_name, item))
                    .collect(),
            ),
            NormalizedValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, item)| {
                        ObjectField::new(name.clone(), self.argument_value(field, argument_name, item))
                    })
                    .collect(),
            ),
        }
    }
}

fn defer_directive(defer: &DeferExecution) -> Arc<Directive> {
    let arguments = match &defer.label {
        Some(label) => vec![Arc::new(Argument::new("label", Value::String(label.clone())))],
        None => vec![],
    };
    Arc::new(Directive {
        name: "defer".to_string(),
        arguments,
    })
}
