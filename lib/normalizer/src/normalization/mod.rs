//! Turns an operation into the tree of fields a runtime executes, one field
//! per result key and set of concrete object types.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{debug, instrument};

pub mod collector;
mod conditionals;
pub mod context;
pub mod error;
mod factory;
pub mod field;
mod merger;
pub mod operation;

use crate::ast::{Document, OperationDefinition};
use crate::config::NormalizerConfig;
use crate::schema::SchemaState;
use crate::values::{coerce_variable_values, CoercedVariables};
use context::NormalizationContext;
use factory::NormalizedOperationFactory;

pub use collector::{CollectedField, FieldCollector};
pub use error::NormalizationError;
pub use field::{DeferExecution, FieldCoordinates, FieldId, NormalizedField};
pub use operation::NormalizedOperation;

/// Picks the operation to run: the one named `operation_name`, or the only
/// operation of the document when no name is given.
pub fn get_operation<'d>(
    document: &'d Document,
    operation_name: Option<&str>,
) -> Result<&'d Arc<OperationDefinition>, NormalizationError> {
    match operation_name {
        Some(name) => document
            .operations()
            .find(|op| op.name.as_deref() == Some(name))
            .ok_or_else(|| NormalizationError::SpecifiedOperationNotFound {
                operation_name: name.to_string(),
            }),
        None => {
            let mut operations = document.operations();
            let first = operations.next().ok_or(NormalizationError::OperationNotFound)?;
            if operations.next().is_some() {
                return Err(NormalizationError::MultipleMatchingOperationsFound);
            }
            Ok(first)
        }
    }
}

/// Normalizes the selected operation with variables that were already coerced.
#[instrument(level = "trace", skip(schema, document, variables, config))]
pub fn normalize_operation(
    schema: &SchemaState,
    document: &Document,
    operation_name: Option<&str>,
    variables: &CoercedVariables,
    config: &NormalizerConfig,
) -> Result<NormalizedOperation, NormalizationError> {
    let operation = get_operation(document, operation_name)?;
    normalize_selected(schema, document, operation, variables.clone(), config)
}

/// Coerces `raw_variables` against the operation's variable definitions first,
/// keeping the typed values on the result.
#[instrument(level = "trace", skip(schema, document, raw_variables, config))]
pub fn normalize_operation_with_raw_variables(
    schema: &SchemaState,
    document: &Document,
    operation_name: Option<&str>,
    raw_variables: &JsonMap<String, JsonValue>,
    config: &NormalizerConfig,
) -> Result<NormalizedOperation, NormalizationError> {
    let operation = get_operation(document, operation_name)?;
    let variables = coerce_variable_values(schema, &operation.variable_definitions, raw_variables)?;
    normalize_selected(schema, document, operation, variables, config)
}

fn normalize_selected(
    schema: &SchemaState,
    document: &Document,
    operation: &OperationDefinition,
    variables: CoercedVariables,
    config: &NormalizerConfig,
) -> Result<NormalizedOperation, NormalizationError> {
    let values = variables.values().clone();
    let ctx = NormalizationContext::new(schema, config, document, &values);
    let (normalized, _) = NormalizedOperationFactory::new(&ctx, &values).create(operation, variables)?;
    Ok(normalized)
}

/// One normalized operation of a [`NormalizedDocument`], with the
/// `@skip`/`@include` variable values it was built under.
#[derive(Debug)]
pub struct NormalizedOperationWithAssumedSkipIncludeVariables {
    /// `None` when the operation has no variable driven `@skip`/`@include`.
    pub assumed_skip_include_variables: Option<IndexMap<String, bool>>,
    pub normalized_operation: NormalizedOperation,
}

/// Every operation of a document, normalized ahead of knowing variable values.
#[derive(Debug, Default)]
pub struct NormalizedDocument {
    pub normalized_operations: Vec<NormalizedOperationWithAssumedSkipIncludeVariables>,
}

impl NormalizedDocument {
    /// The variant matching the given `@skip`/`@include` values.
    pub fn operation_for(
        &self,
        operation_name: Option<&str>,
        skip_include_variables: &JsonMap<String, JsonValue>,
    ) -> Option<&NormalizedOperation> {
        self.normalized_operations
            .iter()
            .filter(|op| op.normalized_operation.operation_name() == operation_name)
            .find(|op| match &op.assumed_skip_include_variables {
                None => true,
                Some(assumed) => assumed.iter().all(|(name, value)| {
                    skip_include_variables.get(name).and_then(JsonValue::as_bool) == Some(*value)
                }),
            })
            .map(|op| &op.normalized_operation)
    }
}

/// Normalizes every operation without variable values. Arguments referring to
/// variables are left unresolved, and each operation is built once per
/// combination of the boolean values its `@skip`/`@include` variables can take.
#[instrument(level = "trace", skip_all)]
pub fn normalize_document(
    schema: &SchemaState,
    document: &Document,
    config: &NormalizerConfig,
) -> Result<NormalizedDocument, NormalizationError> {
    let no_variables = JsonMap::new();
    let ctx =
        NormalizationContext::new(schema, config, document, &no_variables).with_pending_variables();
    let mut normalized_operations = vec![];

    for operation in document.operations() {
        let (normalized, skip_include_variables) =
            NormalizedOperationFactory::new(&ctx, &no_variables)
                .create(operation, CoercedVariables::empty())?;

        if skip_include_variables.is_empty() {
            normalized_operations.push(NormalizedOperationWithAssumedSkipIncludeVariables {
                assumed_skip_include_variables: None,
                normalized_operation: normalized,
            });
            continue;
        }

        let count = skip_include_variables.len();
        let too_many = NormalizationError::TooManySkipIncludeVariables {
            count,
            max_skip_include_variables: config.max_skip_include_variables,
        };
        if count > config.max_skip_include_variables {
            return Err(too_many);
        }
        let combinations = u32::try_from(count)
            .ok()
            .and_then(|count| 1usize.checked_shl(count))
            .ok_or(too_many)?;
        debug!(
            operation = operation.name.as_deref(),
            variables = ?skip_include_variables,
            combinations,
            "normalizing every @skip/@include combination"
        );

        for combination in 0..combinations {
            let assumed: IndexMap<String, bool> = skip_include_variables
                .iter()
                .enumerate()
                .map(|(index, name)| (name.clone(), combination & (1usize << index) != 0))
                .collect();
            let condition_values: JsonMap<String, JsonValue> = assumed
                .iter()
                .map(|(name, value)| (name.clone(), JsonValue::Bool(*value)))
                .collect();

            let (normalized, _) = NormalizedOperationFactory::new(&ctx, &condition_values)
                .create(operation, CoercedVariables::empty())?;
            normalized_operations.push(NormalizedOperationWithAssumedSkipIncludeVariables {
                assumed_skip_include_variables: Some(assumed),
                normalized_operation: normalized,
            });
        }
    }

    Ok(NormalizedDocument {
        normalized_operations,
    })
}
