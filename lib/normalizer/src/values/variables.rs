use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{instrument, trace};

use super::coercion::{CoercionContext, InputValueSource};
use super::error::CoercionError;
use super::NormalizedInputValue;
use crate::ast::VariableDefinition;
use crate::schema::SchemaState;

/// Variable values after coercion against the operation's variable definitions.
///
/// Variables that were neither provided nor defaulted are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercedVariables {
    values: JsonMap<String, JsonValue>,
    normalized: IndexMap<String, NormalizedInputValue>,
}

impl CoercedVariables {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Plain values, keyed by variable name.
    pub fn values(&self) -> &JsonMap<String, JsonValue> {
        &self.values
    }

    /// Typed values, in variable definition order.
    pub fn normalized(&self) -> &IndexMap<String, NormalizedInputValue> {
        &self.normalized
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[instrument(level = "trace", skip_all, fields(definitions = definitions.len()))]
pub fn coerce_variable_values(
    schema: &SchemaState,
    definitions: &[Arc<VariableDefinition>],
    raw_variables: &JsonMap<String, JsonValue>,
) -> Result<CoercedVariables, CoercionError> {
    // defaults are literals without variables
    let no_variables = JsonMap::new();
    let ctx = CoercionContext::new(schema, &no_variables);
    let mut coerced = CoercedVariables::default();

    for definition in definitions {
        let path = format!("${}", definition.name);
        let non_null_error = || CoercionError::NonNullVariable {
            variable_name: definition.name.clone(),
            type_name: definition.var_type.to_string(),
        };

        let value = match raw_variables.get(&definition.name) {
            Some(JsonValue::Null) if definition.var_type.is_non_null() => {
                return Err(non_null_error())
            }
            Some(raw) => raw.coerce(&ctx, &definition.var_type, &path)?,
            None => match &definition.default_value {
                Some(default_value) => default_value.coerce(&ctx, &definition.var_type, &path)?,
                None if definition.var_type.is_non_null() => return Err(non_null_error()),
                None => None,
            },
        };

        if let Some(value) = value {
            trace!(variable = %definition.name, value = %value, "variable coerced");
            coerced.values.insert(definition.name.clone(), value.to_json());
            coerced.normalized.insert(definition.name.clone(), value);
        }
    }

    Ok(coerced)
}
